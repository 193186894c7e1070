use crate::cdb::constants::*;
use crate::cdb::error::{CdbError, Result};
use crate::cdb::hash::cdb_hash;
use crate::cdb::layout::{self, RecordHeader, Slot, TableRef};
use crate::cdb::value_handle::ValueHandle;
use memmap2::Mmap;
use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Read session over a finalized constant database.
///
/// `open` memory-maps the file and decodes the 256-entry header once; both
/// are immutable afterwards, so a reader is `Send + Sync` and lookups may be
/// issued concurrently. Each lookup carries its own probe state in a
/// [`Lookup`] cursor rather than on the session object, so in-flight
/// lookups never observe each other's progress.
#[derive(Debug)]
pub struct CdbReader {
    mmap: Arc<Mmap>,
    header: [TableRef; TABLE_COUNT],
}

impl CdbReader {
    /// Opens a finalized database file for reading.
    ///
    /// Decodes the 2048-byte header and validates that every nonempty
    /// bucket's subtable lies within the file.
    ///
    /// # Returns:
    /// - `Ok(CdbReader)`: A read session over the file.
    /// - `Err(CdbError::Io)`: If the file does not exist or cannot be
    ///   opened/mapped.
    /// - `Err(CdbError::Malformed)`: If the file is smaller than the header
    ///   region or a subtable extent is inconsistent with the file size.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        if file_len < HEADER_SIZE as u64 {
            return Err(CdbError::Malformed(format!(
                "file is {file_len} bytes, smaller than the {HEADER_SIZE}-byte header"
            )));
        }

        let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };
        let header = layout::decode_header(&mmap[..HEADER_SIZE])?;

        for (index, table) in header.iter().enumerate() {
            if table.slot_count == 0 {
                continue;
            }
            let start = u64::from(table.position);
            let end = start + u64::from(table.slot_count) * SLOT_SIZE as u64;
            if start < HEADER_SIZE as u64 || end > file_len {
                return Err(CdbError::Malformed(format!(
                    "bucket {index}: subtable {start}..{end} is outside the {file_len}-byte file"
                )));
            }
        }

        debug!(bytes = file_len, "opened constant database");

        Ok(Self {
            mmap: Arc::new(mmap),
            header,
        })
    }

    /// Retrieves the first value stored under `key`.
    ///
    /// # Returns:
    /// - `Ok(Some(ValueHandle))`: Zero-copy handle to the value bytes.
    /// - `Ok(None)`: The key was never written. Not an error.
    /// - `Err(CdbError::Malformed)`: A slot or record referenced bytes
    ///   outside the file.
    pub fn get(&self, key: &[u8]) -> Result<Option<ValueHandle>> {
        self.get_nth(key, 0)
    }

    /// Retrieves the value at zero-based `occurrence` among all values
    /// stored under `key`, in insertion order.
    ///
    /// Requesting an occurrence past the last one stored returns
    /// `Ok(None)`, indistinguishable from a key that was never written.
    pub fn get_nth(&self, key: &[u8], occurrence: usize) -> Result<Option<ValueHandle>> {
        let mut lookup = self.lookup(key);
        for _ in 0..occurrence {
            match lookup.next() {
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err),
                None => return Ok(None),
            }
        }
        lookup.next().transpose()
    }

    /// Starts a probe for `key`, returning a caller-held cursor over all of
    /// its values in insertion order.
    ///
    /// Each call to [`Lookup::next`] resumes from the slot after the most
    /// recent match, so iterating yields every duplicate without repeating
    /// the walk from the bucket's natural slot.
    pub fn lookup<'r, 'k>(&'r self, key: &'k [u8]) -> Lookup<'r, 'k> {
        let hash = cdb_hash(key);
        let table = self.header[(hash & 0xff) as usize];
        let slot = if table.slot_count == 0 {
            0
        } else {
            (hash >> 8) % table.slot_count
        };

        Lookup {
            reader: self,
            key,
            hash,
            table,
            slot,
            probed: 0,
        }
    }

    /// Releases the session. Equivalent to dropping the reader; existing
    /// [`ValueHandle`]s keep the underlying map alive.
    pub fn close(self) {}

    /// Locates the value range of the record at `position` if its stored
    /// key equals `key`. `Ok(None)` means the hashes collided but the keys
    /// differ.
    fn record_value(&self, position: u32, key: &[u8]) -> Result<Option<Range<usize>>> {
        let file_len = self.mmap.len() as u64;
        let start = u64::from(position);
        let key_start = start + RECORD_HEADER_SIZE as u64;

        if start < HEADER_SIZE as u64 || key_start > file_len {
            return Err(CdbError::Malformed(format!(
                "slot references record at {start}, outside the {file_len}-byte file"
            )));
        }

        let header = RecordHeader::deserialize(&self.mmap[start as usize..key_start as usize]);

        // Cheap length check first; a mismatched length can never be our key.
        if header.key_len as usize != key.len() {
            return Ok(None);
        }

        let value_start = key_start + u64::from(header.key_len);
        let value_end = value_start + u64::from(header.value_len);
        if value_end > file_len {
            return Err(CdbError::Malformed(format!(
                "record at {start} extends to {value_end}, past the {file_len}-byte file"
            )));
        }

        if &self.mmap[key_start as usize..value_start as usize] != key {
            return Ok(None);
        }

        Ok(Some(value_start as usize..value_end as usize))
    }
}

/// Caller-held probe cursor over all values stored under one key.
///
/// Produced by [`CdbReader::lookup`]. Yields `Ok(ValueHandle)` per true
/// occurrence, in insertion order; terminates at the first empty slot.
/// Hash collisions with other keys are skipped transparently and do not
/// consume an occurrence.
pub struct Lookup<'r, 'k> {
    reader: &'r CdbReader,
    key: &'k [u8],
    hash: u32,
    table: TableRef,
    /// Current slot index, already reduced modulo `table.slot_count`.
    slot: u32,
    probed: u32,
}

impl Iterator for Lookup<'_, '_> {
    type Item = Result<ValueHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        // A table built at 0.5 load factor always contains empty slots, so
        // the probe cap is only reached on corrupted files.
        while self.probed < self.table.slot_count {
            let base = self.table.position as usize + self.slot as usize * SLOT_SIZE;
            let stored = Slot::deserialize(&self.reader.mmap[base..base + SLOT_SIZE]);

            self.slot = (self.slot + 1) % self.table.slot_count;
            self.probed += 1;

            if stored.is_empty() {
                // No more candidates in this bucket; park the cursor so
                // later calls stay exhausted.
                self.probed = self.table.slot_count;
                return None;
            }
            if stored.hash != self.hash {
                continue;
            }

            match self.reader.record_value(stored.position, self.key) {
                Ok(Some(range)) => {
                    return Some(Ok(ValueHandle {
                        mmap: Arc::clone(&self.reader.mmap),
                        range,
                    }));
                }
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }

        None
    }
}
