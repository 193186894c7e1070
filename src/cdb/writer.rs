use crate::cdb::constants::*;
use crate::cdb::error::{CdbError, Result};
use crate::cdb::hash::cdb_hash;
use crate::cdb::layout::{self, RecordHeader, Slot, TableRef};
use std::fs::OpenOptions;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Streaming constant-database builder.
///
/// Records are framed and written to disk as they arrive; only the
/// `(hash, position)` pairs are buffered in memory, grouped by bucket.
/// [`CdbWriter::finalize`] then appends the 256 subtables and overwrites the
/// reserved header region, in that order, so a crash mid-build never
/// produces a header pointing at incomplete subtables.
///
/// A writer exists only for the construction of one file: `finalize`
/// consumes it. If any `put` fails at the storage layer the writer is
/// poisoned and every later operation fails with
/// [`CdbError::InvalidState`]; the partially written file must be discarded.
pub struct CdbWriter {
    file: BufWriter<std::fs::File>,
    /// Next record position; starts just past the reserved header region.
    position: u32,
    /// Per-bucket `(hash, record position)` pairs, in insertion order.
    buckets: Vec<Vec<Slot>>,
    poisoned: bool,
}

impl CdbWriter {
    /// Begins a new database file at `path`, creating or truncating it.
    ///
    /// The first 2048 bytes are reserved for the header (written last) and
    /// the record cursor is positioned at byte 2048.
    ///
    /// # Returns:
    /// - `Ok(CdbWriter)`: An open writer session.
    /// - `Err(CdbError::Io)`: If the file cannot be created for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut file = BufWriter::new(file);
        file.seek(SeekFrom::Start(HEADER_SIZE as u64))?;

        Ok(Self {
            file,
            position: HEADER_SIZE as u32,
            buckets: vec![Vec::new(); TABLE_COUNT],
            poisoned: false,
        })
    }

    /// Appends one record.
    ///
    /// Records for the same key may be added in any order relative to other
    /// keys; retrieval order on read equals insertion order. Empty keys and
    /// empty values are permitted.
    ///
    /// # Parameters:
    /// - `key`: The binary key; its byte length must fit `u32`.
    /// - `value`: The binary value; its byte length must fit `u32`.
    ///
    /// # Returns:
    /// - `Ok(())`: The record bytes were handed to the record stream.
    /// - `Err(CdbError::RecordTooLarge)`: Framing or the resulting file
    ///   position does not fit the format's 32-bit fields.
    /// - `Err(CdbError::InvalidState)`: The writer was poisoned by an
    ///   earlier failure.
    /// - `Err(CdbError::Io)`: The write itself failed; the writer is now
    ///   poisoned.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.poisoned {
            return Err(CdbError::InvalidState(
                "writer poisoned by an earlier I/O failure",
            ));
        }

        let header = RecordHeader {
            key_len: u32::try_from(key.len())
                .map_err(|_| CdbError::RecordTooLarge("key length exceeds u32"))?,
            value_len: u32::try_from(value.len())
                .map_err(|_| CdbError::RecordTooLarge("value length exceeds u32"))?,
        };

        let record_len = RECORD_HEADER_SIZE as u64 + key.len() as u64 + value.len() as u64;
        let end = u64::from(self.position) + record_len;
        if end > u64::from(u32::MAX) {
            return Err(CdbError::RecordTooLarge(
                "record region exceeds 32-bit file addressing",
            ));
        }

        if let Err(err) = self.stream_record(&header, key, value) {
            self.poisoned = true;
            return Err(err.into());
        }

        let hash = cdb_hash(key);
        self.buckets[(hash & 0xff) as usize].push(Slot {
            hash,
            position: self.position,
        });
        self.position = end as u32;

        Ok(())
    }

    fn stream_record(
        &mut self,
        header: &RecordHeader,
        key: &[u8],
        value: &[u8],
    ) -> std::io::Result<()> {
        self.file.write_all(&header.serialize())?;
        self.file.write_all(key)?;
        self.file.write_all(value)
    }

    /// Completes the database, consuming the writer.
    ///
    /// Three strictly ordered phases:
    /// 1. Flush the streamed record bytes.
    /// 2. Build and append the 256 subtables in bucket order, recording each
    ///    bucket's `(position, slot_count)`.
    /// 3. Seek to offset 0, write the 2048-byte header, flush, and sync.
    ///
    /// # Returns:
    /// - `Ok(())`: All three phases are durably written.
    /// - `Err(CdbError::Io)`: A write/flush failed; the file is in an
    ///   indeterminate, non-finalized state and must not be used.
    pub fn finalize(mut self) -> Result<()> {
        if self.poisoned {
            return Err(CdbError::InvalidState(
                "writer poisoned by an earlier I/O failure",
            ));
        }

        // Phase 1: close out the record stream.
        self.file.flush()?;

        // Phase 2: subtables, in bucket index order.
        let record_count: usize = self.buckets.iter().map(Vec::len).sum();
        let mut header = [TableRef::default(); TABLE_COUNT];

        for (index, bucket) in self.buckets.iter().enumerate() {
            let table = build_subtable(bucket);

            let end = u64::from(self.position) + table.len() as u64;
            if end > u64::from(u32::MAX) {
                return Err(CdbError::RecordTooLarge(
                    "subtable region exceeds 32-bit file addressing",
                ));
            }

            self.file.write_all(&table)?;
            header[index] = TableRef {
                position: self.position,
                slot_count: (bucket.len() * 2) as u32,
            };
            self.position = end as u32;
        }
        self.file.flush()?;

        // Phase 3: the header is the last thing written.
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&layout::encode_header(&header))?;
        self.file.flush()?;
        self.file.get_ref().sync_all()?;

        debug!(
            records = record_count,
            bytes = self.position,
            "finalized constant database"
        );

        Ok(())
    }
}

/// Builds one bucket's open-addressed subtable buffer: `2n` zero-filled
/// slots for `n` entries, each inserted at `(hash >> 8) % slot_count` with
/// forward linear probing to the first empty slot. Deterministic for a given
/// insertion order; ties among equal hashes keep insertion order.
fn build_subtable(entries: &[Slot]) -> Vec<u8> {
    let slot_count = entries.len() * 2;
    let mut table = vec![0u8; slot_count * SLOT_SIZE];

    for entry in entries {
        let mut slot = (entry.hash >> 8) as usize % slot_count;
        loop {
            let base = slot * SLOT_SIZE;
            if Slot::deserialize(&table[base..base + SLOT_SIZE]).is_empty() {
                table[base..base + SLOT_SIZE].copy_from_slice(&entry.serialize());
                break;
            }
            slot = (slot + 1) % slot_count;
        }
    }

    table
}
