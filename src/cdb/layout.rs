//! Shared binary layout: header entries, subtable slots, and record framing.
//! All integers little-endian. This module carries no behavior beyond the
//! byte contract both the writer and reader rely on.

use crate::cdb::constants::*;
use crate::cdb::error::{CdbError, Result};

/// Header entry for one bucket: file position of its subtable and the number
/// of slots in it. An empty bucket has `slot_count == 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableRef {
    pub position: u32,
    pub slot_count: u32,
}

impl TableRef {
    #[inline]
    pub fn serialize(&self) -> [u8; HEADER_ENTRY_SIZE] {
        let mut buf = [0u8; HEADER_ENTRY_SIZE];
        buf[0..4].copy_from_slice(&self.position.to_le_bytes());
        buf[4..8].copy_from_slice(&self.slot_count.to_le_bytes());
        buf
    }

    #[inline]
    pub fn deserialize(data: &[u8]) -> Self {
        Self {
            position: u32::from_le_bytes(data[0..4].try_into().unwrap()),
            slot_count: u32::from_le_bytes(data[4..8].try_into().unwrap()),
        }
    }
}

/// One open-addressed subtable slot. The all-zero slot is the empty sentinel;
/// [`crate::cdb_hash`] never produces 0, so the sentinel is unambiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub hash: u32,
    pub position: u32,
}

impl Slot {
    #[inline]
    pub fn serialize(&self) -> [u8; SLOT_SIZE] {
        let mut buf = [0u8; SLOT_SIZE];
        buf[0..4].copy_from_slice(&self.hash.to_le_bytes());
        buf[4..8].copy_from_slice(&self.position.to_le_bytes());
        buf
    }

    #[inline]
    pub fn deserialize(data: &[u8]) -> Self {
        Self {
            hash: u32::from_le_bytes(data[0..4].try_into().unwrap()),
            position: u32::from_le_bytes(data[4..8].try_into().unwrap()),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hash == 0
    }
}

/// Framing prefix stored in front of every record's key and value bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_len: u32,
    pub value_len: u32,
}

impl RecordHeader {
    #[inline]
    pub fn serialize(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut buf = [0u8; RECORD_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.key_len.to_le_bytes());
        buf[4..8].copy_from_slice(&self.value_len.to_le_bytes());
        buf
    }

    #[inline]
    pub fn deserialize(data: &[u8]) -> Self {
        Self {
            key_len: u32::from_le_bytes(data[0..4].try_into().unwrap()),
            value_len: u32::from_le_bytes(data[4..8].try_into().unwrap()),
        }
    }
}

/// Serializes all 256 header entries into the fixed 2048-byte header region.
pub fn encode_header(entries: &[TableRef; TABLE_COUNT]) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    for (index, entry) in entries.iter().enumerate() {
        let base = index * HEADER_ENTRY_SIZE;
        buf[base..base + HEADER_ENTRY_SIZE].copy_from_slice(&entry.serialize());
    }
    buf
}

/// Decodes the 2048-byte header region into 256 bucket entries.
pub fn decode_header(data: &[u8]) -> Result<[TableRef; TABLE_COUNT]> {
    if data.len() < HEADER_SIZE {
        return Err(CdbError::Malformed(format!(
            "header region is {} bytes, expected {HEADER_SIZE}",
            data.len()
        )));
    }

    Ok(std::array::from_fn(|index| {
        let base = index * HEADER_ENTRY_SIZE;
        TableRef::deserialize(&data[base..base + HEADER_ENTRY_SIZE])
    }))
}
