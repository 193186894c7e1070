//! # cdbfile
//!
//! Constant database (CDB) files: an immutable, disk-resident, keyed
//! byte-string store optimized for fast single-key lookup without an
//! in-memory record index. A database is built once with [`CdbWriter`] and
//! thereafter opened read-only with [`CdbReader`] for point lookups,
//! including retrieval of multiple values stored under the same key.
//!
//! ## File layout
//!
//! All integers are little-endian.
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ HEADER (fixed 2048 bytes at offset 0)          │
//! │                                                │
//! │ 256 × [ position (u32) | slot_count (u32) ]    │
//! ├────────────────────────────────────────────────┤
//! │ RECORDS (insertion order)                      │
//! │                                                │
//! │ key_len (u32) | value_len (u32) | key | value  │
//! │ ... repeated for each record ...               │
//! ├────────────────────────────────────────────────┤
//! │ SUBTABLES (256, in bucket order)               │
//! │                                                │
//! │ slot_count × [ hash (u32) | position (u32) ]   │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Keys are partitioned into 256 buckets by the low 8 bits of a 32-bit
//! DJB-style hash. Each bucket owns an open-addressed subtable sized at
//! twice its entry count (0.5 load factor) and probed linearly, identically
//! on the write and read side. The header is written last, so a crash during
//! construction never yields a file that advertises incomplete subtables.
//!
//! ## Example
//!
//! ```no_run
//! use cdbfile::{CdbReader, CdbWriter};
//! # fn main() -> cdbfile::Result<()> {
//! let path = std::path::Path::new("lookup.cdb");
//!
//! let mut writer = CdbWriter::create(path)?;
//! writer.put(b"meow", b"0xdeadbeef")?;
//! writer.put(b"meow", b"0xbeefdead")?;
//! writer.put(b"abcd", b"test1")?;
//! writer.finalize()?;
//!
//! let reader = CdbReader::open(path)?;
//! assert_eq!(reader.get(b"abcd")?.unwrap(), b"test1".as_slice());
//! assert_eq!(reader.get_nth(b"meow", 1)?.unwrap(), b"0xbeefdead".as_slice());
//! assert!(reader.get(b"nope")?.is_none());
//! # Ok(())
//! # }
//! ```

pub mod cdb;

pub use cdb::{CdbError, CdbReader, CdbWriter, Lookup, Result, ValueHandle, cdb_hash};
