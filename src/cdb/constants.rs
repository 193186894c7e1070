/// Number of top-level hash buckets, selected by the low 8 bits of a hash.
pub const TABLE_COUNT: usize = 256;

/// One header entry per bucket: `(u32 position, u32 slot_count)`.
pub const HEADER_ENTRY_SIZE: usize = 8;

/// Fixed header region at the start of every database file.
pub const HEADER_SIZE: usize = TABLE_COUNT * HEADER_ENTRY_SIZE; // 2048

/// One subtable slot: `(u32 hash, u32 record_position)`.
pub const SLOT_SIZE: usize = 8;

/// Record framing prefix: `(u32 key_len, u32 value_len)`.
pub const RECORD_HEADER_SIZE: usize = 8;
