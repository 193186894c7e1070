/// Substitute for a computed hash of exactly 0, which would be
/// indistinguishable from the zero-filled empty-slot sentinel. Applied
/// inside [`cdb_hash`] so the writer and reader agree by construction.
const ZERO_HASH_SUBSTITUTE: u32 = 0x8000_0000;

/// 32-bit DJB-style key hash shared by the writer and reader.
///
/// Starts at 5381; for each byte, `hash = ((hash << 5) + hash) ^ byte`,
/// truncated to 32 bits at every step.
#[inline]
pub fn cdb_hash(key: &[u8]) -> u32 {
    let mut hash: u32 = 5381;
    for &byte in key {
        hash = (hash << 5).wrapping_add(hash) ^ u32::from(byte);
    }
    if hash == 0 { ZERO_HASH_SUBSTITUTE } else { hash }
}
