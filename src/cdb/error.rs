use thiserror::Error;

pub type Result<T> = std::result::Result<T, CdbError>;

/// Errors surfaced by the writer and reader.
///
/// A missing key is **not** an error; lookups report absence as `Ok(None)`
/// so callers can distinguish "absent key" from "storage failure" cheaply.
#[derive(Debug, Error)]
pub enum CdbError {
    /// Open/read/write/flush failure at the storage layer. Never retried
    /// internally; callers own retry policy.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Operation invoked outside its valid lifecycle stage, e.g. writing
    /// through a writer poisoned by an earlier I/O failure.
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    /// The file does not decode as a finalized database: header region too
    /// short, or a subtable/record extent inconsistent with the file size.
    #[error("malformed database: {0}")]
    Malformed(String),

    /// Key, value, or resulting file position does not fit the format's
    /// 32-bit fields.
    #[error("record does not fit 32-bit framing: {0}")]
    RecordTooLarge(&'static str),
}
