mod constants;
pub use constants::*;

mod error;
pub use error::{CdbError, Result};

mod hash;
pub use hash::cdb_hash;

mod layout;
pub use layout::{RecordHeader, Slot, TableRef};

mod value_handle;
pub use value_handle::ValueHandle;

mod writer;
pub use writer::CdbWriter;

mod reader;
pub use reader::{CdbReader, Lookup};
