pub mod error;
pub mod writer;

pub use error::ResultsError;
pub use writer::{format_record, ResultWriter};
