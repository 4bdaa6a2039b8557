// File I/O operations: reading invoice exports, writing comparison reports

pub mod csv;
pub mod error;
pub mod json;
pub mod source;
pub mod xlsx;

pub use error::IoError;
pub use source::{label_for, read_file_as_utf8};
