//! Table input: parsing and the file read provider
pub mod source;
pub mod table;
