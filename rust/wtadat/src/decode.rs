//! Decoding of the regions of a data file: the file header, then per class a class
//! header followed by a body of fixed-stride rows.
//!
//! The functions here operate on byte windows already sliced from the file.
//! [`DataSource`](crate::DataSource) ties them together.
mod class;
mod dyn_reader;
mod file_header;
pub(crate) mod zstd;

pub use class::{decode_class_body, decode_class_header, decode_field_descriptor};
#[cfg(feature = "async")]
pub use dyn_reader::AsyncDynReader;
pub use dyn_reader::DynReader;
pub(crate) use dyn_reader::read_all;
pub use file_header::decode_file_header;
