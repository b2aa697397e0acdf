//! A crate for reading WTA finance data files: the fixed-layout binary container
//! holding historical quotes and financial statements for a single security, and
//! converting the decoded tables to other encodings.
//!
//! ```no_run
//! use wtadat::{DataSource, DecodeOptions};
//!
//! let source = DataSource::read_file("000001.dat", DecodeOptions::default())?;
//! let frame = source.search_data(Some("2020-01-01"), None, None)?;
//! println!("{:?}", frame.column_names()?);
//! # Ok::<(), wtadat::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::missing_errors_doc)]

pub mod codec;
pub mod datetime;
pub mod decode;
pub mod encode;
pub mod error;
pub mod query;
pub mod record;
pub mod registry;
pub mod source;
#[cfg(test)]
mod test_utils;

pub use crate::{
    datetime::DecodeOptions,
    error::{Error, Result},
    query::{Frame, Query},
    record::{
        ClassCode, ClassEntry, ClassHeader, ClassTable, FieldDescriptor, FileHeader, Row,
        StorageType, Value,
    },
    source::{read_files, DataSource},
};

/// Length in bytes of the file header region at the start of every file.
pub const FILE_HEADER_LEN: usize = 1024;
/// Offset of the class table within the file header.
const CLASS_TABLE_OFFSET: usize = 32;
/// Length in bytes of one class table entry: `u32` class code and `i64` start offset.
pub const CLASS_ENTRY_LEN: usize = 12;
/// Length in bytes of the header region reserved for each class.
pub const CLASS_HEADER_LEN: usize = 6400;
/// Offset of the first field descriptor within a class header.
const FIELD_DESCRIPTORS_OFFSET: usize = 14;
/// Length in bytes of one field descriptor inside a class header.
pub const FIELD_DESCRIPTOR_LEN: usize = 21;
/// Length in bytes of the body region reserved for each class in a multi-class file.
/// Fixed by the producer's format version.
pub const CLASS_BODY_LEN: usize = 8 * 200 * 4 * 50;
/// Total length of one class slot, header and body, in a multi-class file.
pub const CLASS_SLOT_LEN: usize = CLASS_BODY_LEN + CLASS_HEADER_LEN;
/// Width in bytes of the leading time key and of every field value in a row.
pub const VALUE_LEN: usize = 8;
