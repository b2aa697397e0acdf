//! Encoding of query results to text formats and of tables back into the binary
//! data file format.
pub mod csv;
mod file;
pub mod json;

use std::io;

pub use file::{class_table, FileEncoder};

use crate::Frame;

/// Trait for types that encode query results.
pub trait EncodeFrame {
    /// Encodes every row of `frame`.
    ///
    /// # Errors
    /// This function returns an error if it's unable to write to the underlying
    /// writer or a column name can't be resolved.
    fn encode_frame(&mut self, frame: &Frame) -> crate::Result<()>;

    /// Flushes any buffered content to the true output.
    ///
    /// # Errors
    /// This function returns an error if it's unable to flush the underlying writer.
    fn flush(&mut self) -> crate::Result<()>;
}

/// Returns the header names for `frame`, either registry display names or the raw
/// field codes.
pub(crate) fn column_headers(frame: &Frame, use_raw_codes: bool) -> crate::Result<Vec<String>> {
    if use_raw_codes {
        Ok(frame
            .column_codes()
            .into_iter()
            .map(|code| code.to_string())
            .collect())
    } else {
        Ok(frame
            .column_names()?
            .into_iter()
            .map(str::to_owned)
            .collect())
    }
}

pub(crate) fn flush_writer(writer: &mut impl io::Write) -> crate::Result<()> {
    writer
        .flush()
        .map_err(|e| crate::Error::io(e, "flushing output"))
}
