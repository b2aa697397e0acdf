//! Encoding of query results into comma-separated values (CSV) and other
//! text-delimited formats.
use std::io;

use super::{column_headers, EncodeFrame};
use crate::{Frame, Value};

/// Type for encoding [`Frame`]s in CSV or other text-delimited tabular file formats
/// including TSV (tab-separated values).
pub struct Encoder<W>
where
    W: io::Write,
{
    writer: csv::Writer<W>,
    write_header: bool,
    use_raw_codes: bool,
    // Prevent writing header twice
    has_written_header: bool,
}

/// Helper for constructing a CSV [`Encoder`].
///
/// No fields are required.
pub struct EncoderBuilder<W>
where
    W: io::Write,
{
    writer: W,
    write_header: bool,
    use_raw_codes: bool,
    delimiter: u8,
}

impl<W> EncoderBuilder<W>
where
    W: io::Write,
{
    /// Creates a new CSV encoder builder.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            write_header: true,
            use_raw_codes: false,
            delimiter: b',',
        }
    }

    /// Sets whether the encoder will write a header row before the first frame.
    /// Defaults to `true`.
    pub fn write_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    /// Sets whether the header row will contain the raw field codes instead of the
    /// registry display names. Defaults to `false`.
    pub fn use_raw_codes(mut self, use_raw_codes: bool) -> Self {
        self.use_raw_codes = use_raw_codes;
        self
    }

    /// Sets the field delimiter. Defaults to `b','` for comma-separated values (CSV).
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Creates the new encoder with the previously specified settings.
    pub fn build(self) -> Encoder<W> {
        Encoder {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .delimiter(self.delimiter)
                .from_writer(self.writer),
            write_header: self.write_header,
            use_raw_codes: self.use_raw_codes,
            has_written_header: false,
        }
    }
}

impl<W> Encoder<W>
where
    W: io::Write,
{
    /// Creates a new [`Encoder`] that writes comma-separated values with a header
    /// row of display names.
    pub fn new(writer: W) -> Self {
        EncoderBuilder::new(writer).build()
    }

    /// Creates a builder for configuring an `Encoder` object.
    pub fn builder(writer: W) -> EncoderBuilder<W> {
        EncoderBuilder::new(writer)
    }

    /// Encodes the header row for `frame`, regardless of whether one has already
    /// been written.
    ///
    /// # Errors
    /// This function returns an error if a column name can't be resolved or it's
    /// unable to write to the underlying writer.
    pub fn encode_header(&mut self, frame: &Frame) -> crate::Result<()> {
        let headers = column_headers(frame, self.use_raw_codes)?;
        self.writer.write_record(&headers)?;
        self.has_written_header = true;
        Ok(())
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    fn encode_row(&mut self, row: &[Value]) -> crate::Result<()> {
        for value in row {
            match value {
                Value::Int(v) => self.writer.write_field(v.to_string())?,
                Value::Float(v) => self.writer.write_field(v.to_string())?,
                Value::Timestamp(v) => self
                    .writer
                    .write_field(crate::datetime::format_datetime(v)?)?,
            }
        }
        // end of line
        self.writer.write_record(None::<&[u8]>)?;
        Ok(())
    }
}

impl<W> EncodeFrame for Encoder<W>
where
    W: io::Write,
{
    fn encode_frame(&mut self, frame: &Frame) -> crate::Result<()> {
        // a frame without columns has no header row
        if self.write_header && !self.has_written_header && !frame.fields.is_empty() {
            self.encode_header(frame)?;
        }
        for row in frame.rows.iter() {
            self.encode_row(row)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> crate::Result<()> {
        self.writer
            .flush()
            .map_err(|e| crate::Error::io(e, "flushing CSV output"))
    }
}
