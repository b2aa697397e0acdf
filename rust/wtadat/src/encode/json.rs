//! Encoding of query results and file metadata into JavaScript Object Notation
//! (JSON).
use std::io;

use serde::{ser::SerializeMap, Serialize, Serializer};

use super::{column_headers, flush_writer, EncodeFrame};
use crate::{ClassCode, ClassEntry, ClassHeader, DataSource, Frame, Value};

/// Type for encoding [`Frame`]s in newline-delimited JSON, one object per row with
/// the columns as keys.
pub struct Encoder<W>
where
    W: io::Write,
{
    writer: W,
    should_pretty_print: bool,
    use_raw_codes: bool,
}

/// Helper for constructing a JSON [`Encoder`].
///
/// No fields are required.
pub struct EncoderBuilder<W>
where
    W: io::Write,
{
    writer: W,
    should_pretty_print: bool,
    use_raw_codes: bool,
}

impl<W> EncoderBuilder<W>
where
    W: io::Write,
{
    /// Creates a new JSON encoder builder.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            should_pretty_print: false,
            use_raw_codes: false,
        }
    }

    /// Sets whether the JSON encoder should encode nicely-formatted JSON objects
    /// with indentation. Defaults to `false` where each JSON object is compact with
    /// no spacing.
    pub fn should_pretty_print(mut self, should_pretty_print: bool) -> Self {
        self.should_pretty_print = should_pretty_print;
        self
    }

    /// Sets whether the object keys will be the raw field codes instead of the
    /// registry display names. Defaults to `false`.
    pub fn use_raw_codes(mut self, use_raw_codes: bool) -> Self {
        self.use_raw_codes = use_raw_codes;
        self
    }

    /// Creates the new encoder with the previously specified settings.
    pub fn build(self) -> Encoder<W> {
        Encoder {
            writer: self.writer,
            should_pretty_print: self.should_pretty_print,
            use_raw_codes: self.use_raw_codes,
        }
    }
}

impl<W> Encoder<W>
where
    W: io::Write,
{
    /// Creates a new instance of [`Encoder`]. If `should_pretty_print` is `true`,
    /// each JSON object will be nicely formatted and indented, instead of the default
    /// compact output with no whitespace between key-value pairs.
    pub fn new(writer: W, should_pretty_print: bool) -> Self {
        EncoderBuilder::new(writer)
            .should_pretty_print(should_pretty_print)
            .build()
    }

    /// Creates a builder for configuring an `Encoder` object.
    pub fn builder(writer: W) -> EncoderBuilder<W> {
        EncoderBuilder::new(writer)
    }

    /// Encodes the file header of `source` and a summary of each of its classes
    /// into a single JSON object.
    ///
    /// # Errors
    /// This function returns an error if there's an error writing to `writer`.
    pub fn encode_metadata(&mut self, source: &DataSource) -> crate::Result<()> {
        let header = source.header();
        let metadata = Metadata {
            security_code: &header.security_code,
            security_name: header.trimmed_security_name(),
            market: &header.market,
            flag: header.flag,
            class_table: &header.class_table,
            classes: source
                .tables()
                .map(|(class_code, table)| ClassSummary {
                    class_code,
                    name: table.header.name().ok(),
                    header: &table.header,
                    row_count: table.len(),
                })
                .collect(),
        };
        self.write_value(&metadata)?;
        flush_writer(&mut self.writer)
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    fn write_value<T: Serialize>(&mut self, value: &T) -> crate::Result<()> {
        if self.should_pretty_print {
            serde_json::to_writer_pretty(&mut self.writer, value)?;
        } else {
            serde_json::to_writer(&mut self.writer, value)?;
        }
        self.writer
            .write_all(b"\n")
            .map_err(|e| crate::Error::io(e, "writing JSON"))
    }
}

impl<W> EncodeFrame for Encoder<W>
where
    W: io::Write,
{
    fn encode_frame(&mut self, frame: &Frame) -> crate::Result<()> {
        let keys = column_headers(frame, self.use_raw_codes)?;
        for values in frame.rows.iter() {
            self.write_value(&JsonRow {
                keys: &keys,
                values,
            })?;
        }
        Ok(())
    }

    fn flush(&mut self) -> crate::Result<()> {
        flush_writer(&mut self.writer)
    }
}

/// A row serialized as a map, preserving column order.
struct JsonRow<'a> {
    keys: &'a [String],
    values: &'a [Value],
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for (key, value) in self.keys.iter().zip(self.values) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    security_code: &'a str,
    security_name: &'a str,
    market: &'a str,
    flag: bool,
    class_table: &'a [ClassEntry],
    classes: Vec<ClassSummary<'a>>,
}

#[derive(Serialize)]
struct ClassSummary<'a> {
    class_code: ClassCode,
    name: Option<&'static str>,
    header: &'a ClassHeader,
    row_count: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{test_utils::*, DecodeOptions};

    fn encode_frame(frame: &Frame, should_pretty_print: bool, use_raw_codes: bool) -> String {
        let mut encoder = Encoder::builder(Vec::new())
            .should_pretty_print(should_pretty_print)
            .use_raw_codes(use_raw_codes)
            .build();
        encoder.encode_frame(frame).unwrap();
        encoder.flush().unwrap();
        String::from_utf8(encoder.get_ref().clone()).unwrap()
    }

    #[test]
    fn test_encode_frame() {
        let frame = daily_quote_frame(&[(10, 1.5), (20, 2.25)]);
        assert_eq!(
            encode_frame(&frame, false, false),
            "{\"volume\":10,\"close\":1.5}\n{\"volume\":20,\"close\":2.25}\n"
        );
    }

    #[test]
    fn test_encode_frame_raw_codes() {
        let frame = daily_quote_frame(&[(10, 1.5)]);
        assert_eq!(
            encode_frame(&frame, false, true),
            "{\"1007011\":10,\"1007009\":1.5}\n"
        );
    }

    #[test]
    fn test_encode_frame_pretty() {
        let frame = daily_quote_frame(&[(10, 1.5)]);
        assert_eq!(
            encode_frame(&frame, true, false),
            "{\n  \"volume\": 10,\n  \"close\": 1.5\n}\n"
        );
    }

    #[test]
    fn test_encode_empty_frame() {
        assert_eq!(encode_frame(&Frame::empty(), false, false), "");
    }

    #[test]
    fn test_encode_metadata() {
        let tables = vec![daily_quote_table(&[(100, 10, 1.5), (200, 20, 2.5)])];
        let bytes = encode_file(&tables);
        let source = DataSource::from_bytes(&bytes, DecodeOptions::default()).unwrap();
        let mut encoder = Encoder::new(Vec::new(), false);
        encoder.encode_metadata(&source).unwrap();
        let res: serde_json::Value = serde_json::from_slice(encoder.get_ref()).unwrap();
        assert_eq!(res["security_code"], json!("000001"));
        assert_eq!(res["security_name"], json!("平安银行"));
        assert_eq!(res["market"], json!("SZ"));
        assert_eq!(res["class_table"][0]["class_code"], json!(1007));
        assert_eq!(res["class_table"][0]["start_offset"], json!(1024));
        let class = &res["classes"][0];
        assert_eq!(class["name"], json!("历史行情"));
        assert_eq!(class["row_count"], json!(2));
        assert_eq!(class["header"]["record_stride"], json!(24));
        assert_eq!(
            class["header"]["latest_timestamp"],
            json!("2021-01-04 07:00:00")
        );
        assert_eq!(class["header"]["fields"][0]["storage_type"], json!("Int64"));
    }
}
