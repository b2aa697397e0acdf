use std::io;

use crate::{
    codec::{encode_ascii_str, encode_unicode_str},
    ClassEntry, ClassHeader, ClassTable, DecodeOptions, FieldDescriptor, FileHeader, Row,
    StorageType, Value, CLASS_BODY_LEN, CLASS_ENTRY_LEN, CLASS_HEADER_LEN, CLASS_SLOT_LEN,
    CLASS_TABLE_OFFSET, FIELD_DESCRIPTORS_OFFSET, FIELD_DESCRIPTOR_LEN, FILE_HEADER_LEN,
    VALUE_LEN,
};

/// Returns the class table for a file containing `tables` in order, with the start
/// offset of each class slot.
pub fn class_table(tables: &[ClassTable]) -> Vec<ClassEntry> {
    tables
        .iter()
        .enumerate()
        .map(|(i, table)| ClassEntry {
            class_code: table.class_code(),
            start_offset: (FILE_HEADER_LEN + i * CLASS_SLOT_LEN) as i64,
        })
        .collect()
}

/// Type for encoding class tables into the binary data file format.
///
/// Timestamps are converted back to Unix time at the UTC offset in the
/// [`DecodeOptions`].
pub struct FileEncoder<W>
where
    W: io::Write,
{
    writer: W,
    options: DecodeOptions,
}

impl<W> FileEncoder<W>
where
    W: io::Write,
{
    /// Creates a new [`FileEncoder`] that converts timestamps at UTC.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, DecodeOptions::default())
    }

    /// Creates a new [`FileEncoder`] that converts timestamps at the UTC offset of
    /// `options`.
    pub fn with_options(writer: W, options: DecodeOptions) -> Self {
        Self { writer, options }
    }

    /// Encodes a complete file: `header` followed by one class slot per table.
    /// The class table of `header` is written as is, see [`class_table()`].
    ///
    /// A file with one class holds only as many rows as it has, followed by a
    /// sentinel row. Otherwise every class occupies a fixed-size slot, zero-filled
    /// after its last row.
    ///
    /// # Errors
    /// This function returns an error if the class table and `tables` differ in
    /// length, a table doesn't fit its slot, a row doesn't match its class header,
    /// or it's unable to write to the underlying writer.
    pub fn encode(&mut self, header: &FileHeader, tables: &[ClassTable]) -> crate::Result<()> {
        if header.class_table.len() != tables.len() {
            return Err(crate::Error::encode(format!(
                "class table has {} entries but {} tables were given",
                header.class_table.len(),
                tables.len()
            )));
        }
        let mut buffer = self.encode_file_header(header)?;
        for table in tables {
            buffer.extend(self.encode_class_header(&table.header)?);
            let body = self.encode_class_body(table)?;
            if tables.len() == 1 {
                buffer.extend(body);
                buffer.resize(buffer.len() + usize::from(table.header.record_stride), 0);
            } else {
                if body.len() > CLASS_BODY_LEN {
                    return Err(crate::Error::encode(format!(
                        "{} rows of class {} need {} bytes, more than the {CLASS_BODY_LEN}-byte slot",
                        table.rows.len(),
                        table.class_code(),
                        body.len()
                    )));
                }
                let slot_end = buffer.len() + CLASS_BODY_LEN;
                buffer.extend(body);
                buffer.resize(slot_end, 0);
            }
        }
        self.writer
            .write_all(&buffer)
            .map_err(|e| crate::Error::io(e, "writing data file"))?;
        self.writer
            .flush()
            .map_err(|e| crate::Error::io(e, "flushing data file"))
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consumes the encoder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn encode_file_header(&self, header: &FileHeader) -> crate::Result<Vec<u8>> {
        let security_code: i64 = header.security_code.trim().parse().map_err(|e| {
            crate::Error::encode(format!(
                "security code '{}' isn't numeric: {e}",
                header.security_code
            ))
        })?;
        let max_classes = (FILE_HEADER_LEN - CLASS_TABLE_OFFSET) / CLASS_ENTRY_LEN;
        if header.class_table.len() > max_classes {
            return Err(crate::Error::encode(format!(
                "{} classes don't fit the file header, the maximum is {max_classes}",
                header.class_table.len()
            )));
        }
        let mut buffer = Vec::with_capacity(FILE_HEADER_LEN);
        buffer.extend(security_code.to_le_bytes());
        buffer.extend(encode_unicode_str(&header.security_name, 16));
        buffer.extend(encode_ascii_str(&header.market, 2));
        buffer.extend(i16::from(header.flag).to_le_bytes());
        buffer.extend((header.class_table.len() as u32).to_le_bytes());
        for entry in header.class_table.iter() {
            buffer.extend(entry.class_code.0.to_le_bytes());
            buffer.extend(entry.start_offset.to_le_bytes());
        }
        buffer.resize(FILE_HEADER_LEN, 0);
        Ok(buffer)
    }

    fn encode_class_header(&self, header: &ClassHeader) -> crate::Result<Vec<u8>> {
        if header.field_count as usize != header.fields.len() {
            return Err(crate::Error::encode(format!(
                "class {} declares {} fields but describes {}",
                header.class_code,
                header.field_count,
                header.fields.len()
            )));
        }
        let len = FIELD_DESCRIPTORS_OFFSET + header.fields.len() * FIELD_DESCRIPTOR_LEN;
        if len > CLASS_HEADER_LEN {
            return Err(crate::Error::encode(format!(
                "{} field descriptors of class {} don't fit the class header",
                header.fields.len(),
                header.class_code
            )));
        }
        let latest = u32::try_from(self.to_unix(&header.latest_timestamp)).map_err(|_| {
            crate::Error::encode(format!(
                "latest time {} of class {} can't be stored as a u32",
                header.latest_timestamp, header.class_code
            ))
        })?;
        let mut buffer = Vec::with_capacity(CLASS_HEADER_LEN);
        buffer.extend(header.class_code.0.to_le_bytes());
        buffer.extend(header.field_count.to_le_bytes());
        buffer.extend(header.record_stride.to_le_bytes());
        buffer.extend(latest.to_le_bytes());
        for field in header.fields.iter() {
            buffer.extend(field.code.to_le_bytes());
            buffer.extend(encode_unicode_str(&field.unit, 4));
            buffer.extend(field.digits.to_le_bytes());
            buffer.push(u8::from(field.storage_type));
        }
        buffer.resize(CLASS_HEADER_LEN, 0);
        Ok(buffer)
    }

    fn encode_class_body(&self, table: &ClassTable) -> crate::Result<Vec<u8>> {
        let header = &table.header;
        let stride = usize::from(header.record_stride);
        if stride < header.min_stride() {
            return Err(crate::Error::encode(format!(
                "record stride {stride} of class {} can't hold {} fields",
                header.class_code,
                header.fields.len()
            )));
        }
        let mut buffer = Vec::with_capacity(stride * table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            self.encode_row(header, row, &mut buffer)
                .map_err(|e| crate::Error::encode(format!("{e} in row {i}")))?;
            buffer.resize(stride * (i + 1), 0);
        }
        Ok(buffer)
    }

    fn encode_row(&self, header: &ClassHeader, row: &Row, buffer: &mut Vec<u8>) -> crate::Result<()> {
        if row.time == 0 {
            return Err(crate::Error::encode(
                "time key 0 is reserved for the end-of-data sentinel",
            ));
        }
        if row.values.len() != header.fields.len() {
            return Err(crate::Error::encode(format!(
                "row has {} values but class {} has {} fields",
                row.values.len(),
                header.class_code,
                header.fields.len()
            )));
        }
        buffer.extend(row.time.to_le_bytes());
        for (field, value) in header.fields.iter().zip(row.values.iter()) {
            buffer.extend(self.encode_value(field, value)?);
        }
        Ok(())
    }

    fn encode_value(&self, field: &FieldDescriptor, value: &Value) -> crate::Result<[u8; VALUE_LEN]> {
        match (field.storage_type, value) {
            (StorageType::Int64, Value::Int(v)) => Ok(v.to_le_bytes()),
            (StorageType::Float64, Value::Float(v)) => Ok(v.to_le_bytes()),
            (StorageType::TimestampInt64, Value::Timestamp(v)) => {
                Ok(self.to_unix(v).to_le_bytes())
            }
            (storage_type, value) => Err(crate::Error::encode(format!(
                "value {value:?} doesn't match storage type {storage_type:?} of field {}",
                field.code
            ))),
        }
    }

    fn to_unix(&self, datetime: &time::PrimitiveDateTime) -> i64 {
        datetime
            .assume_offset(self.options.utc_offset())
            .unix_timestamp()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::{test_utils::*, ClassCode};

    #[test]
    fn test_single_class_layout() {
        let table = daily_quote_table(&[(100, 10, 1.5), (200, 20, 2.5)]);
        let header = file_header(&[table.clone()]);
        let mut encoder = FileEncoder::new(Vec::new());
        encoder.encode(&header, &[table]).unwrap();
        let bytes = encoder.into_inner();
        // header, class header, two rows, sentinel
        assert_eq!(bytes.len(), FILE_HEADER_LEN + CLASS_HEADER_LEN + 3 * 24);
        assert_eq!(&bytes[28..32], &1u32.to_le_bytes());
        assert_eq!(&bytes[32..36], &1007u32.to_le_bytes());
        let first_row = FILE_HEADER_LEN + CLASS_HEADER_LEN;
        assert_eq!(&bytes[first_row..first_row + 8], &100i64.to_le_bytes());
        assert!(bytes[first_row + 48..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_multi_class_layout() {
        let tables = vec![
            daily_quote_table(&[(100, 10, 1.5)]),
            income_table(&[(100, 1.0e8)]),
        ];
        let header = file_header(&tables);
        assert_eq!(header.class_table[1].start_offset, 327_424);
        let mut encoder = FileEncoder::new(Vec::new());
        encoder.encode(&header, &tables).unwrap();
        let bytes = encoder.into_inner();
        assert_eq!(bytes.len(), FILE_HEADER_LEN + 2 * CLASS_SLOT_LEN);
        let second_slot = FILE_HEADER_LEN + CLASS_SLOT_LEN;
        assert_eq!(
            &bytes[second_slot..second_slot + 4],
            &1001u32.to_le_bytes()
        );
    }

    #[test]
    fn test_class_table_mismatch() {
        let table = daily_quote_table(&[(100, 10, 1.5)]);
        let mut header = file_header(&[table.clone()]);
        header.class_table.clear();
        let res = FileEncoder::new(Vec::new()).encode(&header, &[table]);
        assert!(matches!(res, Err(crate::Error::Encode(_))));
    }

    #[test]
    fn test_zero_time_key_rejected() {
        let table = daily_quote_table(&[(0, 10, 1.5)]);
        let header = file_header(&[table.clone()]);
        let res = FileEncoder::new(Vec::new()).encode(&header, &[table]);
        assert!(matches!(res, Err(crate::Error::Encode(ref msg)) if msg.contains("sentinel")));
    }

    #[test]
    fn test_value_type_mismatch() {
        let mut table = daily_quote_table(&[(100, 10, 1.5)]);
        table.rows[0].values[0] = Value::Float(10.0);
        let header = file_header(&[table.clone()]);
        let res = FileEncoder::new(Vec::new()).encode(&header, &[table]);
        assert!(matches!(res, Err(crate::Error::Encode(ref msg)) if msg.contains("row 0")));
    }

    #[test]
    fn test_multi_class_slot_overflow() {
        let rows: Vec<_> = (1..=CLASS_BODY_LEN as i64 / 24 + 1)
            .map(|i| (i, i, 1.0))
            .collect();
        let tables = vec![daily_quote_table(&rows), income_table(&[(100, 1.0)])];
        let header = file_header(&tables);
        let res = FileEncoder::new(Vec::new()).encode(&header, &tables);
        assert!(matches!(res, Err(crate::Error::Encode(ref msg)) if msg.contains("slot")));
    }

    #[test]
    fn test_bad_security_code() {
        let table = daily_quote_table(&[]);
        let mut header = file_header(&[table.clone()]);
        header.security_code = "ABC".to_owned();
        let res = FileEncoder::new(Vec::new()).encode(&header, &[table]);
        assert!(matches!(res, Err(crate::Error::Encode(_))));
    }

    #[test]
    fn test_timestamp_field_uses_offset() {
        let options = DecodeOptions::default().with_utc_offset(time::macros::offset!(+8));
        let table = ClassTable {
            header: ClassHeader {
                class_code: ClassCode(1008),
                field_count: 1,
                record_stride: 16,
                latest_timestamp: datetime!(2021-01-04 15:00:00),
                fields: vec![FieldDescriptor {
                    code: 1008001,
                    unit: String::new(),
                    digits: 0,
                    storage_type: StorageType::TimestampInt64,
                }],
            },
            rows: vec![Row {
                time: 1_609_743_600,
                values: vec![Value::Timestamp(datetime!(2021-01-04 15:00:00))],
            }],
        };
        let header = file_header(&[table.clone()]);
        let mut encoder = FileEncoder::with_options(Vec::new(), options);
        encoder.encode(&header, &[table]).unwrap();
        let bytes = encoder.into_inner();
        let latest = FILE_HEADER_LEN + 10;
        assert_eq!(&bytes[latest..latest + 4], &1_609_743_600u32.to_le_bytes());
        let value = FILE_HEADER_LEN + CLASS_HEADER_LEN + 8;
        assert_eq!(&bytes[value..value + 8], &1_609_743_600i64.to_le_bytes());
    }
}
