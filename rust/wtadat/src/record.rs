//! Decoded file contents: the file header, class headers, field descriptors, and the
//! rows of each class table.
use std::{fmt, str::FromStr};

use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Serialize, Serializer};
use time::PrimitiveDateTime;

use crate::{datetime::serialize_datetime, registry, VALUE_LEN};

/// Identifies a class, i.e. one table within a file, such as the balance sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClassCode(pub u32);

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ClassCode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self).map_err(|e| {
            crate::Error::bad_argument("class_code", format!("'{s}' is not a class code: {e}"))
        })
    }
}

impl From<u32> for ClassCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// How the 8-byte values of a field are stored in a class body, selected by the
/// one-byte tag in the field descriptor. Unknown tags fall back to
/// [`Float64`](Self::Float64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive, Serialize)]
#[repr(u8)]
pub enum StorageType {
    /// A little-endian `i64`.
    Int64 = 0x71, // b'q'
    /// A little-endian `i64` of seconds since the Unix epoch.
    TimestampInt64 = 0x54, // b'T'
    /// A little-endian IEEE-754 `f64`.
    #[num_enum(default)]
    Float64 = 0x64, // b'd'
}

impl StorageType {
    /// Returns the tag character written by the producer for this storage type.
    pub fn tag(self) -> char {
        char::from(u8::from(self))
    }
}

/// Describes one field (column) of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// The field code, unique within the class.
    pub code: i64,
    /// The display unit, such as a currency label. Trailing NULs are preserved.
    pub unit: String,
    /// The intended number of decimal digits. Informational only.
    pub digits: i64,
    /// How the field's values are stored.
    pub storage_type: StorageType,
}

impl FieldDescriptor {
    /// Returns the display name of this field as a member of `class_code`.
    ///
    /// # Errors
    /// This function returns [`Error::Lookup`](crate::Error::Lookup) if the field
    /// isn't in the registry.
    pub fn display_name(&self, class_code: ClassCode) -> crate::Result<&'static str> {
        registry::field_name(class_code, self.code)
    }
}

/// The header of one class, preceding its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassHeader {
    /// The class code.
    pub class_code: ClassCode,
    /// The number of fields in each row after the leading time key.
    pub field_count: u32,
    /// The length in bytes of one row in the class body.
    pub record_stride: u16,
    /// When the class's data was last updated.
    #[serde(serialize_with = "serialize_datetime")]
    pub latest_timestamp: PrimitiveDateTime,
    /// The fields in column order.
    pub fields: Vec<FieldDescriptor>,
}

impl ClassHeader {
    /// Returns the smallest stride able to hold the leading time key and one value
    /// per field.
    pub fn min_stride(&self) -> usize {
        VALUE_LEN * (1 + self.fields.len())
    }

    /// Returns the display name of the class.
    ///
    /// # Errors
    /// This function returns [`Error::Lookup`](crate::Error::Lookup) if the class
    /// isn't in the registry.
    pub fn name(&self) -> crate::Result<&'static str> {
        registry::class_name(self.class_code)
    }

    /// Returns the display names of the fields in column order.
    ///
    /// # Errors
    /// This function returns [`Error::Lookup`](crate::Error::Lookup) if the class
    /// or any of its fields isn't in the registry.
    pub fn field_names(&self) -> crate::Result<Vec<&'static str>> {
        self.fields
            .iter()
            .map(|field| field.display_name(self.class_code))
            .collect()
    }
}

/// An entry of the class table in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassEntry {
    /// The class code.
    pub class_code: ClassCode,
    /// The producer's start offset of the class. Informational only: classes are
    /// located by their position in the table.
    pub start_offset: i64,
}

/// The header at the start of every file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    /// The 6-character zero-padded security code.
    pub security_code: String,
    /// The security's display name. Trailing NULs are preserved.
    pub security_name: String,
    /// The 2-character market tag, such as `SH` or `SZ`.
    pub market: String,
    /// A producer-defined flag.
    pub flag: bool,
    /// The classes in the file in declared order.
    pub class_table: Vec<ClassEntry>,
}

impl FileHeader {
    /// Returns the security name without trailing NUL padding.
    pub fn trimmed_security_name(&self) -> &str {
        self.security_name.trim_end_matches('\0')
    }
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A [`StorageType::Int64`] value.
    Int(i64),
    /// A [`StorageType::TimestampInt64`] value converted to local time.
    Timestamp(PrimitiveDateTime),
    /// A [`StorageType::Float64`] value.
    Float(f64),
}

impl Value {
    /// Returns the value if it's an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value if it's a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value if it's a timestamp.
    pub fn as_timestamp(&self) -> Option<PrimitiveDateTime> {
        match self {
            Self::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::Timestamp(v) => {
                f.write_str(&crate::datetime::format_datetime(v).map_err(|_| fmt::Error)?)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Timestamp(v) => serialize_datetime(v, serializer),
        }
    }
}

/// One row of a class table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The leading time key in seconds since the Unix epoch. Never 0.
    pub time: i64,
    /// One value per field of the class, in column order.
    pub values: Vec<Value>,
}

/// A decoded class: its header and its rows in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTable {
    /// The class header.
    pub header: ClassHeader,
    /// The rows preceding the end-of-data sentinel.
    pub rows: Vec<Row>,
}

impl ClassTable {
    /// Returns the class code.
    pub fn class_code(&self) -> ClassCode {
        self.header.class_code
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use time::macros::datetime;

    use super::*;

    #[rstest]
    #[case(b'q', StorageType::Int64)]
    #[case(b'T', StorageType::TimestampInt64)]
    #[case(b'd', StorageType::Float64)]
    #[case(b'x', StorageType::Float64)]
    #[case(b'Q', StorageType::Float64)]
    #[case(b't', StorageType::Float64)]
    #[case(0, StorageType::Float64)]
    fn test_storage_type_from_tag(#[case] tag: u8, #[case] exp: StorageType) {
        assert_eq!(StorageType::from(tag), exp);
    }

    #[test]
    fn test_storage_type_tag() {
        assert_eq!(StorageType::Int64.tag(), 'q');
        assert_eq!(StorageType::TimestampInt64.tag(), 'T');
        assert_eq!(StorageType::Float64.tag(), 'd');
    }

    #[rstest]
    #[case("1007", ClassCode(1007))]
    #[case(" 1001 ", ClassCode(1001))]
    fn test_class_code_from_str(#[case] s: &str, #[case] exp: ClassCode) {
        assert_eq!(s.parse::<ClassCode>().unwrap(), exp);
        assert_eq!(exp.to_string(), s.trim());
    }

    #[test]
    fn test_class_code_from_str_invalid() {
        assert!(matches!(
            "balance".parse::<ClassCode>(),
            Err(crate::Error::BadArgument { .. })
        ));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(10.5).to_string(), "10.5");
        assert_eq!(
            Value::Timestamp(datetime!(2021-01-04 15:00:00)).to_string(),
            "2021-01-04 15:00:00"
        );
    }

    #[test]
    fn test_field_names() {
        let header = ClassHeader {
            class_code: registry::DAILY_QUOTES,
            field_count: 2,
            record_stride: 24,
            latest_timestamp: datetime!(2021-01-04 15:00:00),
            fields: vec![
                FieldDescriptor {
                    code: 1007010,
                    unit: String::new(),
                    digits: 0,
                    storage_type: StorageType::TimestampInt64,
                },
                FieldDescriptor {
                    code: 1007009,
                    unit: "元\0".to_owned(),
                    digits: 2,
                    storage_type: StorageType::Float64,
                },
            ],
        };
        assert_eq!(header.min_stride(), 24);
        assert_eq!(header.name().unwrap(), "历史行情");
        assert_eq!(header.field_names().unwrap(), vec!["date", "close"]);
    }

    #[test]
    fn test_trimmed_security_name() {
        let header = FileHeader {
            security_code: "000001".to_owned(),
            security_name: "平安银行\0\0\0\0".to_owned(),
            market: "SZ".to_owned(),
            flag: false,
            class_table: Vec::new(),
        };
        assert_eq!(header.trimmed_security_name(), "平安银行");
    }
}
