//! Range-filtered queries over the decoded class tables of a [`DataSource`].
use crate::{ClassCode, ClassTable, DataSource, FieldDescriptor, Value};

/// A query over one class of a [`DataSource`]: an inclusive time range, the class,
/// and the fields to return.
///
/// ```no_run
/// use wtadat::{registry, DataSource, DecodeOptions, Query};
///
/// let source = DataSource::read_file("000001.dat", DecodeOptions::default())?;
/// let frame = Query::new()
///     .start("2021-01-01")
///     .end("2021-06-30 15:00:00")
///     .class_code(registry::DAILY_QUOTES)
///     .fields([1007010, 1007009])
///     .execute(&source)?;
/// # Ok::<(), wtadat::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    start: Option<String>,
    end: Option<String>,
    class_code: Option<ClassCode>,
    fields: Option<Vec<i64>>,
}

impl Query {
    /// Creates a query for every row and field of the only class in a file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only rows with a time key at or after `start`, a `YYYY-MM-DD` or
    /// `YYYY-MM-DD HH:MM:SS` local date.
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Keeps only rows with a time key at or before `end`, a `YYYY-MM-DD` or
    /// `YYYY-MM-DD HH:MM:SS` local date. An empty string imposes no bound.
    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Selects the class to query. Required when the file contains more than one
    /// class.
    pub fn class_code(mut self, class_code: ClassCode) -> Self {
        self.class_code = Some(class_code);
        self
    }

    /// Projects the result onto the fields with `codes`, in the given order.
    /// Defaults to every field of the class in file order.
    pub fn fields(mut self, codes: impl IntoIterator<Item = i64>) -> Self {
        self.fields = Some(codes.into_iter().collect());
        self
    }

    /// Runs the query against `source`.
    ///
    /// Without a class code, the only class in the file is queried and a file
    /// without classes yields an empty [`Frame`]. The leading time key isn't
    /// part of the result.
    ///
    /// # Errors
    /// This function returns an error if:
    /// - the class isn't in `source` ([`Error::ClassNotFound`](crate::Error::ClassNotFound))
    /// - no class code was given and the file contains more than one class
    ///   ([`Error::AmbiguousClass`](crate::Error::AmbiguousClass))
    /// - a projected field isn't in the class ([`Error::Lookup`](crate::Error::Lookup))
    /// - `start` or `end` can't be parsed ([`Error::BadArgument`](crate::Error::BadArgument))
    pub fn execute(&self, source: &DataSource) -> crate::Result<Frame> {
        let Some(table) = self.select_table(source)? else {
            return Ok(Frame::empty());
        };
        let columns = self.columns(table)?;
        let fields = columns
            .iter()
            .map(|i| table.header.fields[*i].clone())
            .collect();
        let mut frame = Frame {
            class_code: Some(table.class_code()),
            fields,
            rows: Vec::new(),
        };
        if table.is_empty() {
            return Ok(frame);
        }
        let options = source.options();
        let start = self
            .start
            .as_deref()
            .map(|start| options.parse_query_time(start, "start"))
            .transpose()?;
        let end = self
            .end
            .as_deref()
            .filter(|end| !end.is_empty())
            .map(|end| options.parse_query_time(end, "end"))
            .transpose()?;
        frame.rows = table
            .rows
            .iter()
            .filter(|row| start.map_or(true, |start| row.time >= start))
            .filter(|row| end.map_or(true, |end| row.time <= end))
            .map(|row| columns.iter().map(|i| row.values[*i]).collect())
            .collect();
        Ok(frame)
    }

    fn select_table<'a>(&self, source: &'a DataSource) -> crate::Result<Option<&'a ClassTable>> {
        if let Some(class_code) = self.class_code {
            return source
                .table(class_code)
                .map(Some)
                .ok_or_else(|| crate::Error::ClassNotFound {
                    class_code,
                    available: source.class_codes(),
                });
        }
        let mut tables = source.tables();
        match (tables.next(), tables.next()) {
            (None, _) => Ok(None),
            (Some((_, table)), None) => Ok(Some(table)),
            (Some(_), Some(_)) => Err(crate::Error::AmbiguousClass {
                available: source.class_codes(),
            }),
        }
    }

    /// Returns the indices of the projected fields within the class.
    fn columns(&self, table: &ClassTable) -> crate::Result<Vec<usize>> {
        let fields = &table.header.fields;
        match &self.fields {
            None => Ok((0..fields.len()).collect()),
            Some(codes) => codes
                .iter()
                .map(|code| {
                    fields
                        .iter()
                        .position(|field| field.code == *code)
                        .ok_or(crate::Error::Lookup {
                            class_code: table.class_code(),
                            field_code: Some(*code),
                        })
                })
                .collect(),
        }
    }
}

/// The result of a query: rows of values for a set of fields of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The queried class. `None` for the empty result of a file without classes.
    pub class_code: Option<ClassCode>,
    /// The descriptors of the columns.
    pub fields: Vec<FieldDescriptor>,
    /// The rows in file order, each with one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Creates a frame without a class, columns, or rows.
    pub fn empty() -> Self {
        Self {
            class_code: None,
            fields: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Returns the registry display names of the columns.
    ///
    /// # Errors
    /// This function returns [`Error::Lookup`](crate::Error::Lookup) if a column
    /// has no registry entry. The values remain usable through
    /// [`column_codes()`](Self::column_codes).
    pub fn column_names(&self) -> crate::Result<Vec<&'static str>> {
        let Some(class_code) = self.class_code else {
            return Ok(Vec::new());
        };
        self.fields
            .iter()
            .map(|field| field.display_name(class_code))
            .collect()
    }

    /// Returns the raw field codes of the columns.
    pub fn column_codes(&self) -> Vec<i64> {
        self.fields.iter().map(|field| field.code).collect()
    }

    /// Returns the values of the column for the field with `code`, or `None` if
    /// the frame has no such column.
    pub fn column(&self, code: i64) -> Option<Vec<Value>> {
        let i = self.fields.iter().position(|field| field.code == code)?;
        Some(self.rows.iter().map(|row| row[i]).collect())
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;
    use crate::{registry, test_utils::*, DecodeOptions};

    fn source(tables: &[ClassTable]) -> DataSource {
        DataSource::from_bytes(&encode_file(tables), DecodeOptions::default()).unwrap()
    }

    fn volumes(frame: &Frame) -> Vec<i64> {
        frame.rows.iter().filter_map(|row| row[0].as_i64()).collect()
    }

    #[rstest]
    #[case(None, None, vec![1, 2, 3, 4])]
    #[case(Some("1970-01-01 00:03:20"), None, vec![2, 3, 4])]
    #[case(None, Some("1970-01-01 00:05:00"), vec![1, 2, 3])]
    #[case(Some("1970-01-01 00:03:20"), Some("1970-01-01 00:05:00"), vec![2, 3])]
    #[case(None, Some(""), vec![1, 2, 3, 4])]
    #[case(Some("1970-01-01"), None, vec![1, 2, 3, 4])]
    #[case(Some("1970-01-02"), None, vec![])]
    // inverted range
    #[case(Some("1970-01-01 00:05:00"), Some("1970-01-01 00:03:20"), vec![])]
    fn test_range_filter(
        #[case] start: Option<&str>,
        #[case] end: Option<&str>,
        #[case] exp: Vec<i64>,
    ) {
        let source = source(&[daily_quote_table(&[
            (100, 1, 1.0),
            (200, 2, 2.0),
            (300, 3, 3.0),
            (400, 4, 4.0),
        ])]);
        let mut query = Query::new();
        if let Some(start) = start {
            query = query.start(start);
        }
        if let Some(end) = end {
            query = query.end(end);
        }
        let frame = query.execute(&source).unwrap();
        assert_eq!(volumes(&frame), exp);
        assert_eq!(frame.column_names().unwrap(), vec!["volume", "close"]);
    }

    #[test]
    fn test_range_filter_uses_offset() {
        let bytes = encode_file(&[daily_quote_table(&[
            (1_609_430_399, 1, 1.0),
            (1_609_430_400, 2, 2.0),
        ])]);
        let options = DecodeOptions::default().with_utc_offset(time::macros::offset!(+8));
        let source = DataSource::from_bytes(&bytes, options).unwrap();
        // 2021-01-01 00:00:00 +08:00
        let frame = Query::new().start("2021-01-01").execute(&source).unwrap();
        assert_eq!(volumes(&frame), vec![2]);
    }

    #[test]
    fn test_projection() {
        let source = source(&[daily_quote_table(&[(100, 1, 1.5)])]);
        let frame = Query::new()
            .fields([1007009, 1007011])
            .execute(&source)
            .unwrap();
        assert_eq!(frame.column_codes(), vec![1007009, 1007011]);
        assert_eq!(frame.rows, vec![vec![Value::Float(1.5), Value::Int(1)]]);
        assert_eq!(frame.column(1007011), Some(vec![Value::Int(1)]));
        assert_eq!(frame.column(1007001), None);
    }

    #[test]
    fn test_projection_unknown_field() {
        let source = source(&[daily_quote_table(&[(100, 1, 1.5)])]);
        let res = Query::new().fields([1007001]).execute(&source);
        assert!(matches!(
            res,
            Err(crate::Error::Lookup {
                field_code: Some(1007001),
                ..
            })
        ));
    }

    #[test]
    fn test_multiple_classes_require_class_code() {
        let source = source(&[
            daily_quote_table(&[(100, 1, 1.5)]),
            income_table(&[(100, 2.0e8)]),
        ]);
        assert!(matches!(
            Query::new().execute(&source),
            Err(crate::Error::AmbiguousClass { ref available })
                if *available == vec![registry::DAILY_QUOTES, registry::INCOME_STATEMENT]
        ));
        let frame = Query::new()
            .class_code(registry::INCOME_STATEMENT)
            .execute(&source)
            .unwrap();
        assert_eq!(frame.class_code, Some(registry::INCOME_STATEMENT));
        assert_eq!(frame.rows, vec![vec![Value::Float(2.0e8)]]);
    }

    #[test]
    fn test_class_not_found() {
        let source = source(&[daily_quote_table(&[(100, 1, 1.5)])]);
        assert!(matches!(
            Query::new().class_code(registry::BALANCE_SHEET).execute(&source),
            Err(crate::Error::ClassNotFound { class_code, .. }) if class_code == registry::BALANCE_SHEET
        ));
    }

    #[test]
    fn test_no_classes() {
        let source = source(&[]);
        let frame = Query::new().start("2021-01-01").execute(&source).unwrap();
        assert_eq!(frame, Frame::empty());
        assert!(frame.column_names().unwrap().is_empty());
    }

    #[test]
    fn test_empty_table_skips_bounds() {
        let source = source(&[daily_quote_table(&[])]);
        // bounds of an empty table are never parsed
        let frame = Query::new().start("not a date").execute(&source).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.fields.len(), 2);
    }

    #[rstest]
    #[case(Some(""), None, "start")]
    #[case(Some("2021/01/01"), None, "start")]
    #[case(None, Some("01-01-2021"), "end")]
    fn test_bad_bounds(
        #[case] start: Option<&str>,
        #[case] end: Option<&str>,
        #[case] exp_param: &str,
    ) {
        let source = source(&[daily_quote_table(&[(100, 1, 1.5)])]);
        let mut query = Query::new();
        if let Some(start) = start {
            query = query.start(start);
        }
        if let Some(end) = end {
            query = query.end(end);
        }
        assert!(matches!(
            query.execute(&source),
            Err(crate::Error::BadArgument { ref param_name, .. }) if param_name == exp_param
        ));
    }
}
