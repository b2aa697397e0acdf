//! The decoded contents of a data file and the entry points for reading them.
use std::{
    io::{self, Read},
    path::Path,
};

use log::{debug, warn};

use crate::{
    decode::{decode_class_body, decode_class_header, decode_file_header, DynReader},
    ClassCode, ClassTable, DecodeOptions, FileHeader, Frame, Query, CLASS_BODY_LEN,
    CLASS_HEADER_LEN, CLASS_SLOT_LEN, FILE_HEADER_LEN,
};

/// A fully decoded data file: its header and one table per class, in the order the
/// classes are declared in the file header.
///
/// A `DataSource` is immutable once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    header: FileHeader,
    tables: Vec<ClassTable>,
    options: DecodeOptions,
}

impl DataSource {
    /// Reads and decodes the file at `path`. Zstandard-compressed files are
    /// decompressed transparently.
    ///
    /// # Errors
    /// This function returns an error if the file can't be opened or read, or if its
    /// contents are malformed.
    pub fn read_file(path: impl AsRef<Path>, options: DecodeOptions) -> crate::Result<Self> {
        let path = path.as_ref();
        let mut reader = DynReader::from_file(path)?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|e| {
            crate::Error::io(e, format!("reading file at path '{}'", path.display()))
        })?;
        debug!("Read {} bytes from '{}'", bytes.len(), path.display());
        Self::from_bytes(&bytes, options)
    }

    /// Reads `reader` to the end and decodes its contents. Zstandard-compressed
    /// input is decompressed transparently.
    ///
    /// # Errors
    /// This function returns an error if it's unable to read from `reader` or the
    /// contents are malformed.
    pub fn from_reader(reader: impl io::Read, options: DecodeOptions) -> crate::Result<Self> {
        let bytes = crate::decode::read_all(io::BufReader::new(reader), "data file")?;
        Self::from_bytes(&bytes, options)
    }

    /// Decodes the uncompressed contents of a data file.
    ///
    /// Class `i` of the class table is located at the `i`th fixed-size slot after
    /// the file header. In a file with a single class, that class's body instead
    /// extends to the end of `bytes`.
    ///
    /// # Errors
    /// This function returns an error if `bytes` is shorter than the file header, a
    /// class slot starts past the end of `bytes`, or a class header or body is
    /// malformed.
    pub fn from_bytes(bytes: &[u8], options: DecodeOptions) -> crate::Result<Self> {
        if bytes.len() < FILE_HEADER_LEN {
            return Err(crate::Error::decode(format!(
                "file must be at least {FILE_HEADER_LEN} bytes, found {}",
                bytes.len()
            )));
        }
        let header = decode_file_header(&bytes[..FILE_HEADER_LEN])?;
        let class_count = header.class_table.len();
        let mut tables: Vec<ClassTable> = Vec::with_capacity(class_count);
        for (i, entry) in header.class_table.iter().enumerate() {
            let slot_start = FILE_HEADER_LEN + i * CLASS_SLOT_LEN;
            if slot_start >= bytes.len() {
                return Err(crate::Error::decode(format!(
                    "slot {i} of class {} starts at byte {slot_start}, past the end of the \
                    {}-byte file",
                    entry.class_code,
                    bytes.len()
                )));
            }
            let body_start = (slot_start + CLASS_HEADER_LEN).min(bytes.len());
            let class_header = decode_class_header(&bytes[slot_start..body_start], &options)?;
            if class_header.class_code != entry.class_code {
                warn!(
                    "Class table entry {i} declares class {} but its slot holds class {}",
                    entry.class_code, class_header.class_code
                );
            }
            let body_end = if class_count == 1 {
                bytes.len()
            } else {
                let slot_end = body_start + CLASS_BODY_LEN;
                if slot_end > bytes.len() {
                    warn!(
                        "Body of class {} is truncated by end of file: {} of {CLASS_BODY_LEN} bytes",
                        class_header.class_code,
                        bytes.len() - body_start
                    );
                }
                slot_end.min(bytes.len())
            };
            let rows = decode_class_body(&class_header, &bytes[body_start..body_end], &options)?;
            debug!(
                "Decoded class {} with {} fields, stride {}, and {} rows",
                class_header.class_code,
                class_header.fields.len(),
                class_header.record_stride,
                rows.len()
            );
            let table = ClassTable {
                header: class_header,
                rows,
            };
            if let Some(existing) = tables
                .iter_mut()
                .find(|existing| existing.class_code() == table.class_code())
            {
                warn!(
                    "Class {} appears more than once, slot {i} replaces the earlier table",
                    table.class_code()
                );
                *existing = table;
            } else {
                tables.push(table);
            }
        }
        Ok(Self {
            header,
            tables,
            options,
        })
    }

    /// Returns the file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns an iterator over the decoded classes in declared order.
    pub fn tables(&self) -> impl Iterator<Item = (ClassCode, &ClassTable)> {
        self.tables.iter().map(|table| (table.class_code(), table))
    }

    /// Returns the table of the class with `class_code`, if present.
    pub fn table(&self, class_code: ClassCode) -> Option<&ClassTable> {
        self.tables
            .iter()
            .find(|table| table.class_code() == class_code)
    }

    /// Returns the codes of the decoded classes in declared order.
    pub fn class_codes(&self) -> Vec<ClassCode> {
        self.tables.iter().map(ClassTable::class_code).collect()
    }

    /// Returns the options the file was decoded with, which are also used to parse
    /// query bounds.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Returns the rows of one class with time keys in the inclusive range
    /// `start..=end`, without the time key. A bound of `None` or an empty `end`
    /// imposes no limit on that side.
    ///
    /// `class_code` may be omitted only if the file contains at most one class.
    /// See [`Query`] for selecting fields.
    ///
    /// # Errors
    /// This function returns an error if the class isn't present, the class is
    /// ambiguous, or a bound isn't a `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` date.
    pub fn search_data(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        class_code: Option<ClassCode>,
    ) -> crate::Result<Frame> {
        let mut query = Query::new();
        if let Some(start) = start {
            query = query.start(start);
        }
        if let Some(end) = end {
            query = query.end(end);
        }
        if let Some(class_code) = class_code {
            query = query.class_code(class_code);
        }
        query.execute(self)
    }

    /// Runs [`search_data()`](Self::search_data) for every class, returning the
    /// results in declared order.
    ///
    /// # Errors
    /// This function returns an error if a bound isn't a `YYYY-MM-DD` or
    /// `YYYY-MM-DD HH:MM:SS` date.
    pub fn search_all(&self, start: Option<&str>, end: Option<&str>) -> crate::Result<Vec<Frame>> {
        self.tables
            .iter()
            .map(|table| self.search_data(start, end, Some(table.class_code())))
            .collect()
    }
}

#[cfg(feature = "async")]
impl DataSource {
    /// Asynchronously reads and decodes the file at `path`. Zstandard-compressed
    /// files are decompressed transparently.
    ///
    /// # Errors
    /// This function returns an error if the file can't be opened or read, or if its
    /// contents are malformed.
    pub async fn read_file_async(
        path: impl AsRef<Path>,
        options: DecodeOptions,
    ) -> crate::Result<Self> {
        let bytes = crate::decode::AsyncDynReader::from_file(path)
            .await?
            .read_all()
            .await?;
        Self::from_bytes(&bytes, options)
    }
}

/// Reads and decodes each file in `paths` on its own thread. Returns one result
/// per path in the same order, so a failure only affects its own file.
pub fn read_files<P>(paths: &[P], options: DecodeOptions) -> Vec<crate::Result<DataSource>>
where
    P: AsRef<Path> + Sync,
{
    std::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| scope.spawn(move || DataSource::read_file(path, options)))
            .collect();
        handles
            .into_iter()
            .zip(paths)
            .map(|(handle, path)| {
                handle.join().unwrap_or_else(|_| {
                    Err(crate::Error::decode(format!(
                        "thread decoding '{}' panicked",
                        path.as_ref().display()
                    )))
                })
            })
            .collect()
    })
}
