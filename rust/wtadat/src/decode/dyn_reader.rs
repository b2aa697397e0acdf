use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use super::zstd;

/// Type for runtime polymorphism over reading uncompressed or Zstd-compressed data
/// files. Implements [`std::io::Read`].
pub struct DynReader<'a, R>(DynReaderImpl<'a, R>)
where
    R: io::BufRead;

enum DynReaderImpl<'a, R>
where
    R: io::BufRead,
{
    Uncompressed(R),
    Zstd(::zstd::stream::Decoder<'a, R>),
}

impl<R> DynReader<'_, BufReader<R>>
where
    R: io::Read,
{
    /// Creates a new [`DynReader`] from a reader, inferring the compression.
    /// If `reader` also implements [`io::BufRead`], it is better to use
    /// [`inferred_with_buffer()`](Self::inferred_with_buffer).
    ///
    /// # Errors
    /// This function will return an error if it is unable to read from `reader`
    /// or it fails to create the zstd decoder.
    pub fn new_inferred(reader: R) -> crate::Result<Self> {
        Self::inferred_with_buffer(BufReader::new(reader))
    }
}

impl<R> DynReader<'_, R>
where
    R: io::BufRead,
{
    /// Creates a new [`DynReader`] from a buffered reader, inferring the compression
    /// from the Zstandard magic number.
    ///
    /// # Errors
    /// This function will return an error if it fails to read from `reader` or creating
    /// the zstd decoder fails.
    pub fn inferred_with_buffer(mut reader: R) -> crate::Result<Self> {
        let first_bytes = reader
            .fill_buf()
            .map_err(|e| crate::Error::io(e, "creating buffer to infer compression"))?;
        if zstd::starts_with_prefix(first_bytes) {
            Ok(Self(DynReaderImpl::Zstd(
                ::zstd::stream::Decoder::with_buffer(reader)
                    .map_err(|e| crate::Error::io(e, "creating zstd decoder"))?,
            )))
        } else {
            Ok(Self(DynReaderImpl::Uncompressed(reader)))
        }
    }

    /// Returns `true` if the input is Zstd-compressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self.0, DynReaderImpl::Zstd(_))
    }
}

impl DynReader<'_, BufReader<File>> {
    /// Creates a new [`DynReader`] from the file at `path`.
    ///
    /// # Errors
    /// This function will return an error if the file doesn't exist, it is unable to
    /// determine the compression of the file, or it fails to create the zstd decoder.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            crate::Error::io(
                e,
                format!(
                    "opening file to decode at path '{}'",
                    path.as_ref().display()
                ),
            )
        })?;
        DynReader::new_inferred(file)
    }
}

impl<R> io::Read for DynReader<'_, R>
where
    R: io::BufRead,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.0 {
            DynReaderImpl::Uncompressed(r) => r.read(buf),
            DynReaderImpl::Zstd(r) => r.read(buf),
        }
    }
}

/// Reads all of `reader` into memory, decompressing if necessary.
pub(crate) fn read_all<R: io::BufRead>(reader: R, context: &str) -> crate::Result<Vec<u8>> {
    let mut reader = DynReader::inferred_with_buffer(reader)?;
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .map_err(|e| crate::Error::io(e, format!("reading {context}")))?;
    Ok(buffer)
}

#[cfg(feature = "async")]
pub use self::r#async::DynReader as AsyncDynReader;

#[cfg(feature = "async")]
mod r#async {
    use std::{path::Path, pin::Pin};

    use async_compression::tokio::bufread::ZstdDecoder;
    use tokio::{
        fs::File,
        io::{self, AsyncBufReadExt, AsyncReadExt, BufReader},
    };

    /// A type for runtime polymorphism on compressed and uncompressed input.
    /// The async version of [`DynReader`](super::DynReader).
    pub struct DynReader<R>(DynReaderImpl<R>)
    where
        R: io::AsyncBufRead + Unpin;

    enum DynReaderImpl<R>
    where
        R: io::AsyncBufRead + Unpin,
    {
        Uncompressed(R),
        Zstd(ZstdDecoder<R>),
    }

    impl<R> DynReader<R>
    where
        R: io::AsyncBufRead + Unpin,
    {
        /// Creates a new [`DynReader`] from a buffered reader, inferring the
        /// compression.
        ///
        /// # Errors
        /// This function will return an error if it fails to read from `reader`.
        pub async fn inferred_with_buffer(mut reader: R) -> crate::Result<Self> {
            let first_bytes = reader
                .fill_buf()
                .await
                .map_err(|e| crate::Error::io(e, "creating buffer to infer compression"))?;
            Ok(if super::zstd::starts_with_prefix(first_bytes) {
                let mut decoder = ZstdDecoder::new(reader);
                decoder.multiple_members(true);
                Self(DynReaderImpl::Zstd(decoder))
            } else {
                Self(DynReaderImpl::Uncompressed(reader))
            })
        }

        /// Reads the remaining input into memory.
        ///
        /// # Errors
        /// This function will return an error if reading or decompressing fails.
        pub async fn read_all(mut self) -> crate::Result<Vec<u8>> {
            let mut buffer = Vec::new();
            self.read_to_end(&mut buffer)
                .await
                .map_err(|e| crate::Error::io(e, "reading data file"))?;
            Ok(buffer)
        }
    }

    impl DynReader<BufReader<File>> {
        /// Creates a new [`DynReader`] from the file at `path`.
        ///
        /// # Errors
        /// This function will return an error if the file doesn't exist, it is unable
        /// to read from it.
        pub async fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
            let file = File::open(path.as_ref()).await.map_err(|e| {
                crate::Error::io(
                    e,
                    format!(
                        "opening file to decode at path '{}'",
                        path.as_ref().display()
                    ),
                )
            })?;
            DynReader::inferred_with_buffer(BufReader::new(file)).await
        }
    }

    impl<R> io::AsyncRead for DynReader<R>
    where
        R: io::AsyncBufRead + Unpin,
    {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match &mut self.0 {
                DynReaderImpl::Uncompressed(reader) => {
                    io::AsyncRead::poll_read(Pin::new(reader), cx, buf)
                }
                DynReaderImpl::Zstd(reader) => io::AsyncRead::poll_read(Pin::new(reader), cx, buf),
            }
        }
    }
}
