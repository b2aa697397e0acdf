//! Types for errors that can occur while working with WTA finance data files.
use thiserror::Error;

use crate::ClassCode;

/// An error that can occur while decoding, querying, or encoding data files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error while reading or writing a data file or another encoding.
    #[error("IO error: {source:?} while {context}")]
    Io {
        /// The original error.
        #[source]
        source: std::io::Error,
        /// The context in which the error occurred.
        context: String,
    },
    /// Malformed or truncated input.
    #[error("decoding error: {0}")]
    Decode(String),
    /// An error while encoding a data file or a text output.
    #[error("encoding error: {0}")]
    Encode(String),
    /// A class or field code has no entry in the [`registry`](crate::registry).
    #[error("{}", lookup_msg(.class_code, .field_code))]
    Lookup {
        /// The class code that was looked up.
        class_code: ClassCode,
        /// The field code that was looked up, `None` when the class itself is unknown.
        field_code: Option<i64>,
    },
    /// A query named a class that isn't present in the file.
    #[error("class {class_code} not found, file contains {available:?}")]
    ClassNotFound {
        /// The requested class.
        class_code: ClassCode,
        /// The classes present in the file in declared order.
        available: Vec<ClassCode>,
    },
    /// A query didn't name a class while the file contains more than one.
    #[error("file contains multiple classes {available:?}, a class code is required")]
    AmbiguousClass {
        /// The classes present in the file in declared order.
        available: Vec<ClassCode>,
    },
    /// An invalid argument was passed to a function.
    #[error("bad argument {param_name}: {desc}")]
    BadArgument {
        /// The name of the parameter to which the bad argument was passed.
        param_name: String,
        /// The description of why the argument was invalid.
        desc: String,
    },
}
/// An alias for a `Result` with [`wtadat::Error`](crate::Error) as the error type.
pub type Result<T> = std::result::Result<T, Error>;

fn lookup_msg(class_code: &ClassCode, field_code: &Option<i64>) -> String {
    match field_code {
        Some(field_code) => {
            format!("no registry entry for field {field_code} of class {class_code}")
        }
        None => format!("no registry entry for class {class_code}"),
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        match value.into_kind() {
            csv::ErrorKind::Io(io) => Self::io(io, "writing CSV"),
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => Self::Encode(format!(
                "unequal CSV row lengths{}: expected {expected_len}, found {len}",
                Self::opt_pos(&pos)
            )),
            e => Self::Encode(format!("{e:?}")),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        if value.is_io() {
            Self::io(value.into(), "writing JSON")
        } else {
            Self::Encode(value.to_string())
        }
    }
}

impl Error {
    /// Creates a new I/O [`wtadat::Error`](crate::Error).
    pub fn io(error: std::io::Error, context: impl ToString) -> Self {
        Self::Io {
            source: error,
            context: context.to_string(),
        }
    }

    /// Creates a new decode [`wtadat::Error`](crate::Error).
    pub fn decode(msg: impl ToString) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Creates a new encode [`wtadat::Error`](crate::Error).
    pub fn encode(msg: impl ToString) -> Self {
        Self::Encode(msg.to_string())
    }

    /// Creates a new bad argument [`wtadat::Error`](crate::Error).
    pub fn bad_argument(param_name: impl ToString, desc: impl ToString) -> Self {
        Self::BadArgument {
            param_name: param_name.to_string(),
            desc: desc.to_string(),
        }
    }

    fn opt_pos(pos: &Option<csv::Position>) -> String {
        if let Some(pos) = pos.as_ref() {
            format!(" at {pos:?}")
        } else {
            String::default()
        }
    }
}
