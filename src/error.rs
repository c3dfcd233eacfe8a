//! Error types for archive reading and writing.
//!
//! Reading and writing each have a closed error taxonomy, [`ReaderError`] and
//! [`WriterError`]. Both carry a `None` sentinel meaning "no error so far".
//! Errors are *sticky*: once a [`ReaderIterator`](crate::ReaderIterator) or
//! [`Writer`](crate::Writer) records one, every later operation on that object
//! fails fast and leaves the error unchanged.
//!
//! Operations report failure through their return value (`false`, `None` or an
//! empty buffer) and the caller queries `error()` for the reason:
//!
//! ```rust,no_run
//! use archivum::{SupportedFilter, SupportedFormat, Writer, WriterError};
//!
//! let mut writer = Writer::new("out.tar.gz", SupportedFormat::TarUstar, SupportedFilter::Gzip);
//! if !writer.add_bytes("hello.txt", b"hello") {
//!     match writer.error() {
//!         WriterError::CannotOpenFile => eprintln!("cannot create out.tar.gz"),
//!         other => eprintln!("write failed: {other}"),
//!     }
//! }
//! ```
//!
//! [`EngineError`] is what the codec engine itself returns; the public types
//! translate it into the sticky taxonomy.

use std::io;

use thiserror::Error;

/// Errors recorded by a [`Reader`](crate::Reader) or
/// [`ReaderIterator`](crate::ReaderIterator).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReaderError {
    /// No error so far.
    #[default]
    #[error("no error")]
    None,

    /// The engine could not allocate a session.
    ///
    /// Allocation failure aborts the process, so this is never produced.
    #[error("cannot allocate memory")]
    CannotAllocateMemory,

    /// An explicitly requested format cannot be registered with the engine.
    #[error("format not supported")]
    FormatNotSupported,

    /// An explicitly requested filter cannot be registered with the engine.
    #[error("filter not supported")]
    FilterNotSupported,

    /// The source file could not be opened.
    #[error("cannot open file")]
    CannotOpenFile,

    /// The engine failed while reading an entry's payload.
    #[error("cannot read data")]
    CannotReadData,
}

impl ReaderError {
    /// Returns true for [`ReaderError::None`].
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// Errors recorded by a [`Writer`](crate::Writer).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WriterError {
    /// No error so far.
    #[default]
    #[error("no error")]
    None,

    /// The engine could not allocate a session.
    ///
    /// Allocation failure aborts the process, so this is never produced.
    #[error("cannot allocate memory")]
    CannotAllocateMemory,

    /// The destination, or a source file being added, could not be opened.
    #[error("cannot open file")]
    CannotOpenFile,

    /// The engine rejected the container format.
    #[error("cannot set format")]
    CannotSetFormat,

    /// The engine fatally rejected a filter.
    #[error("cannot add filter")]
    CannotAddFilter,

    /// The engine rejected an entry header.
    #[error("cannot write header")]
    CannotWriteHeader,

    /// The engine accepted fewer payload bytes than requested, or a source
    /// stream failed.
    #[error("cannot write data")]
    CannotWriteData,

    /// A header was written from a null entry.
    #[error("invalid entry")]
    InvalidEntry,

    /// A filesystem object is neither a regular file nor a directory.
    #[error("unexpected file type")]
    UnexpectedFileType,
}

impl WriterError {
    /// Returns true for [`WriterError::None`].
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// How serious an engine failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The operation completed, but something was lost or approximated.
    ///
    /// No engine operation reports this level yet; callers log it and carry on.
    Warn,
    /// The operation failed; the session may still be usable.
    Failed,
    /// The session is unusable.
    Fatal,
}

/// A failure reported by the codec engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{severity:?}: {message}")]
pub struct EngineError {
    /// How serious the failure is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl EngineError {
    /// Creates a warning.
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            message: message.into(),
        }
    }

    /// Creates a recoverable failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Failed,
            message: message.into(),
        }
    }

    /// Creates a fatal failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            message: message.into(),
        }
    }

    /// Returns true if the session cannot continue.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

/// I/O errors from the underlying file or codec are fatal to the session.
impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        Self::fatal(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
