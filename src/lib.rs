//! # archivum
//!
//! Entry-oriented reading and writing of archives: tar (ustar, pax, GNU), zip
//! and raw streams, optionally wrapped in gzip, bzip2, xz, lzma, zstd or lz4.
//!
//! The crate has three parts:
//!
//! - [`Entry`] describes one archive member: type, path, size, permissions and
//!   modification time.
//! - [`Reader`] and [`ReaderIterator`] walk an existing archive entry by entry.
//! - [`Writer`] creates an archive from entries and their payloads.
//!
//! Operations report failure through a sticky error code rather than a
//! `Result`: the first failure is recorded, later operations become no-ops,
//! and [`Reader::error`], [`ReaderIterator::error`] or [`Writer::error`] tell
//! what went wrong.
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use archivum::{Permissions, SupportedFilter, SupportedFormat, Writer, WriterError};
//!
//! let mut writer = Writer::new("site.tar.gz", SupportedFormat::TarPaxRestricted, SupportedFilter::Gzip);
//! writer.add_directory("site");
//! writer.add_bytes("site/index.html", b"<h1>Hello</h1>");
//! writer.add_bytes_with("site/run.sh", b"#!/bin/sh\n", Writer::DEFAULT_DIRECTORY_PERMISSIONS);
//! writer.close();
//! assert_eq!(writer.error(), WriterError::None);
//! ```
//!
//! ### Reading an Archive
//!
//! ```rust,no_run
//! use archivum::Reader;
//!
//! let mut reader = Reader::new("site.tar.gz");
//! println!("{} entries", reader.file_count());
//!
//! let mut entries = reader.iterator();
//! while let Some(entry) = entries.next_entry() {
//!     println!("{:?} {:?} {:?}", entry.file_type(), entry.path_name(), entry.permissions());
//! }
//!
//! let index = reader.file_data("site/index.html");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `gzip` | Yes | gzip filter via `flate2` |
//! | `bzip2` | Yes | bzip2 filter |
//! | `xz` | Yes | xz filter via `xz2` |
//! | `lzma` | Yes | lzma-alone filter via `lzma-rust2` |
//! | `zstd` | Yes | Zstandard filter |
//! | `lz4` | Yes | lz4 frame filter via `lz4_flex` |
//!
//! A filter whose feature is disabled cannot be registered: readers report
//! [`ReaderError::FilterNotSupported`] and writers
//! [`WriterError::CannotAddFilter`].
//!
//! ## Logging
//!
//! Session lifecycle is logged at `debug` level and every recorded error at
//! `warn` level through the [`log`] facade. No logger is installed.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default chunk size for reading and for copying payloads into a writer.
pub const DEFAULT_BLOCK_SIZE: usize = 10240;

pub mod archive_path;
pub mod error;
pub mod format;
pub mod permissions;
pub mod read;
pub mod timestamp;
pub mod write;

mod engine;
mod entry;

pub use entry::Entry;
pub use error::{EngineError, ReaderError, Severity, WriterError};
pub use format::{FileType, SupportedFilter, SupportedFormat};
pub use permissions::Permissions;
pub use timestamp::Timestamp;

// Re-export reading API at crate root for convenience
pub use read::{Reader, ReaderIterator};

// Re-export writing API at crate root for convenience
pub use write::{EntrySource, LazyFile, Writer};
