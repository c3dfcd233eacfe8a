//! Archive reading API.
//!
//! A [`Reader`] holds a file name and the formats and filters it accepts. It
//! keeps nothing open: every call to [`Reader::iterator`] starts a fresh pass
//! over the archive, so several passes can run side by side.
//!
//! # Example
//!
//! ```rust,no_run
//! use archivum::{Reader, ReaderError};
//!
//! let reader = Reader::new("backup.tar.gz");
//! assert_eq!(reader.error(), ReaderError::None);
//!
//! let mut entries = reader.iterator();
//! while let Some(entry) = entries.next_entry() {
//!     println!("{:?} {:?}", entry.file_type(), entry.path_name());
//! }
//!
//! let readme = reader.file_data("./docs/README.md");
//! ```

mod iterator;

pub use iterator::ReaderIterator;

use std::path::{Path, PathBuf};

use crate::archive_path::clean_path;
use crate::error::ReaderError;
use crate::format::{SupportedFilter, SupportedFormat};
use crate::DEFAULT_BLOCK_SIZE;

/// Configuration for reading one archive file.
#[derive(Debug, Clone)]
pub struct Reader {
    file_name: PathBuf,
    formats: Vec<SupportedFormat>,
    filters: Vec<SupportedFilter>,
    block_size: usize,
    error: ReaderError,
    file_count: Option<u64>,
}

impl Reader {
    /// Creates a reader accepting every format and filter.
    ///
    /// The file is probed once; check [`error`](Self::error) for the result.
    pub fn new(file_name: impl AsRef<Path>) -> Self {
        Self::with_support(file_name, &[SupportedFormat::All], &[SupportedFilter::All])
    }

    /// Creates a reader accepting only the given formats and filters.
    ///
    /// [`SupportedFormat::All`] and [`SupportedFilter::All`] act as wildcards.
    pub fn with_support(
        file_name: impl AsRef<Path>,
        formats: &[SupportedFormat],
        filters: &[SupportedFilter],
    ) -> Self {
        let mut reader = Self::unbound(formats, filters);
        reader.file_name = file_name.as_ref().to_path_buf();
        reader.probe();
        reader
    }

    /// Creates a reader that is not bound to a file yet. Nothing is probed
    /// until [`open`](Self::open).
    pub fn unbound(formats: &[SupportedFormat], filters: &[SupportedFilter]) -> Self {
        Self {
            file_name: PathBuf::new(),
            formats: formats.to_vec(),
            filters: filters.to_vec(),
            block_size: DEFAULT_BLOCK_SIZE,
            error: ReaderError::None,
            file_count: None,
        }
    }

    /// Rebinds the reader to `file_name` and probes it.
    ///
    /// Returns true if the archive could be opened. A cached
    /// [`file_count`](Self::file_count) is kept.
    pub fn open(&mut self, file_name: impl AsRef<Path>, block_size: usize) -> bool {
        self.file_name = file_name.as_ref().to_path_buf();
        self.block_size = block_size;
        self.probe();
        self.error.is_none()
    }

    fn probe(&mut self) {
        self.error = self.iterator().error();
        if !self.error.is_none() {
            log::debug!(
                "probing {} failed: {}",
                self.file_name.display(),
                self.error
            );
        }
    }

    /// Starts a new pass over the archive.
    pub fn iterator(&self) -> ReaderIterator {
        ReaderIterator::open(
            &self.file_name,
            &self.formats,
            &self.filters,
            self.block_size,
        )
    }

    /// The number of entries, counted on first use and cached afterwards.
    pub fn file_count(&mut self) -> u64 {
        if let Some(count) = self.file_count {
            return count;
        }
        let mut iter = self.iterator();
        let mut count = 0;
        while iter.next_entry().is_some() {
            count += 1;
        }
        self.file_count = Some(count);
        count
    }

    /// Returns the payload of the first entry whose cleaned path equals the
    /// cleaned `path_name`, scanning from the start.
    pub fn file_data(&self, path_name: &str) -> Option<Vec<u8>> {
        let wanted = clean_path(path_name);
        let mut iter = self.iterator();
        loop {
            let current = iter.next_entry()?.clean_path_name();
            if current.as_deref() == Some(wanted.as_str()) {
                return Some(iter.read_data(None));
            }
        }
    }

    /// The archive file this reader is bound to.
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Accepted formats.
    pub fn supported_formats(&self) -> &[SupportedFormat] {
        &self.formats
    }

    /// Accepted filters.
    pub fn supported_filters(&self) -> &[SupportedFilter] {
        &self.filters
    }

    /// Read block size used by new iterators.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Result of the last probe.
    pub fn error(&self) -> ReaderError {
        self.error
    }
}
