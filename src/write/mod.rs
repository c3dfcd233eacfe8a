//! Archive writing API.
//!
//! A [`Writer`] opens its destination, selects the format and chains the
//! filters as soon as it is constructed. Entries are then written one after
//! another: a header, followed by the entry's payload. Writing the next header
//! finishes the previous entry; [`Writer::close`] (or dropping the writer)
//! finishes the archive.
//!
//! Errors are sticky. The first failure is recorded in [`Writer::error`] and
//! every later operation returns `false` without touching the archive.
//!
//! # Example
//!
//! ```rust,no_run
//! use archivum::{SupportedFilter, SupportedFormat, Writer, WriterError};
//!
//! let mut writer = Writer::new("out.tar.gz", SupportedFormat::TarPaxRestricted, SupportedFilter::Gzip);
//! writer.add_directory("docs");
//! writer.add_bytes("docs/hello.txt", b"Hello, World!");
//! writer.close();
//! assert_eq!(writer.error(), WriterError::None);
//! ```

mod source;

pub use source::{EntrySource, LazyFile};

use std::fmt::Display;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use walkdir::WalkDir;

use crate::DEFAULT_BLOCK_SIZE;
use crate::engine::WriteSession;
use crate::entry::Entry;
use crate::error::WriterError;
use crate::format::{FileType, SupportedFilter, SupportedFormat};
use crate::permissions::Permissions;
use crate::timestamp::Timestamp;

/// Writes one archive file.
pub struct Writer {
    file_path: PathBuf,
    format: SupportedFormat,
    filters: Vec<SupportedFilter>,
    session: Option<WriteSession>,
    error: WriterError,
    file_count: u64,
    block_size: usize,
}

impl Writer {
    /// `rw-r--r--`, used by [`add_file`](Self::add_file) and [`add_bytes`](Self::add_bytes).
    pub const DEFAULT_FILE_PERMISSIONS: Permissions = Permissions::READ_OWNER
        .union(Permissions::WRITE_OWNER)
        .union(Permissions::READ_GROUP)
        .union(Permissions::READ_OTHER);

    /// `rwxr-xr-x`, used by [`add_directory`](Self::add_directory).
    pub const DEFAULT_DIRECTORY_PERMISSIONS: Permissions = Self::DEFAULT_FILE_PERMISSIONS
        .union(Permissions::EXE_OWNER)
        .union(Permissions::EXE_GROUP)
        .union(Permissions::EXE_OTHER);

    /// Creates `file_path` as an archive of `format` passed through `filter`.
    ///
    /// Use [`SupportedFilter::None`] for no compression. Check
    /// [`error`](Self::error) to see whether the archive could be set up.
    pub fn new(file_path: impl AsRef<Path>, format: SupportedFormat, filter: SupportedFilter) -> Self {
        Self::with_filters(file_path, format, &[filter])
    }

    /// Like [`new`](Self::new), chaining several filters. The archive bytes
    /// pass through the filters in the given order.
    pub fn with_filters(
        file_path: impl AsRef<Path>,
        format: SupportedFormat,
        filters: &[SupportedFilter],
    ) -> Self {
        let mut writer = Self {
            file_path: file_path.as_ref().to_path_buf(),
            format,
            filters: filters.to_vec(),
            session: None,
            error: WriterError::None,
            file_count: 0,
            block_size: DEFAULT_BLOCK_SIZE,
        };

        let mut session = WriteSession::new();
        if let Err(e) = session.set_format(format.code()) {
            writer.fail(WriterError::CannotSetFormat, e);
            return writer;
        }
        for filter in filters {
            match session.add_filter(filter.code()) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    writer.fail(WriterError::CannotAddFilter, e);
                    return writer;
                }
                Err(e) => log::warn!("adding {filter}: {e}"),
            }
        }
        if let Err(e) = session.open_filename(&writer.file_path) {
            writer.fail(WriterError::CannotOpenFile, e);
            return writer;
        }

        writer.session = Some(session);
        writer
    }

    fn fail(&mut self, error: WriterError, cause: impl Display) {
        log::warn!("{}: {error}: {cause}", self.file_path.display());
        self.error = error;
    }

    fn session(&mut self) -> Option<&mut WriteSession> {
        if self.error.is_none() {
            self.session.as_mut()
        } else {
            None
        }
    }

    /// Writes an entry header, finishing the previous entry.
    ///
    /// Any valid entry is accepted, including one borrowed from a
    /// [`ReaderIterator`](crate::ReaderIterator), so entries can be copied
    /// between archives.
    pub fn write_header(&mut self, entry: &Entry<'_>) -> bool {
        if !self.error.is_none() {
            return false;
        }
        let Some(raw) = entry.raw() else {
            self.fail(WriterError::InvalidEntry, "null entry");
            return false;
        };
        let Some(session) = self.session() else {
            return false;
        };
        match session.write_header(raw) {
            Ok(()) => {
                self.file_count += 1;
                true
            }
            Err(e) => {
                self.fail(WriterError::CannotWriteHeader, e);
                false
            }
        }
    }

    /// Appends `data` to the current entry's payload.
    ///
    /// Fails with [`WriterError::CannotWriteData`] unless all of `data` is
    /// accepted, for instance when it runs past the entry's declared size.
    pub fn write_data(&mut self, data: &[u8]) -> bool {
        let Some(session) = self.session() else {
            return false;
        };
        match session.write_data(data) {
            Ok(n) if n == data.len() => true,
            Ok(n) => {
                self.fail(
                    WriterError::CannotWriteData,
                    format!("accepted {n} of {} bytes", data.len()),
                );
                false
            }
            Err(e) => {
                self.fail(WriterError::CannotWriteData, e);
                false
            }
        }
    }

    /// Copies `source` to the current entry's payload in
    /// [`block_size`](Self::block_size) chunks.
    pub fn write_data_from<R: Read + ?Sized>(&mut self, source: &mut R) -> bool {
        if self.session().is_none() {
            return false;
        }
        let mut buf = vec![0u8; self.block_size.max(1)];
        loop {
            match source.read(&mut buf) {
                Ok(0) => return true,
                Ok(n) => {
                    if !self.write_data(&buf[..n]) {
                        return false;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.fail(WriterError::CannotWriteData, e);
                    return false;
                }
            }
        }
    }

    /// Adds a directory entry with [`DEFAULT_DIRECTORY_PERMISSIONS`](Self::DEFAULT_DIRECTORY_PERMISSIONS).
    pub fn add_directory(&mut self, path: &str) -> bool {
        self.add_directory_with(path, Self::DEFAULT_DIRECTORY_PERMISSIONS)
    }

    /// Adds a directory entry.
    pub fn add_directory_with(&mut self, path: &str, permissions: Permissions) -> bool {
        self.add_directory_entry(path, permissions, None)
    }

    fn add_directory_entry(
        &mut self,
        path: &str,
        permissions: Permissions,
        mtime: Option<Timestamp>,
    ) -> bool {
        if !self.error.is_none() {
            return false;
        }
        let mut entry = Entry::new();
        entry.set_file_type(FileType::Directory);
        entry.set_path_name(path);
        entry.set_permissions(permissions);
        if let Some(mtime) = mtime {
            entry.set_modification_time(mtime);
        }
        self.write_header(&entry)
    }

    /// Adds a regular file read from `source`, with
    /// [`DEFAULT_FILE_PERMISSIONS`](Self::DEFAULT_FILE_PERMISSIONS).
    pub fn add_file<S: EntrySource + ?Sized>(
        &mut self,
        path_in_archive: &str,
        source: &mut S,
    ) -> bool {
        self.add_file_with(path_in_archive, source, Self::DEFAULT_FILE_PERMISSIONS)
    }

    /// Adds a regular file whose payload is read from `source`.
    ///
    /// The header records `source`'s current size. The source is opened if
    /// needed; failing that sets [`WriterError::CannotOpenFile`].
    pub fn add_file_with<S: EntrySource + ?Sized>(
        &mut self,
        path_in_archive: &str,
        source: &mut S,
        permissions: Permissions,
    ) -> bool {
        self.add_file_entry(path_in_archive, source, permissions, None)
    }

    fn add_file_entry<S: EntrySource + ?Sized>(
        &mut self,
        path_in_archive: &str,
        source: &mut S,
        permissions: Permissions,
        mtime: Option<Timestamp>,
    ) -> bool {
        if !self.error.is_none() {
            return false;
        }

        let mut entry = Entry::new();
        entry.set_file_type(FileType::Regular);
        entry.set_path_name(path_in_archive);
        entry.set_permissions(permissions);
        entry.set_size(i64::try_from(source.size()).unwrap_or(i64::MAX));
        if let Some(mtime) = mtime {
            entry.set_modification_time(mtime);
        }

        if let Err(e) = source.open() {
            self.fail(WriterError::CannotOpenFile, e);
            return false;
        }
        self.write_header(&entry) && self.write_data_from(source)
    }

    /// Adds a regular file holding `data`, with
    /// [`DEFAULT_FILE_PERMISSIONS`](Self::DEFAULT_FILE_PERMISSIONS).
    pub fn add_bytes(&mut self, path_in_archive: &str, data: &[u8]) -> bool {
        self.add_bytes_with(path_in_archive, data, Self::DEFAULT_FILE_PERMISSIONS)
    }

    /// Adds a regular file holding `data`.
    pub fn add_bytes_with(
        &mut self,
        path_in_archive: &str,
        data: &[u8],
        permissions: Permissions,
    ) -> bool {
        self.add_file_with(path_in_archive, &mut Cursor::new(data), permissions)
    }

    /// Adds a file or a whole directory tree from disk under
    /// `path_in_archive`, keeping permissions and modification times.
    ///
    /// Directories are walked in name order, each directory ahead of its
    /// contents. Anything that is neither a regular file nor a directory
    /// (symbolic links included) sets [`WriterError::UnexpectedFileType`].
    pub fn add_path(&mut self, path_in_archive: &str, fs_path: impl AsRef<Path>) -> bool {
        if !self.error.is_none() {
            return false;
        }
        let root = fs_path.as_ref();
        let base = path_in_archive.trim_end_matches('/');

        for item in WalkDir::new(root).sort_by_file_name() {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    self.fail(WriterError::CannotOpenFile, e);
                    return false;
                }
            };
            let name = archive_name(base, item.path().strip_prefix(root).unwrap_or(item.path()));
            if !self.add_fs_object(&name, item.path()) {
                return false;
            }
        }
        true
    }

    fn add_fs_object(&mut self, name: &str, path: &Path) -> bool {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                self.fail(WriterError::CannotOpenFile, e);
                return false;
            }
        };
        let mtime = FileTime::from_last_modification_time(&meta);
        let mtime = Timestamp::from_secs_nanos(mtime.unix_seconds(), i64::from(mtime.nanoseconds()));

        if meta.is_dir() {
            let permissions = fs_permissions(&meta, Self::DEFAULT_DIRECTORY_PERMISSIONS);
            self.add_directory_entry(name, permissions, Some(mtime))
        } else if meta.is_file() {
            let permissions = fs_permissions(&meta, Self::DEFAULT_FILE_PERMISSIONS);
            self.add_file_entry(name, &mut LazyFile::new(path), permissions, Some(mtime))
        } else {
            self.fail(
                WriterError::UnexpectedFileType,
                format!("{} is neither a file nor a directory", path.display()),
            );
            false
        }
    }

    /// Finishes the archive and releases the destination. Closing twice is a
    /// no-op.
    ///
    /// A failure while finishing sets [`WriterError::CannotWriteData`] unless
    /// an earlier error is already recorded.
    pub fn close(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Err(e) = session.close() {
            if self.error.is_none() {
                self.fail(WriterError::CannotWriteData, e);
            } else {
                log::warn!("{}: finishing after error: {e}", self.file_path.display());
            }
        }
    }

    /// The sticky error, [`WriterError::None`] while everything succeeds.
    pub fn error(&self) -> WriterError {
        self.error
    }

    /// Number of headers written successfully.
    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    /// Chunk size used when copying payloads from readers.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Sets the chunk size for [`write_data_from`](Self::write_data_from).
    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
    }

    /// The archive file being written.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The archive format.
    pub fn format(&self) -> SupportedFormat {
        self.format
    }

    /// The filter chain, in the order the archive bytes pass through it.
    pub fn filters(&self) -> &[SupportedFilter] {
        &self.filters
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("file_path", &self.file_path)
            .field("format", &self.format)
            .field("filters", &self.filters)
            .field("open", &self.session.is_some())
            .field("error", &self.error)
            .field("file_count", &self.file_count)
            .finish()
    }
}

/// Joins `base` and a path relative to the walk root with `/`.
fn archive_name(base: &str, relative: &Path) -> String {
    let mut name = base.to_string();
    for part in relative.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(&part.as_os_str().to_string_lossy());
    }
    name
}

#[cfg(unix)]
fn fs_permissions(meta: &fs::Metadata, _fallback: Permissions) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    Permissions::from_mode(meta.permissions().mode())
}

#[cfg(not(unix))]
fn fs_permissions(meta: &fs::Metadata, fallback: Permissions) -> Permissions {
    if meta.permissions().readonly() {
        fallback & !(Permissions::WRITE_OWNER | Permissions::WRITE_GROUP | Permissions::WRITE_OTHER)
    } else {
        fallback
    }
}
