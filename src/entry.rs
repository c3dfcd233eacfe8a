//! Archive entry metadata.
//!
//! An [`Entry`] is a handle to one entry's metadata: type, path, size,
//! permissions and modification time. It comes in three flavours:
//!
//! - **owned**: created with [`Entry::new`], mutable, and handed to
//!   [`Writer::write_header`](crate::Writer::write_header)
//! - **borrowed**: produced by [`ReaderIterator`](crate::ReaderIterator) and
//!   valid until the iterator advances; read-only
//! - **null**: a moved-from entry ([`Entry::take`], [`Entry::default`]) that
//!   refers to nothing
//!
//! Every accessor requires a non-null handle and every mutator requires an
//! owned one; violating either is a programming error and panics. Check
//! [`Entry::is_valid`] when in doubt.
//!
//! # Example
//!
//! ```rust
//! use archivum::{Entry, FileType, Permissions, Timestamp};
//!
//! let mut entry = Entry::new();
//! entry.set_file_type(FileType::Regular);
//! entry.set_path_name("./docs//readme.txt");
//! entry.set_size(42);
//! entry.set_permissions(Permissions::READ_OWNER | Permissions::WRITE_OWNER);
//! entry.set_modification_time(Timestamp::from_unix_secs(1_700_000_000));
//!
//! assert_eq!(entry.clean_path_name().as_deref(), Some("docs/readme.txt"));
//! assert_eq!(entry.size(), Some(42));
//! ```

use std::fmt;

use crate::archive_path::clean_path;
use crate::engine::RawEntry;
use crate::format::FileType;
use crate::permissions::Permissions;
use crate::timestamp::Timestamp;

enum Handle<'a> {
    Null,
    Owned(Box<RawEntry>),
    Borrowed(&'a RawEntry),
}

/// A handle to one archive entry's metadata.
///
/// Entries cannot be cloned; ownership moves with the value, and
/// [`take`](Self::take) moves it out explicitly, leaving a null entry behind.
pub struct Entry<'a> {
    handle: Handle<'a>,
}

impl Entry<'static> {
    /// Creates an empty, owned entry.
    ///
    /// The file type starts as [`FileType::Unknown`] and every optional field
    /// is unset.
    pub fn new() -> Self {
        Self {
            handle: Handle::Owned(Box::new(RawEntry::new())),
        }
    }
}

impl<'a> Entry<'a> {
    /// A null entry.
    pub(crate) const fn null() -> Self {
        Self {
            handle: Handle::Null,
        }
    }

    /// A read-only view of engine-owned metadata.
    pub(crate) fn borrowed(raw: &'a RawEntry) -> Self {
        Self {
            handle: Handle::Borrowed(raw),
        }
    }

    pub(crate) fn raw(&self) -> Option<&RawEntry> {
        match &self.handle {
            Handle::Null => None,
            Handle::Owned(raw) => Some(&**raw),
            Handle::Borrowed(raw) => Some(*raw),
        }
    }

    fn get(&self) -> &RawEntry {
        match self.raw() {
            Some(raw) => raw,
            None => panic!("accessed a null archive entry"),
        }
    }

    fn get_mut(&mut self) -> &mut RawEntry {
        match &mut self.handle {
            Handle::Owned(raw) => raw,
            Handle::Borrowed(_) => panic!("cannot modify an entry borrowed from a reader"),
            Handle::Null => panic!("accessed a null archive entry"),
        }
    }

    /// Moves the handle out, leaving a null entry in its place.
    pub fn take(&mut self) -> Entry<'a> {
        Entry {
            handle: std::mem::replace(&mut self.handle, Handle::Null),
        }
    }

    /// Returns true if the entry refers to metadata.
    pub fn is_valid(&self) -> bool {
        !matches!(self.handle, Handle::Null)
    }

    /// Returns true if the entry owns its metadata and can be modified.
    pub fn is_owned(&self) -> bool {
        matches!(self.handle, Handle::Owned(_))
    }

    /// The entry's type.
    ///
    /// # Panics
    ///
    /// Panics on a null entry.
    pub fn file_type(&self) -> FileType {
        self.get().filetype()
    }

    /// Sets the entry's type.
    ///
    /// # Panics
    ///
    /// Panics unless the entry is owned.
    pub fn set_file_type(&mut self, file_type: FileType) {
        self.get_mut().set_filetype(file_type);
    }

    /// The path exactly as stored, or `None` if unset.
    pub fn path_name(&self) -> Option<String> {
        self.get().pathname_utf8().map(str::to_string)
    }

    /// The path in canonical form (see
    /// [`clean_path`](crate::archive_path::clean_path)), or `None` if unset.
    pub fn clean_path_name(&self) -> Option<String> {
        self.get().pathname_utf8().map(clean_path)
    }

    /// Sets the path. Stored as UTF-8, so any Unicode text round-trips.
    pub fn set_path_name(&mut self, path: &str) {
        self.get_mut().set_pathname_utf8(path);
    }

    /// The payload size in bytes, or `None` if the format carries none.
    pub fn size(&self) -> Option<i64> {
        let raw = self.get();
        raw.size_is_set().then(|| raw.size())
    }

    /// Sets the payload size.
    pub fn set_size(&mut self, size: i64) {
        self.get_mut().set_size(size);
    }

    /// The permission set, or `None` if the format carries none.
    pub fn permissions(&self) -> Option<Permissions> {
        let raw = self.get();
        raw.perm_is_set()
            .then(|| Permissions::from_mode(raw.perm()))
    }

    /// Sets the permission set. Only the nine mapped bits are stored.
    pub fn set_permissions(&mut self, permissions: Permissions) {
        self.get_mut().set_perm(permissions.to_mode());
    }

    /// The modification time, or `None` if the format carries none.
    pub fn modification_time(&self) -> Option<Timestamp> {
        let raw = self.get();
        raw.mtime_is_set()
            .then(|| Timestamp::from_secs_nanos(raw.mtime(), raw.mtime_nsec()))
    }

    /// Sets the modification time.
    pub fn set_modification_time(&mut self, time: Timestamp) {
        let (secs, nanos) = time.to_secs_nanos();
        self.get_mut().set_mtime(secs, nanos);
    }
}

impl Default for Entry<'_> {
    /// A null entry.
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(raw) = self.raw() else {
            return f.write_str("Entry(null)");
        };
        f.debug_struct("Entry")
            .field("owned", &self.is_owned())
            .field("file_type", &raw.filetype())
            .field("path_name", &raw.pathname_utf8())
            .field("size", &raw.size_is_set().then(|| raw.size()))
            .field(
                "permissions",
                &raw.perm_is_set().then(|| Permissions::from_mode(raw.perm())),
            )
            .field(
                "modification_time",
                &raw.mtime_is_set()
                    .then(|| Timestamp::from_secs_nanos(raw.mtime(), raw.mtime_nsec())),
            )
            .finish()
    }
}
