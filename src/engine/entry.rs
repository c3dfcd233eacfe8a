use crate::format::{FileType, S_IFMT};

/// One entry's metadata as the engine stores it.
///
/// Type and permission bits share a native `mode`. Every other field has an
/// explicit "unset" state distinct from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawEntry {
    mode: u32,
    perm_set: bool,
    pathname: Option<String>,
    size: Option<i64>,
    mtime: Option<(i64, i64)>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every field to unset, reusing the allocation.
    pub fn clear(&mut self) {
        self.mode = 0;
        self.perm_set = false;
        self.pathname = None;
        self.size = None;
        self.mtime = None;
    }

    pub fn filetype(&self) -> FileType {
        FileType::from_mode(self.mode)
    }

    pub fn set_filetype(&mut self, file_type: FileType) {
        self.mode = (self.mode & !S_IFMT) | file_type.mode_bits();
    }

    pub fn pathname_utf8(&self) -> Option<&str> {
        self.pathname.as_deref()
    }

    pub fn set_pathname_utf8(&mut self, path: &str) {
        self.pathname = Some(path.to_string());
    }

    pub fn size(&self) -> i64 {
        self.size.unwrap_or(0)
    }

    pub fn size_is_set(&self) -> bool {
        self.size.is_some()
    }

    pub fn set_size(&mut self, size: i64) {
        self.size = Some(size);
    }

    /// Permission bits of the mode (`0o7777`).
    pub fn perm(&self) -> u32 {
        self.mode & 0o7777
    }

    pub fn perm_is_set(&self) -> bool {
        self.perm_set
    }

    pub fn set_perm(&mut self, perm: u32) {
        self.mode = (self.mode & S_IFMT) | (perm & 0o7777);
        self.perm_set = true;
    }

    pub fn mtime(&self) -> i64 {
        self.mtime.map_or(0, |(secs, _)| secs)
    }

    pub fn mtime_nsec(&self) -> i64 {
        self.mtime.map_or(0, |(_, nanos)| nanos)
    }

    pub fn mtime_is_set(&self) -> bool {
        self.mtime.is_some()
    }

    pub fn set_mtime(&mut self, secs: i64, nanos: i64) {
        self.mtime = Some((secs, nanos));
    }
}
