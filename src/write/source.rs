//! Payload sources for [`Writer::add_file`](super::Writer::add_file).

use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// A readable payload whose length is known before it is read.
///
/// The length goes into the entry header, so it is queried first; the
/// source is then opened if it is not open already, and read to the end.
pub trait EntrySource: Read {
    /// Current length of the payload in bytes.
    fn size(&self) -> u64;

    /// Makes the source readable. Sources that are always open keep the
    /// default, which does nothing.
    fn open(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: AsRef<[u8]>> EntrySource for Cursor<T> {
    fn size(&self) -> u64 {
        self.get_ref().as_ref().len() as u64
    }
}

impl EntrySource for File {
    fn size(&self) -> u64 {
        self.metadata().map(|m| m.len()).unwrap_or(0)
    }
}

/// A file on disk that is opened only when its payload is needed.
#[derive(Debug)]
pub struct LazyFile {
    path: PathBuf,
    file: Option<File>,
}

impl LazyFile {
    /// Refers to `path` without opening it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
        }
    }

    /// The file's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true once [`open`](EntrySource::open) has succeeded.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl EntrySource for LazyFile {
    /// Size on disk, or zero if the file cannot be inspected.
    fn size(&self) -> u64 {
        match &self.file {
            Some(file) => file.size(),
            None => fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        }
    }

    fn open(&mut self) -> io::Result<()> {
        if self.file.is_none() {
            self.file = Some(File::open(&self.path)?);
        }
        Ok(())
    }
}

impl Read for LazyFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("{} is not open", self.path.display()),
            )),
        }
    }
}
