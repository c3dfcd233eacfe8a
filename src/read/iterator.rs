//! Streaming over one archive's entries.

use std::io::{self, Write};
use std::path::Path;

use crate::engine::ReadSession;
use crate::entry::Entry;
use crate::error::{EngineError, EngineResult, ReaderError};
use crate::format::{SupportedFilter, SupportedFormat};

/// A single pass over an archive.
///
/// Each iterator owns its own engine session, opened on construction and
/// released by [`close`](Self::close) or on drop. Entries are yielded as
/// borrowed views that stay valid until the next call to
/// [`next_entry`](Self::next_entry); the borrow checker enforces this.
///
/// Read an entry's payload before advancing: once the iterator moves on, the
/// previous payload is gone.
pub struct ReaderIterator {
    session: Option<ReadSession>,
    block_size: usize,
    error: ReaderError,
    valid: bool,
}

impl ReaderIterator {
    pub(crate) fn open(
        file_name: &Path,
        formats: &[SupportedFormat],
        filters: &[SupportedFilter],
        block_size: usize,
    ) -> Self {
        let mut iter = Self {
            session: None,
            block_size: block_size.max(1),
            error: ReaderError::None,
            valid: false,
        };

        let mut session = ReadSession::new();
        if let Err(e) = register_formats(&mut session, formats) {
            iter.fail(ReaderError::FormatNotSupported, &e);
            return iter;
        }
        if let Err(e) = register_filters(&mut session, filters) {
            iter.fail(ReaderError::FilterNotSupported, &e);
            return iter;
        }
        if let Err(e) = session.open_filename(file_name, iter.block_size) {
            iter.fail(ReaderError::CannotOpenFile, &e);
            return iter;
        }

        iter.session = Some(session);
        iter
    }

    fn fail(&mut self, error: ReaderError, cause: &EngineError) {
        log::warn!("{error}: {cause}");
        self.error = error;
        self.valid = false;
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }

    /// Advances to the next entry.
    ///
    /// Returns `None` both at the end of the archive and when the next header
    /// cannot be read; the two are not told apart here, and
    /// [`error`](Self::error) stays [`ReaderError::None`] in either case.
    pub fn next_entry(&mut self) -> Option<Entry<'_>> {
        self.valid = false;
        if !self.error.is_none() {
            return None;
        }
        let session = self.session.as_mut()?;
        match session.next_header() {
            Ok(Some(raw)) => {
                self.valid = true;
                Some(Entry::borrowed(raw))
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("cannot read next entry header: {e}");
                None
            }
        }
    }

    /// The current entry, or a null entry unless the last
    /// [`next_entry`](Self::next_entry) succeeded.
    pub fn entry(&self) -> Entry<'_> {
        match self.session.as_ref() {
            Some(session) if self.valid => Entry::borrowed(session.entry()),
            _ => Entry::default(),
        }
    }

    /// Reads the current entry's payload.
    ///
    /// With `max_size` set, that many bytes are requested. Otherwise the
    /// entry's declared size is requested, or nothing at all when the format
    /// does not record one (raw streams); use
    /// [`read_data_into`](Self::read_data_into) for those. The result holds
    /// only the bytes actually produced.
    ///
    /// Read failures set [`ReaderError::CannotReadData`].
    pub fn read_data(&mut self, max_size: Option<usize>) -> Vec<u8> {
        if !self.valid || !self.error.is_none() {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let wanted = match max_size {
            Some(max_size) => max_size,
            None => {
                let raw = session.entry();
                if raw.size_is_set() {
                    usize::try_from(raw.size().max(0)).unwrap_or(usize::MAX)
                } else {
                    0
                }
            }
        };

        match read_up_to(session, wanted, self.block_size) {
            Ok(data) => data,
            Err(e) => {
                self.fail(ReaderError::CannotReadData, &e);
                Vec::new()
            }
        }
    }

    /// Streams the whole remaining payload of the current entry into `out`,
    /// whatever its declared size, and returns the number of bytes copied.
    ///
    /// An engine failure sets [`ReaderError::CannotReadData`]; a failure of
    /// `out` itself is only returned.
    pub fn read_data_into<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<u64> {
        if !self.valid || !self.error.is_none() {
            return Ok(0);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };

        let mut buf = vec![0u8; self.block_size];
        let mut copied = 0u64;
        loop {
            let n = match session.read_data(&mut buf) {
                Ok(n) => n,
                Err(e) => {
                    let err = io::Error::other(e.to_string());
                    self.fail(ReaderError::CannotReadData, &e);
                    return Err(err);
                }
            };
            if n == 0 {
                return Ok(copied);
            }
            out.write_all(&buf[..n])?;
            copied += n as u64;
        }
    }

    /// Releases the engine session. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.valid = false;
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }

    /// Returns true if the last [`next_entry`](Self::next_entry) produced an
    /// entry, that is, if [`entry`](Self::entry) and
    /// [`read_data`](Self::read_data) refer to something.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The sticky error. Once set, the iterator yields nothing more.
    pub fn error(&self) -> ReaderError {
        self.error
    }
}

impl Drop for ReaderIterator {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ReaderIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderIterator")
            .field("open", &self.session.is_some())
            .field("valid", &self.valid)
            .field("error", &self.error)
            .finish()
    }
}

fn register_formats(session: &mut ReadSession, formats: &[SupportedFormat]) -> EngineResult<()> {
    for format in formats {
        if format.is_wildcard() {
            session.support_format_all()?;
        } else {
            session.support_format_by_code(format.code())?;
        }
    }
    Ok(())
}

fn register_filters(session: &mut ReadSession, filters: &[SupportedFilter]) -> EngineResult<()> {
    for filter in filters {
        if filter.is_wildcard() {
            session.support_filter_all()?;
        } else {
            session.support_filter_by_code(filter.code())?;
        }
    }
    Ok(())
}

/// Reads at most `wanted` bytes, growing the buffer one block at a time so a
/// bogus declared size cannot force a huge allocation up front.
fn read_up_to(session: &mut ReadSession, wanted: usize, block_size: usize) -> EngineResult<Vec<u8>> {
    let mut data = Vec::with_capacity(wanted.min(block_size));
    let mut chunk = vec![0u8; wanted.min(block_size)];
    while data.len() < wanted {
        let want = chunk.len().min(wanted - data.len());
        let n = session.read_data(&mut chunk[..want])?;
        data.extend_from_slice(&chunk[..n]);
        if n < want {
            break;
        }
    }
    Ok(data)
}
