//! zip, backed by the `zip` crate.
//!
//! zip keeps its directory at the end of the file, so both directions need
//! random access. An unfiltered archive is read straight from its file; a
//! filtered one is decoded into memory first. Likewise a zip written through
//! filters is assembled in memory and pushed through the filter chain when the
//! session closes.
//!
//! Modification times use the DOS encoding: two-second resolution, years
//! 1980-2107, interpreted as UTC.

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use super::entry::RawEntry;
use super::filter::Encoder;
use super::{FormatReader, FormatWriter};
use crate::error::{EngineError, EngineResult};
use crate::format::{FileType, SupportedFormat};
use crate::timestamp::CivilTime;

fn zip_error(err: ZipError) -> EngineError {
    match err {
        ZipError::Io(e) => EngineError::fatal(e.to_string()),
        other => EngineError::failed(other.to_string()),
    }
}

/// Random-access storage for a zip archive.
pub(crate) enum ZipSource {
    File(File),
    Memory(Cursor<Vec<u8>>),
}

impl Read for ZipSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for ZipSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(file) => file.seek(pos),
            Self::Memory(cursor) => cursor.seek(pos),
        }
    }
}

/// Destination a zip is assembled in.
pub(crate) enum ZipTarget {
    File(BufWriter<File>),
    /// Bytes are forwarded to the filter chain on close.
    Memory(Cursor<Vec<u8>>),
}

impl Write for ZipTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.write(buf),
            Self::Memory(cursor) => cursor.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(file) => file.flush(),
            Self::Memory(cursor) => cursor.flush(),
        }
    }
}

impl Seek for ZipTarget {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(file) => file.seek(pos),
            Self::Memory(cursor) => cursor.seek(pos),
        }
    }
}

/// Converts to DOS time, flooring to the even second it can represent.
fn to_dos_time(secs: i64) -> DateTime {
    let civil = CivilTime::from_unix_secs(secs);
    let second = civil.second - civil.second % 2;
    u16::try_from(civil.year)
        .ok()
        .and_then(|year| {
            DateTime::from_date_and_time(
                year,
                civil.month as u8,
                civil.day as u8,
                civil.hour as u8,
                civil.minute as u8,
                second as u8,
            )
            .ok()
        })
        .unwrap_or_default()
}

fn from_dos_time(time: DateTime) -> i64 {
    CivilTime {
        year: i64::from(time.year()),
        month: u32::from(time.month()),
        day: u32::from(time.day()),
        hour: u32::from(time.hour()),
        minute: u32::from(time.minute()),
        second: u32::from(time.second()),
    }
    .to_unix_secs()
}

/// Reads entries in central-directory order.
pub(crate) struct ZipReader {
    archive: ZipArchive<ZipSource>,
    next: usize,
    current: Option<usize>,
    payload: Option<Cursor<Vec<u8>>>,
}

impl ZipReader {
    pub fn new(source: ZipSource) -> EngineResult<Self> {
        let archive = ZipArchive::new(source).map_err(zip_error)?;
        log::debug!("zip archive with {} entries", archive.len());
        Ok(Self {
            archive,
            next: 0,
            current: None,
            payload: None,
        })
    }
}

impl FormatReader for ZipReader {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Zip
    }

    fn next_header(&mut self, entry: &mut RawEntry) -> EngineResult<bool> {
        self.payload = None;
        self.current = None;
        if self.next >= self.archive.len() {
            return Ok(false);
        }
        let index = self.next;
        self.next += 1;

        let file = self.archive.by_index(index).map_err(zip_error)?;
        let file_type = match file.unix_mode().map(FileType::from_mode) {
            Some(file_type) if file_type != FileType::Unknown => file_type,
            _ if file.is_dir() => FileType::Directory,
            _ => FileType::Regular,
        };

        entry.clear();
        entry.set_filetype(file_type);
        entry.set_pathname_utf8(file.name());
        entry.set_size(i64::try_from(file.size()).unwrap_or(i64::MAX));
        if let Some(mode) = file.unix_mode() {
            entry.set_perm(mode);
        }
        entry.set_mtime(from_dos_time(file.last_modified()), 0);

        self.current = Some(index);
        Ok(true)
    }

    fn read_data(&mut self, buf: &mut [u8]) -> EngineResult<usize> {
        let Some(index) = self.current else {
            return Ok(0);
        };
        if self.payload.is_none() {
            let mut file = self.archive.by_index(index).map_err(zip_error)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            self.payload = Some(Cursor::new(data));
        }
        match self.payload.as_mut() {
            Some(payload) => Ok(payload.read(buf)?),
            None => Ok(0),
        }
    }
}

/// Writes regular files and directories, deflate-compressed.
pub(crate) struct ZipFormatWriter {
    zip: ZipWriter<ZipTarget>,
    sink: Option<Box<dyn Encoder>>,
    in_entry: bool,
    remaining: Option<u64>,
}

impl ZipFormatWriter {
    /// Writes straight into `file`.
    pub fn to_file(file: File) -> Self {
        Self::with_target(ZipTarget::File(BufWriter::new(file)), None)
    }

    /// Assembles the archive in memory and hands it to `sink` on finish.
    pub fn to_sink(sink: Box<dyn Encoder>) -> Self {
        Self::with_target(ZipTarget::Memory(Cursor::new(Vec::new())), Some(sink))
    }

    fn with_target(target: ZipTarget, sink: Option<Box<dyn Encoder>>) -> Self {
        Self {
            zip: ZipWriter::new(target),
            sink,
            in_entry: false,
            remaining: None,
        }
    }
}

impl FormatWriter for ZipFormatWriter {
    fn write_header(&mut self, entry: &RawEntry) -> EngineResult<()> {
        self.in_entry = false;
        self.remaining = None;

        let Some(path) = entry.pathname_utf8().filter(|p| !p.is_empty()) else {
            return Err(EngineError::failed(
                "Can't record entry in zip file without pathname",
            ));
        };

        let mut options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        if entry.perm_is_set() {
            options = options.unix_permissions(entry.perm());
        }
        if entry.mtime_is_set() {
            options = options.last_modified_time(to_dos_time(entry.mtime()));
        }

        match entry.filetype() {
            FileType::Regular => {
                let size = entry.size_is_set().then(|| entry.size().max(0) as u64);
                options = options.large_file(size.is_some_and(|s| s > u64::from(u32::MAX)));
                self.zip.start_file(path, options).map_err(zip_error)?;
                self.in_entry = true;
                self.remaining = size;
            }
            FileType::Directory => {
                self.zip.add_directory(path, options).map_err(zip_error)?;
            }
            other => {
                return Err(EngineError::failed(format!(
                    "zip format cannot archive {path}: {other:?} entries are not supported"
                )));
            }
        }
        Ok(())
    }

    fn write_data(&mut self, buf: &[u8]) -> EngineResult<usize> {
        if !self.in_entry {
            return Ok(0);
        }
        let n = match self.remaining {
            Some(remaining) => (buf.len() as u64).min(remaining) as usize,
            None => buf.len(),
        };
        self.zip.write_all(&buf[..n])?;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= n as u64;
        }
        Ok(n)
    }

    fn finish(mut self: Box<Self>) -> EngineResult<()> {
        let target = self.zip.finish().map_err(zip_error)?;
        match (target, self.sink.take()) {
            (ZipTarget::File(mut file), _) => file.flush()?,
            (ZipTarget::Memory(cursor), Some(mut sink)) => {
                sink.write_all(&cursor.into_inner())?;
                sink.finish()?;
            }
            (ZipTarget::Memory(_), None) => {
                return Err(EngineError::fatal("zip archive has no destination"));
            }
        }
        Ok(())
    }
}
