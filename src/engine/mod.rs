//! The codec engine.
//!
//! A session-based service the public types are layered on. A
//! [`ReadSession`] detects filters and the container format of one source and
//! walks its entries; a [`WriteSession`] encodes entries into one destination
//! through a chain of filters. Both report failures as [`EngineError`]s with a
//! severity and leave recovery policy to the caller.
//!
//! Container formats plug in through [`FormatReader`] and [`FormatWriter`];
//! filters through the traits in [`filter`].

mod entry;
pub(crate) mod filter;
mod raw;
mod tar;
mod zip;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

pub(crate) use self::entry::RawEntry;
use self::filter::{Decoder, Encoder, FileSink, Passthrough};
use self::raw::{EmptyReader, RawReader, RawWriter};
use self::tar::{TarDialect, TarReader, TarWriter};
use self::zip::{ZipFormatWriter, ZipReader, ZipSource};
use crate::error::{EngineError, EngineResult};
use crate::format::{SupportedFilter, SupportedFormat};

/// Bytes inspected when detecting the container format.
const DETECT_LEN: usize = 512;

/// Decodes entries of one container format.
pub(crate) trait FormatReader: Send {
    /// The format family being read.
    fn format(&self) -> SupportedFormat;

    /// Advances to the next entry and fills `entry` with its metadata.
    ///
    /// Returns `false` at the end of the archive.
    fn next_header(&mut self, entry: &mut RawEntry) -> EngineResult<bool>;

    /// Reads payload bytes of the current entry; 0 at its end.
    fn read_data(&mut self, buf: &mut [u8]) -> EngineResult<usize>;
}

/// Encodes entries into one container format.
pub(crate) trait FormatWriter: Send {
    /// Starts a new entry, finalising the previous one.
    fn write_header(&mut self, entry: &RawEntry) -> EngineResult<()>;

    /// Appends payload bytes to the current entry and returns how many were
    /// accepted.
    fn write_data(&mut self, buf: &[u8]) -> EngineResult<usize>;

    /// Writes the archive trailer and finishes the filter chain.
    fn finish(self: Box<Self>) -> EngineResult<()>;
}

fn is_readable(format: SupportedFormat) -> bool {
    matches!(
        format.family(),
        SupportedFormat::Tar | SupportedFormat::Zip | SupportedFormat::Empty | SupportedFormat::Raw
    )
}

fn is_writable(format: SupportedFormat) -> bool {
    matches!(
        format.family(),
        SupportedFormat::Tar | SupportedFormat::Zip | SupportedFormat::Raw
    )
}

fn open_error(path: &Path, err: std::io::Error) -> EngineError {
    EngineError::fatal(format!("Failed to open '{}': {err}", path.display()))
}

/// A read session over one source.
pub(crate) struct ReadSession {
    formats: Vec<SupportedFormat>,
    filters: Vec<SupportedFilter>,
    path: Option<PathBuf>,
    source: Option<Box<dyn Decoder>>,
    removed: Vec<SupportedFilter>,
    reader: Option<Box<dyn FormatReader>>,
    entry: RawEntry,
    fatal: bool,
}

impl ReadSession {
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
            filters: Vec::new(),
            path: None,
            source: None,
            removed: Vec::new(),
            reader: None,
            entry: RawEntry::new(),
            fatal: false,
        }
    }

    fn enable_format(&mut self, format: SupportedFormat) {
        let family = format.family();
        if !self.formats.contains(&family) {
            self.formats.push(family);
        }
    }

    /// Enables every format that is bid on automatically: tar, zip and empty.
    ///
    /// Raw has to be requested explicitly, as it accepts any input.
    pub fn support_format_all(&mut self) -> EngineResult<()> {
        for format in [
            SupportedFormat::Tar,
            SupportedFormat::Zip,
            SupportedFormat::Empty,
        ] {
            self.enable_format(format);
        }
        Ok(())
    }

    /// Enables the family of the format with native code `code`.
    pub fn support_format_by_code(&mut self, code: i32) -> EngineResult<()> {
        let Some(format) = SupportedFormat::from_code(code) else {
            return Err(EngineError::fatal(format!("No such format ({code:#x})")));
        };
        if format.is_wildcard() {
            return self.support_format_all();
        }
        if !is_readable(format) {
            return Err(EngineError::fatal(format!(
                "{format} is not supported for reading"
            )));
        }
        self.enable_format(format);
        Ok(())
    }

    /// Enables every available filter.
    pub fn support_filter_all(&mut self) -> EngineResult<()> {
        for filter in filter::available() {
            if !self.filters.contains(&filter) {
                self.filters.push(filter);
            }
        }
        Ok(())
    }

    /// Enables the filter with native code `code`.
    pub fn support_filter_by_code(&mut self, code: i32) -> EngineResult<()> {
        let Some(filter) = SupportedFilter::from_code(code) else {
            return Err(EngineError::fatal(format!("No such filter ({code})")));
        };
        if filter.is_wildcard() {
            return self.support_filter_all();
        }
        if !filter::is_available(filter) {
            return Err(EngineError::fatal(format!(
                "{filter} is not supported for reading"
            )));
        }
        if filter != SupportedFilter::None && !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
        Ok(())
    }

    /// Opens `path` and unwraps the filters around its content.
    pub fn open_filename(&mut self, path: &Path, block_size: usize) -> EngineResult<()> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let input: Box<dyn Decoder> = Box::new(Passthrough::new(BufReader::with_capacity(
            block_size.max(DETECT_LEN),
            file,
        )));
        let (decoded, removed) = filter::unwrap_filters(input, &self.filters)?;
        log::debug!("opened {} for reading, filters {removed:?}", path.display());

        self.path = Some(path.to_path_buf());
        self.source = Some(decoded);
        self.removed = removed;
        self.reader = None;
        Ok(())
    }

    /// Picks the format reader for the opened source.
    fn detect_format(&mut self) -> EngineResult<Box<dyn FormatReader>> {
        let Some(source) = self.source.take() else {
            return Err(EngineError::fatal("Archive is not open"));
        };
        let (head, source) = filter::peek(source, DETECT_LEN)?;
        let enabled = |format: SupportedFormat| self.formats.contains(&format);

        if head.is_empty() && enabled(SupportedFormat::Empty) {
            return Ok(Box::new(EmptyReader));
        }
        if enabled(SupportedFormat::Zip)
            && (head.starts_with(b"PK\x03\x04") || head.starts_with(b"PK\x05\x06"))
        {
            let zip_source = match (&self.path, self.removed.is_empty()) {
                (Some(path), true) => {
                    ZipSource::File(File::open(path).map_err(|e| open_error(path, e))?)
                }
                _ => {
                    let mut data = Vec::new();
                    let mut source = source;
                    source.read_to_end(&mut data)?;
                    ZipSource::Memory(std::io::Cursor::new(data))
                }
            };
            return Ok(Box::new(ZipReader::new(zip_source)?));
        }
        if enabled(SupportedFormat::Tar) && tar::is_tar_block(&head) {
            return Ok(Box::new(TarReader::new(source)));
        }
        if enabled(SupportedFormat::Raw) {
            return Ok(Box::new(RawReader::new(source)));
        }
        Err(EngineError::fatal("Unrecognized archive format"))
    }

    /// Advances to the next entry. `None` at the end of the archive.
    ///
    /// The format is detected on the first call. After a fatal error every
    /// later call fails.
    pub fn next_header(&mut self) -> EngineResult<Option<&RawEntry>> {
        let found = self.advance();
        match self.track(found)? {
            true => Ok(Some(&self.entry)),
            false => Ok(None),
        }
    }

    fn advance(&mut self) -> EngineResult<bool> {
        self.ensure_usable()?;
        if self.reader.is_none() {
            let reader = self.detect_format()?;
            log::debug!("detected {} format", reader.format());
            self.reader = Some(reader);
        }
        let Some(reader) = self.reader.as_mut() else {
            return Err(EngineError::fatal("Archive is not open"));
        };
        reader.next_header(&mut self.entry)
    }

    /// The entry read by the last successful [`next_header`](Self::next_header).
    pub fn entry(&self) -> &RawEntry {
        &self.entry
    }

    /// Fills `buf` from the current entry's payload.
    ///
    /// Returns fewer bytes than requested only at the end of the entry.
    pub fn read_data(&mut self, buf: &mut [u8]) -> EngineResult<usize> {
        let filled = self.fill(buf);
        self.track(filled)
    }

    fn fill(&mut self, buf: &mut [u8]) -> EngineResult<usize> {
        self.ensure_usable()?;
        let Some(reader) = self.reader.as_mut() else {
            return Err(EngineError::failed("No current entry"));
        };
        let mut filled = 0;
        while filled < buf.len() {
            let n = reader.read_data(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn ensure_usable(&self) -> EngineResult<()> {
        match self.fatal {
            true => Err(EngineError::fatal("Archive is in a fatal state")),
            false => Ok(()),
        }
    }

    /// Records a fatal result so the session refuses further work.
    fn track<T>(&mut self, result: EngineResult<T>) -> EngineResult<T> {
        if let Err(e) = &result {
            if e.is_fatal() && !self.fatal {
                log::debug!("read session failed: {e}");
                self.fatal = true;
            }
        }
        result
    }

    /// Releases the source.
    pub fn close(&mut self) {
        if self.path.take().is_some() {
            log::debug!("read session closed");
        }
        self.source = None;
        self.reader = None;
        self.entry.clear();
    }
}

/// A write session into one destination.
pub(crate) struct WriteSession {
    format: Option<SupportedFormat>,
    filters: Vec<SupportedFilter>,
    writer: Option<Box<dyn FormatWriter>>,
}

impl WriteSession {
    pub fn new() -> Self {
        Self {
            format: None,
            filters: Vec::new(),
            writer: None,
        }
    }

    /// Selects the container format by native code.
    pub fn set_format(&mut self, code: i32) -> EngineResult<()> {
        match SupportedFormat::from_code(code) {
            Some(format) if is_writable(format) => {
                self.format = Some(format);
                Ok(())
            }
            Some(format) => Err(EngineError::fatal(format!(
                "{format} is not supported for writing"
            ))),
            None => Err(EngineError::fatal(format!("No such format ({code:#x})"))),
        }
    }

    /// Appends a filter by native code. Format bytes pass through filters in
    /// the order they were added.
    pub fn add_filter(&mut self, code: i32) -> EngineResult<()> {
        match SupportedFilter::from_code(code) {
            Some(SupportedFilter::None) => Ok(()),
            Some(filter) if filter::is_available(filter) => {
                self.filters.push(filter);
                Ok(())
            }
            Some(filter) => Err(EngineError::fatal(format!(
                "{filter} is not supported for writing"
            ))),
            None => Err(EngineError::fatal(format!("No such filter ({code})"))),
        }
    }

    /// Creates `path` and prepares the format writer behind the filter chain.
    pub fn open_filename(&mut self, path: &Path) -> EngineResult<()> {
        let Some(format) = self.format else {
            return Err(EngineError::fatal("No format set"));
        };
        let file = File::create(path).map_err(|e| open_error(path, e))?;

        let unfiltered_zip = format == SupportedFormat::Zip && self.filters.is_empty();
        let writer: Box<dyn FormatWriter> = if unfiltered_zip {
            Box::new(ZipFormatWriter::to_file(file))
        } else {
            let mut sink: Box<dyn Encoder> = Box::new(FileSink::new(file));
            for filter in self.filters.iter().rev() {
                sink = filter::build_encoder(*filter, sink)?;
                log::debug!("chained {} filter", sink.filter());
            }
            match TarDialect::from_format(format) {
                Some(dialect) => Box::new(TarWriter::new(sink, dialect)),
                None if format == SupportedFormat::Zip => Box::new(ZipFormatWriter::to_sink(sink)),
                None => Box::new(RawWriter::new(sink)),
            }
        };
        log::debug!(
            "opened {} for writing as {format}, filters {:?}",
            path.display(),
            self.filters
        );
        self.writer = Some(writer);
        Ok(())
    }

    fn writer(&mut self) -> EngineResult<&mut Box<dyn FormatWriter>> {
        self.writer
            .as_mut()
            .ok_or_else(|| EngineError::fatal("Archive is not open"))
    }

    pub fn write_header(&mut self, entry: &RawEntry) -> EngineResult<()> {
        self.writer()?.write_header(entry)
    }

    /// Returns how many bytes of `buf` were accepted.
    pub fn write_data(&mut self, buf: &[u8]) -> EngineResult<usize> {
        self.writer()?.write_data(buf)
    }

    /// Finalises the archive. Closing twice is a no-op.
    pub fn close(&mut self) -> EngineResult<()> {
        match self.writer.take() {
            Some(writer) => {
                log::debug!("write session closed");
                writer.finish()
            }
            None => Ok(()),
        }
    }
}

impl Drop for WriteSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to finalise archive: {e}");
        }
    }
}
