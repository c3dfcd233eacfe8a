//! Single-stream formats: raw data and empty input.

use std::io::{Read, Write};

use super::entry::RawEntry;
use super::filter::{Decoder, Encoder};
use super::{FormatReader, FormatWriter};
use crate::error::{EngineError, EngineResult};
use crate::format::{FileType, SupportedFormat};

/// Name given to the one entry of a raw stream.
pub(crate) const RAW_ENTRY_NAME: &str = "data";

/// Presents the whole (decoded) input as one regular entry of unknown size.
pub(crate) struct RawReader {
    input: Box<dyn Decoder>,
    started: bool,
    done: bool,
}

impl RawReader {
    pub fn new(input: Box<dyn Decoder>) -> Self {
        Self {
            input,
            started: false,
            done: false,
        }
    }
}

impl FormatReader for RawReader {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Raw
    }

    fn next_header(&mut self, entry: &mut RawEntry) -> EngineResult<bool> {
        if self.started {
            self.done = true;
            return Ok(false);
        }
        self.started = true;
        entry.clear();
        entry.set_filetype(FileType::Regular);
        entry.set_pathname_utf8(RAW_ENTRY_NAME);
        Ok(true)
    }

    fn read_data(&mut self, buf: &mut [u8]) -> EngineResult<usize> {
        if self.done || !self.started {
            return Ok(0);
        }
        Ok(self.input.read(buf)?)
    }
}

/// Zero-length input: an archive with no entries.
pub(crate) struct EmptyReader;

impl FormatReader for EmptyReader {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Empty
    }

    fn next_header(&mut self, _entry: &mut RawEntry) -> EngineResult<bool> {
        Ok(false)
    }

    fn read_data(&mut self, _buf: &mut [u8]) -> EngineResult<usize> {
        Ok(0)
    }
}

/// Writes the payload of exactly one regular entry with no framing.
pub(crate) struct RawWriter {
    out: Box<dyn Encoder>,
    entries: usize,
}

impl RawWriter {
    pub fn new(out: Box<dyn Encoder>) -> Self {
        Self { out, entries: 0 }
    }
}

impl FormatWriter for RawWriter {
    fn write_header(&mut self, entry: &RawEntry) -> EngineResult<()> {
        if entry.filetype() != FileType::Regular {
            return Err(EngineError::failed(
                "Raw format only supports regular files",
            ));
        }
        if self.entries > 0 {
            return Err(EngineError::failed("Raw format only supports one entry"));
        }
        self.entries += 1;
        Ok(())
    }

    fn write_data(&mut self, buf: &[u8]) -> EngineResult<usize> {
        if self.entries == 0 {
            return Ok(0);
        }
        self.out.write_all(buf)?;
        Ok(buf.len())
    }

    fn finish(self: Box<Self>) -> EngineResult<()> {
        self.out.finish()?;
        Ok(())
    }
}
