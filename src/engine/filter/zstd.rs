//! Zstandard filter.

use std::io::{self, BufReader, Read, Write};

use zstd::stream::{Decoder as ZstdReader, Encoder as ZstdWriter};

use super::{Decoder, Encoder};
use crate::error::EngineResult;
use crate::format::SupportedFilter;

const LEVEL: i32 = 3;

/// Zstandard decoder.
pub(crate) struct ZstdDecoder<R> {
    inner: ZstdReader<'static, BufReader<R>>,
}

impl<R> std::fmt::Debug for ZstdDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZstdDecoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> ZstdDecoder<R> {
    pub fn new(input: R) -> io::Result<Self> {
        let decoder = ZstdReader::new(input)?;
        Ok(Self { inner: decoder })
    }
}

impl<R: Read + Send> Read for ZstdDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for ZstdDecoder<R> {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Zstd
    }
}

/// Zstandard encoder.
pub(crate) struct ZstdEncoder {
    inner: ZstdWriter<'static, Box<dyn Encoder>>,
}

impl ZstdEncoder {
    pub fn new(output: Box<dyn Encoder>) -> EngineResult<Self> {
        let encoder = ZstdWriter::new(output, LEVEL)?;
        Ok(Self { inner: encoder })
    }
}

impl Write for ZstdEncoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for ZstdEncoder {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Zstd
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?.finish()
    }
}
