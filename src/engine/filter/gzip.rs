//! gzip filter.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use super::{Decoder, Encoder};
use crate::format::SupportedFilter;

/// gzip decoder. Concatenated members decode as one stream.
pub(crate) struct GzipDecoder<R: Read> {
    inner: MultiGzDecoder<R>,
}

impl<R: Read> std::fmt::Debug for GzipDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipDecoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> GzipDecoder<R> {
    pub fn new(input: R) -> Self {
        Self {
            inner: MultiGzDecoder::new(input),
        }
    }
}

impl<R: Read + Send> Read for GzipDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for GzipDecoder<R> {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Gzip
    }
}

/// gzip encoder at the default level.
pub(crate) struct GzipEncoder {
    inner: GzEncoder<Box<dyn Encoder>>,
}

impl GzipEncoder {
    pub fn new(output: Box<dyn Encoder>) -> Self {
        Self {
            inner: GzEncoder::new(output, Compression::default()),
        }
    }
}

impl Write for GzipEncoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for GzipEncoder {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Gzip
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?.finish()
    }
}
