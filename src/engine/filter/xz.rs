//! xz filter.

use std::io::{self, Read, Write};

use xz2::read::XzDecoder as XzReader;
use xz2::write::XzEncoder as XzWriter;

use super::{Decoder, Encoder};
use crate::format::SupportedFilter;

const PRESET: u32 = 6;

/// xz decoder. Concatenated streams decode as one.
pub(crate) struct XzDecoder<R: Read> {
    inner: XzReader<R>,
}

impl<R: Read> std::fmt::Debug for XzDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XzDecoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> XzDecoder<R> {
    pub fn new(input: R) -> Self {
        Self {
            inner: XzReader::new_multi_decoder(input),
        }
    }
}

impl<R: Read + Send> Read for XzDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for XzDecoder<R> {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Xz
    }
}

/// xz encoder.
pub(crate) struct XzEncoder {
    inner: XzWriter<Box<dyn Encoder>>,
}

impl XzEncoder {
    pub fn new(output: Box<dyn Encoder>) -> Self {
        Self {
            inner: XzWriter::new(output, PRESET),
        }
    }
}

impl Write for XzEncoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for XzEncoder {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Xz
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?.finish()
    }
}
