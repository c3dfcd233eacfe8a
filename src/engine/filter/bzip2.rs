//! bzip2 filter.

use std::io::{self, Read, Write};

use bzip2::Compression;
use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;

use super::{Decoder, Encoder};
use crate::format::SupportedFilter;

/// bzip2 decoder. Concatenated streams decode as one.
pub(crate) struct Bzip2Decoder<R> {
    inner: MultiBzDecoder<R>,
}

impl<R> std::fmt::Debug for Bzip2Decoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2Decoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> Bzip2Decoder<R> {
    pub fn new(input: R) -> Self {
        Self {
            inner: MultiBzDecoder::new(input),
        }
    }
}

impl<R: Read + Send> Read for Bzip2Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for Bzip2Decoder<R> {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Bzip2
    }
}

/// bzip2 encoder with 900k blocks.
pub(crate) struct Bzip2Encoder {
    inner: BzEncoder<Box<dyn Encoder>>,
}

impl Bzip2Encoder {
    pub fn new(output: Box<dyn Encoder>) -> Self {
        Self {
            inner: BzEncoder::new(output, Compression::best()),
        }
    }
}

impl Write for Bzip2Encoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for Bzip2Encoder {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Bzip2
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?.finish()
    }
}
