//! LZ4 frame filter.

use std::io::{self, Read, Write};

use lz4_flex::frame::{FrameDecoder, FrameEncoder};

use super::{Decoder, Encoder};
use crate::format::SupportedFilter;

/// LZ4 frame decoder.
pub(crate) struct Lz4Decoder<R: Read> {
    inner: FrameDecoder<R>,
}

impl<R: Read> std::fmt::Debug for Lz4Decoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lz4Decoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> Lz4Decoder<R> {
    pub fn new(input: R) -> Self {
        Self {
            inner: FrameDecoder::new(input),
        }
    }
}

impl<R: Read + Send> Read for Lz4Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for Lz4Decoder<R> {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Lz4
    }
}

/// LZ4 frame encoder.
pub(crate) struct Lz4Encoder {
    inner: FrameEncoder<Box<dyn Encoder>>,
}

impl Lz4Encoder {
    pub fn new(output: Box<dyn Encoder>) -> Self {
        Self {
            inner: FrameEncoder::new(output),
        }
    }
}

impl Write for Lz4Encoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for Lz4Encoder {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Lz4
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish().map_err(io::Error::other)?.finish()
    }
}
