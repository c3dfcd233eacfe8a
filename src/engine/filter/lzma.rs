//! lzma-alone (`.lzma`) filter.
//!
//! The stream starts with a 13-byte header: the packed lc/lp/pb byte, the
//! dictionary size (u32 LE) and the uncompressed size (u64 LE, all ones when
//! unknown). Streams written here always use the unknown size and an end
//! marker.

use std::io::{self, Read, Write};

use lzma_rust2::{LzmaOptions, LzmaReader, LzmaWriter};

use super::{Decoder, Encoder};
use crate::error::{EngineError, EngineResult};
use crate::format::SupportedFilter;

const PRESET: u32 = 6;
const HEADER_LEN: usize = 13;
const UNKNOWN_SIZE: u64 = u64::MAX;

/// lzma-alone decoder.
pub(crate) struct LzmaDecoder<R> {
    inner: LzmaReader<R>,
}

impl<R> std::fmt::Debug for LzmaDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LzmaDecoder").finish_non_exhaustive()
    }
}

impl<R: Read + Send> LzmaDecoder<R> {
    /// Consumes the header from `input` and prepares to decode the body.
    pub fn new(mut input: R) -> io::Result<Self> {
        let mut header = [0u8; HEADER_LEN];
        input.read_exact(&mut header)?;

        let props = header[0];
        let dict_size = u32::from_le_bytes([header[1], header[2], header[3], header[4]]);
        let mut size = [0u8; 8];
        size.copy_from_slice(&header[5..]);
        let uncompressed_size = u64::from_le_bytes(size);

        let reader = LzmaReader::new_with_props(input, uncompressed_size, props, dict_size, None)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(Self { inner: reader })
    }
}

impl<R: Read + Send> Read for LzmaDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for LzmaDecoder<R> {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Lzma
    }
}

/// lzma-alone encoder.
pub(crate) struct LzmaEncoder {
    inner: LzmaWriter<Box<dyn Encoder>>,
}

impl LzmaEncoder {
    /// Writes the header to `output` and prepares to encode the body.
    pub fn new(mut output: Box<dyn Encoder>) -> EngineResult<Self> {
        let opts = LzmaOptions::with_preset(PRESET);

        let mut header = Vec::with_capacity(HEADER_LEN);
        header.push(opts.get_props());
        header.extend_from_slice(&opts.dict_size.to_le_bytes());
        header.extend_from_slice(&UNKNOWN_SIZE.to_le_bytes());
        output.write_all(&header)?;

        let writer = LzmaWriter::new_no_header(output, &opts, true)
            .map_err(|e| EngineError::fatal(format!("lzma encoder: {e}")))?;
        Ok(Self { inner: writer })
    }
}

impl Write for LzmaEncoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for LzmaEncoder {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::Lzma
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner
            .finish()
            .map_err(|e| io::Error::other(e.to_string()))?
            .finish()
    }
}
