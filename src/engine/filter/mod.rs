//! Compression filters wrapped around a container format's byte stream.
//!
//! Every filter has a [`Decoder`] used when reading and an [`Encoder`] used
//! when writing. Filters are backed by the codec crates behind the matching
//! cargo features; a filter whose feature is disabled, or that has no codec
//! crate at all, is unavailable and cannot be registered with a session.
//!
//! When reading, filters are recognised by their magic bytes, repeatedly, so
//! stacked filters unwrap one layer at a time. When writing, encoders are
//! chained in front of a [`FileSink`]; finishing an encoder finishes the rest
//! of the chain behind it.

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Write};

use crate::error::{EngineError, EngineResult};
use crate::format::SupportedFilter;

#[cfg(feature = "bzip2")]
mod bzip2;
#[cfg(feature = "gzip")]
mod gzip;
#[cfg(feature = "lz4")]
mod lz4;
#[cfg(feature = "lzma")]
mod lzma;
#[cfg(feature = "xz")]
mod xz;
#[cfg(feature = "zstd")]
mod zstd;

/// Upper bound on stacked filters unwrapped while reading.
const MAX_FILTER_DEPTH: usize = 25;

/// Bytes inspected when looking for a filter signature.
const SIGNATURE_LEN: usize = 16;

/// A decoding stage in a read pipeline.
pub(crate) trait Decoder: Read + Send {
    /// Returns the filter this stage removes.
    fn filter(&self) -> SupportedFilter;
}

/// An encoding stage in a write pipeline.
pub(crate) trait Encoder: Write + Send {
    /// Returns the filter this stage applies.
    fn filter(&self) -> SupportedFilter;

    /// Finishes this stage, then every stage behind it.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Returns true if `filter` can be registered with a session.
pub(crate) fn is_available(filter: SupportedFilter) -> bool {
    match filter {
        SupportedFilter::None => true,
        SupportedFilter::Gzip => cfg!(feature = "gzip"),
        SupportedFilter::Bzip2 => cfg!(feature = "bzip2"),
        SupportedFilter::Xz => cfg!(feature = "xz"),
        SupportedFilter::Lzma => cfg!(feature = "lzma"),
        SupportedFilter::Zstd => cfg!(feature = "zstd"),
        SupportedFilter::Lz4 => cfg!(feature = "lz4"),
        _ => false,
    }
}

/// Every available filter except `None`.
pub(crate) fn available() -> Vec<SupportedFilter> {
    SupportedFilter::KNOWN
        .into_iter()
        .filter(|f| *f != SupportedFilter::None && is_available(*f))
        .collect()
}

/// The unfiltered bottom of a read pipeline.
pub(crate) struct Passthrough<R> {
    inner: R,
}

impl<R: Read + Send> Passthrough<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read + Send> Read for Passthrough<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> Decoder for Passthrough<R> {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::None
    }
}

/// The bottom of a write pipeline: the destination file.
pub(crate) struct FileSink {
    inner: BufWriter<File>,
}

impl FileSink {
    pub fn new(file: File) -> Self {
        Self {
            inner: BufWriter::new(file),
        }
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for FileSink {
    fn filter(&self) -> SupportedFilter {
        SupportedFilter::None
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Wraps `output` in the encoder for `filter`.
pub(crate) fn build_encoder(
    filter: SupportedFilter,
    output: Box<dyn Encoder>,
) -> EngineResult<Box<dyn Encoder>> {
    match filter {
        SupportedFilter::None => Ok(output),
        #[cfg(feature = "gzip")]
        SupportedFilter::Gzip => Ok(Box::new(gzip::GzipEncoder::new(output))),
        #[cfg(feature = "bzip2")]
        SupportedFilter::Bzip2 => Ok(Box::new(bzip2::Bzip2Encoder::new(output))),
        #[cfg(feature = "xz")]
        SupportedFilter::Xz => Ok(Box::new(xz::XzEncoder::new(output))),
        #[cfg(feature = "lzma")]
        SupportedFilter::Lzma => Ok(Box::new(lzma::LzmaEncoder::new(output)?)),
        #[cfg(feature = "zstd")]
        SupportedFilter::Zstd => Ok(Box::new(zstd::ZstdEncoder::new(output)?)),
        #[cfg(feature = "lz4")]
        SupportedFilter::Lz4 => Ok(Box::new(lz4::Lz4Encoder::new(output))),
        other => Err(EngineError::fatal(format!(
            "{other} filter is not available for writing"
        ))),
    }
}

/// Wraps `input` in the decoder for `filter`.
fn build_decoder(filter: SupportedFilter, input: Box<dyn Decoder>) -> io::Result<Box<dyn Decoder>> {
    match filter {
        SupportedFilter::None => Ok(input),
        #[cfg(feature = "gzip")]
        SupportedFilter::Gzip => Ok(Box::new(gzip::GzipDecoder::new(input))),
        #[cfg(feature = "bzip2")]
        SupportedFilter::Bzip2 => Ok(Box::new(bzip2::Bzip2Decoder::new(input))),
        #[cfg(feature = "xz")]
        SupportedFilter::Xz => Ok(Box::new(xz::XzDecoder::new(input))),
        #[cfg(feature = "lzma")]
        SupportedFilter::Lzma => Ok(Box::new(lzma::LzmaDecoder::new(input)?)),
        #[cfg(feature = "zstd")]
        SupportedFilter::Zstd => Ok(Box::new(zstd::ZstdDecoder::new(input)?)),
        #[cfg(feature = "lz4")]
        SupportedFilter::Lz4 => Ok(Box::new(lz4::Lz4Decoder::new(input))),
        other => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{other} filter is not available for reading"),
        )),
    }
}

/// Reads up to `len` bytes from the front of `input` without losing them.
///
/// Returns the bytes read and a reader that yields them again followed by the
/// rest of `input`.
pub(crate) fn peek(
    mut input: Box<dyn Decoder>,
    len: usize,
) -> io::Result<(Vec<u8>, Box<dyn Decoder>)> {
    let mut head = Vec::with_capacity(len);
    (&mut input).take(len as u64).read_to_end(&mut head)?;
    let replay = Cursor::new(head.clone()).chain(input);
    Ok((head, Box::new(Passthrough::new(replay))))
}

/// Identifies the filter whose signature starts `head`.
pub(crate) fn sniff(head: &[u8]) -> Option<SupportedFilter> {
    const GZIP: &[u8] = &[0x1f, 0x8b];
    const XZ: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
    const ZSTD: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
    const LZ4: &[u8] = &[0x04, 0x22, 0x4d, 0x18];

    if head.starts_with(GZIP) {
        Some(SupportedFilter::Gzip)
    } else if head.len() >= 4 && head.starts_with(b"BZh") && (b'1'..=b'9').contains(&head[3]) {
        Some(SupportedFilter::Bzip2)
    } else if head.starts_with(XZ) {
        Some(SupportedFilter::Xz)
    } else if head.starts_with(ZSTD) {
        Some(SupportedFilter::Zstd)
    } else if head.starts_with(LZ4) {
        Some(SupportedFilter::Lz4)
    } else if looks_like_lzma_alone(head) {
        Some(SupportedFilter::Lzma)
    } else {
        None
    }
}

/// lzma-alone has no magic number; judge the 13-byte header on plausibility.
fn looks_like_lzma_alone(head: &[u8]) -> bool {
    if head.len() < 13 {
        return false;
    }
    // lc/lp/pb packed as (pb * 5 + lp) * 9 + lc
    if head[0] > (4 * 5 + 4) * 9 + 8 {
        return false;
    }
    let dict_size = u32::from_le_bytes([head[1], head[2], head[3], head[4]]);
    let plausible_dict = (12..=30).any(|n| dict_size == 1 << n || dict_size == 3 << (n - 1));
    if !plausible_dict {
        return false;
    }
    let mut size = [0u8; 8];
    size.copy_from_slice(&head[5..13]);
    let size = u64::from_le_bytes(size);
    size == u64::MAX || size < 1 << 39
}

/// Strips every recognised filter layer from `input`.
///
/// Only filters in `enabled` are recognised. Returns the decoded stream and
/// the filters removed, outermost first.
pub(crate) fn unwrap_filters(
    mut input: Box<dyn Decoder>,
    enabled: &[SupportedFilter],
) -> io::Result<(Box<dyn Decoder>, Vec<SupportedFilter>)> {
    let mut removed = Vec::new();
    while removed.len() < MAX_FILTER_DEPTH {
        let (head, replay) = peek(input, SIGNATURE_LEN)?;
        let detected = sniff(&head).filter(|f| enabled.contains(f));
        match detected {
            Some(filter) => {
                input = build_decoder(filter, replay)?;
                log::debug!("unwrapping {} filter", input.filter());
                removed.push(filter);
            }
            None => return Ok((replay, removed)),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "too many stacked filters",
    ))
}
