//! tar family: ustar, pax (interchange and restricted) and GNU tar.
//!
//! The `tar` crate encodes and decodes the format itself: header fields and
//! checksums, ustar prefix splitting, pax records and GNU long names. This
//! module only frames it so that entries can be read and written one call at
//! a time through a filter chain.

use std::io::{self, Read, Write};
use std::path::Path;

use tar::{Builder, EntryType, Header, PaxExtensions};

use super::entry::RawEntry;
use super::filter::{Decoder, Encoder};
use super::{FormatReader, FormatWriter};
use crate::error::{EngineError, EngineResult};
use crate::format::{FileType, SupportedFormat};

const BLOCK: u64 = 512;
const RECORD: u64 = 10240;
const ZERO_BLOCK: [u8; BLOCK as usize] = [0; BLOCK as usize];

/// Largest value an 11-digit octal field holds.
const OCTAL_MAX: u64 = 0o77777777777;
/// Largest entry size an entry can report.
const MAX_ENTRY_SIZE: u64 = i64::MAX as u64;
/// Extended-header payloads larger than this are treated as corruption.
const MAX_META_LEN: u64 = 16 << 20;
/// Header name used when the real path lives in a pax record.
const STAND_IN_NAME: &str = "pax-path";

/// Returns true if `block` is a tar header with a valid checksum, or the
/// all-zero end-of-archive block.
pub(crate) fn is_tar_block(block: &[u8]) -> bool {
    if block.len() != BLOCK as usize {
        return false;
    }
    is_null(block) || checksum_matches(Header::from_byte_slice(block))
}

fn checksum_matches(header: &Header) -> bool {
    let mut expected = header.clone();
    expected.set_cksum();
    matches!((header.cksum(), expected.cksum()), (Ok(stored), Ok(computed)) if stored == computed)
}

fn padding_for(size: u64) -> u64 {
    (BLOCK - size % BLOCK) % BLOCK
}

fn is_null(block: &[u8]) -> bool {
    block.iter().all(|b| *b == 0)
}

fn damaged() -> EngineError {
    EngineError::fatal("Damaged tar archive")
}

/// Fields an extended header overrides in the entry that follows it.
#[derive(Debug, Default)]
struct PaxOverrides {
    path: Option<String>,
    size: Option<u64>,
    mtime: Option<(i64, i64)>,
}

impl PaxOverrides {
    fn apply_records(&mut self, data: &[u8]) -> EngineResult<()> {
        for extension in PaxExtensions::new(data) {
            let extension =
                extension.map_err(|_| EngineError::fatal("Invalid pax extended header"))?;
            let value = extension.value_bytes();
            match extension.key() {
                Ok("path") => self.path = Some(String::from_utf8_lossy(value).into_owned()),
                Ok("size") => {
                    let size = std::str::from_utf8(value)
                        .ok()
                        .and_then(|text| text.parse::<u64>().ok())
                        .filter(|size| *size <= MAX_ENTRY_SIZE)
                        .ok_or_else(damaged)?;
                    self.size = Some(size);
                }
                Ok("mtime") => {
                    self.mtime = std::str::from_utf8(value).ok().and_then(parse_pax_time);
                }
                _ => log::debug!(
                    "ignoring pax attribute {}",
                    String::from_utf8_lossy(extension.key_bytes())
                ),
            }
        }
        Ok(())
    }
}

/// Parses a pax time such as `1700000000.25` or `-1.5`.
fn parse_pax_time(text: &str) -> Option<(i64, i64)> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let secs: i64 = whole.parse().ok()?;
    let mut nanos: i64 = 0;
    for (i, c) in frac.chars().take(9).enumerate() {
        let digit = c.to_digit(10)? as i64;
        nanos += digit * 10i64.pow(8 - i as u32);
    }
    if !negative {
        Some((secs, nanos))
    } else if nanos == 0 {
        Some((-secs, 0))
    } else {
        Some((-secs - 1, 1_000_000_000 - nanos))
    }
}

fn format_pax_time(secs: i64, nanos: i64) -> String {
    if nanos == 0 {
        secs.to_string()
    } else if secs >= 0 {
        format!("{secs}.{nanos:09}")
    } else {
        format!("-{}.{:09}", -(secs + 1), 1_000_000_000 - nanos)
    }
}

/// Streaming tar reader.
pub(crate) struct TarReader {
    input: Box<dyn Decoder>,
    remaining: u64,
    padding: u64,
    finished: bool,
}

impl TarReader {
    pub fn new(input: Box<dyn Decoder>) -> Self {
        Self {
            input,
            remaining: 0,
            padding: 0,
            finished: false,
        }
    }

    /// Reads the next block, or `None` at a clean end of stream.
    fn read_block(&mut self) -> EngineResult<Option<[u8; BLOCK as usize]>> {
        let mut block = [0u8; BLOCK as usize];
        let mut filled = 0;
        while filled < block.len() {
            let n = self.input.read(&mut block[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        match filled {
            0 => Ok(None),
            n if n == block.len() => Ok(Some(block)),
            _ => Err(EngineError::fatal("Truncated tar archive")),
        }
    }

    fn skip(&mut self, len: u64) -> EngineResult<()> {
        let skipped = io::copy(&mut (&mut self.input).take(len), &mut io::sink())?;
        if skipped != len {
            return Err(EngineError::fatal("Truncated tar archive"));
        }
        Ok(())
    }

    /// Reads an extension payload and the padding after it.
    fn read_meta(&mut self, size: u64) -> EngineResult<Vec<u8>> {
        if size > MAX_META_LEN {
            return Err(EngineError::fatal("Extended header too large"));
        }
        let mut data = vec![0u8; size as usize];
        self.input.read_exact(&mut data)?;
        self.skip(padding_for(size))?;
        Ok(data)
    }
}

impl FormatReader for TarReader {
    fn format(&self) -> SupportedFormat {
        SupportedFormat::Tar
    }

    fn next_header(&mut self, entry: &mut RawEntry) -> EngineResult<bool> {
        if self.finished {
            return Ok(false);
        }
        let rest = self.remaining.checked_add(self.padding).ok_or_else(damaged)?;
        self.skip(rest)?;
        self.remaining = 0;
        self.padding = 0;

        let mut long_name: Option<Vec<u8>> = None;
        let mut pax = PaxOverrides::default();

        loop {
            let Some(block) = self.read_block()? else {
                self.finished = true;
                return Ok(false);
            };
            if is_null(&block) {
                self.finished = true;
                return Ok(false);
            }
            let header = Header::from_byte_slice(&block);
            if !checksum_matches(header) {
                return Err(damaged());
            }
            let header_size = header.size()?;

            match header.entry_type() {
                EntryType::GNULongName => {
                    let mut name = self.read_meta(header_size)?;
                    while name.last() == Some(&0) {
                        name.pop();
                    }
                    long_name = Some(name);
                    continue;
                }
                EntryType::XHeader => {
                    let data = self.read_meta(header_size)?;
                    pax.apply_records(&data)?;
                    continue;
                }
                EntryType::GNULongLink | EntryType::XGlobalHeader => {
                    self.read_meta(header_size)?;
                    continue;
                }
                _ => {}
            }

            let path = match (pax.path.take(), long_name.take()) {
                (Some(path), _) => path,
                (None, Some(name)) => String::from_utf8_lossy(&name).into_owned(),
                (None, None) => String::from_utf8_lossy(&header.path_bytes()).into_owned(),
            };
            let size = pax.size.unwrap_or(header_size);
            if size > MAX_ENTRY_SIZE {
                return Err(damaged());
            }
            let file_type = match header.entry_type() {
                EntryType::Directory => FileType::Directory,
                EntryType::Symlink => FileType::SymbolicLink,
                EntryType::Char => FileType::CharacterDevice,
                EntryType::Block => FileType::BlockDevice,
                EntryType::Fifo => FileType::Fifo,
                _ if header.as_ustar().is_none() && path.ends_with('/') => FileType::Directory,
                _ => FileType::Regular,
            };

            entry.clear();
            entry.set_filetype(file_type);
            entry.set_pathname_utf8(&path);
            entry.set_size(size as i64);
            entry.set_perm(header.mode()?);
            match pax.mtime {
                Some((secs, nanos)) => entry.set_mtime(secs, nanos),
                None => entry.set_mtime(i64::try_from(header.mtime()?).unwrap_or(i64::MAX), 0),
            }

            self.remaining = size;
            self.padding = padding_for(size);
            return Ok(true);
        }
    }

    fn read_data(&mut self, buf: &mut [u8]) -> EngineResult<usize> {
        let want = (buf.len() as u64).min(self.remaining) as usize;
        if want == 0 {
            return Ok(0);
        }
        let n = self.input.read(&mut buf[..want])?;
        if n == 0 {
            return Err(EngineError::fatal("Truncated tar archive"));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

/// The tar variant a [`TarWriter`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TarDialect {
    Ustar,
    PaxInterchange,
    PaxRestricted,
    Gnu,
}

impl TarDialect {
    pub fn from_format(format: SupportedFormat) -> Option<Self> {
        match format {
            SupportedFormat::Tar | SupportedFormat::TarPaxRestricted => Some(Self::PaxRestricted),
            SupportedFormat::TarUstar => Some(Self::Ustar),
            SupportedFormat::TarPaxInterchange => Some(Self::PaxInterchange),
            SupportedFormat::TarGnu => Some(Self::Gnu),
            _ => None,
        }
    }

    fn new_header(self) -> Header {
        match self {
            Self::Gnu => Header::new_gnu(),
            _ => Header::new_ustar(),
        }
    }
}

/// Counts what reaches the filter chain, for record alignment.
struct CountingSink {
    out: Box<dyn Encoder>,
    written: u64,
}

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.out.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Gives a header whose path went into a pax record a short name of its own.
fn set_stand_in_path(header: &mut Header, path: &str) -> io::Result<()> {
    let name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let mut end = name.len().min(header.as_old().name.len());
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    header
        .set_path(&name[..end])
        .or_else(|_| header.set_path(STAND_IN_NAME))
}

/// Streaming tar writer.
///
/// Headers go through [`Builder`]; payload bytes are streamed behind them and
/// padded here, since the builder only appends whole entries.
pub(crate) struct TarWriter {
    builder: Builder<CountingSink>,
    dialect: TarDialect,
    in_entry: bool,
    remaining: u64,
    padding: u64,
}

impl TarWriter {
    pub fn new(out: Box<dyn Encoder>, dialect: TarDialect) -> Self {
        let mut builder = Builder::new(CountingSink { out, written: 0 });
        builder.preserve_absolute(true);
        Self {
            builder,
            dialect,
            in_entry: false,
            remaining: 0,
            padding: 0,
        }
    }

    fn emit(&mut self, bytes: &[u8]) -> EngineResult<()> {
        self.builder.get_mut().write_all(bytes)?;
        Ok(())
    }

    fn emit_zeros(&mut self, mut len: u64) -> EngineResult<()> {
        while len > 0 {
            let n = len.min(BLOCK) as usize;
            self.emit(&ZERO_BLOCK[..n])?;
            len -= n as u64;
        }
        Ok(())
    }

    /// Zero-fills whatever the current entry is still owed.
    fn finish_entry(&mut self) -> EngineResult<()> {
        if self.in_entry {
            if self.remaining > 0 {
                log::debug!("zero-filling {} missing bytes", self.remaining);
            }
            self.emit_zeros(self.remaining + self.padding)?;
            self.in_entry = false;
            self.remaining = 0;
            self.padding = 0;
        }
        Ok(())
    }
}

impl FormatWriter for TarWriter {
    fn write_header(&mut self, entry: &RawEntry) -> EngineResult<()> {
        self.finish_entry()?;

        let Some(pathname) = entry.pathname_utf8().filter(|p| !p.is_empty()) else {
            return Err(EngineError::failed(
                "Can't record entry in tar file without pathname",
            ));
        };
        let file_type = entry.filetype();
        let kind = match file_type {
            FileType::Regular => EntryType::Regular,
            FileType::Directory => EntryType::Directory,
            FileType::SymbolicLink => EntryType::Symlink,
            FileType::CharacterDevice => EntryType::Char,
            FileType::BlockDevice => EntryType::Block,
            FileType::Fifo => EntryType::Fifo,
            FileType::Socket | FileType::Unknown => {
                return Err(EngineError::failed(format!(
                    "tar format cannot archive {pathname}: unsupported file type"
                )));
            }
        };

        let mut path = pathname.to_owned();
        if file_type == FileType::Directory && !path.ends_with('/') {
            path.push('/');
        }
        let size = match file_type {
            FileType::Regular => u64::try_from(entry.size()).unwrap_or(0),
            _ => 0,
        };
        let (secs, nanos) = match entry.mtime_is_set() {
            true => (entry.mtime(), entry.mtime_nsec()),
            false => (0, 0),
        };
        let mtime_fits = (0..=OCTAL_MAX as i64).contains(&secs);

        let mut header = self.dialect.new_header();
        header.set_mode(entry.perm());
        header.set_uid(0);
        header.set_gid(0);
        header.set_size(if self.dialect == TarDialect::Gnu { size } else { size.min(OCTAL_MAX) });
        header.set_mtime(secs.clamp(0, OCTAL_MAX as i64) as u64);
        header.set_entry_type(kind);

        match self.dialect {
            TarDialect::Ustar => {
                if size > OCTAL_MAX {
                    return Err(EngineError::failed(format!("File size out of range: {pathname}")));
                }
                header.set_path_absolute(&path).map_err(|err| {
                    EngineError::failed(format!("Pathname cannot be stored: {pathname}: {err}"))
                })?;
                header.set_cksum();
                self.builder.append(&header, io::empty())?;
            }
            TarDialect::PaxRestricted | TarDialect::PaxInterchange => {
                let always = self.dialect == TarDialect::PaxInterchange;
                let base = header.clone();
                let fits = path.is_ascii() && header.set_path_absolute(&path).is_ok();
                if !fits {
                    header = base;
                    set_stand_in_path(&mut header, &path)?;
                }
                let size_text = size.to_string();
                let mtime_text = format_pax_time(secs, nanos);
                let mut records: Vec<(&str, &[u8])> = Vec::new();
                if always || !fits {
                    records.push(("path", path.as_bytes()));
                }
                if size > OCTAL_MAX {
                    records.push(("size", size_text.as_bytes()));
                }
                if (always && entry.mtime_is_set()) || !mtime_fits {
                    records.push(("mtime", mtime_text.as_bytes()));
                }
                self.builder.append_pax_extensions(records)?;
                header.set_cksum();
                self.builder.append(&header, io::empty())?;
            }
            TarDialect::Gnu => {
                self.builder
                    .append_data(&mut header, Path::new(&path), io::empty())
                    .map_err(|err| {
                        EngineError::failed(format!("Pathname cannot be stored: {pathname}: {err}"))
                    })?;
            }
        }

        self.in_entry = true;
        self.remaining = size;
        self.padding = padding_for(size);
        Ok(())
    }

    fn write_data(&mut self, buf: &[u8]) -> EngineResult<usize> {
        let n = (buf.len() as u64).min(self.remaining) as usize;
        if n == 0 {
            return Ok(0);
        }
        self.emit(&buf[..n])?;
        self.remaining -= n as u64;
        Ok(n)
    }

    fn finish(mut self: Box<Self>) -> EngineResult<()> {
        self.finish_entry()?;
        self.builder.finish()?;
        let tail = (RECORD - self.builder.get_ref().written % RECORD) % RECORD;
        self.emit_zeros(tail)?;
        let sink = self.builder.into_inner()?;
        sink.out.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::filter::Passthrough;
    use super::super::filter::testing::SharedSink;
    use super::*;
    use std::io::Cursor;

    fn regular(path: &str, size: i64) -> RawEntry {
        let mut entry = RawEntry::new();
        entry.set_filetype(FileType::Regular);
        entry.set_pathname_utf8(path);
        entry.set_size(size);
        entry.set_perm(0o644);
        entry.set_mtime(1_700_000_000, 0);
        entry
    }

    fn write_all(dialect: TarDialect, entries: &[(RawEntry, &[u8])]) -> Vec<u8> {
        let sink = SharedSink::default();
        let mut writer: Box<TarWriter> = Box::new(TarWriter::new(Box::new(sink.clone()), dialect));
        for (entry, data) in entries {
            writer.write_header(entry).unwrap();
            writer.write_data(data).unwrap();
        }
        writer.finish().unwrap();
        sink.contents()
    }

    fn reader_for(data: Vec<u8>) -> TarReader {
        TarReader::new(Box::new(Passthrough::new(Cursor::new(data))))
    }

    fn read_all(data: Vec<u8>) -> Vec<(RawEntry, Vec<u8>)> {
        let mut reader = reader_for(data);
        let mut out = Vec::new();
        let mut entry = RawEntry::new();
        while reader.next_header(&mut entry).unwrap() {
            let mut payload = Vec::new();
            let mut buf = [0u8; 100];
            loop {
                let n = reader.read_data(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                payload.extend_from_slice(&buf[..n]);
            }
            out.push((entry.clone(), payload));
        }
        out
    }

    #[test]
    fn test_archive_is_record_aligned() {
        let data = write_all(TarDialect::Ustar, &[(regular("a.txt", 5), &b"hello"[..])]);
        assert_eq!(data.len() as u64 % RECORD, 0);
        assert!(is_tar_block(&data[..512]));
    }

    #[test]
    fn test_checksum_detects_damage() {
        let data = write_all(TarDialect::Ustar, &[(regular("a.txt", 5), &b"hello"[..])]);
        let mut block = data[..512].to_vec();
        assert!(is_tar_block(&block));
        block[0] ^= 0x20;
        assert!(!is_tar_block(&block));
        assert!(is_tar_block(&[0u8; 512]));
        assert!(!is_tar_block(&[0u8; 100]));
    }

    #[test]
    fn test_roundtrip_each_dialect() {
        for dialect in [
            TarDialect::Ustar,
            TarDialect::PaxInterchange,
            TarDialect::PaxRestricted,
            TarDialect::Gnu,
        ] {
            let data = write_all(dialect, &[(regular("dir/a.txt", 5), &b"hello"[..])]);
            let entries = read_all(data);
            assert_eq!(entries.len(), 1, "{dialect:?}");
            let (entry, payload) = &entries[0];
            assert_eq!(entry.pathname_utf8(), Some("dir/a.txt"));
            assert_eq!(entry.perm(), 0o644);
            assert_eq!(entry.mtime(), 1_700_000_000);
            assert_eq!(payload, b"hello");
        }
    }

    #[test]
    fn test_output_reads_with_tar_archive() {
        let long = format!("{}/{}", "d".repeat(120), "f".repeat(150));
        for dialect in [TarDialect::PaxInterchange, TarDialect::PaxRestricted, TarDialect::Gnu] {
            let data = write_all(
                dialect,
                &[(regular(&long, 4), &b"long"[..]), (regular("b", 1), &b"b"[..])],
            );
            let mut archive = tar::Archive::new(Cursor::new(data));
            let mut seen = Vec::new();
            for entry in archive.entries().unwrap() {
                let mut entry = entry.unwrap();
                let path = entry.path().unwrap().to_string_lossy().into_owned();
                let mut payload = Vec::new();
                entry.read_to_end(&mut payload).unwrap();
                seen.push((path, payload));
            }
            assert_eq!(seen.len(), 2, "{dialect:?}");
            assert_eq!(seen[0], (long.clone(), b"long".to_vec()));
            assert_eq!(seen[1], (String::from("b"), b"b".to_vec()));
        }
    }

    #[test]
    fn test_long_paths() {
        let long = format!("{}/{}", "d".repeat(120), "f".repeat(90));
        let very_long = "x".repeat(300);

        let data = write_all(TarDialect::Ustar, &[(regular(&long, 1), &b"1"[..])]);
        assert_eq!(read_all(data)[0].0.pathname_utf8(), Some(long.as_str()));

        for dialect in [TarDialect::PaxRestricted, TarDialect::Gnu] {
            let data = write_all(dialect, &[(regular(&very_long, 1), &b"1"[..])]);
            assert_eq!(read_all(data)[0].0.pathname_utf8(), Some(very_long.as_str()));
        }
    }

    #[test]
    fn test_ustar_rejects_unsplittable_path() {
        let sink = SharedSink::default();
        let mut writer = TarWriter::new(Box::new(sink), TarDialect::Ustar);
        let err = writer.write_header(&regular(&"x".repeat(300), 0)).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_short_entry_is_zero_filled() {
        let data = write_all(
            TarDialect::Ustar,
            &[(regular("a", 10), &b"abc"[..]), (regular("b", 2), &b"xy"[..])],
        );
        let entries = read_all(data);
        assert_eq!(entries[0].1, b"abc\0\0\0\0\0\0\0");
        assert_eq!(entries[1].1, b"xy");
    }

    #[test]
    fn test_data_beyond_size_is_refused() {
        let sink = SharedSink::default();
        let mut writer = TarWriter::new(Box::new(sink), TarDialect::Ustar);
        writer.write_header(&regular("a", 3)).unwrap();
        assert_eq!(writer.write_data(b"abcdef").unwrap(), 3);
        assert_eq!(writer.write_data(b"g").unwrap(), 0);
    }

    #[test]
    fn test_directory_gets_trailing_slash() {
        let mut dir = RawEntry::new();
        dir.set_filetype(FileType::Directory);
        dir.set_pathname_utf8("sub");
        dir.set_perm(0o755);
        let entries = read_all(write_all(TarDialect::PaxRestricted, &[(dir, &b""[..])]));
        assert_eq!(entries[0].0.pathname_utf8(), Some("sub/"));
        assert_eq!(entries[0].0.filetype(), FileType::Directory);
        assert_eq!(entries[0].0.perm(), 0o755);
    }

    #[test]
    fn test_socket_rejected() {
        let mut entry = regular("sock", 0);
        entry.set_filetype(FileType::Socket);
        let mut writer = TarWriter::new(Box::new(SharedSink::default()), TarDialect::Gnu);
        assert!(writer.write_header(&entry).is_err());
    }

    #[test]
    fn test_pax_subsecond_mtime() {
        let mut entry = regular("t", 0);
        entry.set_mtime(1_700_000_000, 250_000_000);
        let entries = read_all(write_all(TarDialect::PaxInterchange, &[(entry, &b""[..])]));
        assert_eq!(entries[0].0.mtime(), 1_700_000_000);
        assert_eq!(entries[0].0.mtime_nsec(), 250_000_000);
    }

    #[test]
    fn test_pax_records() {
        let mut pax = PaxOverrides::default();
        pax.apply_records(b"12 path=abc\n18 mtime=1.000001\n11 size=42\n").unwrap();
        assert_eq!(pax.path.as_deref(), Some("abc"));
        assert_eq!(pax.mtime, Some((1, 1_000)));
        assert_eq!(pax.size, Some(42));

        assert!(PaxOverrides::default().apply_records(b"99 path=abc\n").is_err());
    }

    #[test]
    fn test_pax_size_out_of_range() {
        let mut pax = PaxOverrides::default();
        let err = pax.apply_records(b"29 size=18446744073709551615\n").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(pax.size, None);
    }

    #[test]
    fn test_huge_header_size_is_damage() {
        let mut header = Header::new_gnu();
        header.set_path("big").unwrap();
        header.set_size(u64::MAX);
        header.set_entry_type(EntryType::Regular);
        header.set_cksum();
        let mut data = header.as_bytes().to_vec();
        data.extend_from_slice(&[0u8; 1024]);

        let mut reader = reader_for(data);
        let mut entry = RawEntry::new();
        assert!(reader.next_header(&mut entry).unwrap_err().is_fatal());
    }

    #[test]
    fn test_pax_time_formatting() {
        assert_eq!(parse_pax_time("-1.5"), Some((-2, 500_000_000)));
        assert_eq!(format_pax_time(-2, 500_000_000), "-1.500000000");
        assert_eq!(parse_pax_time("42"), Some((42, 0)));
        assert_eq!(format_pax_time(42, 0), "42");
        assert_eq!(parse_pax_time("x"), None);
    }

    #[test]
    fn test_truncated_archive() {
        let mut data = write_all(TarDialect::Ustar, &[(regular("a", 600), &[7u8; 600][..])]);
        data.truncate(700);
        let mut reader = reader_for(data);
        let mut entry = RawEntry::new();
        assert!(reader.next_header(&mut entry).unwrap());
        let mut buf = vec![0u8; 600];
        let first = reader.read_data(&mut buf).unwrap();
        assert!(first <= 188);
        let mut result = Ok(first);
        while let Ok(n) = result {
            if n == 0 {
                break;
            }
            result = reader.read_data(&mut buf);
        }
        assert!(result.is_err());
    }
}
