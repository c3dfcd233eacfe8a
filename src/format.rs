//! Format, filter and file type identifiers.
//!
//! The numeric values of every enum in this module are the codec engine's
//! native identifiers. They are passed to the engine unchanged, so they must
//! never be renumbered.
//!
//! Container formats are bit-packed as `family | variant`: the high bits select
//! the family (tar, cpio, zip, ...) and the low 16 bits select a variant of it.
//!
//! # Example
//!
//! ```rust
//! use archivum::SupportedFormat;
//!
//! assert_eq!(SupportedFormat::TarGnu.code(), 0x30004);
//! assert_eq!(SupportedFormat::TarGnu.family(), SupportedFormat::Tar);
//! ```

use std::fmt;

/// Mask selecting the family part of a format code.
pub const FORMAT_BASE_MASK: i32 = 0xff0000;

/// Code used by both [`SupportedFormat::All`] and [`SupportedFilter::All`].
pub const ALL_CODE: i32 = -1;

/// A container format the engine can read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedFormat {
    /// cpio family.
    Cpio,
    /// POSIX octet-oriented cpio.
    CpioPosix,
    /// Little-endian binary cpio.
    CpioBinLe,
    /// Big-endian binary cpio.
    CpioBinBe,
    /// SVR4 cpio without checksum.
    CpioSvr4Nocrc,
    /// SVR4 cpio with checksum.
    CpioSvr4Crc,
    /// afio large cpio.
    CpioAfioLarge,
    /// PWB cpio.
    CpioPwb,
    /// Shell archive family.
    Shar,
    /// Plain shell archive.
    SharBase,
    /// Shell archive with uuencoded dump.
    SharDump,
    /// tar family. Writing selects the restricted pax dialect.
    Tar,
    /// POSIX ustar.
    TarUstar,
    /// pax, always emitting extended headers.
    TarPaxInterchange,
    /// pax, emitting extended headers only when ustar cannot hold a field.
    TarPaxRestricted,
    /// GNU tar.
    TarGnu,
    /// ISO 9660 image.
    Iso9660,
    /// ISO 9660 with Rock Ridge extensions.
    Iso9660Rockridge,
    /// zip.
    Zip,
    /// Zero-length input (read only).
    Empty,
    /// ar family.
    Ar,
    /// GNU ar.
    ArGnu,
    /// BSD ar.
    ArBsd,
    /// mtree specification.
    Mtree,
    /// A single unstructured data stream.
    Raw,
    /// xar.
    Xar,
    /// LHA/LZH.
    Lha,
    /// Microsoft cabinet.
    Cab,
    /// RAR (v4 and earlier).
    Rar,
    /// 7-Zip.
    SevenZip,
    /// Web archive.
    Warc,
    /// RAR v5.
    RarV5,
    /// Wildcard: every format the engine knows.
    All,
}

impl SupportedFormat {
    /// Every concrete format, in code order.
    pub const KNOWN: [SupportedFormat; 32] = [
        Self::Cpio,
        Self::CpioPosix,
        Self::CpioBinLe,
        Self::CpioBinBe,
        Self::CpioSvr4Nocrc,
        Self::CpioSvr4Crc,
        Self::CpioAfioLarge,
        Self::CpioPwb,
        Self::Shar,
        Self::SharBase,
        Self::SharDump,
        Self::Tar,
        Self::TarUstar,
        Self::TarPaxInterchange,
        Self::TarPaxRestricted,
        Self::TarGnu,
        Self::Iso9660,
        Self::Iso9660Rockridge,
        Self::Zip,
        Self::Empty,
        Self::Ar,
        Self::ArGnu,
        Self::ArBsd,
        Self::Mtree,
        Self::Raw,
        Self::Xar,
        Self::Lha,
        Self::Cab,
        Self::Rar,
        Self::SevenZip,
        Self::Warc,
        Self::RarV5,
    ];

    /// Returns the engine's native code for this format.
    pub const fn code(self) -> i32 {
        const CPIO: i32 = 0x10000;
        const SHAR: i32 = 0x20000;
        const TAR: i32 = 0x30000;
        const ISO9660: i32 = 0x40000;
        const AR: i32 = 0x70000;
        match self {
            Self::Cpio => CPIO,
            Self::CpioPosix => CPIO | 1,
            Self::CpioBinLe => CPIO | 2,
            Self::CpioBinBe => CPIO | 3,
            Self::CpioSvr4Nocrc => CPIO | 4,
            Self::CpioSvr4Crc => CPIO | 5,
            Self::CpioAfioLarge => CPIO | 6,
            Self::CpioPwb => CPIO | 7,
            Self::Shar => SHAR,
            Self::SharBase => SHAR | 1,
            Self::SharDump => SHAR | 2,
            Self::Tar => TAR,
            Self::TarUstar => TAR | 1,
            Self::TarPaxInterchange => TAR | 2,
            Self::TarPaxRestricted => TAR | 3,
            Self::TarGnu => TAR | 4,
            Self::Iso9660 => ISO9660,
            Self::Iso9660Rockridge => ISO9660 | 1,
            Self::Zip => 0x50000,
            Self::Empty => 0x60000,
            Self::Ar => AR,
            Self::ArGnu => AR | 1,
            Self::ArBsd => AR | 2,
            Self::Mtree => 0x80000,
            Self::Raw => 0x90000,
            Self::Xar => 0xA0000,
            Self::Lha => 0xB0000,
            Self::Cab => 0xC0000,
            Self::Rar => 0xD0000,
            Self::SevenZip => 0xE0000,
            Self::Warc => 0xF0000,
            Self::RarV5 => 0x100000,
            Self::All => ALL_CODE,
        }
    }

    /// Looks up a format by its native code.
    pub fn from_code(code: i32) -> Option<Self> {
        if code == ALL_CODE {
            return Some(Self::All);
        }
        Self::KNOWN.iter().copied().find(|f| f.code() == code)
    }

    /// Returns the family this format belongs to (itself for a family code).
    pub fn family(self) -> Self {
        match self {
            Self::All => Self::All,
            other => Self::from_code(other.code() & FORMAT_BASE_MASK).unwrap_or(other),
        }
    }

    /// Returns true for the [`All`](Self::All) wildcard.
    pub fn is_wildcard(self) -> bool {
        self == Self::All
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:#x})", self, self.code())
    }
}

/// A compression or encoding filter wrapped around a container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedFilter {
    /// No filter.
    None,
    /// gzip.
    Gzip,
    /// bzip2.
    Bzip2,
    /// Unix `compress` (.Z).
    Compress,
    /// External program.
    Program,
    /// lzma-alone (.lzma).
    Lzma,
    /// xz.
    Xz,
    /// uuencode.
    Uu,
    /// RPM package wrapper.
    Rpm,
    /// lzip.
    Lzip,
    /// lrzip.
    Lrzip,
    /// lzop.
    Lzop,
    /// grzip.
    Grzip,
    /// LZ4 frame.
    Lz4,
    /// Zstandard.
    Zstd,
    /// Wildcard: every filter the engine knows.
    All,
}

impl SupportedFilter {
    /// Every concrete filter, in code order.
    pub const KNOWN: [SupportedFilter; 15] = [
        Self::None,
        Self::Gzip,
        Self::Bzip2,
        Self::Compress,
        Self::Program,
        Self::Lzma,
        Self::Xz,
        Self::Uu,
        Self::Rpm,
        Self::Lzip,
        Self::Lrzip,
        Self::Lzop,
        Self::Grzip,
        Self::Lz4,
        Self::Zstd,
    ];

    /// Returns the engine's native code for this filter.
    pub const fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Gzip => 1,
            Self::Bzip2 => 2,
            Self::Compress => 3,
            Self::Program => 4,
            Self::Lzma => 5,
            Self::Xz => 6,
            Self::Uu => 7,
            Self::Rpm => 8,
            Self::Lzip => 9,
            Self::Lrzip => 10,
            Self::Lzop => 11,
            Self::Grzip => 12,
            Self::Lz4 => 13,
            Self::Zstd => 14,
            Self::All => ALL_CODE,
        }
    }

    /// Looks up a filter by its native code.
    pub fn from_code(code: i32) -> Option<Self> {
        if code == ALL_CODE {
            return Some(Self::All);
        }
        Self::KNOWN.iter().copied().find(|f| f.code() == code)
    }

    /// Returns true for the [`All`](Self::All) wildcard.
    pub fn is_wildcard(self) -> bool {
        self == Self::All
    }
}

impl fmt::Display for SupportedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Mask selecting the file type bits of a mode.
pub const S_IFMT: u32 = 0o170000;

/// The type of an archive entry.
///
/// Values are the POSIX `S_IF*` type bits the engine stores in an entry's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link.
    SymbolicLink,
    /// Unix domain socket.
    Socket,
    /// Character device.
    CharacterDevice,
    /// Block device.
    BlockDevice,
    /// Named pipe.
    Fifo,
    /// Anything else, including "not set".
    Unknown,
}

impl FileType {
    /// Returns the `S_IF*` bits for this type, or 0 for [`Unknown`](Self::Unknown).
    pub const fn mode_bits(self) -> u32 {
        match self {
            Self::Regular => 0o100000,
            Self::Directory => 0o040000,
            Self::SymbolicLink => 0o120000,
            Self::Socket => 0o140000,
            Self::CharacterDevice => 0o020000,
            Self::BlockDevice => 0o060000,
            Self::Fifo => 0o010000,
            Self::Unknown => 0,
        }
    }

    /// Decodes the type bits of a mode. Other bits are ignored.
    pub const fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            0o100000 => Self::Regular,
            0o040000 => Self::Directory,
            0o120000 => Self::SymbolicLink,
            0o140000 => Self::Socket,
            0o020000 => Self::CharacterDevice,
            0o060000 => Self::BlockDevice,
            0o010000 => Self::Fifo,
            _ => Self::Unknown,
        }
    }
}
