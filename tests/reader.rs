//! Reader behaviour: cached counts, lookups by path, independent passes.

mod common;

use archivum::{
    FileType, Reader, ReaderError, SupportedFilter, SupportedFormat, DEFAULT_BLOCK_SIZE,
};
use tempfile::TempDir;

fn sample(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("sample.tar");
    let error = common::write_archive(
        &path,
        SupportedFormat::TarPaxRestricted,
        &[SupportedFilter::None],
        &[
            ("docs/readme.txt", &b"read me"[..]),
            ("docs/guide.txt", &b"guide"[..]),
            ("bin/tool", &b"\x7fELF"[..]),
        ],
    );
    assert_eq!(error, archivum::WriterError::None);
    path
}

#[test]
fn test_configuration_accessors() {
    let dir = TempDir::new().unwrap();
    let path = sample(&dir);
    let reader = Reader::new(&path);
    assert_eq!(reader.file_name(), path.as_path());
    assert_eq!(reader.supported_formats(), [SupportedFormat::All]);
    assert_eq!(reader.supported_filters(), [SupportedFilter::All]);
    assert_eq!(reader.block_size(), DEFAULT_BLOCK_SIZE);
}

#[test]
fn test_file_count_is_cached() {
    let dir = TempDir::new().unwrap();
    let path = sample(&dir);
    let mut reader = Reader::new(&path);
    assert_eq!(reader.file_count(), 3);

    // the archive changes on disk, but the count is kept
    common::write_archive(
        &path,
        SupportedFormat::TarUstar,
        &[SupportedFilter::None],
        &[("only", &b"1"[..])],
    );
    assert_eq!(reader.file_count(), 3);
    assert_eq!(common::read_archive(&reader).len(), 1);

    // a new reader counts again
    assert_eq!(Reader::new(&path).file_count(), 1);
}

#[test]
fn test_file_data_compares_clean_paths() {
    let dir = TempDir::new().unwrap();
    let reader = Reader::new(sample(&dir));

    assert_eq!(reader.file_data("docs/guide.txt").as_deref(), Some(&b"guide"[..]));
    assert_eq!(reader.file_data("./docs//guide.txt").as_deref(), Some(&b"guide"[..]));
    assert_eq!(reader.file_data("docs/x/../readme.txt").as_deref(), Some(&b"read me"[..]));
    assert_eq!(reader.file_data("bin/tool").as_deref(), Some(&b"\x7fELF"[..]));
    assert_eq!(reader.file_data("docs"), None);
    assert_eq!(reader.file_data("missing"), None);
}

#[test]
fn test_iterators_are_independent() {
    let dir = TempDir::new().unwrap();
    let reader = Reader::new(sample(&dir));

    let mut first = reader.iterator();
    let mut second = reader.iterator();

    let a = first.next_entry().and_then(|e| e.path_name());
    let b = first.next_entry().and_then(|e| e.path_name());
    let c = second.next_entry().and_then(|e| e.path_name());
    assert_eq!(a.as_deref(), Some("docs/readme.txt"));
    assert_eq!(b.as_deref(), Some("docs/guide.txt"));
    assert_eq!(c.as_deref(), Some("docs/readme.txt"));

    assert_eq!(second.read_data(None), b"read me");
    assert_eq!(first.read_data(None), b"guide");
}

#[test]
fn test_entry_view_follows_iterator() {
    let dir = TempDir::new().unwrap();
    let reader = Reader::new(sample(&dir));
    let mut iter = reader.iterator();
    assert!(iter.next_entry().is_some());

    let entry = iter.entry();
    assert!(entry.is_valid());
    assert!(!entry.is_owned());
    assert_eq!(entry.file_type(), FileType::Regular);
    assert_eq!(entry.size(), Some(7));
    assert_eq!(entry.clean_path_name().as_deref(), Some("docs/readme.txt"));
}

#[test]
fn test_partial_reads() {
    let dir = TempDir::new().unwrap();
    let reader = Reader::new(sample(&dir));
    let mut iter = reader.iterator();
    assert!(iter.next_entry().is_some());
    assert_eq!(iter.read_data(Some(4)), b"read");
    assert_eq!(iter.read_data(Some(100)), b" me");
    assert!(iter.read_data(Some(100)).is_empty());
    assert_eq!(iter.error(), ReaderError::None);
}

#[test]
fn test_unbound_reader() {
    let dir = TempDir::new().unwrap();
    let path = sample(&dir);

    let mut reader = Reader::unbound(&[SupportedFormat::Tar], &[SupportedFilter::None]);
    assert_eq!(reader.error(), ReaderError::None);
    assert!(reader.file_name().as_os_str().is_empty());

    assert!(reader.open(&path, 512));
    assert_eq!(reader.file_count(), 3);
    assert_eq!(reader.block_size(), 512);
    assert_eq!(reader.file_data("bin/tool").as_deref(), Some(&b"\x7fELF"[..]));
}

#[cfg(feature = "zstd")]
#[test]
fn test_compressed_zip_lookup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.zip.zst");
    common::write_archive(
        &path,
        SupportedFormat::Zip,
        &[SupportedFilter::Zstd],
        &[("a/b.txt", &b"zipped"[..])],
    );
    let mut reader = Reader::new(&path);
    assert_eq!(reader.file_count(), 1);
    assert_eq!(reader.file_data("a/b.txt").as_deref(), Some(&b"zipped"[..]));
}
