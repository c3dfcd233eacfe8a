//! Round-trip integration tests.
//!
//! This file focuses on:
//! - Payloads of awkward sizes in every tar dialect
//! - Unicode path names
//! - Modification times per format
//! - Raw streams
//! - Copying entries between archives

mod common;

use archivum::{
    Entry, FileType, Reader, ReaderError, SupportedFilter, SupportedFormat, Timestamp, Writer,
    WriterError,
};
use tempfile::TempDir;

const TAR_DIALECTS: [SupportedFormat; 5] = [
    SupportedFormat::Tar,
    SupportedFormat::TarUstar,
    SupportedFormat::TarPaxInterchange,
    SupportedFormat::TarPaxRestricted,
    SupportedFormat::TarGnu,
];

#[test]
fn test_tar_random_payloads() {
    let dir = TempDir::new().unwrap();
    let sizes = [0usize, 1, 511, 512, 513, 10_240, 100_003];
    let payloads: Vec<Vec<u8>> = sizes
        .iter()
        .enumerate()
        .map(|(i, &len)| common::random_bytes(len, i as u64))
        .collect();
    let names: Vec<String> = sizes.iter().map(|len| format!("data/{len}.bin")).collect();
    let entries: Vec<(&str, &[u8])> = names
        .iter()
        .zip(&payloads)
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();

    for format in TAR_DIALECTS {
        let path = dir.path().join(format!("{:?}.tar", format));
        let error = common::write_archive(&path, format, &[SupportedFilter::None], &entries);
        assert_eq!(error, WriterError::None, "{format}");
        common::verify_archive_contents(&path, &entries);
    }
}

#[test]
fn test_tar_is_block_aligned() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.tar");
    common::write_archive(
        &path,
        SupportedFormat::TarUstar,
        &[SupportedFilter::None],
        &[("a", &b"abc"[..])],
    );
    let len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(len % 10_240, 0);
}

#[test]
fn test_long_names() {
    let dir = TempDir::new().unwrap();
    let long = format!("{}/{}.txt", "d".repeat(120), "n".repeat(150));
    for format in [
        SupportedFormat::TarPaxRestricted,
        SupportedFormat::TarPaxInterchange,
        SupportedFormat::TarGnu,
    ] {
        let path = dir.path().join(format!("{:?}.tar", format));
        let entries = [(long.as_str(), &b"long"[..])];
        common::write_archive(&path, format, &[SupportedFilter::None], &entries);
        common::verify_archive_contents(&path, &entries);
    }
}

#[test]
fn test_zip_unicode_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unicode.zip");
    let name = "Wunderschöner Name mit ß und ü.txt";

    let mut writer = Writer::new(&path, SupportedFormat::Zip, SupportedFilter::None);
    assert_eq!(writer.error(), WriterError::None);
    assert!(writer.add_bytes(name, b"Testdaten"));
    writer.close();
    assert_eq!(writer.error(), WriterError::None);

    let mut reader = Reader::new(&path);
    assert_eq!(reader.error(), ReaderError::None);
    assert_eq!(reader.file_count(), 1);

    let mut iter = reader.iterator();
    let entry = iter.next_entry().expect("one entry");
    assert!(entry.is_valid());
    assert_eq!(entry.clean_path_name().as_deref(), Some(name));
    assert_eq!(entry.size(), Some(9));
}

#[test]
fn test_tar_unicode_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unicode.tar");
    let entries = [("Ünïcödé/日本語.txt", &b"x"[..])];
    common::write_archive(&path, SupportedFormat::Tar, &[SupportedFilter::None], &entries);
    common::verify_archive_contents(&path, &entries);
}

fn mtime_after_roundtrip(format: SupportedFormat, time: Timestamp) -> Option<Timestamp> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("times");
    {
        let mut writer = Writer::new(&path, format, SupportedFilter::None);
        let mut entry = Entry::new();
        entry.set_file_type(FileType::Regular);
        entry.set_path_name("test.txt");
        entry.set_size(9);
        entry.set_modification_time(time);
        assert!(writer.write_header(&entry));
        assert!(writer.write_data(b"test data"));
    }
    let reader = Reader::with_support(&path, &[SupportedFormat::All], &[SupportedFilter::All]);
    assert_eq!(reader.error(), ReaderError::None);
    let mut iter = reader.iterator();
    iter.next_entry().and_then(|entry| entry.modification_time())
}

#[test]
fn test_zip_timestamps_even_seconds() {
    let time = Timestamp::from_unix_secs(1_700_000_000);
    assert_eq!(mtime_after_roundtrip(SupportedFormat::Zip, time), Some(time));
}

#[test]
fn test_zip_timestamps_two_second_resolution() {
    let time = Timestamp::from_unix_millis(1_700_000_001_500);
    assert_eq!(
        mtime_after_roundtrip(SupportedFormat::Zip, time),
        Some(Timestamp::from_unix_secs(1_700_000_000))
    );
}

#[test]
fn test_tar_timestamps() {
    let time = Timestamp::from_unix_millis(1_700_000_000_123);
    assert_eq!(
        mtime_after_roundtrip(SupportedFormat::TarUstar, time),
        Some(time.truncated_to_secs())
    );
    assert_eq!(
        mtime_after_roundtrip(SupportedFormat::TarPaxInterchange, time),
        Some(time)
    );
}

#[cfg(feature = "gzip")]
#[test]
fn test_raw_stream() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("payload.gz");
    let payload = common::random_bytes(50_000, 7);
    let error = common::write_archive(
        &path,
        SupportedFormat::Raw,
        &[SupportedFilter::Gzip],
        &[("ignored", payload.as_slice())],
    );
    assert_eq!(error, WriterError::None);

    let reader = Reader::with_support(&path, &[SupportedFormat::Raw], &[SupportedFilter::All]);
    assert_eq!(reader.error(), ReaderError::None);
    let mut iter = reader.iterator();
    {
        let entry = iter.next_entry().expect("one entry");
        assert_eq!(entry.path_name().as_deref(), Some("data"));
        assert_eq!(entry.file_type(), FileType::Regular);
        assert_eq!(entry.size(), None);
    }
    // no declared size, so nothing is requested
    assert!(iter.read_data(None).is_empty());

    let mut out = Vec::new();
    assert_eq!(iter.read_data_into(&mut out).unwrap(), payload.len() as u64);
    assert_eq!(out, payload);
    assert!(iter.next_entry().is_none());
}

#[test]
fn test_raw_writer_takes_one_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("payload");
    let mut writer = Writer::new(&path, SupportedFormat::Raw, SupportedFilter::None);
    assert!(writer.add_bytes("a", b"first"));
    assert!(!writer.add_bytes("b", b"second"));
    assert_eq!(writer.error(), WriterError::CannotWriteHeader);
}

#[test]
fn test_copy_entries_between_archives() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source.tar");
    let target = dir.path().join("target.zip");
    let entries = [("a.txt", &b"alpha"[..]), ("b/c.txt", &b"gamma"[..])];
    common::write_archive(&source, SupportedFormat::TarUstar, &[SupportedFilter::None], &entries);

    let reader = Reader::new(&source);
    let mut writer = Writer::new(&target, SupportedFormat::Zip, SupportedFilter::None);
    let mut iter = reader.iterator();
    loop {
        let copied = match iter.next_entry() {
            Some(entry) => writer.write_header(&entry),
            None => break,
        };
        assert!(copied);
        let data = iter.read_data(None);
        assert!(writer.write_data(&data));
    }
    writer.close();
    assert_eq!(writer.error(), WriterError::None);
    assert_eq!(writer.file_count(), 2);

    common::verify_archive_contents(&target, &entries);
}

#[test]
fn test_empty_archives() {
    let dir = TempDir::new().unwrap();

    let tar = dir.path().join("empty.tar");
    assert_eq!(
        common::write_archive(&tar, SupportedFormat::TarUstar, &[SupportedFilter::None], &[]),
        WriterError::None
    );
    let mut reader = Reader::new(&tar);
    assert_eq!(reader.error(), ReaderError::None);
    assert_eq!(reader.file_count(), 0);

    let zero = dir.path().join("zero-length");
    std::fs::write(&zero, b"").unwrap();
    let mut reader = Reader::new(&zero);
    assert_eq!(reader.error(), ReaderError::None);
    assert_eq!(reader.file_count(), 0);
}
