//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::Path;

use archivum::{Reader, SupportedFilter, SupportedFormat, Writer, WriterError};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Deterministic pseudo-random payload.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

/// Writes `entries` as regular files with default permissions and returns
/// the writer's final error.
pub fn write_archive(
    path: &Path,
    format: SupportedFormat,
    filters: &[SupportedFilter],
    entries: &[(&str, &[u8])],
) -> WriterError {
    let mut writer = Writer::with_filters(path, format, filters);
    for (name, data) in entries {
        writer.add_bytes(name, data);
    }
    writer.close();
    writer.error()
}

/// Reads every entry as (clean path, payload).
pub fn read_archive(reader: &Reader) -> Vec<(String, Vec<u8>)> {
    let mut entries = Vec::new();
    let mut iter = reader.iterator();
    while let Some(entry) = iter.next_entry() {
        let name = entry.clean_path_name().unwrap_or_default();
        entries.push((name, iter.read_data(None)));
    }
    entries
}

/// Asserts that `path` holds exactly `expected`, in order.
pub fn verify_archive_contents(path: &Path, expected: &[(&str, &[u8])]) {
    let reader = Reader::new(path);
    assert_eq!(reader.error(), archivum::ReaderError::None);
    let actual = read_archive(&reader);
    assert_eq!(actual.len(), expected.len(), "entry count of {}", path.display());
    for ((name, data), (expected_name, expected_data)) in actual.iter().zip(expected) {
        assert_eq!(name, expected_name);
        assert_eq!(data.as_slice(), *expected_data, "payload of {name}");
    }
}

/// Filters compiled into this build, `None` included.
pub fn available_filters() -> Vec<SupportedFilter> {
    let mut filters = vec![SupportedFilter::None];
    if cfg!(feature = "gzip") {
        filters.push(SupportedFilter::Gzip);
    }
    if cfg!(feature = "bzip2") {
        filters.push(SupportedFilter::Bzip2);
    }
    if cfg!(feature = "xz") {
        filters.push(SupportedFilter::Xz);
    }
    if cfg!(feature = "lzma") {
        filters.push(SupportedFilter::Lzma);
    }
    if cfg!(feature = "zstd") {
        filters.push(SupportedFilter::Zstd);
    }
    if cfg!(feature = "lz4") {
        filters.push(SupportedFilter::Lz4);
    }
    filters
}
