//! Permission round-trip tests.

use archivum::{
    Entry, FileType, Permissions, Reader, ReaderError, SupportedFilter, SupportedFormat, Writer,
    WriterError,
};
use tempfile::TempDir;

fn all_combinations() -> Vec<Permissions> {
    let mut combinations = vec![Permissions::empty()];
    for flag in Permissions::FLAGS {
        let next: Vec<Permissions> = combinations.iter().map(|c| *c | flag).collect();
        combinations.extend(next);
    }
    combinations
}

#[test]
fn test_combination_count() {
    let combinations = all_combinations();
    assert_eq!(combinations.len(), 512);
    let mut modes: Vec<u32> = combinations.iter().map(|p| p.to_mode()).collect();
    modes.sort_unstable();
    modes.dedup();
    assert_eq!(modes.len(), 512);
}

fn roundtrip_permissions(format: SupportedFormat, file_name: &str) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(file_name);

    {
        let mut writer = Writer::new(&path, format, SupportedFilter::None);
        assert_eq!(writer.error(), WriterError::None);
        assert!(writer.add_directory("./"));

        for permissions in all_combinations() {
            let label = format!("{:04x}", permissions.bits());
            let mut entry = Entry::new();
            entry.set_file_type(FileType::Regular);
            entry.set_path_name(&format!("./file.{label}.bin"));
            entry.set_size(label.len() as i64);
            entry.set_permissions(permissions);

            assert!(writer.write_header(&entry));
            assert!(writer.write_data(label.as_bytes()));
        }
        assert_eq!(writer.file_count(), 513);
    }

    let reader = Reader::new(&path);
    assert_eq!(reader.error(), ReaderError::None);

    let mut seen = 0;
    let mut iter = reader.iterator();
    loop {
        let actual = match iter.next_entry() {
            Some(entry) if entry.file_type() == FileType::Regular => {
                assert_eq!(entry.size(), Some(4));
                entry.permissions().expect("permissions are stored")
            }
            Some(_) => continue,
            None => break,
        };
        let data = iter.read_data(None);
        let label = std::str::from_utf8(&data).unwrap();
        let expected = Permissions::from_bits_truncate(u16::from_str_radix(label, 16).unwrap());
        assert_eq!(actual, expected, "entry {label}");
        seen += 1;
    }
    assert_eq!(seen, 512);
}

#[test]
fn test_tar_keeps_every_combination() {
    roundtrip_permissions(SupportedFormat::Tar, "permissions.tar");
}

#[test]
fn test_zip_keeps_every_combination() {
    roundtrip_permissions(SupportedFormat::Zip, "permissions.zip");
}

#[test]
fn test_default_permissions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("defaults.tar");
    {
        let mut writer = Writer::new(&path, SupportedFormat::TarUstar, SupportedFilter::None);
        assert!(writer.add_directory("dir"));
        assert!(writer.add_bytes("dir/file", b"x"));
    }

    let reader = Reader::new(&path);
    let mut iter = reader.iterator();
    let dir_perms = iter.next_entry().and_then(|e| e.permissions());
    assert_eq!(dir_perms.map(|p| p.to_mode()), Some(0o755));
    let file_perms = iter.next_entry().and_then(|e| e.permissions());
    assert_eq!(file_perms.map(|p| p.to_mode()), Some(0o644));
}

#[cfg(unix)]
#[test]
fn test_add_path_keeps_disk_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("script.sh");
    std::fs::write(&file, b"#!/bin/sh\n").unwrap();
    std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o751)).unwrap();

    let path = dir.path().join("disk.tar");
    {
        let mut writer = Writer::new(&path, SupportedFormat::TarUstar, SupportedFilter::None);
        assert!(writer.add_path("bin/script.sh", &file));
    }

    let reader = Reader::new(&path);
    let mut iter = reader.iterator();
    let entry = iter.next_entry().expect("one entry");
    assert_eq!(entry.path_name().as_deref(), Some("bin/script.sh"));
    assert_eq!(entry.permissions().map(|p| p.to_mode()), Some(0o751));
    assert!(entry.modification_time().is_some());
}
