//! Archive path normalisation.
//!
//! Archives store member names verbatim, so the same file can appear as
//! `./dir//file.txt`, `dir/file.txt` or `dir/sub/../file.txt`. [`clean_path`]
//! folds those spellings into one canonical form, which is what entry lookups
//! compare against.

/// Returns the canonical form of a `/`-separated path.
///
/// - redundant separators are collapsed (`a//b` → `a/b`)
/// - `.` segments are dropped (`./a` → `a`)
/// - `..` removes the preceding segment (`a/b/../c` → `a/c`); leading `..`
///   segments of a relative path are kept, while `..` directly under the root
///   of an absolute path is dropped
/// - a trailing separator is removed unless the path is the root
/// - a relative path that cleans to nothing becomes `.`
///
/// The empty string stays empty. Cleaning is idempotent.
///
/// # Example
///
/// ```rust
/// use archivum::archive_path::clean_path;
///
/// assert_eq!(clean_path("./dir//sub/../file.txt"), "dir/file.txt");
/// assert_eq!(clean_path("dir/"), "dir");
/// assert_eq!(clean_path("./"), ".");
/// assert_eq!(clean_path("/../etc"), "/etc");
/// ```
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            name => segments.push(name),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Returns true if `path` is already in canonical form.
pub fn is_clean(path: &str) -> bool {
    clean_path(path) == path
}
