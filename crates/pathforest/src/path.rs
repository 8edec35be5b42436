// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Abstract, slash-delimited paths
//!
//! Paths handed to partition schemes and stored in [`crate::FileStats`] are
//! plain strings using `/` as separator regardless of host platform. Empty
//! segments (leading, trailing or doubled separators) never count.

pub const SEPARATOR: char = '/';

/// Split a path into its non-empty segments, left to right
#[must_use]
pub fn split_abstract_path(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Join segments with the separator; no leading separator is added
#[must_use]
pub fn join_abstract_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(SEPARATOR);
        }
        out.push_str(segment);
    }
    out
}

/// Canonical form: segments joined without leading or trailing separators
#[must_use]
pub fn normalize_abstract_path(path: &str) -> String {
    join_abstract_path(split_abstract_path(path))
}

/// Extracts the final segment of a path, if any
#[must_use]
pub fn basename(path: &str) -> Option<&str> {
    split_abstract_path(path).pop()
}

/// Everything but the final segment, in canonical form
#[must_use]
pub fn dirname(path: &str) -> String {
    let mut segments = split_abstract_path(path);
    let _ = segments.pop();
    join_abstract_path(segments)
}

/// True when `ancestor`'s segments are a strict prefix of `path`'s segments
#[must_use]
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    let ancestor = split_abstract_path(ancestor);
    let path = split_abstract_path(path);
    ancestor.len() < path.len() && path.starts_with(&ancestor)
}

/// Remove a base directory from a path, segment-wise
///
/// Returns `None` when `path` is not located under `base`. An empty base
/// leaves the path unchanged apart from normalization.
#[must_use]
pub fn strip_base(path: &str, base: &str) -> Option<String> {
    let base = split_abstract_path(base);
    let path = split_abstract_path(path);
    if !path.starts_with(&base) {
        return None;
    }
    Some(join_abstract_path(&path[base.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_abstract_path() {
        assert_eq!(split_abstract_path("/2009/11"), vec!["2009", "11"]);
        assert_eq!(split_abstract_path("a//b/"), vec!["a", "b"]);
        assert!(split_abstract_path("").is_empty());
        assert!(split_abstract_path("/").is_empty());
        assert_eq!(
            split_abstract_path("day=321/ignored=3.4/year=2009"),
            vec!["day=321", "ignored=3.4", "year=2009"]
        );
    }

    #[test]
    fn test_join_and_normalize() {
        assert_eq!(join_abstract_path(["a", "", "b"]), "a/b");
        assert_eq!(normalize_abstract_path("/a/b/"), "a/b");
        assert_eq!(normalize_abstract_path("//"), "");
    }

    #[test]
    fn test_basename_dirname() {
        assert_eq!(basename("/path/to/file.parquet"), Some("file.parquet"));
        assert_eq!(basename("/path/to/dir/"), Some("dir"));
        assert_eq!(basename("/"), None);

        assert_eq!(dirname("/path/to/file.parquet"), "path/to");
        assert_eq!(dirname("file.parquet"), "");
    }

    #[test]
    fn test_is_ancestor() {
        assert!(is_ancestor("a", "a/b"));
        assert!(is_ancestor("", "a"));
        assert!(!is_ancestor("a", "a"));
        assert!(!is_ancestor("a", "ab/c"));
    }

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("/data/year=2009/f", "/data"), Some("year=2009/f".to_string()));
        assert_eq!(strip_base("data/x", ""), Some("data/x".to_string()));
        assert_eq!(strip_base("other/x", "data"), None);
        // Segment-wise, not string-wise
        assert_eq!(strip_base("database/x", "data"), None);
    }
}
