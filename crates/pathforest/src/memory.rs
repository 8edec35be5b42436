// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory filesystem
//!
//! Files are `Bytes` keyed by normalized path. Directories exist either
//! explicitly (via [`MemoryFileSystem::create_dir`]) or implicitly as the
//! ancestors of a file. Used by tests and for datasets assembled in memory.

use crate::error::{Error, Result};
use crate::filesystem::{FileSystem, RandomAccessFile};
use crate::path::{dirname, is_ancestor, normalize_abstract_path, split_abstract_path};
use crate::stats::{FileSelector, FileStats};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
struct Entries {
    files: BTreeMap<String, Bytes>,
    dirs: BTreeSet<String>,
}

impl Entries {
    fn is_dir(&self, path: &str) -> bool {
        path.is_empty()
            || self.dirs.contains(path)
            || self.files.keys().any(|f| is_ancestor(path, f))
    }

    /// Every directory, explicit or implied by a file
    fn all_dirs(&self) -> BTreeSet<String> {
        let mut dirs = self.dirs.clone();
        for path in self.files.keys().chain(self.dirs.iter()) {
            let mut parent = dirname(path);
            while !parent.is_empty() {
                let next = dirname(&parent);
                let _ = dirs.insert(parent);
                parent = next;
            }
        }
        dirs
    }
}

#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    entries: RwLock<Entries>,
}

impl MemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file
    pub fn create_file<S: AsRef<str>, B: Into<Bytes>>(&self, path: S, content: B) -> Result<()> {
        let path = normalize_abstract_path(path.as_ref());
        if path.is_empty() {
            return Err(Error::invalid_path(path));
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.is_dir(&path) {
            return Err(Error::already_exists(path));
        }
        if let Some(ancestor) = split_abstract_path(&path)
            .iter()
            .scan(String::new(), |prefix, segment| {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(segment);
                Some(prefix.clone())
            })
            .find(|prefix| *prefix != path && entries.files.contains_key(prefix))
        {
            return Err(Error::not_a_directory(ancestor));
        }
        let _ = entries.files.insert(path, content.into());
        Ok(())
    }

    /// Create a directory (and, implicitly, its ancestors)
    pub fn create_dir<S: AsRef<str>>(&self, path: S) -> Result<()> {
        let path = normalize_abstract_path(path.as_ref());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.files.contains_key(&path) {
            return Err(Error::already_exists(path));
        }
        if !path.is_empty() {
            let _ = entries.dirs.insert(path);
        }
        Ok(())
    }
}

impl FileSystem for MemoryFileSystem {
    fn type_name(&self) -> &str {
        "memory"
    }

    fn get_target_stats(&self, selector: &FileSelector) -> Result<Vec<FileStats>> {
        let base = normalize_abstract_path(&selector.base_dir);
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        if entries.files.contains_key(&base) {
            return Err(Error::not_a_directory(base));
        }
        if !entries.is_dir(&base) {
            if selector.allow_not_found {
                return Ok(Vec::new());
            }
            return Err(Error::not_found(base));
        }

        let depth = split_abstract_path(&base).len();
        let selected = |path: &str| {
            is_ancestor(&base, path)
                && (selector.recursive || split_abstract_path(path).len() == depth + 1)
        };

        let mut out: Vec<FileStats> = entries
            .all_dirs()
            .into_iter()
            .filter(|d| selected(d.as_str()))
            .map(FileStats::dir)
            .collect();
        out.extend(
            entries
                .files
                .iter()
                .filter(|(f, _)| selected(f.as_str()))
                .map(|(f, content)| FileStats::file(f, content.len() as u64)),
        );
        out.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(out)
    }

    fn get_file_stats(&self, paths: &[String]) -> Result<Vec<FileStats>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        paths
            .iter()
            .map(|p| {
                let path = normalize_abstract_path(p);
                if let Some(content) = entries.files.get(&path) {
                    Ok(FileStats::file(path, content.len() as u64))
                } else if !path.is_empty() && entries.is_dir(&path) {
                    Ok(FileStats::dir(path))
                } else {
                    Err(Error::not_found(path))
                }
            })
            .collect()
    }

    fn open_input_file(&self, path: &str) -> Result<Box<dyn RandomAccessFile>> {
        let path = normalize_abstract_path(path);
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.files.get(&path) {
            Some(content) => Ok(Box::new(Cursor::new(content.clone()))),
            None if entries.is_dir(&path) => Err(Error::not_a_file(path)),
            None => Err(Error::not_found(path)),
        }
    }
}
