// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::path::normalize_abstract_path;

/// Kind of a discovered filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    File,
    Directory,
}

impl FileType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::File => "file",
            FileType::Directory => "directory",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discovered file or directory, identified by its abstract path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    path: String,
    file_type: FileType,
    size: Option<u64>,
}

impl FileStats {
    /// A file entry; the path is normalized
    pub fn file<S: AsRef<str>>(path: S, size: u64) -> Self {
        Self {
            path: normalize_abstract_path(path.as_ref()),
            file_type: FileType::File,
            size: Some(size),
        }
    }

    /// A directory entry; the path is normalized
    pub fn dir<S: AsRef<str>>(path: S) -> Self {
        Self {
            path: normalize_abstract_path(path.as_ref()),
            file_type: FileType::Directory,
            size: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Describes which entries a listing should return
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSelector {
    /// Directory to list, as an abstract path
    pub base_dir: String,
    /// Descend into subdirectories
    pub recursive: bool,
    /// A missing base directory yields an empty listing instead of an error
    pub allow_not_found: bool,
}

impl FileSelector {
    pub fn new<S: AsRef<str>>(base_dir: S) -> Self {
        Self {
            base_dir: normalize_abstract_path(base_dir.as_ref()),
            recursive: false,
            allow_not_found: false,
        }
    }

    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn allow_not_found(mut self, allow: bool) -> Self {
        self.allow_not_found = allow;
        self
    }
}
