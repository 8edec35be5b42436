// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::ErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur while listing or opening files
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    NotFound(String),
    NotAFile(String),
    NotADirectory(String),
    AlreadyExists(String),

    /// Path escapes the filesystem root or contains an unusable component
    InvalidPath(String),

    /// Host I/O failure, kept as kind + message so the error stays comparable
    Io {
        path: String,
        kind: ErrorKind,
        message: String,
    },
}

impl Error {
    pub fn not_found<S: AsRef<str>>(path: S) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn not_a_file<S: AsRef<str>>(path: S) -> Self {
        Error::NotAFile(path.as_ref().to_string())
    }

    pub fn not_a_directory<S: AsRef<str>>(path: S) -> Self {
        Error::NotADirectory(path.as_ref().to_string())
    }

    pub fn already_exists<S: AsRef<str>>(path: S) -> Self {
        Error::AlreadyExists(path.as_ref().to_string())
    }

    pub fn invalid_path<S: AsRef<str>>(path: S) -> Self {
        Error::InvalidPath(path.as_ref().to_string())
    }

    /// Wrap a host I/O error; `NotFound` is mapped onto [`Error::NotFound`]
    pub fn io<S: AsRef<str>>(path: S, err: std::io::Error) -> Self {
        if err.kind() == ErrorKind::NotFound {
            return Error::not_found(path);
        }
        Error::Io {
            path: path.as_ref().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "Path not found: {}", path),
            Error::NotAFile(path) => write!(f, "Not a file: {}", path),
            Error::NotADirectory(path) => write!(f, "Not a directory: {}", path),
            Error::AlreadyExists(path) => write!(f, "Entry already exists: {}", path),
            Error::InvalidPath(path) => write!(f, "Invalid path: {}", path),
            Error::Io { path, message, .. } => write!(f, "I/O error on {}: {}", path, message),
        }
    }
}

impl std::error::Error for Error {}
