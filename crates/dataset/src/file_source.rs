// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use bytes::Bytes;
use pathforest::{FileSystemRef, RandomAccessFile, same_filesystem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Read};

/// Raw compression applied to a whole file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Uncompressed,
    Gzip,
    Zstd,
    Bz2,
    Lz4,
    Snappy,
}

impl Compression {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Uncompressed => "uncompressed",
            Compression::Gzip => "gzip",
            Compression::Zstd => "zstd",
            Compression::Bz2 => "bz2",
            Compression::Lz4 => "lz4",
            Compression::Snappy => "snappy",
        }
    }

    /// Guess the compression from a file name's final extension
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "gz" | "gzip" => Compression::Gzip,
            "zst" | "zstd" => Compression::Zstd,
            "bz2" => Compression::Bz2,
            "lz4" => Compression::Lz4,
            "snappy" | "sz" => Compression::Snappy,
            _ => Compression::Uncompressed,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Compression::Uncompressed),
            "gzip" => Ok(Compression::Gzip),
            "zstd" => Ok(Compression::Zstd),
            "bz2" => Ok(Compression::Bz2),
            "lz4" => Ok(Compression::Lz4),
            "snappy" => Ok(Compression::Snappy),
            other => Err(Error::invalid(format!("unknown compression: {other}"))),
        }
    }
}

/// Which kind of location a [`FileSource`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Path,
    Buffer,
}

#[derive(Clone)]
enum Location {
    Path {
        path: String,
        filesystem: FileSystemRef,
    },
    Buffer(Bytes),
}

/// Where a file's bytes live: a path on a filesystem, or a memory buffer
///
/// Cheap to clone; the filesystem and buffer are shared.
#[derive(Clone)]
pub struct FileSource {
    location: Location,
    compression: Compression,
}

impl FileSource {
    pub fn from_path<S: Into<String>>(path: S, filesystem: FileSystemRef) -> Self {
        Self {
            location: Location::Path {
                path: path.into(),
                filesystem,
            },
            compression: Compression::Uncompressed,
        }
    }

    pub fn from_buffer<B: Into<Bytes>>(buffer: B) -> Self {
        Self {
            location: Location::Buffer(buffer.into()),
            compression: Compression::Uncompressed,
        }
    }

    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn source_type(&self) -> SourceType {
        match self.location {
            Location::Path { .. } => SourceType::Path,
            Location::Buffer(_) => SourceType::Buffer,
        }
    }

    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// The file path; `None` for buffer sources
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match &self.location {
            Location::Path { path, .. } => Some(path.as_str()),
            Location::Buffer(_) => None,
        }
    }

    /// The filesystem holding the file; `None` for buffer sources
    #[must_use]
    pub fn filesystem(&self) -> Option<&FileSystemRef> {
        match &self.location {
            Location::Path { filesystem, .. } => Some(filesystem),
            Location::Buffer(_) => None,
        }
    }

    /// The in-memory contents; `None` for path sources
    #[must_use]
    pub fn buffer(&self) -> Option<&Bytes> {
        match &self.location {
            Location::Path { .. } => None,
            Location::Buffer(buffer) => Some(buffer),
        }
    }

    /// Open a random-access view of the (still compressed) bytes
    pub fn open(&self) -> Result<Box<dyn RandomAccessFile>> {
        match &self.location {
            Location::Path { path, filesystem } => Ok(filesystem.open_input_file(path)?),
            Location::Buffer(buffer) => Ok(Box::new(Cursor::new(buffer.clone()))),
        }
    }

    /// All bytes of the source; buffers are returned without copying
    pub fn read_all(&self) -> Result<Bytes> {
        match &self.location {
            Location::Buffer(buffer) => Ok(buffer.clone()),
            Location::Path { .. } => {
                let mut content = Vec::new();
                let _ = self.open()?.read_to_end(&mut content)?;
                Ok(Bytes::from(content))
            }
        }
    }

    /// Up to `len` leading bytes, for format sniffing
    pub fn read_prefix(&self, len: usize) -> Result<Vec<u8>> {
        let mut prefix = Vec::with_capacity(len);
        let _ = self.open()?.take(len as u64).read_to_end(&mut prefix)?;
        Ok(prefix)
    }

    /// Short human-readable name: the path, or `<Buffer>`
    #[must_use]
    pub fn describe(&self) -> &str {
        self.path().unwrap_or("<Buffer>")
    }
}

impl PartialEq for FileSource {
    fn eq(&self, other: &Self) -> bool {
        match (&self.location, &other.location) {
            (
                Location::Path { path, filesystem },
                Location::Path {
                    path: other_path,
                    filesystem: other_filesystem,
                },
            ) => path == other_path && same_filesystem(filesystem, other_filesystem),
            (Location::Buffer(a), Location::Buffer(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Location::Path { path, filesystem } => f
                .debug_struct("FileSource")
                .field("path", path)
                .field("filesystem", &filesystem.type_name())
                .field("compression", &self.compression)
                .finish(),
            Location::Buffer(buffer) => f
                .debug_struct("FileSource")
                .field("buffer_len", &buffer.len())
                .field("compression", &self.compression)
                .finish(),
        }
    }
}
