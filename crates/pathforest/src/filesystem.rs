// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::stats::{FileSelector, FileStats};
use std::io::{Read, Seek};
use std::sync::Arc;

/// A byte-range reader over one file
pub trait RandomAccessFile: Read + Seek + Send {}

impl<T: Read + Seek + Send> RandomAccessFile for T {}

/// Listing and opening files addressed by abstract paths
///
/// Implementations are shared behind `Arc` and must tolerate concurrent
/// readers. Listing results are fully materialized before they are returned.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Name identifying the kind of filesystem
    fn type_name(&self) -> &str;

    /// List the entries selected by `selector`, excluding the base directory itself
    fn get_target_stats(&self, selector: &FileSelector) -> Result<Vec<FileStats>>;

    /// Stats for specific paths; missing paths are an error
    fn get_file_stats(&self, paths: &[String]) -> Result<Vec<FileStats>>;

    /// Open a file for random-access reading
    fn open_input_file(&self, path: &str) -> Result<Box<dyn RandomAccessFile>>;
}

pub type FileSystemRef = Arc<dyn FileSystem>;

/// Identity comparison for shared filesystem handles
#[must_use]
pub fn same_filesystem(a: &FileSystemRef, b: &FileSystemRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
