// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Pathforest: abstract paths, file listings and the forest built over them
//!
//! This crate is the filesystem side of dataset discovery. It lists files
//! through the [`FileSystem`] trait, describes them with [`FileStats`], and
//! arranges a listing into a [`PathForest`] that data sources walk when
//! producing fragments.

mod error;
mod filesystem;
mod forest;
mod local;
mod memory;
pub mod path;
mod stats;

pub use error::{Error, Result};
pub use filesystem::{FileSystem, FileSystemRef, RandomAccessFile, same_filesystem};
pub use forest::PathForest;
pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
pub use path::split_abstract_path;
pub use stats::{FileSelector, FileStats, FileType};
