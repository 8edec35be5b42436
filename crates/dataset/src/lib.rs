// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Partitioned dataset discovery and filtering
//!
//! Directory layouts become partition predicates, and files become fragments
//! annotated with them so a scan planner can skip what a query cannot match.

mod data_source;
mod discovery;
mod error;
pub mod expression;
mod factory;
mod file_source;
mod filesystem_source;
pub mod format;
mod partition;
pub mod prune;
pub mod scan;

#[cfg(test)]
mod testing;

pub use data_source::{DataSource, DataSourceRef, FragmentIterator, TreeDataSource};
pub use discovery::{
    HivePartitionSchemeDiscovery, PartitionSchemeDiscovery, PartitionSchemeOrDiscovery,
    SchemaPartitionSchemeDiscovery,
};
pub use error::{Error, Result};
pub use expression::ExpressionVector;
pub use factory::{FileSystemDataSourceDiscovery, FileSystemDiscoveryOptions, PartitioningConfig};
pub use file_source::{Compression, FileSource, SourceType};
pub use filesystem_source::FileSystemDataSource;
pub use format::{FileDataFragment, FileFormat, FileFormatRef, IpcFileFormat, ParquetFileFormat};
pub use partition::{
    FunctionPartitionScheme, HivePartitionScheme, Key, PartitionKeys, PartitionScheme,
    SchemaPartitionScheme, SegmentDictionaryPartitionScheme, SegmentParser, convert_key,
};
pub use scan::{ScanContext, ScanOptions, ScanTask, ScanTaskIterator};
