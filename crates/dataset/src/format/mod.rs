// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File formats and the fragments they scan

mod ipc;
mod parquet;

pub use self::ipc::IpcFileFormat;
pub use self::parquet::ParquetFileFormat;

use crate::error::{Error, Result};
use crate::expression::trivial;
use crate::file_source::{Compression, FileSource};
use crate::scan::{ScanContext, ScanOptions, ScanTaskIterator};
use arrow_schema::SchemaRef;
use datafusion::logical_expr::Expr;
use std::fmt::Debug;
use std::sync::Arc;

/// Capability interface for one on-disk format
///
/// Implementations own every side effect; callers only pass sources through.
pub trait FileFormat: Send + Sync + Debug {
    fn type_name(&self) -> &str;

    /// Whether `source` looks like this format; may read a short prefix
    fn is_supported(&self, source: &FileSource) -> Result<bool>;

    fn inspect(&self, source: &FileSource) -> Result<SchemaRef>;

    fn scan_file(
        &self,
        source: &FileSource,
        options: Arc<ScanOptions>,
        context: Arc<ScanContext>,
    ) -> Result<ScanTaskIterator>;

    fn make_fragment(
        self: Arc<Self>,
        source: FileSource,
        options: Arc<ScanOptions>,
    ) -> Result<FileDataFragment>;
}

pub type FileFormatRef = Arc<dyn FileFormat>;

/// One file's worth of data under a format and scan options
#[derive(Debug, Clone)]
pub struct FileDataFragment {
    source: FileSource,
    format: FileFormatRef,
    scan_options: Arc<ScanOptions>,
    partition_expression: Expr,
}

impl FileDataFragment {
    pub fn new(source: FileSource, format: FileFormatRef, scan_options: Arc<ScanOptions>) -> Self {
        Self {
            source,
            format,
            scan_options,
            partition_expression: trivial(),
        }
    }

    #[must_use]
    pub fn with_partition_expression(mut self, expression: Expr) -> Self {
        self.partition_expression = expression;
        self
    }

    #[must_use]
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    #[must_use]
    pub fn format(&self) -> &FileFormatRef {
        &self.format
    }

    #[must_use]
    pub fn scan_options(&self) -> &Arc<ScanOptions> {
        &self.scan_options
    }

    /// Predicate every row of this fragment satisfies
    #[must_use]
    pub fn partition_expression(&self) -> &Expr {
        &self.partition_expression
    }

    /// Scan the file; nothing is cached between calls
    pub fn scan(&self, context: Arc<ScanContext>) -> Result<ScanTaskIterator> {
        self.format
            .scan_file(&self.source, Arc::clone(&self.scan_options), context)
    }
}

/// Reject sources the built-in decoders cannot read directly
pub(crate) fn require_uncompressed(format: &str, source: &FileSource) -> Result<()> {
    match source.compression() {
        Compression::Uncompressed => Ok(()),
        other => Err(Error::not_implemented(format!(
            "{format} format cannot read {other} compressed source {}",
            source.describe()
        ))),
    }
}

/// Resolve projected column names to indices in `schema`
pub(crate) fn projection_indices(
    schema: &SchemaRef,
    projection: Option<&[String]>,
) -> Result<Option<Vec<usize>>> {
    let Some(columns) = projection else {
        return Ok(None);
    };
    columns
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| Error::invalid(format!("projected column '{name}' not in schema")))
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}
