// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::expression::trivial;
use arrow_array::RecordBatch;
use datafusion::logical_expr::Expr;

/// Default number of rows per produced batch
pub const DEFAULT_BATCH_SIZE: usize = 1 << 15;

/// Lazy sequence of record batches produced by one scan task
pub type RecordBatchIterator = Box<dyn Iterator<Item = Result<RecordBatch>> + Send>;

/// Lazy sequence of scan tasks produced by scanning one fragment
pub type ScanTaskIterator = Box<dyn Iterator<Item = Result<Box<dyn ScanTask>>> + Send>;

/// Caller-side options for a scan
///
/// `filter` drives partition pruning; it is not applied to rows here.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub filter: Expr,
    pub projection: Option<Vec<String>>,
    pub batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            filter: trivial(),
            projection: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ScanOptions {
    #[must_use]
    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_projection<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Execution context shared by the tasks of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanContext {
    pub use_threads: bool,
}

/// One independently executable unit of a scan
pub trait ScanTask: Send {
    fn execute(&self) -> Result<RecordBatchIterator>;
}

/// A task over batches that are already in memory
#[derive(Debug, Clone)]
pub struct InMemoryScanTask {
    batches: Vec<RecordBatch>,
}

impl InMemoryScanTask {
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }
}

impl ScanTask for InMemoryScanTask {
    fn execute(&self) -> Result<RecordBatchIterator> {
        Ok(Box::new(self.batches.clone().into_iter().map(Ok)))
    }
}

/// Execute every task in order and collect all batches
pub fn collect_batches(tasks: ScanTaskIterator) -> Result<Vec<RecordBatch>> {
    let mut batches = Vec::new();
    for task in tasks {
        for batch in task?.execute()? {
            batches.push(batch?);
        }
    }
    Ok(batches)
}
