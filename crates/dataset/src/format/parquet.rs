// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{FileDataFragment, FileFormat, projection_indices, require_uncompressed};
use crate::error::{Error, Result};
use crate::file_source::FileSource;
use crate::scan::{RecordBatchIterator, ScanContext, ScanOptions, ScanTask, ScanTaskIterator};
use ::parquet::arrow::ProjectionMask;
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use arrow_schema::SchemaRef;
use bytes::Bytes;
use std::sync::Arc;

const PARQUET_MAGIC: &[u8] = b"PAR1";

/// Apache Parquet files, one scan task per row group
#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetFileFormat;

impl ParquetFileFormat {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn builder(data: Bytes) -> Result<ParquetRecordBatchReaderBuilder<Bytes>> {
        Ok(ParquetRecordBatchReaderBuilder::try_new(data)?)
    }
}

impl FileFormat for ParquetFileFormat {
    fn type_name(&self) -> &str {
        "parquet"
    }

    fn is_supported(&self, source: &FileSource) -> Result<bool> {
        if require_uncompressed(self.type_name(), source).is_err() {
            return Ok(false);
        }
        Ok(source.read_prefix(PARQUET_MAGIC.len())? == PARQUET_MAGIC)
    }

    fn inspect(&self, source: &FileSource) -> Result<SchemaRef> {
        require_uncompressed(self.type_name(), source)?;
        let builder = Self::builder(source.read_all()?)?;
        Ok(Arc::clone(builder.schema()))
    }

    fn scan_file(
        &self,
        source: &FileSource,
        options: Arc<ScanOptions>,
        _context: Arc<ScanContext>,
    ) -> Result<ScanTaskIterator> {
        require_uncompressed(self.type_name(), source)?;
        let data = source.read_all()?;
        let builder = Self::builder(data.clone())?;
        let projection = projection_indices(builder.schema(), options.projection.as_deref())?;
        let row_groups = builder.metadata().num_row_groups();
        diagnostics::log_debug!(
            "scanning parquet {source} with {row_groups} row groups",
            source: source.describe(),
            row_groups: row_groups
        );

        let batch_size = options.batch_size.max(1);
        Ok(Box::new((0..row_groups).map(move |row_group| {
            let task: Box<dyn ScanTask> = Box::new(ParquetScanTask {
                data: data.clone(),
                row_group,
                projection: projection.clone(),
                batch_size,
            });
            Ok(task)
        })))
    }

    fn make_fragment(
        self: Arc<Self>,
        source: FileSource,
        options: Arc<ScanOptions>,
    ) -> Result<FileDataFragment> {
        Ok(FileDataFragment::new(source, self, options))
    }
}

struct ParquetScanTask {
    data: Bytes,
    row_group: usize,
    projection: Option<Vec<usize>>,
    batch_size: usize,
}

impl ScanTask for ParquetScanTask {
    fn execute(&self) -> Result<RecordBatchIterator> {
        let mut builder = ParquetFileFormat::builder(self.data.clone())?
            .with_row_groups(vec![self.row_group])
            .with_batch_size(self.batch_size);
        if let Some(indices) = &self.projection {
            let mask = ProjectionMask::roots(builder.parquet_schema(), indices.iter().copied());
            builder = builder.with_projection(mask);
        }
        let reader = builder.build()?;
        Ok(Box::new(reader.map(|batch| batch.map_err(Error::from))))
    }
}
