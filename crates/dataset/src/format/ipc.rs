// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{FileDataFragment, FileFormat, projection_indices, require_uncompressed};
use crate::error::{Error, Result};
use crate::file_source::FileSource;
use crate::scan::{RecordBatchIterator, ScanContext, ScanOptions, ScanTask, ScanTaskIterator};
use arrow::ipc::reader::FileReader;
use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use bytes::Bytes;
use std::io::Cursor;
use std::sync::Arc;

const ARROW_MAGIC: &[u8] = b"ARROW1";

/// Arrow IPC files, one scan task per record batch
#[derive(Debug, Clone, Copy, Default)]
pub struct IpcFileFormat;

impl IpcFileFormat {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn reader(data: Bytes, projection: Option<Vec<usize>>) -> Result<FileReader<Cursor<Bytes>>> {
        Ok(FileReader::try_new(Cursor::new(data), projection)?)
    }
}

impl FileFormat for IpcFileFormat {
    fn type_name(&self) -> &str {
        "ipc"
    }

    fn is_supported(&self, source: &FileSource) -> Result<bool> {
        if require_uncompressed(self.type_name(), source).is_err() {
            return Ok(false);
        }
        Ok(source.read_prefix(ARROW_MAGIC.len())? == ARROW_MAGIC)
    }

    fn inspect(&self, source: &FileSource) -> Result<SchemaRef> {
        require_uncompressed(self.type_name(), source)?;
        Ok(Self::reader(source.read_all()?, None)?.schema())
    }

    fn scan_file(
        &self,
        source: &FileSource,
        options: Arc<ScanOptions>,
        _context: Arc<ScanContext>,
    ) -> Result<ScanTaskIterator> {
        require_uncompressed(self.type_name(), source)?;
        let data = source.read_all()?;
        let reader = Self::reader(data.clone(), None)?;
        let projection = projection_indices(&reader.schema(), options.projection.as_deref())?;
        let num_batches = reader.num_batches();
        diagnostics::log_debug!(
            "scanning ipc {source} with {num_batches} batches",
            source: source.describe(),
            num_batches: num_batches
        );

        let batch_size = options.batch_size.max(1);
        Ok(Box::new((0..num_batches).map(move |index| {
            let task: Box<dyn ScanTask> = Box::new(IpcScanTask {
                data: data.clone(),
                index,
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

struct IpcScanTask {
    data: Bytes,
    index: usize,
    projection: Option<Vec<usize>>,
    batch_size: usize,
}

impl ScanTask for IpcScanTask {
    fn execute(&self) -> Result<RecordBatchIterator> {
        let mut reader = IpcFileFormat::reader(self.data.clone(), self.projection.clone())?;
        reader.set_index(self.index)?;
        let batch = match reader.next() {
            Some(batch) => batch?,
            None => {
                return Err(Error::invalid(format!(
                    "ipc batch {} is missing",
                    self.index
                )));
            }
        };
        Ok(Box::new(split_batch(batch, self.batch_size).into_iter().map(Ok)))
    }
}

/// Zero-copy slices of at most `batch_size` rows
fn split_batch(batch: RecordBatch, batch_size: usize) -> Vec<RecordBatch> {
    let batch_size = batch_size.max(1);
    let rows = batch.num_rows();
    if rows <= batch_size {
        return vec![batch];
    }
    (0..rows)
        .step_by(batch_size)
        .map(|offset| batch.slice(offset, batch_size.min(rows - offset)))
        .collect()
}
