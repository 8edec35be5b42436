// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers shared by the unit tests of this crate

use crate::error::Result;
use crate::file_source::FileSource;
use crate::format::{FileDataFragment, FileFormat};
use crate::scan::{InMemoryScanTask, ScanContext, ScanOptions, ScanTask, ScanTaskIterator};
use arrow::ipc::writer::FileWriter;
use arrow_array::{ArrayRef, Int32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const STUB_MAGIC: &[u8] = b"stub";

/// A format that accepts any source starting with `stub` and yields empty tasks
#[derive(Debug)]
pub struct StubFormat {
    tasks_per_file: usize,
    scan_calls: AtomicUsize,
}

impl StubFormat {
    pub fn new(tasks_per_file: usize) -> Self {
        Self {
            tasks_per_file,
            scan_calls: AtomicUsize::new(0),
        }
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new(
            "reading",
            DataType::Float64,
            true,
        )]))
    }
}

impl FileFormat for StubFormat {
    fn type_name(&self) -> &str {
        "stub"
    }

    fn is_supported(&self, source: &FileSource) -> Result<bool> {
        Ok(source.read_prefix(STUB_MAGIC.len())? == STUB_MAGIC)
    }

    fn inspect(&self, _source: &FileSource) -> Result<SchemaRef> {
        Ok(Self::schema())
    }

    fn scan_file(
        &self,
        _source: &FileSource,
        _options: Arc<ScanOptions>,
        _context: Arc<ScanContext>,
    ) -> Result<ScanTaskIterator> {
        let _ = self.scan_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new((0..self.tasks_per_file).map(|_| {
            let task: Box<dyn ScanTask> = Box::new(InMemoryScanTask::new(Vec::new()));
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

/// Rows `start..start + len` as `key: int32, value: utf8`
pub fn sample_batch(start: i32, len: i32) -> RecordBatch {
    let keys: ArrayRef = Arc::new(Int32Array::from_iter_values(start..start + len));
    let values: ArrayRef = Arc::new(StringArray::from_iter_values(
        (start..start + len).map(|i| format!("v{i}")),
    ));
    RecordBatch::try_from_iter(vec![("key", keys), ("value", values)]).unwrap()
}

pub fn parquet_bytes(batches: &[RecordBatch], max_row_group_size: Option<usize>) -> Bytes {
    let mut props = WriterProperties::builder();
    if let Some(size) = max_row_group_size {
        props = props.set_max_row_group_size(size);
    }
    let mut buffer = Vec::new();
    let mut writer =
        ArrowWriter::try_new(&mut buffer, batches[0].schema(), Some(props.build())).unwrap();
    for batch in batches {
        writer.write(batch).unwrap();
    }
    let _ = writer.close().unwrap();
    Bytes::from(buffer)
}

pub fn ipc_bytes(batches: &[RecordBatch]) -> Bytes {
    let mut buffer = Vec::new();
    {
        let mut writer = FileWriter::try_new(&mut buffer, &batches[0].schema()).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        writer.finish().unwrap();
    }
    Bytes::from(buffer)
}
