// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::data_source::{DataSource, FragmentIterator};
use crate::error::{Error, Result};
use crate::expression::{ExpressionVector, and_all, is_trivial, trivial};
use crate::file_source::{Compression, FileSource};
use crate::format::{FileDataFragment, FileFormatRef};
use crate::prune::can_satisfy;
use crate::scan::ScanOptions;
use datafusion::logical_expr::Expr;
use pathforest::{FileStats, FileSystemRef, PathForest};
use std::fmt;
use std::sync::Arc;

/// Files discovered on a filesystem, each annotated with a partition predicate
///
/// `partitions[i]` belongs to forest node `i`. A file's full predicate is the
/// source partition, then its ancestors' predicates from the root down, then
/// its own.
#[derive(Debug, Clone)]
pub struct FileSystemDataSource {
    filesystem: FileSystemRef,
    forest: Arc<PathForest>,
    partitions: Arc<ExpressionVector>,
    source_partition: Expr,
    format: FileFormatRef,
}

impl FileSystemDataSource {
    /// Build from a flat listing with every node unconstrained
    pub fn make(
        filesystem: FileSystemRef,
        stats: Vec<FileStats>,
        source_partition: Expr,
        format: FileFormatRef,
    ) -> Result<Self> {
        Self::make_with_partitions(filesystem, stats, Vec::new(), source_partition, format)
    }

    /// Build from a flat listing with `partitions[i]` describing `stats[i]`
    ///
    /// Stats without an entry are unconstrained.
    pub fn make_with_partitions(
        filesystem: FileSystemRef,
        stats: Vec<FileStats>,
        partitions: ExpressionVector,
        source_partition: Expr,
        format: FileFormatRef,
    ) -> Result<Self> {
        if partitions.len() > stats.len() {
            return Err(Error::invalid(format!(
                "{} partition expressions for {} files",
                partitions.len(),
                stats.len()
            )));
        }
        let (forest, partitions) = PathForest::make_with(stats, partitions, trivial);
        Self::make_from_forest(filesystem, forest, partitions, source_partition, format)
    }

    /// Build over an already computed forest, `partitions` indexed by node
    pub fn make_from_forest(
        filesystem: FileSystemRef,
        forest: PathForest,
        mut partitions: ExpressionVector,
        source_partition: Expr,
        format: FileFormatRef,
    ) -> Result<Self> {
        if partitions.len() > forest.len() {
            return Err(Error::invalid(format!(
                "{} partition expressions for {} forest nodes",
                partitions.len(),
                forest.len()
            )));
        }
        partitions.resize_with(forest.len(), trivial);

        diagnostics::log_debug!(
            "Created filesystem data source over {nodes} nodes with format {format}",
            nodes: forest.len(),
            format: format.type_name()
        );

        Ok(Self {
            filesystem,
            forest: Arc::new(forest),
            partitions: Arc::new(partitions),
            source_partition,
            format,
        })
    }

    #[must_use]
    pub fn filesystem(&self) -> &FileSystemRef {
        &self.filesystem
    }

    #[must_use]
    pub fn forest(&self) -> &PathForest {
        &self.forest
    }

    #[must_use]
    pub fn partitions(&self) -> &[Expr] {
        &self.partitions
    }

    #[must_use]
    pub fn format(&self) -> &FileFormatRef {
        &self.format
    }
}

impl DataSource for FileSystemDataSource {
    fn type_name(&self) -> &str {
        "filesystem"
    }

    fn partition_expression(&self) -> &Expr {
        &self.source_partition
    }

    fn get_fragments_impl(&self, options: Arc<ScanOptions>) -> FragmentIterator {
        Box::new(FragmentWalk {
            filesystem: Arc::clone(&self.filesystem),
            forest: Arc::clone(&self.forest),
            partitions: Arc::clone(&self.partitions),
            source_conjuncts: nontrivial(&self.source_partition),
            format: Arc::clone(&self.format),
            options,
            next: 0,
            open_dirs: Vec::new(),
        })
    }
}

fn nontrivial(expr: &Expr) -> Vec<Expr> {
    if is_trivial(expr) {
        Vec::new()
    } else {
        vec![expr.clone()]
    }
}

/// A directory whose subtree is still being walked
struct OpenDir {
    end: usize,
    conjuncts: Vec<Expr>,
}

/// Pre-order walk over the forest, one node per step
struct FragmentWalk {
    filesystem: FileSystemRef,
    forest: Arc<PathForest>,
    partitions: Arc<ExpressionVector>,
    source_conjuncts: Vec<Expr>,
    format: FileFormatRef,
    options: Arc<ScanOptions>,
    next: usize,
    open_dirs: Vec<OpenDir>,
}

impl FragmentWalk {
    fn make_fragment(&self, path: &str, predicate: Expr) -> Result<FileDataFragment> {
        let source = FileSource::from_path(path, Arc::clone(&self.filesystem))
            .with_compression(Compression::from_path(path));
        let fragment = Arc::clone(&self.format).make_fragment(source, Arc::clone(&self.options))?;
        Ok(fragment.with_partition_expression(predicate))
    }
}

impl Iterator for FragmentWalk {
    type Item = Result<FileDataFragment>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.forest.len() {
            let index = self.next;
            let stat = &self.forest.stats()[index];
            let subtree_end = index + 1 + self.forest.num_descendants(index);

            while self.open_dirs.last().is_some_and(|dir| dir.end <= index) {
                let _ = self.open_dirs.pop();
            }
            let mut conjuncts = match self.open_dirs.last() {
                Some(dir) => dir.conjuncts.clone(),
                None => self.source_conjuncts.clone(),
            };
            let own = &self.partitions[index];
            if !is_trivial(own) {
                conjuncts.push(own.clone());
            }
            let predicate = and_all(conjuncts.clone());

            if !can_satisfy(&predicate, &self.options.filter) {
                diagnostics::log_debug!(
                    "Pruned {path} and {descendants} descendants",
                    path: stat.path(),
                    descendants: subtree_end - index - 1
                );
                self.next = subtree_end;
                continue;
            }

            self.next = index + 1;
            if stat.is_dir() {
                self.open_dirs.push(OpenDir {
                    end: subtree_end,
                    conjuncts,
                });
                continue;
            }
            let path = stat.path().to_string();
            return Some(self.make_fragment(&path, predicate));
        }
        None
    }
}

impl fmt::Display for FileSystemDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.type_name())?;
        writeln!(f, "  format: {}", self.format.type_name())?;
        writeln!(f, "  partition: {}", self.source_partition)?;
        for (index, stat) in self.forest.stats().iter().enumerate() {
            let depth = self.forest.ancestors(index).count();
            let name = if stat.is_dir() {
                format!("{}/", stat.path())
            } else {
                stat.path().to_string()
            };
            write!(f, "{:indent$}{name}", "", indent = 2 * (depth + 1))?;
            let partition = &self.partitions[index];
            if !is_trivial(partition) {
                write!(f, " [{partition}]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
