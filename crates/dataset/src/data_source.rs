// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::expression::trivial;
use crate::format::FileDataFragment;
use crate::prune::can_satisfy;
use crate::scan::ScanOptions;
use datafusion::logical_expr::Expr;
use std::fmt::Debug;
use std::sync::Arc;

/// Lazy, finite sequence of fragments
pub type FragmentIterator = Box<dyn Iterator<Item = Result<FileDataFragment>> + Send>;

/// A collection of fragments sharing a source-level partition predicate
pub trait DataSource: Send + Sync + Debug {
    fn type_name(&self) -> &str;

    /// Predicate satisfied by every row of this source
    fn partition_expression(&self) -> &Expr;

    /// Fragments that may satisfy `options.filter`
    ///
    /// A source whose own partition rules out the filter yields nothing.
    fn get_fragments(&self, options: Arc<ScanOptions>) -> FragmentIterator {
        if !can_satisfy(self.partition_expression(), &options.filter) {
            diagnostics::log_debug!(
                "Skipping {source_type} data source: partition excludes filter",
                source_type: self.type_name()
            );
            return Box::new(std::iter::empty());
        }
        self.get_fragments_impl(options)
    }

    fn get_fragments_impl(&self, options: Arc<ScanOptions>) -> FragmentIterator;
}

pub type DataSourceRef = Arc<dyn DataSource>;

/// A data source made of child data sources
///
/// Each child applies its own filtering; fragments come out child by child.
#[derive(Debug, Clone)]
pub struct TreeDataSource {
    children: Vec<DataSourceRef>,
    partition_expression: Expr,
}

impl TreeDataSource {
    #[must_use]
    pub fn new(children: Vec<DataSourceRef>) -> Self {
        Self {
            children,
            partition_expression: trivial(),
        }
    }

    #[must_use]
    pub fn with_partition_expression(mut self, expression: Expr) -> Self {
        self.partition_expression = expression;
        self
    }

    #[must_use]
    pub fn children(&self) -> &[DataSourceRef] {
        &self.children
    }
}

impl DataSource for TreeDataSource {
    fn type_name(&self) -> &str {
        "tree"
    }

    fn partition_expression(&self) -> &Expr {
        &self.partition_expression
    }

    fn get_fragments_impl(&self, options: Arc<ScanOptions>) -> FragmentIterator {
        let children = self.children.clone();
        Box::new(
            children
                .into_iter()
                .flat_map(move |child| child.get_fragments(Arc::clone(&options))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{equal, field_ref};
    use crate::filesystem_source::FileSystemDataSource;
    use crate::testing::StubFormat;
    use datafusion::logical_expr::lit;
    use pathforest::{FileStats, FileSystemRef, MemoryFileSystem};

    fn leaf_source(files: &[&str], partition: Expr) -> DataSourceRef {
        let fs = MemoryFileSystem::new();
        let stats = files
            .iter()
            .map(|f| {
                fs.create_file(f, &b"stub"[..]).unwrap();
                FileStats::file(f, 4)
            })
            .collect();
        let fs: FileSystemRef = Arc::new(fs);
        Arc::new(
            FileSystemDataSource::make(fs, stats, partition, Arc::new(StubFormat::new(1)))
                .unwrap(),
        )
    }

    #[test]
    fn test_tree_concatenates_children() {
        let north = leaf_source(&["n/1", "n/2"], equal(field_ref("site"), lit("north")));
        let south = leaf_source(&["s/1"], equal(field_ref("site"), lit("south")));
        let tree = TreeDataSource::new(vec![north, south]);
        assert_eq!(tree.type_name(), "tree");

        let all: Vec<_> = tree
            .get_fragments(Arc::new(ScanOptions::default()))
            .map(|f| f.unwrap().source().path().unwrap().to_string())
            .collect();
        assert_eq!(all, vec!["n/1", "n/2", "s/1"]);

        let filter = field_ref("site").eq(lit("south"));
        let south_only: Vec<_> = tree
            .get_fragments(Arc::new(ScanOptions::default().with_filter(filter)))
            .map(|f| f.unwrap().source().path().unwrap().to_string())
            .collect();
        assert_eq!(south_only, vec!["s/1"]);
    }

    #[test]
    fn test_source_partition_short_circuits() {
        let tree = TreeDataSource::new(vec![leaf_source(&["a"], trivial())])
            .with_partition_expression(equal(field_ref("site"), lit("north")));
        let filter = field_ref("site").eq(lit("east"));
        assert_eq!(
            tree.get_fragments(Arc::new(ScanOptions::default().with_filter(filter)))
                .count(),
            0
        );
        assert_eq!(tree.get_fragments(Arc::new(ScanOptions::default())).count(), 1);
    }
}
