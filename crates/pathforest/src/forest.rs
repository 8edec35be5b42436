// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A read-only forest over discovered paths
//!
//! Nodes live in an arena ordered so that every node is immediately followed
//! by its descendants (segment-wise pre-order). Links are indices, so a
//! subtree is the contiguous range `i + 1 ..= i + num_descendants(i)`.

use crate::path::{is_ancestor, split_abstract_path};
use crate::stats::FileStats;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathForest {
    stats: Vec<FileStats>,
    parents: Vec<Option<usize>>,
    descendants: Vec<usize>,
}

impl PathForest {
    /// Build a forest from a flat listing
    #[must_use]
    pub fn make(stats: Vec<FileStats>) -> Self {
        let associated = vec![(); stats.len()];
        Self::make_with(stats, associated, || ()).0
    }

    /// Build a forest and permute `associated` so it stays index-aligned
    ///
    /// `associated[i]` describes `stats[i]`. Missing trailing entries are
    /// produced by `fill`; extra entries are dropped. When a path occurs
    /// more than once the first occurrence wins.
    pub fn make_with<T, F>(
        stats: Vec<FileStats>,
        mut associated: Vec<T>,
        fill: F,
    ) -> (Self, Vec<T>)
    where
        F: FnMut() -> T,
    {
        associated.resize_with(stats.len(), fill);

        let mut entries: Vec<(Vec<String>, FileStats, T)> = stats
            .into_iter()
            .zip(associated)
            .map(|(stat, assoc)| {
                let key = split_abstract_path(stat.path())
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (key, stat, assoc)
            })
            .collect();

        // Stable, so duplicates keep their listing order.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|later, earlier| later.0 == earlier.0);

        let (stats, associated): (Vec<FileStats>, Vec<T>) = entries
            .into_iter()
            .map(|(_, stat, assoc)| (stat, assoc))
            .unzip();

        let mut parents = Vec::with_capacity(stats.len());
        let mut stack: Vec<usize> = Vec::new();
        for (i, stat) in stats.iter().enumerate() {
            while let Some(&top) = stack.last() {
                if is_ancestor(stats[top].path(), stat.path()) {
                    break;
                }
                let _ = stack.pop();
            }
            parents.push(stack.last().copied());
            stack.push(i);
        }

        let mut descendants = vec![0; stats.len()];
        for i in 0..stats.len() {
            let mut cursor = parents[i];
            while let Some(p) = cursor {
                descendants[p] += 1;
                cursor = parents[p];
            }
        }

        diagnostics::log_debug!(
            "Built path forest with {nodes} nodes",
            nodes: stats.len()
        );

        (
            Self {
                stats,
                parents,
                descendants,
            },
            associated,
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> &[FileStats] {
        &self.stats
    }

    #[must_use]
    pub fn node(&self, i: usize) -> Option<&FileStats> {
        self.stats.get(i)
    }

    #[must_use]
    pub fn parent(&self, i: usize) -> Option<usize> {
        self.parents.get(i).copied().flatten()
    }

    #[must_use]
    pub fn num_descendants(&self, i: usize) -> usize {
        self.descendants.get(i).copied().unwrap_or(0)
    }

    /// Ancestors of node `i`, nearest first
    pub fn ancestors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent(i), move |&p| self.parent(p))
    }

    /// Direct children of node `i`, in forest order
    pub fn children(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        let end = i + 1 + self.num_descendants(i);
        (i + 1..end.min(self.len())).filter(move |&c| self.parents[c] == Some(i))
    }

    /// Nodes without a parent, in forest order
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.parents[i].is_none())
    }
}
