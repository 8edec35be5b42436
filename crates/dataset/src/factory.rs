// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Turn a directory listing into a schema and a [`FileSystemDataSource`]

use crate::discovery::{
    HivePartitionSchemeDiscovery, PartitionSchemeOrDiscovery, SchemaPartitionSchemeDiscovery,
};
use crate::error::Result;
use crate::expression::trivial;
use crate::file_source::{Compression, FileSource};
use crate::filesystem_source::FileSystemDataSource;
use crate::format::FileFormatRef;
use crate::partition::PartitionScheme;
use arrow_schema::{Schema, SchemaRef};
use pathforest::path::{basename, dirname, split_abstract_path, strip_base};
use pathforest::{FileSelector, FileStats, FileSystemRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How directory names map to partition fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PartitioningConfig {
    /// Directories carry no partition information
    #[default]
    None,
    /// `key=value` directory names
    Hive,
    /// Positional directory names, one field per level
    Schema { field_names: Vec<String> },
}

impl PartitioningConfig {
    #[must_use]
    pub fn build(&self) -> PartitionSchemeOrDiscovery {
        match self {
            PartitioningConfig::None => PartitionScheme::Default.into(),
            PartitioningConfig::Hive => HivePartitionSchemeDiscovery::make().into(),
            PartitioningConfig::Schema { field_names } => {
                SchemaPartitionSchemeDiscovery::make(field_names.clone()).into()
            }
        }
    }
}

/// Options controlling which files are discovered and how they are partitioned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSystemDiscoveryOptions {
    /// Paths are parsed for partitions relative to this directory.
    /// Empty means the selector's base directory.
    pub partition_base_dir: String,
    /// Drop files the format does not recognize
    pub exclude_invalid_files: bool,
    /// Entries with a path segment starting with one of these are skipped
    pub ignore_prefixes: Vec<String>,
    pub partitioning: PartitioningConfig,
}

impl Default for FileSystemDiscoveryOptions {
    fn default() -> Self {
        Self {
            partition_base_dir: String::new(),
            exclude_invalid_files: false,
            ignore_prefixes: vec![".".to_string(), "_".to_string()],
            partitioning: PartitioningConfig::None,
        }
    }
}

impl FileSystemDiscoveryOptions {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    fn is_ignored(&self, segment: &str) -> bool {
        self.ignore_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && segment.starts_with(prefix.as_str()))
    }
}

/// Lists files once, then infers a schema and builds data sources from them
#[derive(Debug, Clone)]
pub struct FileSystemDataSourceDiscovery {
    filesystem: FileSystemRef,
    stats: Vec<FileStats>,
    format: FileFormatRef,
    partition_base_dir: String,
    partitioning: PartitionSchemeOrDiscovery,
}

impl FileSystemDataSourceDiscovery {
    /// Discover everything under `selector`
    pub fn make(
        filesystem: FileSystemRef,
        selector: &FileSelector,
        format: FileFormatRef,
        options: FileSystemDiscoveryOptions,
    ) -> Result<Self> {
        let listed = filesystem.get_target_stats(selector)?;
        let stats = listed
            .into_iter()
            .filter(|stat| {
                let relative = strip_base(stat.path(), &selector.base_dir).unwrap_or_default();
                let ignored = split_abstract_path(&relative)
                    .into_iter()
                    .any(|segment| options.is_ignored(segment));
                if ignored {
                    diagnostics::log_debug!("Ignoring {path}", path: stat.path());
                }
                !ignored
            })
            .collect();
        let base = if options.partition_base_dir.is_empty() {
            selector.base_dir.clone()
        } else {
            options.partition_base_dir.clone()
        };
        Self::finish_listing(filesystem, stats, format, base, options)
    }

    /// Discover an explicit list of files
    ///
    /// Ignore prefixes apply to each file name only.
    pub fn make_from_paths(
        filesystem: FileSystemRef,
        paths: &[String],
        format: FileFormatRef,
        options: FileSystemDiscoveryOptions,
    ) -> Result<Self> {
        let stats = filesystem
            .get_file_stats(paths)?
            .into_iter()
            .filter(|stat| !basename(stat.path()).is_some_and(|name| options.is_ignored(name)))
            .collect();
        let base = options.partition_base_dir.clone();
        Self::finish_listing(filesystem, stats, format, base, options)
    }

    fn finish_listing(
        filesystem: FileSystemRef,
        stats: Vec<FileStats>,
        format: FileFormatRef,
        partition_base_dir: String,
        options: FileSystemDiscoveryOptions,
    ) -> Result<Self> {
        let stats: Vec<FileStats> = if options.exclude_invalid_files {
            stats
                .into_iter()
                .filter(|stat| {
                    stat.is_dir() || {
                        let supported = format
                            .is_supported(&file_source(&filesystem, stat.path()))
                            .unwrap_or(false);
                        if !supported {
                            diagnostics::log_debug!(
                                "Excluding {path}: not a {format} file",
                                path: stat.path(),
                                format: format.type_name()
                            );
                        }
                        supported
                    }
                })
                .collect()
        } else {
            stats
        };

        Ok(Self {
            filesystem,
            stats,
            format,
            partition_base_dir,
            partitioning: options.partitioning.build(),
        })
    }

    /// Replace the partitioning taken from the options
    #[must_use]
    pub fn with_partitioning<P>(mut self, partitioning: P) -> Self
    where
        P: Into<PartitionSchemeOrDiscovery>,
    {
        self.partitioning = partitioning.into();
        self
    }

    #[must_use]
    pub fn stats(&self) -> &[FileStats] {
        &self.stats
    }

    #[must_use]
    pub fn partitioning(&self) -> &PartitionSchemeOrDiscovery {
        &self.partitioning
    }

    /// The directory part of a file path, relative to the partition base
    fn partition_path(&self, stat: &FileStats) -> Option<String> {
        if !stat.is_file() {
            return None;
        }
        strip_base(stat.path(), &self.partition_base_dir).map(|relative| dirname(&relative))
    }

    /// Schema of the first readable file merged with the partition schema
    pub fn inspect(&self) -> Result<SchemaRef> {
        let mut file_schema = Schema::empty();
        for stat in self.stats.iter().filter(|s| s.is_file()) {
            let source = file_source(&self.filesystem, stat.path());
            if self.format.is_supported(&source)? {
                file_schema = self.format.inspect(&source)?.as_ref().clone();
                break;
            }
        }

        let partition_paths: Vec<String> = self
            .stats
            .iter()
            .filter_map(|stat| self.partition_path(stat))
            .collect();
        let paths: Vec<&str> = partition_paths.iter().map(String::as_str).collect();
        let partition_schema = self.partitioning.inspect(&paths)?;

        let merged = Schema::try_merge(vec![file_schema, partition_schema.as_ref().clone()])?;
        diagnostics::log_info!(
            "Inspected {files} files: {fields} fields",
            files: paths.len(),
            fields: merged.fields().len()
        );
        Ok(Arc::new(merged))
    }

    /// Build the data source, every file annotated with its partition predicate
    pub fn finish(&self, schema: &SchemaRef) -> Result<FileSystemDataSource> {
        let scheme = self.partitioning.resolve(schema)?;
        let partitions = self
            .stats
            .iter()
            .map(|stat| match self.partition_path(stat) {
                Some(path) => scheme.parse(&path),
                None => Ok(trivial()),
            })
            .collect::<Result<Vec<_>>>()?;

        FileSystemDataSource::make_with_partitions(
            Arc::clone(&self.filesystem),
            self.stats.clone(),
            partitions,
            trivial(),
            Arc::clone(&self.format),
        )
    }
}

fn file_source(filesystem: &FileSystemRef, path: &str) -> FileSource {
    FileSource::from_path(path, Arc::clone(filesystem))
        .with_compression(Compression::from_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::DataSource;
    use crate::expression::{equal, field_ref};
    use crate::scan::ScanOptions;
    use crate::testing::StubFormat;
    use arrow_schema::DataType;
    use datafusion::logical_expr::lit;
    use pathforest::MemoryFileSystem;

    fn hive_tree() -> FileSystemRef {
        let fs = MemoryFileSystem::new();
        for path in [
            "data/year=2009/month=11/a.stub",
            "data/year=2009/month=12/b.stub",
            "data/year=2010/month=1/c.stub",
            "data/_SUCCESS",
            "data/.hidden/d.stub",
            "data/year=2010/readme.txt",
        ] {
            let content: &[u8] = if path.ends_with(".stub") { b"stub" } else { b"text" };
            fs.create_file(path, content).unwrap();
        }
        Arc::new(fs)
    }

    fn hive_options() -> FileSystemDiscoveryOptions {
        FileSystemDiscoveryOptions {
            partitioning: PartitioningConfig::Hive,
            exclude_invalid_files: true,
            ..Default::default()
        }
    }

    fn discover(options: FileSystemDiscoveryOptions) -> FileSystemDataSourceDiscovery {
        FileSystemDataSourceDiscovery::make(
            hive_tree(),
            &FileSelector::new("data").recursive(true),
            Arc::new(StubFormat::new(1)),
            options,
        )
        .unwrap()
    }

    fn file_paths(discovery: &FileSystemDataSourceDiscovery) -> Vec<&str> {
        discovery
            .stats()
            .iter()
            .filter(|s| s.is_file())
            .map(FileStats::path)
            .collect()
    }

    #[test]
    fn test_ignored_and_invalid_files_are_dropped() {
        let discovery = discover(hive_options());
        assert_eq!(
            file_paths(&discovery),
            vec![
                "data/year=2009/month=11/a.stub",
                "data/year=2009/month=12/b.stub",
                "data/year=2010/month=1/c.stub",
            ]
        );

        let keep_invalid = discover(FileSystemDiscoveryOptions {
            exclude_invalid_files: false,
            ..hive_options()
        });
        assert_eq!(file_paths(&keep_invalid).len(), 4);
    }

    #[test]
    fn test_inspect_merges_partition_fields() {
        let discovery = discover(hive_options());
        let schema = discovery.inspect().unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["reading", "year", "month"]);
        assert_eq!(schema.field_with_name("year").unwrap().data_type(), &DataType::Int32);
    }

    #[test]
    fn test_finish_annotates_files() {
        let discovery = discover(hive_options());
        let schema = discovery.inspect().unwrap();
        let source = discovery.finish(&schema).unwrap();

        let fragments: Vec<_> = source
            .get_fragments(Arc::new(ScanOptions::default()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(
            fragments[0].partition_expression(),
            &equal(field_ref("year"), lit(2009)).and(equal(field_ref("month"), lit(11)))
        );

        let filter = field_ref("year").eq(lit(2010));
        let pruned: Vec<_> = source
            .get_fragments(Arc::new(ScanOptions::default().with_filter(filter)))
            .map(|f| f.unwrap().source().path().unwrap().to_string())
            .collect();
        assert_eq!(pruned, vec!["data/year=2010/month=1/c.stub"]);
    }

    #[test]
    fn test_positional_partitioning_with_base_dir() {
        let fs = MemoryFileSystem::new();
        fs.create_file("root/2009/11/a.stub", &b"stub"[..]).unwrap();
        fs.create_file("root/2010/1/b.stub", &b"stub"[..]).unwrap();
        let options = FileSystemDiscoveryOptions {
            partition_base_dir: "root".to_string(),
            partitioning: PartitioningConfig::Schema {
                field_names: vec!["year".to_string(), "month".to_string()],
            },
            ..Default::default()
        };
        let discovery = FileSystemDataSourceDiscovery::make(
            Arc::new(fs),
            &FileSelector::new("root").recursive(true),
            Arc::new(StubFormat::new(1)),
            options,
        )
        .unwrap();
        let schema = discovery.inspect().unwrap();
        assert_eq!(schema.fields().len(), 3);

        let source = discovery.finish(&schema).unwrap();
        let first = source
            .get_fragments(Arc::new(ScanOptions::default()))
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(
            first.partition_expression(),
            &equal(field_ref("year"), lit(2009)).and(equal(field_ref("month"), lit(11)))
        );
    }

    #[test]
    fn test_explicit_paths_and_custom_scheme() {
        let paths = vec![
            "data/year=2009/month=11/a.stub".to_string(),
            "data/_SUCCESS".to_string(),
        ];
        let discovery = FileSystemDataSourceDiscovery::make_from_paths(
            hive_tree(),
            &paths,
            Arc::new(StubFormat::new(1)),
            FileSystemDiscoveryOptions::default(),
        )
        .unwrap()
        .with_partitioning(PartitionScheme::Default);
        assert_eq!(file_paths(&discovery), vec!["data/year=2009/month=11/a.stub"]);
        assert!(discovery.partitioning().as_scheme().is_some());

        let schema = discovery.inspect().unwrap();
        let source = discovery.finish(&schema).unwrap();
        let fragment = source
            .get_fragments(Arc::new(ScanOptions::default()))
            .next()
            .unwrap()
            .unwrap();
        assert!(crate::expression::is_trivial(fragment.partition_expression()));
    }

    #[test]
    fn test_options_from_yaml() {
        let options = FileSystemDiscoveryOptions::from_yaml(
            "partition_base_dir: data\npartitioning:\n  kind: schema\n  field_names: [year, month]\n",
        )
        .unwrap();
        assert_eq!(options.partition_base_dir, "data");
        assert!(!options.exclude_invalid_files);
        assert_eq!(options.ignore_prefixes, vec![".", "_"]);
        assert_eq!(
            options.partitioning,
            PartitioningConfig::Schema {
                field_names: vec!["year".to_string(), "month".to_string()]
            }
        );

        let hive = FileSystemDiscoveryOptions::from_yaml("partitioning:\n  kind: hive\n").unwrap();
        assert_eq!(hive.partitioning, PartitioningConfig::Hive);
        assert!(FileSystemDiscoveryOptions::from_yaml("partitioning: 7").is_err());
    }
}
