// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result, anyhow};
use arrow_schema::Schema;
use clap::{Args, ValueEnum};
use datafusion::logical_expr::{Expr, lit};
use dataset::expression::{and_all, field_ref, parse_scalar};
use dataset::{
    FileFormatRef, FileSystemDataSourceDiscovery, FileSystemDiscoveryOptions, IpcFileFormat,
    ParquetFileFormat, PartitioningConfig,
};
use pathforest::{FileSelector, FileSystemRef, LocalFileSystem};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatChoice {
    Parquet,
    Ipc,
}

impl FormatChoice {
    #[must_use]
    pub fn build(self) -> FileFormatRef {
        match self {
            FormatChoice::Parquet => Arc::new(ParquetFileFormat::new()),
            FormatChoice::Ipc => Arc::new(IpcFileFormat::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PartitioningChoice {
    None,
    Hive,
    Schema,
}

/// Arguments shared by every command that opens a dataset directory
#[derive(Debug, Clone, Args)]
pub struct DatasetArgs {
    /// Dataset root directory on the host
    pub root: PathBuf,

    /// YAML discovery options; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// File format of the dataset files
    #[arg(long, value_enum, default_value = "parquet")]
    pub format: FormatChoice,

    /// How directory names map to partition fields
    #[arg(long, value_enum)]
    pub partitioning: Option<PartitioningChoice>,

    /// Partition field name for schema partitioning, one per directory level
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Keep only files whose partitions may match COLUMN=VALUE
    #[arg(long = "where", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Keep files the format does not recognize
    #[arg(long)]
    pub include_invalid: bool,
}

impl DatasetArgs {
    /// Discovery options from the config file, overridden by flags
    pub fn discovery_options(&self) -> Result<FileSystemDiscoveryOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                FileSystemDiscoveryOptions::from_yaml(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => FileSystemDiscoveryOptions {
                exclude_invalid_files: true,
                ..Default::default()
            },
        };

        match self.partitioning {
            Some(PartitioningChoice::None) => options.partitioning = PartitioningConfig::None,
            Some(PartitioningChoice::Hive) => options.partitioning = PartitioningConfig::Hive,
            Some(PartitioningChoice::Schema) => {
                if self.fields.is_empty() {
                    return Err(anyhow!("schema partitioning needs at least one --field"));
                }
                options.partitioning = PartitioningConfig::Schema {
                    field_names: self.fields.clone(),
                };
            }
            None => {}
        }
        if self.include_invalid {
            options.exclude_invalid_files = false;
        }
        Ok(options)
    }

    /// List the root directory and prepare discovery
    pub fn open_discovery(&self) -> Result<FileSystemDataSourceDiscovery> {
        let filesystem: FileSystemRef = Arc::new(
            LocalFileSystem::new(&self.root)
                .with_context(|| format!("opening {}", self.root.display()))?,
        );
        let selector = FileSelector::new("").recursive(true);
        let discovery = FileSystemDataSourceDiscovery::make(
            filesystem,
            &selector,
            self.format.build(),
            self.discovery_options()?,
        )?;
        diagnostics::log_debug!(
            "Discovered {count} entries under {root}",
            count: discovery.stats().len(),
            root: self.root.display().to_string()
        );
        Ok(discovery)
    }
}

/// Conjunction of `COLUMN=VALUE` equalities, typed by `schema`
pub fn parse_filters(filters: &[String], schema: &Schema) -> Result<Expr> {
    let exprs = filters
        .iter()
        .map(|filter| {
            let (column, value) = filter
                .split_once('=')
                .ok_or_else(|| anyhow!("filter '{filter}' is not COLUMN=VALUE"))?;
            let field = schema
                .field_with_name(column)
                .map_err(|_| anyhow!("filter column '{column}' is not in the dataset schema"))?;
            let scalar = parse_scalar(value, field.data_type())?;
            Ok(field_ref(column).eq(lit(scalar)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(and_all(exprs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::{DataType, Field};
    use datafusion::common::ScalarValue;

    fn args(extra: &[&str]) -> DatasetArgs {
        #[derive(clap::Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: DatasetArgs,
        }
        let argv = ["strata", "/data"].into_iter().chain(extra.iter().copied());
        <Wrapper as clap::Parser>::parse_from(argv).args
    }

    #[test]
    fn test_flags_override_defaults() {
        let options = args(&["--partitioning", "schema", "--field", "year", "--field", "month"])
            .discovery_options()
            .unwrap();
        assert!(options.exclude_invalid_files);
        assert_eq!(
            options.partitioning,
            PartitioningConfig::Schema {
                field_names: vec!["year".to_string(), "month".to_string()]
            }
        );

        let options = args(&["--partitioning", "hive", "--include-invalid"])
            .discovery_options()
            .unwrap();
        assert_eq!(options.partitioning, PartitioningConfig::Hive);
        assert!(!options.exclude_invalid_files);

        assert!(args(&["--partitioning", "schema"]).discovery_options().is_err());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discovery.yaml");
        std::fs::write(&path, "ignore_prefixes: ['tmp']\npartitioning:\n  kind: hive\n").unwrap();
        let config = path.to_str().unwrap();
        let options = args(&["--config", config]).discovery_options().unwrap();
        assert_eq!(options.ignore_prefixes, vec!["tmp"]);
        assert_eq!(options.partitioning, PartitioningConfig::Hive);

        let options = args(&["--config", config, "--partitioning", "none"])
            .discovery_options()
            .unwrap();
        assert_eq!(options.partitioning, PartitioningConfig::None);
    }

    #[test]
    fn test_parse_filters() {
        let schema = Schema::new(vec![
            Field::new("year", DataType::Int32, true),
            Field::new("site", DataType::Utf8, true),
        ]);
        let filters = vec!["year=2009".to_string(), "site=north".to_string()];
        let expr = parse_filters(&filters, &schema).unwrap();
        assert_eq!(
            expr,
            field_ref("year")
                .eq(lit(ScalarValue::Int32(Some(2009))))
                .and(field_ref("site").eq(lit("north")))
        );

        assert!(dataset::expression::is_trivial(&parse_filters(&[], &schema).unwrap()));
        assert!(parse_filters(&["year".to_string()], &schema).is_err());
        assert!(parse_filters(&["depth=3".to_string()], &schema).is_err());
        assert!(parse_filters(&["year=abc".to_string()], &schema).is_err());
    }
}
