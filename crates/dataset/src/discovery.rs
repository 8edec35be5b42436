// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Partition discovery: infer a schema from paths, then finish a scheme
//!
//! Discovery runs in two phases so that the inferred schema can be adjusted
//! (merged with file schemas, types overridden by a user) before the scheme
//! that parses paths is fixed:
//!
//! 1. [`PartitionSchemeDiscovery::inspect`] looks at sample paths and infers
//!    field names and types.
//! 2. [`PartitionSchemeDiscovery::finish`] binds a scheme to a final schema.
//!
//! Type inference is deliberately simple: a field whose every observed value
//! is made of ASCII digits is `Int32`, anything else is `Utf8`. Negative
//! numbers, therefore, infer as strings, and digit strings too large for 32
//! bits infer as `Int32` and later fail to parse.

use crate::error::{Error, Result};
use crate::partition::{HivePartitionScheme, PartitionScheme};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use pathforest::split_abstract_path;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Creates a partition scheme when its schema must be inferred from paths
pub trait PartitionSchemeDiscovery: Send + Sync + Debug {
    /// Infer the schema of the resulting scheme from observed paths
    fn inspect(&self, paths: &[&str]) -> Result<SchemaRef>;

    /// Bind a scheme to `schema`; fields the scheme does not use are dropped
    fn finish(&self, schema: &SchemaRef) -> Result<PartitionScheme>;
}

/// Observed values per field name, in first-seen order
#[derive(Debug, Default)]
struct ObservedValues {
    order: Vec<String>,
    values: HashMap<String, Vec<String>>,
}

impl ObservedValues {
    fn push(&mut self, name: &str, value: &str) {
        if !self.values.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.values
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// True when every value is made only of ASCII digits (vacuously for none)
fn all_integral(values: &[String]) -> bool {
    values
        .iter()
        .all(|v| v.bytes().all(|b| b.is_ascii_digit()))
}

fn infer_field(name: &str, values: &[String]) -> Field {
    let data_type = if all_integral(values) {
        DataType::Int32
    } else {
        DataType::Utf8
    };
    Field::new(name, data_type, true)
}

/// Discovery for positional schemes over a fixed list of field names
#[derive(Debug, Clone)]
pub struct SchemaPartitionSchemeDiscovery {
    field_names: Vec<String>,
}

impl SchemaPartitionSchemeDiscovery {
    pub fn new<I, S>(field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field_names: field_names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }
}

impl PartitionSchemeDiscovery for SchemaPartitionSchemeDiscovery {
    fn inspect(&self, paths: &[&str]) -> Result<SchemaRef> {
        let mut observed = ObservedValues::default();
        for path in paths {
            for (name, segment) in self.field_names.iter().zip(split_abstract_path(path)) {
                observed.push(name, segment);
            }
        }

        let fields: Vec<Field> = self
            .field_names
            .iter()
            .map(|name| infer_field(name, observed.values(name)))
            .collect();

        diagnostics::log_info!(
            "Inferred {count} positional partition fields from {paths} paths",
            count: fields.len(),
            paths: paths.len()
        );
        Ok(Arc::new(Schema::new(fields)))
    }

    fn finish(&self, schema: &SchemaRef) -> Result<PartitionScheme> {
        let mut indices = Vec::with_capacity(self.field_names.len());
        for name in &self.field_names {
            let index = schema.index_of(name).map_err(|_| {
                Error::type_error(format!("no field named '{name}' in schema {schema}"))
            })?;
            indices.push(index);
        }

        let projected = schema.project(&indices)?;
        Ok(PartitionScheme::positional(Arc::new(projected)))
    }
}

/// Discovery for Hive `key=value` schemes
#[derive(Debug, Clone, Copy, Default)]
pub struct HivePartitionSchemeDiscovery;

impl PartitionSchemeDiscovery for HivePartitionSchemeDiscovery {
    fn inspect(&self, paths: &[&str]) -> Result<SchemaRef> {
        let mut observed = ObservedValues::default();
        for path in paths {
            for segment in split_abstract_path(path) {
                if let Some(key) = HivePartitionScheme::parse_hive_key(segment) {
                    observed.push(&key.name, &key.value);
                }
            }
        }

        let fields: Vec<Field> = observed
            .order
            .iter()
            .map(|name| infer_field(name, observed.values(name)))
            .collect();

        diagnostics::log_info!(
            "Inferred {count} hive partition fields from {paths} paths",
            count: fields.len(),
            paths: paths.len()
        );
        Ok(Arc::new(Schema::new(fields)))
    }

    fn finish(&self, schema: &SchemaRef) -> Result<PartitionScheme> {
        Ok(PartitionScheme::hive(Arc::clone(schema)))
    }
}

impl SchemaPartitionSchemeDiscovery {
    /// Shared handle, for use where a discovery trait object is expected
    #[must_use]
    pub fn make(field_names: Vec<String>) -> Arc<dyn PartitionSchemeDiscovery> {
        Arc::new(Self::new(field_names))
    }
}

impl HivePartitionSchemeDiscovery {
    #[must_use]
    pub fn make() -> Arc<dyn PartitionSchemeDiscovery> {
        Arc::new(Self)
    }
}

/// Either a finished scheme or a discovery that will produce one
#[derive(Debug, Clone)]
pub enum PartitionSchemeOrDiscovery {
    Scheme(Arc<PartitionScheme>),
    Discovery(Arc<dyn PartitionSchemeDiscovery>),
}

impl PartitionSchemeOrDiscovery {
    #[must_use]
    pub fn as_scheme(&self) -> Option<&Arc<PartitionScheme>> {
        match self {
            PartitionSchemeOrDiscovery::Scheme(s) => Some(s),
            PartitionSchemeOrDiscovery::Discovery(_) => None,
        }
    }

    #[must_use]
    pub fn as_discovery(&self) -> Option<&Arc<dyn PartitionSchemeDiscovery>> {
        match self {
            PartitionSchemeOrDiscovery::Scheme(_) => None,
            PartitionSchemeOrDiscovery::Discovery(d) => Some(d),
        }
    }

    /// The partition schema: the scheme's own, or inferred from `paths`
    pub fn inspect(&self, paths: &[&str]) -> Result<SchemaRef> {
        match self {
            PartitionSchemeOrDiscovery::Scheme(s) => Ok(s.schema()),
            PartitionSchemeOrDiscovery::Discovery(d) => d.inspect(paths),
        }
    }

    /// The scheme to parse paths with, finishing a discovery against `schema`
    pub fn resolve(&self, schema: &SchemaRef) -> Result<Arc<PartitionScheme>> {
        match self {
            PartitionSchemeOrDiscovery::Scheme(s) => Ok(Arc::clone(s)),
            PartitionSchemeOrDiscovery::Discovery(d) => Ok(Arc::new(d.finish(schema)?)),
        }
    }
}

impl Default for PartitionSchemeOrDiscovery {
    fn default() -> Self {
        PartitionSchemeOrDiscovery::Scheme(Arc::new(PartitionScheme::Default))
    }
}

impl From<PartitionScheme> for PartitionSchemeOrDiscovery {
    fn from(scheme: PartitionScheme) -> Self {
        PartitionSchemeOrDiscovery::Scheme(Arc::new(scheme))
    }
}

impl From<Arc<PartitionScheme>> for PartitionSchemeOrDiscovery {
    fn from(scheme: Arc<PartitionScheme>) -> Self {
        PartitionSchemeOrDiscovery::Scheme(scheme)
    }
}

impl From<Arc<dyn PartitionSchemeDiscovery>> for PartitionSchemeOrDiscovery {
    fn from(discovery: Arc<dyn PartitionSchemeDiscovery>) -> Self {
        PartitionSchemeOrDiscovery::Discovery(discovery)
    }
}
