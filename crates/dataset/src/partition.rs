// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Partition schemes: mapping path segments to predicates
//!
//! A scheme consumes a path relative to the root of a partitioned dataset,
//! one segment at a time from left to right. Each segment parses to a
//! predicate; the path's predicate is the conjunction of every segment
//! predicate that actually constrains something.
//!
//! For example, a Hive scheme over `<year: int16, day: int8>` parses
//! `/day=21/ignored=3.4/year=2009` to `day = 21 AND year = 2009`, while a
//! positional scheme over `<year: int16, month: int8>` parses `/2009/11` to
//! `year = 2009 AND month = 11`.
//!
//! Schemes are immutable once built and parsing has no side effects, so a
//! scheme can be shared across threads and called concurrently.

use crate::error::Result;
use crate::expression::{and_all, equal, field_ref, is_trivial, parse_scalar, trivial};
use arrow_schema::{Schema, SchemaRef};
use datafusion::logical_expr::{Expr, lit};
use pathforest::split_abstract_path;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An unconverted `name = value` pair pulled from one path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    pub value: String,
}

impl Key {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Convert a key to an equality predicate against its field in `schema`
///
/// Keys naming a field absent from the schema are not an error: they yield
/// the trivial predicate. A value that does not parse as the field's type
/// is a type error.
pub fn convert_key(key: &Key, schema: &Schema) -> Result<Expr> {
    let Ok(field) = schema.field_with_name(&key.name) else {
        return Ok(trivial());
    };

    let value = parse_scalar(&key.value, field.data_type())?;
    Ok(equal(field_ref(field.name()), lit(value)))
}

/// Schemes that produce at most one equality predicate per segment
///
/// Implementors only decide which key, if any, a segment carries;
/// conversion against the schema is shared.
pub trait PartitionKeys {
    fn key_schema(&self) -> &SchemaRef;

    /// Extract a key from `segment`, found at `position` within its path
    fn parse_key(&self, segment: &str, position: usize) -> Option<Key>;

    fn parse_keyed_segment(&self, segment: &str, position: usize) -> Result<Expr> {
        match self.parse_key(segment, position) {
            Some(key) => convert_key(&key, self.key_schema()),
            None => Ok(trivial()),
        }
    }
}

/// One segment per schema field, in schema order: `/2009/11`
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaPartitionScheme {
    schema: SchemaRef,
}

impl SchemaPartitionScheme {
    #[must_use]
    pub fn new(schema: SchemaRef) -> Self {
        Self { schema }
    }
}

impl PartitionKeys for SchemaPartitionScheme {
    fn key_schema(&self) -> &SchemaRef {
        &self.schema
    }

    fn parse_key(&self, segment: &str, position: usize) -> Option<Key> {
        let field = self.schema.fields().get(position)?;
        Some(Key::new(field.name().as_str(), segment))
    }
}

/// Hive-style `key=value` directory names, in any order: `/year=2009/month=11`
///
/// Segments without `=` and keys the schema does not name are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct HivePartitionScheme {
    schema: SchemaRef,
}

impl HivePartitionScheme {
    #[must_use]
    pub fn new(schema: SchemaRef) -> Self {
        Self { schema }
    }

    /// Split a segment on its first `=`
    #[must_use]
    pub fn parse_hive_key(segment: &str) -> Option<Key> {
        let (name, value) = segment.split_once('=')?;
        Some(Key::new(name, value))
    }
}

impl PartitionKeys for HivePartitionScheme {
    fn key_schema(&self) -> &SchemaRef {
        &self.schema
    }

    fn parse_key(&self, segment: &str, _position: usize) -> Option<Key> {
        Self::parse_hive_key(segment)
    }
}

/// Per-position lookup of precomputed predicates
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDictionaryPartitionScheme {
    schema: SchemaRef,
    dictionaries: Vec<HashMap<String, Expr>>,
}

impl SegmentDictionaryPartitionScheme {
    #[must_use]
    pub fn new(schema: SchemaRef, dictionaries: Vec<HashMap<String, Expr>>) -> Self {
        Self {
            schema,
            dictionaries,
        }
    }

    fn lookup(&self, segment: &str, position: usize) -> Expr {
        self.dictionaries
            .get(position)
            .and_then(|d| d.get(segment))
            .cloned()
            .unwrap_or_else(trivial)
    }
}

/// Signature of a caller-supplied segment parser
pub type SegmentParser = Arc<dyn Fn(&str, usize) -> Result<Expr> + Send + Sync>;

/// A scheme implemented by a closure
#[derive(Clone)]
pub struct FunctionPartitionScheme {
    schema: SchemaRef,
    name: String,
    parser: SegmentParser,
}

impl FunctionPartitionScheme {
    pub fn new<N, F>(schema: SchemaRef, name: N, parser: F) -> Self
    where
        N: Into<String>,
        F: Fn(&str, usize) -> Result<Expr> + Send + Sync + 'static,
    {
        Self {
            schema,
            name: name.into(),
            parser: Arc::new(parser),
        }
    }
}

impl fmt::Debug for FunctionPartitionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionPartitionScheme")
            .field("schema", &self.schema)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The closed set of partition schemes
///
/// New behaviour that none of the built-in variants covers goes through
/// [`PartitionScheme::Function`].
#[derive(Debug, Clone, Default)]
pub enum PartitionScheme {
    /// Every segment parses to the trivial predicate; the schema is empty
    #[default]
    Default,
    SegmentDictionary(SegmentDictionaryPartitionScheme),
    Schema(SchemaPartitionScheme),
    Hive(HivePartitionScheme),
    Function(FunctionPartitionScheme),
}

impl PartitionScheme {
    #[must_use]
    pub fn positional(schema: SchemaRef) -> Self {
        PartitionScheme::Schema(SchemaPartitionScheme::new(schema))
    }

    #[must_use]
    pub fn hive(schema: SchemaRef) -> Self {
        PartitionScheme::Hive(HivePartitionScheme::new(schema))
    }

    #[must_use]
    pub fn segment_dictionary(schema: SchemaRef, dictionaries: Vec<HashMap<String, Expr>>) -> Self {
        PartitionScheme::SegmentDictionary(SegmentDictionaryPartitionScheme::new(
            schema,
            dictionaries,
        ))
    }

    pub fn function<N, F>(schema: SchemaRef, name: N, parser: F) -> Self
    where
        N: Into<String>,
        F: Fn(&str, usize) -> Result<Expr> + Send + Sync + 'static,
    {
        PartitionScheme::Function(FunctionPartitionScheme::new(schema, name, parser))
    }

    /// Stable name of the scheme kind; function schemes report their own name
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            PartitionScheme::Default => "default",
            PartitionScheme::SegmentDictionary(_) => "segment_dictionary",
            PartitionScheme::Schema(_) => "schema",
            PartitionScheme::Hive(_) => "hive",
            PartitionScheme::Function(f) => &f.name,
        }
    }

    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        match self {
            PartitionScheme::Default => Arc::new(Schema::empty()),
            PartitionScheme::SegmentDictionary(s) => Arc::clone(&s.schema),
            PartitionScheme::Schema(s) => Arc::clone(&s.schema),
            PartitionScheme::Hive(s) => Arc::clone(&s.schema),
            PartitionScheme::Function(s) => Arc::clone(&s.schema),
        }
    }

    /// Parse one segment found at `position` within its path
    pub fn parse_segment(&self, segment: &str, position: usize) -> Result<Expr> {
        match self {
            PartitionScheme::Default => Ok(trivial()),
            PartitionScheme::SegmentDictionary(s) => Ok(s.lookup(segment, position)),
            PartitionScheme::Schema(s) => s.parse_keyed_segment(segment, position),
            PartitionScheme::Hive(s) => s.parse_keyed_segment(segment, position),
            PartitionScheme::Function(s) => (s.parser)(segment, position),
        }
    }

    /// Parse a whole path: the conjunction of its non-trivial segment predicates
    pub fn parse(&self, path: &str) -> Result<Expr> {
        let mut expressions = Vec::new();
        for (position, segment) in split_abstract_path(path).into_iter().enumerate() {
            let expr = self.parse_segment(segment, position)?;
            if is_trivial(&expr) {
                continue;
            }
            expressions.push(expr);
        }

        diagnostics::log_debug!(
            "Parsed {path} with {scheme} scheme into {count} constraints",
            path: path,
            scheme: self.type_name(),
            count: expressions.len()
        );
        Ok(and_all(expressions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::{DataType, Field};
    use datafusion::common::ScalarValue;

    fn schema(fields: &[(&str, DataType)]) -> SchemaRef {
        Arc::new(Schema::new(
            fields
                .iter()
                .map(|(name, ty)| Field::new(*name, ty.clone(), true))
                .collect::<Vec<_>>(),
        ))
    }

    fn eq_i16(name: &str, v: i16) -> Expr {
        field_ref(name).eq(lit(ScalarValue::Int16(Some(v))))
    }

    fn eq_i8(name: &str, v: i8) -> Expr {
        field_ref(name).eq(lit(ScalarValue::Int8(Some(v))))
    }

    #[test]
    fn test_default_scheme() {
        let scheme = PartitionScheme::default();
        assert_eq!(scheme.type_name(), "default");
        assert_eq!(scheme.schema().fields().len(), 0);
        assert!(is_trivial(&scheme.parse("/a=1/b/c").unwrap()));
        assert!(is_trivial(&scheme.parse_segment("x", 7).unwrap()));
    }

    #[test]
    fn test_positional_scheme() {
        let scheme = PartitionScheme::positional(schema(&[
            ("year", DataType::Int16),
            ("month", DataType::Int8),
        ]));
        assert_eq!(scheme.type_name(), "schema");

        assert_eq!(
            scheme.parse("/2009/11").unwrap(),
            eq_i16("year", 2009).and(eq_i8("month", 11))
        );
        // Shorter paths leave trailing fields unconstrained
        assert_eq!(scheme.parse("/2009").unwrap(), eq_i16("year", 2009));
        // Segments past the last field are ignored
        assert_eq!(
            scheme.parse("/2009/11/part-0.parquet").unwrap(),
            eq_i16("year", 2009).and(eq_i8("month", 11))
        );
        assert!(is_trivial(&scheme.parse("").unwrap()));
    }

    #[test]
    fn test_positional_scheme_bad_value() {
        let scheme = PartitionScheme::positional(schema(&[("year", DataType::Int16)]));
        let err = scheme.parse("/twenty").unwrap_err();
        assert!(err.is_type_error(), "{err}");
    }

    #[test]
    fn test_hive_scheme() {
        let scheme = PartitionScheme::hive(schema(&[
            ("year", DataType::Int16),
            ("day", DataType::Int16),
        ]));
        assert_eq!(scheme.type_name(), "hive");

        assert_eq!(
            scheme.parse("/day=321/ignored=3.4/year=2009").unwrap(),
            eq_i16("day", 321).and(eq_i16("year", 2009))
        );
        // No '=' means no key, and parsing carries on
        assert_eq!(
            scheme.parse("/data/year=2009/part-0.parquet").unwrap(),
            eq_i16("year", 2009)
        );
    }

    #[test]
    fn test_hive_value_keeps_later_equals() {
        assert_eq!(
            HivePartitionScheme::parse_hive_key("expr=a=b"),
            Some(Key::new("expr", "a=b"))
        );
        assert_eq!(HivePartitionScheme::parse_hive_key("plain"), None);
        assert_eq!(
            HivePartitionScheme::parse_hive_key("empty="),
            Some(Key::new("empty", ""))
        );
    }

    #[test]
    fn test_hive_overflow_is_type_error() {
        let scheme = PartitionScheme::hive(schema(&[("day", DataType::Int8)]));
        assert!(scheme.parse("/day=321").unwrap_err().is_type_error());
    }

    #[test]
    fn test_convert_key_absent_field() {
        let s = schema(&[("year", DataType::Int16)]);
        assert!(is_trivial(&convert_key(&Key::new("month", "zz"), &s).unwrap()));
        assert_eq!(
            convert_key(&Key::new("year", "2009"), &s).unwrap(),
            eq_i16("year", 2009)
        );
    }

    #[test]
    fn test_segment_dictionary_scheme() {
        let alpha = field_ref("alpha").eq(lit(1));
        let beta = field_ref("beta").eq(lit("x"));
        let dictionaries = vec![
            HashMap::from([("one".to_string(), alpha.clone())]),
            HashMap::from([("ex".to_string(), beta.clone())]),
        ];
        let scheme = PartitionScheme::segment_dictionary(
            schema(&[("alpha", DataType::Int32), ("beta", DataType::Utf8)]),
            dictionaries,
        );
        assert_eq!(scheme.type_name(), "segment_dictionary");

        assert_eq!(scheme.parse("/one/ex").unwrap(), alpha.clone().and(beta));
        assert_eq!(scheme.parse("/one/nope").unwrap(), alpha);
        // Dictionaries are positional: "one" is not known at position 1
        assert!(is_trivial(&scheme.parse("/ex/one").unwrap()));
        // Positions past the dictionaries are unconstrained
        assert!(is_trivial(&scheme.parse_segment("one", 5).unwrap()));
    }

    #[test]
    fn test_function_scheme() {
        let scheme = PartitionScheme::function(
            schema(&[("depth", DataType::Int32)]),
            "depth_marker",
            |segment, position| {
                if segment == "mark" {
                    Ok(field_ref("depth").eq(lit(position as i32)))
                } else {
                    Ok(trivial())
                }
            },
        );
        assert_eq!(scheme.type_name(), "depth_marker");
        assert_eq!(
            scheme.parse("/a/mark/b").unwrap(),
            field_ref("depth").eq(lit(1))
        );
    }

    #[test]
    fn test_parse_is_repeatable() {
        let scheme = PartitionScheme::hive(schema(&[("year", DataType::Int16)]));
        let first = scheme.parse("/year=2009/x").unwrap();
        for _ in 0..3 {
            assert_eq!(scheme.parse("/year=2009/x").unwrap(), first);
        }
    }
}
