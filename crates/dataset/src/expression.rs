// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Builders for the partition predicates attached to paths and fragments
//!
//! Predicates are DataFusion logical expressions. This crate only builds and
//! compares them; evaluation belongs to the scan engine.

use crate::error::{Error, Result};
use arrow::array::StringArray;
use arrow_cast::cast::{CastOptions, cast_with_options};
use arrow_schema::DataType;
use datafusion::common::{Column, ScalarValue};
use datafusion::logical_expr::utils::{conjunction, split_conjunction};
use datafusion::logical_expr::{Expr, lit};

/// Expressions index-aligned with the entities they describe
pub type ExpressionVector = Vec<Expr>;

/// The "no constraint" predicate
#[must_use]
pub fn trivial() -> Expr {
    lit(true)
}

#[must_use]
pub fn is_trivial(expr: &Expr) -> bool {
    *expr == trivial()
}

/// Reference a field by its exact name (dots are not treated as qualifiers)
#[must_use]
pub fn field_ref(name: &str) -> Expr {
    Expr::Column(Column::from_name(name))
}

#[must_use]
pub fn equal(lhs: Expr, rhs: Expr) -> Expr {
    lhs.eq(rhs)
}

/// Left-deep conjunction in iteration order; empty input is [`trivial`]
pub fn and_all<I: IntoIterator<Item = Expr>>(exprs: I) -> Expr {
    conjunction(exprs).unwrap_or_else(trivial)
}

/// Like [`and_all`], but operands equal to [`trivial`] are dropped first
pub fn and_nontrivial<I: IntoIterator<Item = Expr>>(exprs: I) -> Expr {
    and_all(exprs.into_iter().filter(|e| !is_trivial(e)))
}

/// The top-level conjuncts of `expr`
#[must_use]
pub fn conjuncts(expr: &Expr) -> Vec<&Expr> {
    split_conjunction(expr)
}

/// Parse the string form of a value as `data_type`
///
/// Malformed or out-of-range input is a type error.
pub fn parse_scalar(value: &str, data_type: &DataType) -> Result<ScalarValue> {
    let array = StringArray::from(vec![value]);
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    let converted = cast_with_options(&array, data_type, &options).map_err(|e| {
        Error::type_error(format!("cannot parse '{value}' as {data_type}: {e}"))
    })?;
    Ok(ScalarValue::try_from_array(converted.as_ref(), 0)?)
}
