// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Conservative partition pruning
//!
//! A partition predicate pins columns to literal values. The scan filter is
//! evaluated under those bindings with three-valued logic and a partition is
//! pruned only when the filter is definitely false.

use crate::expression::conjuncts;
use arrow_schema::DataType;
use datafusion::common::ScalarValue;
use datafusion::logical_expr::expr::{Between, BinaryExpr, InList};
use datafusion::logical_expr::{Expr, Operator};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    fn from_bool(b: bool) -> Self {
        if b { Truth::True } else { Truth::False }
    }

    fn negate(self) -> Self {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    fn and(self, other: Self) -> Self {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }

    fn or(self, other: Self) -> Self {
        match (self, other) {
            (Truth::True, _) | (_, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            _ => Truth::Unknown,
        }
    }
}

/// Column values pinned by a partition predicate
#[derive(Debug, Default)]
struct Bindings {
    values: HashMap<String, ScalarValue>,
    conflicted: Vec<String>,
    contradiction: bool,
}

impl Bindings {
    fn from_partition(partition: &Expr) -> Self {
        let mut bindings = Bindings::default();
        for conjunct in conjuncts(partition) {
            match conjunct {
                Expr::Literal(ScalarValue::Boolean(Some(false))) => bindings.contradiction = true,
                Expr::BinaryExpr(BinaryExpr {
                    left,
                    op: Operator::Eq,
                    right,
                }) => match (left.as_ref(), right.as_ref()) {
                    (Expr::Column(column), Expr::Literal(value))
                    | (Expr::Literal(value), Expr::Column(column)) => {
                        bindings.bind(&column.name, value);
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        bindings
    }

    fn bind(&mut self, name: &str, value: &ScalarValue) {
        if self.conflicted.iter().any(|c| c == name) {
            return;
        }
        match self.values.get(name) {
            Some(existing) if existing != value => {
                // Two different values for one column: leave it undecided
                let _ = self.values.remove(name);
                self.conflicted.push(name.to_string());
            }
            Some(_) => {}
            None => {
                let _ = self.values.insert(name.to_string(), value.clone());
            }
        }
    }

    fn value_of(&self, expr: &Expr) -> Option<ScalarValue> {
        match expr {
            Expr::Column(column) => self.values.get(&column.name).cloned(),
            Expr::Literal(value) => Some(value.clone()),
            Expr::Alias(alias) => self.value_of(&alias.expr),
            _ => None,
        }
    }

    fn eval(&self, expr: &Expr) -> Truth {
        match expr {
            Expr::Literal(ScalarValue::Boolean(Some(b))) => Truth::from_bool(*b),
            Expr::Alias(alias) => self.eval(&alias.expr),
            Expr::Not(inner) => self.eval(inner).negate(),
            Expr::BinaryExpr(BinaryExpr { left, op, right }) => match op {
                Operator::And => self.eval(left).and(self.eval(right)),
                Operator::Or => self.eval(left).or(self.eval(right)),
                _ => self.eval_comparison(left, *op, right),
            },
            Expr::IsNull(inner) => match self.value_of(inner) {
                Some(value) => Truth::from_bool(value.is_null()),
                None => Truth::Unknown,
            },
            Expr::IsNotNull(inner) => match self.value_of(inner) {
                Some(value) => Truth::from_bool(!value.is_null()),
                None => Truth::Unknown,
            },
            Expr::InList(InList {
                expr,
                list,
                negated,
            }) => {
                let truth = self.eval_in_list(expr, list);
                if *negated { truth.negate() } else { truth }
            }
            Expr::Between(Between {
                expr,
                negated,
                low,
                high,
            }) => {
                let truth = self
                    .eval_comparison(expr, Operator::GtEq, low)
                    .and(self.eval_comparison(expr, Operator::LtEq, high));
                if *negated { truth.negate() } else { truth }
            }
            _ => Truth::Unknown,
        }
    }

    fn eval_comparison(&self, left: &Expr, op: Operator, right: &Expr) -> Truth {
        let (Some(left), Some(right)) = (self.value_of(left), self.value_of(right)) else {
            return Truth::Unknown;
        };
        let Some(ordering) = compare(&left, &right) else {
            return Truth::Unknown;
        };
        match op {
            Operator::Eq => Truth::from_bool(ordering == Ordering::Equal),
            Operator::NotEq => Truth::from_bool(ordering != Ordering::Equal),
            Operator::Lt => Truth::from_bool(ordering == Ordering::Less),
            Operator::LtEq => Truth::from_bool(ordering != Ordering::Greater),
            Operator::Gt => Truth::from_bool(ordering == Ordering::Greater),
            Operator::GtEq => Truth::from_bool(ordering != Ordering::Less),
            _ => Truth::Unknown,
        }
    }

    fn eval_in_list(&self, expr: &Expr, list: &[Expr]) -> Truth {
        list.iter().fold(Truth::False, |acc, item| {
            acc.or(self.eval_comparison(expr, Operator::Eq, item))
        })
    }
}

/// Order two scalars, casting one side to the other's type when they differ
///
/// A cast is only used when it loses nothing; mixed numbers fall back to
/// Float64. Nulls, lossy casts and incomparable values give `None`.
fn compare(left: &ScalarValue, right: &ScalarValue) -> Option<Ordering> {
    if left.is_null() || right.is_null() {
        return None;
    }
    if left.data_type() == right.data_type() {
        return left.partial_cmp(right);
    }
    if let Some(cast) = cast_for_compare(right, &left.data_type()) {
        return left.partial_cmp(&cast);
    }
    if let Some(cast) = cast_for_compare(left, &right.data_type()) {
        return cast.partial_cmp(right);
    }
    if left.data_type().is_numeric() && right.data_type().is_numeric() {
        let left = cast_for_compare(left, &DataType::Float64)?;
        let right = cast_for_compare(right, &DataType::Float64)?;
        return left.partial_cmp(&right);
    }
    None
}

/// Cast `value` to `target` only if casting back restores it
///
/// Numbers are never compared as their string renderings.
fn cast_for_compare(value: &ScalarValue, target: &DataType) -> Option<ScalarValue> {
    let is_string =
        |t: &DataType| matches!(t, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View);
    if is_string(target) && !is_string(&value.data_type()) {
        return None;
    }
    let cast = value.cast_to(target).ok().filter(|cast| !cast.is_null())?;
    let restored = cast.cast_to(&value.data_type()).ok()?;
    (restored == *value).then_some(cast)
}

/// Whether rows under `partition` might satisfy `filter`
///
/// Returns `false` only when the answer is definitely no.
#[must_use]
pub fn can_satisfy(partition: &Expr, filter: &Expr) -> bool {
    let bindings = Bindings::from_partition(partition);
    if bindings.contradiction {
        return false;
    }
    bindings.eval(filter) != Truth::False
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{and_all, equal, field_ref, trivial};
    use datafusion::logical_expr::lit;

    fn year_month(year: i16, month: i8) -> Expr {
        and_all(vec![
            equal(field_ref("year"), lit(year)),
            equal(field_ref("month"), lit(month)),
        ])
    }

    #[test]
    fn test_trivial_never_prunes() {
        assert!(can_satisfy(&trivial(), &trivial()));
        assert!(can_satisfy(&year_month(2009, 11), &trivial()));
        assert!(can_satisfy(&trivial(), &field_ref("year").eq(lit(2010))));
    }

    #[test]
    fn test_fractional_literals_are_not_truncated() {
        let partition = equal(field_ref("year"), lit(2009i32));
        assert!(can_satisfy(&partition, &field_ref("year").lt(lit(2009.5f64))));
        assert!(can_satisfy(&partition, &field_ref("year").not_eq(lit(2009.5f64))));
        assert!(!can_satisfy(&partition, &field_ref("year").eq(lit(2009.5f64))));
        assert!(!can_satisfy(&partition, &field_ref("year").gt(lit(2009.5f64))));
        assert!(!can_satisfy(
            &partition,
            &field_ref("year").in_list(vec![lit(2009.5f64), lit(2010.25f64)], false)
        ));
        assert!(can_satisfy(
            &partition,
            &field_ref("year").in_list(vec![lit(2009.5f64), lit(2009.0f64)], false)
        ));
    }

    #[test]
    fn test_equality_with_cast_literals() {
        let partition = year_month(2009, 11);
        // Filter literals are int32 while the partition values are int16/int8
        assert!(can_satisfy(&partition, &field_ref("year").eq(lit(2009))));
        assert!(!can_satisfy(&partition, &field_ref("year").eq(lit(2010))));
        assert!(!can_satisfy(&partition, &lit(2010).eq(field_ref("year"))));
        assert!(can_satisfy(&partition, &field_ref("year").not_eq(lit(2010))));
    }

    #[test]
    fn test_ranges_and_lists() {
        let partition = year_month(2009, 11);
        assert!(!can_satisfy(&partition, &field_ref("year").gt(lit(2009))));
        assert!(can_satisfy(&partition, &field_ref("year").gt_eq(lit(2009))));
        assert!(!can_satisfy(&partition, &field_ref("month").lt(lit(3))));
        assert!(can_satisfy(
            &partition,
            &field_ref("month").between(lit(10), lit(12))
        ));
        assert!(!can_satisfy(
            &partition,
            &field_ref("month").not_between(lit(10), lit(12))
        ));
        assert!(can_satisfy(
            &partition,
            &field_ref("month").in_list(vec![lit(1), lit(11)], false)
        ));
        assert!(!can_satisfy(
            &partition,
            &field_ref("month").in_list(vec![lit(1), lit(2)], false)
        ));
        assert!(!can_satisfy(
            &partition,
            &field_ref("month").in_list(vec![lit(11)], true)
        ));
    }

    #[test]
    fn test_three_valued_logic() {
        let partition = year_month(2009, 11);
        let unknown = field_ref("reading").gt(lit(1.5));
        let no = field_ref("year").eq(lit(2010));
        let yes = field_ref("year").eq(lit(2009));

        // Unbound columns are undecidable
        assert!(can_satisfy(&partition, &unknown));
        assert!(!can_satisfy(&partition, &unknown.clone().and(no.clone())));
        assert!(can_satisfy(&partition, &unknown.clone().or(no.clone())));
        assert!(can_satisfy(&partition, &no.clone().or(yes.clone())));
        assert!(!can_satisfy(&partition, &Expr::Not(Box::new(yes))));
        assert!(can_satisfy(&partition, &Expr::Not(Box::new(unknown))));
        assert!(!can_satisfy(&partition, &no.alias("x")));
        assert!(!can_satisfy(&partition, &lit(false)));
    }

    #[test]
    fn test_string_values() {
        let partition = equal(field_ref("site"), lit("north"));
        assert!(can_satisfy(&partition, &field_ref("site").eq(lit("north"))));
        assert!(!can_satisfy(&partition, &field_ref("site").eq(lit("south"))));
        // Uncastable comparison stays undecided
        assert!(can_satisfy(&partition, &field_ref("site").eq(lit(3))));
    }

    #[test]
    fn test_partition_contradictions() {
        assert!(!can_satisfy(&lit(false), &trivial()));
        let conflicting = and_all(vec![
            equal(field_ref("year"), lit(2009)),
            equal(field_ref("year"), lit(2010)),
        ]);
        // Conflicting bindings are not resolved, so nothing is pruned on that column
        assert!(can_satisfy(&conflicting, &field_ref("year").eq(lit(2011))));
    }
}
