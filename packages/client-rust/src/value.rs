//! In-process evaluation helpers over raw JSON records.
//!
//! Shared by the local dataset provider and the in-memory transport: field
//! lookup, a cross-type total order for sorting, and per-field condition
//! checks. Keyword matching is NOT here -- the remote and local sides
//! deliberately differ on it (case-insensitive regex vs. case-sensitive
//! containment) and each implements its own.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;
use specdeck_core::{Comparator, FieldCondition, SortDirection, SortSpec};

/// Rank used to order values of different JSON types against each other.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by type rank first, then within-type.
///
/// Numbers compare numerically, strings lexicographically, booleans
/// false-before-true; arrays and objects compare by size only. Missing
/// fields are compared as `Null`, which sorts before everything.
pub(crate) fn compare(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => Ordering::Equal,
    }
}

/// Looks up a top-level field, treating absence as `Null`.
pub(crate) fn field_of<'v>(record: &'v Value, field: &str) -> &'v Value {
    record.get(field).unwrap_or(&Value::Null)
}

/// Evaluates one field condition against a record.
fn condition_holds(record: &Value, field: &str, condition: &FieldCondition) -> bool {
    let actual = field_of(record, field);
    match condition {
        FieldCondition::Eq(expected) => actual == expected,
        FieldCondition::Cmp { op, value } => {
            let ord = compare(actual, value);
            match op {
                Comparator::Eq => ord == Ordering::Equal,
                Comparator::Neq => ord != Ordering::Equal,
                Comparator::Gt => ord == Ordering::Greater,
                Comparator::Gte => ord != Ordering::Less,
                Comparator::Lt => ord == Ordering::Less,
                Comparator::Lte => ord != Ordering::Greater,
            }
        }
    }
}

/// True when every per-field condition holds (logical AND).
pub(crate) fn fields_match(record: &Value, conditions: &BTreeMap<String, FieldCondition>) -> bool {
    conditions
        .iter()
        .all(|(field, condition)| condition_holds(record, field, condition))
}

/// Stable sort on one field. `Desc` reverses the comparator, not the sorted
/// list, so equal keys keep their input order either way.
pub(crate) fn sort_records(records: &mut [Value], sort: &SortSpec) {
    records.sort_by(|a, b| {
        let ord = compare(field_of(a, &sort.field), field_of(b, &sort.field));
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
