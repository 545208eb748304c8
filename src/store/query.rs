//! Query evaluation shared by every backend.
//!
//! Backends may push filters down to their own engine, but ordering and
//! limits always go through `sort_and_limit` so all stores agree on order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::traits::{Direction, Document, Fields, OrderBy, Query, SortKind};
use crate::timestamp;

/// Whether a document's fields satisfy every equality filter.
///
/// Numbers compare by value, so `3` matches `3.0` as it does in SQL.
pub fn matches(fields: &Fields, filters: &[(String, Value)]) -> bool {
    filters.iter().all(|(field, expected)| {
        fields
            .get(field)
            .is_some_and(|actual| values_equal(actual, expected))
    })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Filter, order, and limit an id-ordered set of documents.
pub fn apply(docs: Vec<Document>, query: &Query) -> Vec<Document> {
    let filtered = docs
        .into_iter()
        .filter(|d| matches(&d.fields, &query.filters))
        .collect();
    sort_and_limit(filtered, query)
}

/// Order and limit documents that already passed the filters.
///
/// The sort is stable, so ties keep the incoming (id) order.
pub fn sort_and_limit(mut docs: Vec<Document>, query: &Query) -> Vec<Document> {
    if let Some(order) = &query.order_by {
        docs.sort_by(|a, b| compare_documents(a, b, order));
    }
    if let Some(limit) = query.limit {
        docs.truncate(limit);
    }
    docs
}

/// Compare two documents by an order-by clause.
///
/// Documents missing the field sort last in either direction. A null counts
/// as missing, and so does any value that is not an instant when ordering by
/// `SortKind::Instant`.
pub fn compare_documents(a: &Document, b: &Document, order: &OrderBy) -> Ordering {
    let ord = match order.kind {
        SortKind::Value => present_last(
            sort_value(a, &order.field),
            sort_value(b, &order.field),
            |x, y| compare_values(x, y),
        ),
        SortKind::Instant => present_last(
            sort_value(a, &order.field).and_then(timestamp::decode),
            sort_value(b, &order.field).and_then(timestamp::decode),
            |x, y| x.cmp(y),
        ),
    };
    match (ord, order.direction) {
        (Presence::Both(ord), Direction::Ascending) => ord,
        (Presence::Both(ord), Direction::Descending) => ord.reverse(),
        (Presence::Fixed(ord), _) => ord,
    }
}

fn sort_value<'a>(doc: &'a Document, field: &str) -> Option<&'a Value> {
    doc.get(field).filter(|v| !v.is_null())
}

enum Presence {
    /// Both sides present; subject to the sort direction.
    Both(Ordering),
    /// At least one side missing; missing always goes last.
    Fixed(Ordering),
}

fn present_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Presence {
    match (a, b) {
        (None, None) => Presence::Fixed(Ordering::Equal),
        (Some(_), None) => Presence::Fixed(Ordering::Less),
        (None, Some(_)) => Presence::Fixed(Ordering::Greater),
        (Some(x), Some(y)) => Presence::Both(cmp(&x, &y)),
    }
}

#[derive(Debug)]
enum SortKey<'a> {
    Number(f64),
    Instant(DateTime<Utc>),
    Text(&'a str),
    Other(String),
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Instant(_) => 1,
            Self::Text(_) => 2,
            Self::Other(_) => 3,
        }
    }
}

fn sort_key(value: &Value) -> SortKey<'_> {
    if let Some(at) = timestamp::decode(value) {
        return SortKey::Instant(at);
    }
    match value {
        Value::Number(n) => SortKey::Number(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => SortKey::Text(s),
        other => SortKey::Other(other.to_string()),
    }
}

/// Total order over stored values: instants as instants, numbers numerically,
/// strings lexically, mixed kinds by kind.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (sort_key(a), sort_key(b)) {
        (SortKey::Instant(x), SortKey::Instant(y)) => x.cmp(&y),
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (SortKey::Other(x), SortKey::Other(y)) => x.cmp(&y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}
