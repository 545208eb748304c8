//! `DocumentStore` trait: the async interface to the schemaless store.
//!
//! Documents live at `(collection, id)` and carry a flat JSON object of
//! top-level fields. Writes merge top-level fields; nested objects are
//! replaced wholesale.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Top-level fields of a document.
pub type Fields = Map<String, Value>;

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Deserialize the fields into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            StoreError::Serialization(format!("document {}: {e}", self.id))
        })
    }
}

/// Sort direction for `Query::order_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// How an order-by field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKind {
    /// Any stored value; mixed kinds order by kind.
    #[default]
    Value,
    /// Only values that decode as instants count; anything else sorts as missing.
    Instant,
}

/// Ordering clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
    pub kind: SortKind,
}

/// A collection query: equality filters, optional ordering, optional limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    /// Start a query over every document in `collection`.
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Builder: require `field == value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Builder: order results by `field`.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
            kind: SortKind::Value,
        });
        self
    }

    /// Builder: order results by the instant stored in `field`.
    pub fn order_by_instant(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
            kind: SortKind::Instant,
        });
        self
    }

    /// Builder: cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One write inside a `batch_write`.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOp {
    pub collection: String,
    pub id: String,
    pub fields: Fields,
}

impl WriteOp {
    pub fn set(collection: impl Into<String>, id: impl Into<String>, fields: Fields) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            fields,
        }
    }
}

/// Backend-agnostic document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Run a collection query.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Merge `fields` into the document, creating it if missing.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with `StoreError::NotFound` if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Apply several `set` writes all-or-nothing.
    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;
}

/// Merge top-level `incoming` fields into `target`.
pub(crate) fn merge_fields(target: &mut Fields, incoming: Fields) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_builder_collects_clauses() {
        let q = Query::collection("workoutPlans")
            .where_eq("userId", "u1")
            .order_by("createdAt", Direction::Descending)
            .limit(1);

        assert_eq!(q.collection, "workoutPlans");
        assert_eq!(q.filters, vec![("userId".to_string(), json!("u1"))]);
        assert_eq!(q.order_by.as_ref().unwrap().direction, Direction::Descending);
        assert_eq!(q.limit, Some(1));
        assert_eq!(q.order_by.as_ref().unwrap().kind, SortKind::Value);

        let q = q.order_by_instant("createdAt", Direction::Ascending);
        let order = q.order_by.unwrap();
        assert_eq!(order.kind, SortKind::Instant);
        assert_eq!(order.direction, Direction::Ascending);
    }

    #[test]
    fn merge_replaces_top_level_only() {
        let mut target = json!({"a": 1, "nested": {"x": 1, "y": 2}})
            .as_object()
            .cloned()
            .unwrap();
        let incoming = json!({"nested": {"x": 9}, "b": true})
            .as_object()
            .cloned()
            .unwrap();

        merge_fields(&mut target, incoming);

        assert_eq!(target["a"], 1);
        assert_eq!(target["b"], true);
        // Nested objects are replaced, not deep-merged
        assert_eq!(target["nested"], json!({"x": 9}));
    }

    #[test]
    fn decode_reports_document_id() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Strict {
            count: u32,
        }

        let doc = Document::new("d1", json!({"count": "many"}).as_object().cloned().unwrap());
        let err = doc.decode::<Strict>().unwrap_err();
        assert!(err.to_string().contains("d1"));
    }
}
