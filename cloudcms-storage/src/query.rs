//! Filtered, ordered, limited queries over schemaless documents.
//!
//! Field paths are dotted (`header.lastChanged`). A document that lacks a
//! filtered or ordered field never matches, the same way a datastore index
//! omits it. Ties in the order field are broken by key, in the same
//! direction, so results are deterministic across backends.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::key::DocKey;
use cloudcms_core::Timestamp;

/// Typed comparison operand.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Bool(bool),
    Time(Timestamp),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(v: Timestamp) -> Self {
        FieldValue::Time(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl FilterOp {
    fn accepts(&self, ord: Ordering) -> bool {
        match self {
            FilterOp::Eq => ord == Ordering::Equal,
            FilterOp::Gt => ord == Ordering::Greater,
            FilterOp::Ge => ord != Ordering::Less,
            FilterOp::Lt => ord == Ordering::Less,
            FilterOp::Le => ord != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: String,
    pub ancestor: Option<DocKey>,
    pub filters: Vec<Filter>,
    pub order: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ancestor: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn ancestor(mut self, ancestor: DocKey) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<FieldValue>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn ge(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOp::Ge, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOp::Gt, value)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether one stored document satisfies kind, ancestor and filters.
    pub fn matches(&self, key: &DocKey, doc: &Value) -> bool {
        if key.kind != self.kind {
            return false;
        }
        if let Some(ancestor) = &self.ancestor {
            if !key.has_ancestor(ancestor) {
                return false;
            }
        }
        if let Some((field, _)) = &self.order {
            if lookup(doc, field).is_none() {
                return false;
            }
        }
        self.filters.iter().all(|f| {
            lookup(doc, &f.field)
                .and_then(|v| compare_field(v, &f.value))
                .is_some_and(|ord| f.op.accepts(ord))
        })
    }

    /// Filter, order and limit a candidate set.
    pub fn execute(&self, candidates: Vec<(DocKey, Value)>) -> Vec<(DocKey, Value)> {
        let mut hits: Vec<(DocKey, Value)> = candidates
            .into_iter()
            .filter(|(key, doc)| self.matches(key, doc))
            .collect();

        match &self.order {
            Some((field, direction)) => {
                hits.sort_by(|(ka, da), (kb, db)| {
                    let primary = match (lookup(da, field), lookup(db, field)) {
                        (Some(a), Some(b)) => compare_values(a, b),
                        _ => Ordering::Equal,
                    };
                    let ord = primary.then_with(|| ka.cmp(kb));
                    match direction {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    }
                });
            }
            None => hits.sort_by(|(ka, _), (kb, _)| ka.cmp(kb)),
        }

        if let Some(limit) = self.limit {
            hits.truncate(limit);
        }
        hits
    }

    /// Number of matching documents, ignoring the limit.
    pub fn count<'a>(&self, candidates: impl IntoIterator<Item = (&'a DocKey, &'a Value)>) -> usize {
        candidates
            .into_iter()
            .filter(|(key, doc)| self.matches(key, doc))
            .count()
    }
}

/// Resolve a dotted path. `null` counts as missing.
fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    (!current.is_null()).then_some(current)
}

fn parse_time(value: &Value) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(value.as_str()?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compare a stored value against a typed operand. `None` on type mismatch.
fn compare_field(stored: &Value, operand: &FieldValue) -> Option<Ordering> {
    match operand {
        FieldValue::Int(v) => stored.as_i64().map(|s| s.cmp(v)),
        FieldValue::Text(v) => stored.as_str().map(|s| s.cmp(v.as_str())),
        FieldValue::Bool(v) => stored.as_bool().map(|s| s.cmp(v)),
        FieldValue::Time(v) => parse_time(stored).map(|s| s.cmp(v)),
    }
}

/// Order two stored values. Timestamps compare chronologically, not by text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => match (parse_time(a), parse_time(b)) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
