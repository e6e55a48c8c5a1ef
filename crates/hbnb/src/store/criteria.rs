//! Attribute criteria.
//!
//! A [`Criteria`] is a conjunction of [`AttrFilter`]s evaluated against a
//! stored document. A filter on a field the document does not have never
//! matches, so unknown attribute names simply produce no results.

use crate::model::FieldMap;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrFilter {
    pub attr: String,
    pub op: FilterOp,
    pub value: Value,
}

impl AttrFilter {
    pub fn new(attr: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            attr: attr.into(),
            op,
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &FieldMap) -> bool {
        let Some(actual) = doc.get(&self.attr) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Ne => !values_equal(actual, &self.value),
        }
    }
}

/// JSON equality, except that numbers compare by value (`5 == 5.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    filters: Vec<AttrFilter>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality on every entry of `map`.
    pub fn from_map(map: &FieldMap) -> Self {
        Self {
            filters: map
                .iter()
                .map(|(k, v)| AttrFilter::new(k.as_str(), FilterOp::Eq, v.clone()))
                .collect(),
        }
    }

    pub fn eq(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(AttrFilter::new(attr, FilterOp::Eq, value));
        self
    }

    pub fn ne(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(AttrFilter::new(attr, FilterOp::Ne, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[AttrFilter] {
        &self.filters
    }

    /// Empty criteria match everything.
    pub fn matches(&self, doc: &FieldMap) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}
