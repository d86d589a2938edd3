//! Typed query DSL
//!
//! A small subset of the engine's JSON query language, enough for the shapes
//! this crate builds. Each type serializes to exactly the JSON the engine
//! expects, so a malformed clause cannot be expressed.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ============================================================================
// REQUEST BODY
// ============================================================================

/// Top-level `_search` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBody {
    pub query: Query,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<FieldSort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
}

impl SearchBody {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            sort: None,
            size: None,
            from: None,
        }
    }

    pub fn with_sort(mut self, sort: FieldSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_from(mut self, from: u32) -> Self {
        self.from = Some(from);
        self
    }

    /// Encode as a JSON value for the transport.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

// ============================================================================
// SORT
// ============================================================================

/// Sort direction. Only descending sorts are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Desc,
}

/// Sort on one document field: `{"<field>": {"order": "desc"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSort {
    pub field: String,
    pub order: SortOrder,
}

impl FieldSort {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl Serialize for FieldSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Order {
            order: SortOrder,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &Order { order: self.order })?;
        map.end()
    }
}

// ============================================================================
// QUERIES
// ============================================================================

/// Query clause. Serializes externally tagged: `{"match": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Match(FieldClause<MatchClause>),
    Term(FieldClause<bool>),
    Range(FieldClause<RangeClause>),
    Bool(BoolQuery),
    MultiMatch(MultiMatchQuery),
    QueryString(QueryStringQuery),
}

impl Query {
    /// Full-text `match` of `text` against `field`.
    pub fn matching(field: impl Into<String>, text: impl Into<String>) -> Self {
        Query::Match(FieldClause::new(
            field,
            MatchClause {
                query: text.into(),
            },
        ))
    }

    /// Exact `term` match on a boolean field.
    pub fn term(field: impl Into<String>, value: bool) -> Self {
        Query::Term(FieldClause::new(field, value))
    }

    pub fn range(field: impl Into<String>, range: RangeClause) -> Self {
        Query::Range(FieldClause::new(field, range))
    }
}

/// A clause keyed by field name: `{"<field>": <clause>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldClause<T> {
    pub field: String,
    pub clause: T,
}

impl<T> FieldClause<T> {
    pub fn new(field: impl Into<String>, clause: T) -> Self {
        Self {
            field: field.into(),
            clause,
        }
    }
}

impl<T: Serialize> Serialize for FieldClause<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.clause)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchClause {
    pub query: String,
}

/// Upper bound of a `range` clause. The bound is an engine literal, including
/// date math such as `"now"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeClause {
    pub lte: String,
}

impl RangeClause {
    pub fn at_most(bound: impl Into<String>) -> Self {
        Self { lte: bound.into() }
    }
}

/// Compound boolean query.
///
/// `must` and `filter` restrict the match set; `should` only adds score when
/// at least one `must` or `filter` clause is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    /// Every term but the last must match; the last matches as a prefix.
    BoolPrefix,
}

/// Match one text against several fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    #[serde(rename = "type")]
    pub match_type: MultiMatchType,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOperator {
    And,
}

/// Engine query-string syntax, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryStringQuery {
    pub query: String,
    pub default_operator: BoolOperator,
    pub analyze_wildcard: bool,
    pub allow_leading_wildcard: bool,
    pub lenient: bool,
    pub default_field: String,
}
