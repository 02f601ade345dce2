//! Query model shared by remote transports and the local dataset provider.
//!
//! A [`QuerySpec`] describes what a caller wants (filter, sort, whether a
//! total count is needed); a [`PageCursor`] describes which slice; a
//! [`RemoteQuery`] is the fully-built, clause-ordered form handed to a
//! transport. Filters are data, not closures, so both the remote backend
//! and the in-process dataset provider can evaluate the same spec.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Sort direction for query ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Comparison operators usable in a [`FieldCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Condition applied to a single field: either a bare value (equality) or an
/// explicit comparator/value pair.
///
/// Untagged so that `"Intel"` and `{"op": "gte", "value": 2000}` both
/// deserialize naturally. `Cmp` is listed first: untagged resolution tries
/// variants in order, and a bare-value `Eq` would otherwise swallow the
/// comparator map shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldCondition {
    Cmp {
        op: Comparator,
        value: serde_json::Value,
    },
    Eq(serde_json::Value),
}

/// Declarative filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    /// Per-field conditions, combined with logical AND.
    Fields(BTreeMap<String, FieldCondition>),
    /// Keyword match against any of the listed fields (logical OR). Produced
    /// by the loader's `search` operation.
    #[serde(rename_all = "camelCase")]
    AnyFieldMatches { fields: Vec<String>, keyword: String },
}

impl Filter {
    /// Convenience constructor for a single-field equality filter.
    #[must_use]
    pub fn field_eq(field: impl Into<String>, value: serde_json::Value) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), FieldCondition::Eq(value));
        Filter::Fields(fields)
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

/// Sort clause: field name plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

// ---------------------------------------------------------------------------
// QuerySpec
// ---------------------------------------------------------------------------

/// What a caller wants from a collection, independent of pagination.
///
/// Immutable for the duration of one load call; a new search replaces it
/// wholesale rather than mutating it in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sort: Option<SortSpec>,
    /// Whether the loader should issue a separate total-count call on refresh.
    #[serde(default)]
    pub with_count: bool,
}

// ---------------------------------------------------------------------------
// PageCursor
// ---------------------------------------------------------------------------

/// Paging position: zero-based page index and page size.
///
/// `skip` is always derived as `page_index * page_size`, never stored, so the
/// two cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageCursor {
    /// Creates a cursor at page 0. `page_size` must be greater than zero.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        debug_assert!(page_size > 0, "page_size must be > 0");
        Self {
            page_index: 0,
            page_size,
        }
    }

    /// Number of records to skip for the current page.
    #[must_use]
    pub fn skip(&self) -> usize {
        self.page_index * self.page_size
    }

    /// Resets to the first page (refresh / new search).
    pub fn rewind(&mut self) {
        self.page_index = 0;
    }

    /// Moves to the next page after a successful load-more.
    pub fn advance(&mut self) {
        self.page_index += 1;
    }
}

// ---------------------------------------------------------------------------
// RemoteQuery
// ---------------------------------------------------------------------------

/// A single clause of a built remote query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Where(Filter),
    OrderBy(SortSpec),
    Skip(u64),
    Limit(u64),
}

/// A fully-built query against a remote collection.
///
/// Clauses are ordered: the remote query language requires filter before
/// sort before pagination, so the builder emits them in that canonical
/// order and transports interpret them in sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteQuery {
    pub collection: String,
    pub clauses: Vec<Clause>,
}

impl RemoteQuery {
    /// The `Where` clause, if present.
    #[must_use]
    pub fn filter(&self) -> Option<&Filter> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Where(f) => Some(f),
            _ => None,
        })
    }

    /// The `OrderBy` clause, if present.
    #[must_use]
    pub fn sort(&self) -> Option<&SortSpec> {
        self.clauses.iter().find_map(|c| match c {
            Clause::OrderBy(s) => Some(s),
            _ => None,
        })
    }

    /// The `Skip` offset, 0 when absent.
    #[must_use]
    pub fn skip(&self) -> u64 {
        self.clauses
            .iter()
            .find_map(|c| match c {
                Clause::Skip(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// The `Limit`, if present.
    #[must_use]
    pub fn limit(&self) -> Option<u64> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Limit(n) => Some(*n),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
