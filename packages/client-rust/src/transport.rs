//! Remote query transport boundary.
//!
//! [`QueryTransport`] is the seam between the loader and whatever executes
//! queries remotely. The wire shape is dictated entirely by the external
//! service; this crate only assumes collection-scoped
//! filter/sort/skip/limit/get/count semantics and a human-readable failure
//! message on error.
//!
//! [`MemoryTransport`] is the in-process implementation used by tests and
//! demos. It evaluates queries with remote-side semantics -- clause order is
//! honored and keyword search is a case-insensitive match, unlike the local
//! provider's case-sensitive containment.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use regex::Regex;
use serde_json::Value;
use specdeck_core::{Clause, Filter, RemoteQuery};
use tracing::debug;

use crate::value::{fields_match, sort_records};

// ---------------------------------------------------------------------------
// Trait and result types
// ---------------------------------------------------------------------------

/// One page of raw records returned by a transport.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub data: Vec<Value>,
}

/// Failures raised by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Backend-reported failure with a human-readable message. The message
    /// is what the error classifier sees.
    #[error("{message}")]
    Backend { message: String },
    /// The backend replied, but the payload did not decode.
    #[error("malformed backend payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        TransportError::Backend {
            message: message.into(),
        }
    }
}

/// Collection-scoped query execution against the remote service.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Executes a built query and returns one page of records.
    async fn fetch(&self, query: &RemoteQuery) -> Result<QueryPage, TransportError>;

    /// Counts records matching `filter`, ignoring sort and pagination.
    async fn count(&self, collection: &str, filter: Option<&Filter>)
        -> Result<u64, TransportError>;
}

// ---------------------------------------------------------------------------
// MemoryTransport
// ---------------------------------------------------------------------------

/// In-memory [`QueryTransport`] for tests, demos, and ephemeral data.
///
/// Collections are plain record vectors. An injected failure message makes
/// every call fail until cleared, which is how tests exercise the loader's
/// classification and fallback paths.
#[derive(Default)]
pub struct MemoryTransport {
    collections: DashMap<String, Vec<Value>>,
    failure: Mutex<Option<String>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a collection.
    pub fn insert_collection(&self, name: impl Into<String>, records: Vec<Value>) {
        self.collections.insert(name.into(), records);
    }

    /// Makes every subsequent call fail with `message` until cleared.
    pub fn inject_failure(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(message.into());
    }

    /// Clears a previously injected failure.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }

    fn injected_failure(&self) -> Option<String> {
        self.failure
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn matches(record: &Value, filter: &Filter) -> bool {
        match filter {
            Filter::Fields(conditions) => fields_match(record, conditions),
            Filter::AnyFieldMatches { fields, keyword } => {
                // Remote keyword search is a case-insensitive match; the
                // keyword itself is taken literally.
                let pattern = format!("(?i){}", regex::escape(keyword));
                let Ok(re) = Regex::new(&pattern) else {
                    return false;
                };
                fields.iter().any(|field| {
                    record
                        .get(field)
                        .and_then(Value::as_str)
                        .is_some_and(|s| re.is_match(s))
                })
            }
        }
    }

    fn collection_or_error(&self, name: &str) -> Result<Vec<Value>, TransportError> {
        self.collections.get(name).map(|r| r.clone()).ok_or_else(|| {
            TransportError::backend(format!("database collection not exist: {name}"))
        })
    }
}

#[async_trait]
impl QueryTransport for MemoryTransport {
    async fn fetch(&self, query: &RemoteQuery) -> Result<QueryPage, TransportError> {
        if let Some(message) = self.injected_failure() {
            return Err(TransportError::backend(message));
        }

        let mut records = self.collection_or_error(&query.collection)?;
        debug!(
            collection = %query.collection,
            clauses = query.clauses.len(),
            "memory transport executing query"
        );

        // Clauses are interpreted strictly in the order the builder emitted
        // them, matching the remote query language's evaluation model.
        for clause in &query.clauses {
            match clause {
                Clause::Where(filter) => records.retain(|r| Self::matches(r, filter)),
                Clause::OrderBy(sort) => sort_records(&mut records, sort),
                Clause::Skip(n) => {
                    let n = usize::try_from(*n).unwrap_or(usize::MAX);
                    records = records.into_iter().skip(n).collect();
                }
                Clause::Limit(n) => {
                    let n = usize::try_from(*n).unwrap_or(usize::MAX);
                    records.truncate(n);
                }
            }
        }

        Ok(QueryPage { data: records })
    }

    async fn count(&self, collection: &str, filter: Option<&Filter>)
        -> Result<u64, TransportError> {
        if let Some(message) = self.injected_failure() {
            return Err(TransportError::backend(message));
        }

        let records = self.collection_or_error(collection)?;
        let matching = match filter {
            Some(filter) => records.iter().filter(|r| Self::matches(r, filter)).count(),
            None => records.len(),
        };
        Ok(matching as u64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
