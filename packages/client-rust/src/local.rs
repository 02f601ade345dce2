//! Local static dataset provider -- the fallback query target.
//!
//! Holds one static record vector per collection name, loaded once at
//! process start, and answers the same filter/sort/pagination queries the
//! remote backend would, entirely in memory. This is the normal degraded
//! mode when the backend is unavailable, not an error path.

use dashmap::DashMap;
use serde_json::Value;
use specdeck_core::{Filter, PageCursor, QuerySpec};
use tracing::{debug, warn};

use crate::value::{fields_match, sort_records};

/// Result shape shared with the remote path: records plus paging facts.
#[derive(Debug, Clone, Default)]
pub struct LocalQueryResult {
    pub records: Vec<Value>,
    pub has_more: bool,
    /// Count of records matching the filter, before pagination.
    pub total: usize,
}

/// Registry of static per-collection datasets.
pub struct LocalDatasetProvider {
    datasets: DashMap<String, Vec<Value>>,
}

impl LocalDatasetProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            datasets: DashMap::new(),
        }
    }

    /// Registers (or replaces) the dataset backing `collection`.
    pub fn register(&self, collection: impl Into<String>, records: Vec<Value>) {
        let collection = collection.into();
        debug!(collection = %collection, records = records.len(), "registered local dataset");
        self.datasets.insert(collection, records);
    }

    /// Registers a dataset from a JSON array string (the seeded-dataset
    /// format produced by the conversion utility).
    ///
    /// # Errors
    ///
    /// Fails when `json` is not a JSON array.
    pub fn register_json(
        &self,
        collection: impl Into<String>,
        json: &str,
    ) -> Result<(), serde_json::Error> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        self.register(collection, records);
        Ok(())
    }

    /// True when a dataset is registered for `collection`.
    #[must_use]
    pub fn has_collection(&self, collection: &str) -> bool {
        self.datasets.contains_key(collection)
    }

    fn matches(record: &Value, filter: &Filter) -> bool {
        match filter {
            Filter::Fields(conditions) => fields_match(record, conditions),
            Filter::AnyFieldMatches { fields, keyword } => {
                // Case-SENSITIVE containment, unlike the remote side's
                // case-insensitive match. Deliberate simplification for the
                // offline path; documented in DESIGN.md.
                fields.iter().any(|field| {
                    record
                        .get(field)
                        .and_then(Value::as_str)
                        .is_some_and(|s| s.contains(keyword.as_str()))
                })
            }
        }
    }

    /// Runs the equivalent of a remote query against the static dataset.
    ///
    /// An unregistered collection is a configuration error: it is logged and
    /// answered with an empty result rather than a failure, so a misseeded
    /// build degrades to an empty list instead of an error screen.
    #[must_use]
    pub fn query(&self, collection: &str, spec: &QuerySpec, cursor: &PageCursor)
        -> LocalQueryResult {
        let Some(dataset) = self.datasets.get(collection) else {
            warn!(collection = %collection, "no local dataset for collection");
            return LocalQueryResult::default();
        };

        let mut matching: Vec<Value> = match &spec.filter {
            Some(filter) => dataset
                .iter()
                .filter(|r| Self::matches(r, filter))
                .cloned()
                .collect(),
            None => dataset.value().clone(),
        };
        drop(dataset);

        if let Some(sort) = &spec.sort {
            sort_records(&mut matching, sort);
        }

        let total = matching.len();
        let skip = cursor.skip();
        let has_more = skip + cursor.page_size < total;
        let records: Vec<Value> = matching
            .into_iter()
            .skip(skip)
            .take(cursor.page_size)
            .collect();

        debug!(
            collection = %collection,
            returned = records.len(),
            total,
            has_more,
            "local dataset query"
        );
        LocalQueryResult {
            records,
            has_more,
            total,
        }
    }
}

impl Default for LocalDatasetProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
