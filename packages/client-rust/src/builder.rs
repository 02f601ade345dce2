//! Remote query construction.
//!
//! Translates a [`QuerySpec`] plus [`PageCursor`] into the clause-ordered
//! [`RemoteQuery`] form. The remote query language requires filter before
//! sort before pagination; the builder is the only producer of
//! [`RemoteQuery`] values, so the canonical order is enforced in exactly one
//! place.

use std::sync::Arc;

use specdeck_core::{Clause, PageCursor, QuerySpec, RemoteQuery};
use tracing::debug;

use crate::probe::AvailabilityProbe;

/// Errors raised while building a remote query.
///
/// Building against an unavailable backend is a precondition violation by
/// the call site (the loader must consult the probe first), fatal to the
/// call and never retried.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("query backend unavailable; probe must be confirmed before building")]
    BackendUnavailable,
}

/// Builds clause-ordered remote queries, re-checking availability as a
/// precondition.
pub struct QueryBuilder {
    probe: Arc<dyn AvailabilityProbe>,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(probe: Arc<dyn AvailabilityProbe>) -> Self {
        Self { probe }
    }

    fn check_available(&self) -> Result<(), BuildError> {
        if self.probe.is_available() {
            Ok(())
        } else {
            Err(BuildError::BackendUnavailable)
        }
    }

    fn push_pagination(clauses: &mut Vec<Clause>, cursor: &PageCursor) {
        clauses.push(Clause::Skip(cursor.skip() as u64));
        clauses.push(Clause::Limit(cursor.page_size as u64));
    }

    /// Builds the full query: filter, sort, skip, limit -- in that order.
    ///
    /// # Errors
    ///
    /// [`BuildError::BackendUnavailable`] when the probe was not confirmed.
    pub fn build(
        &self,
        collection: &str,
        spec: &QuerySpec,
        cursor: &PageCursor,
    ) -> Result<RemoteQuery, BuildError> {
        self.check_available()?;

        let mut clauses = Vec::with_capacity(4);
        if let Some(filter) = &spec.filter {
            clauses.push(Clause::Where(filter.clone()));
        }
        if let Some(sort) = &spec.sort {
            clauses.push(Clause::OrderBy(sort.clone()));
        }
        Self::push_pagination(&mut clauses, cursor);

        debug!(
            collection,
            skip = cursor.skip(),
            limit = cursor.page_size,
            "built remote query"
        );
        Ok(RemoteQuery {
            collection: collection.to_string(),
            clauses,
        })
    }

    /// Builds the same query without the sort clause -- the degraded-retry
    /// form used after a sort-field failure or a suspicious empty result.
    ///
    /// # Errors
    ///
    /// [`BuildError::BackendUnavailable`] when the probe was not confirmed.
    pub fn build_without_sort(
        &self,
        collection: &str,
        spec: &QuerySpec,
        cursor: &PageCursor,
    ) -> Result<RemoteQuery, BuildError> {
        self.check_available()?;

        let mut clauses = Vec::with_capacity(3);
        if let Some(filter) = &spec.filter {
            clauses.push(Clause::Where(filter.clone()));
        }
        Self::push_pagination(&mut clauses, cursor);

        debug!(collection, "built remote query without sort clause");
        Ok(RemoteQuery {
            collection: collection.to_string(),
            clauses,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
