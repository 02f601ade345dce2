//! The data loader: load/refresh/load-more/search protocol over one
//! collection.
//!
//! Owns the paging cursor and load state, consults the availability probe
//! before every query, dispatches to the query builder, interprets the
//! error classifier's verdict, and falls back to the local dataset provider
//! when warranted. The loader is the only component that decides recovery
//! action -- the builder and the local provider either succeed or fail
//! outright.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use specdeck_core::{
    classify, Document, ErrorCategory, ErrorInfo, Filter, LoadState, PageCursor, Phase, QuerySpec,
};
use tracing::{debug, error, warn};

use crate::builder::QueryBuilder;
use crate::config::LoaderConfig;
use crate::local::LocalDatasetProvider;
use crate::notify::{Notifier, ToastKind, TracingNotifier};
use crate::probe::AvailabilityProbe;
use crate::transport::QueryTransport;

// ---------------------------------------------------------------------------
// Internal load outcome
// ---------------------------------------------------------------------------

/// Result of one pass through the load protocol.
struct LoadOutcome<T> {
    records: Vec<T>,
    has_more: bool,
    /// New total, when this pass learned one (count fetch, local fallback,
    /// or sort-retry recompute). `None` keeps the prior value.
    total: Option<u64>,
    error: Option<ErrorInfo>,
}

impl<T> LoadOutcome<T> {
    fn empty_with_error(error: ErrorInfo) -> Self {
        Self {
            records: Vec::new(),
            has_more: false,
            total: None,
            error: Some(error),
        }
    }
}

fn decode_records<T: Document>(values: Vec<Value>) -> Result<Vec<T>, serde_json::Error> {
    values.into_iter().map(serde_json::from_value).collect()
}

// ---------------------------------------------------------------------------
// DataLoader
// ---------------------------------------------------------------------------

/// Incremental loader for one remote collection with transparent local
/// fallback.
///
/// Single logical thread of control: operations take `&mut self` and only
/// suspend at the transport boundary, so no two load protocols can ever run
/// concurrently for the same instance. The phase flags remain observable
/// entry guards implementing the no-op semantics (`load_more` while busy or
/// finished, `refresh` while already in flight).
pub struct DataLoader<T: Document> {
    collection: String,
    config: LoaderConfig,
    spec: QuerySpec,
    cursor: PageCursor,
    state: LoadState,
    list: Vec<T>,
    builder: QueryBuilder,
    probe: Arc<dyn AvailabilityProbe>,
    transport: Arc<dyn QueryTransport>,
    local: Arc<LocalDatasetProvider>,
    notifier: Arc<dyn Notifier>,
}

impl<T: Document> DataLoader<T> {
    pub fn new(
        collection: impl Into<String>,
        spec: QuerySpec,
        config: LoaderConfig,
        probe: Arc<dyn AvailabilityProbe>,
        transport: Arc<dyn QueryTransport>,
        local: Arc<LocalDatasetProvider>,
    ) -> Self {
        let cursor = PageCursor::new(config.page_size);
        Self {
            collection: collection.into(),
            config,
            spec,
            cursor,
            state: LoadState::default(),
            list: Vec::new(),
            builder: QueryBuilder::new(Arc::clone(&probe)),
            probe,
            transport,
            local,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Replaces the default tracing-backed notification sink.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // ---- observable state -------------------------------------------------

    #[must_use]
    pub fn list(&self) -> &[T] {
        &self.list
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.is_loading()
    }

    #[must_use]
    pub fn refreshing(&self) -> bool {
        self.state.is_refreshing()
    }

    #[must_use]
    pub fn finished(&self) -> bool {
        self.state.finished
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.state.error.as_ref()
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.cursor.page_index
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.cursor.page_size
    }

    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.state.total
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    // ---- operations -------------------------------------------------------

    /// Reloads the first page, replacing the list wholesale.
    ///
    /// No-op while an operation is already in flight. After a successful
    /// refresh returning records the cursor sits at page 1; a refresh
    /// returning nothing leaves it at page 0.
    pub async fn refresh(&mut self) {
        if !self.state.is_idle() {
            return;
        }

        self.cursor.rewind();
        self.state.finished = false;
        self.state.phase = Phase::Refreshing;
        self.notifier.toast(ToastKind::Loading, "Refreshing…");

        let outcome = self.run_load_protocol(true).await;
        let returned = outcome.records.len();

        self.list = outcome.records;
        self.cursor.page_index = usize::from(returned > 0);
        self.apply_outcome_tail(outcome.has_more, outcome.total, outcome.error);

        if self.state.error.is_none() {
            self.notifier.toast(ToastKind::Success, "Refresh complete");
        }
    }

    /// Loads the next page and appends it.
    ///
    /// No-op while an operation is in flight or the page sequence is
    /// finished: no state change, no query dispatched.
    pub async fn load_more(&mut self) {
        if !self.state.is_idle() || self.state.finished {
            return;
        }

        self.state.phase = Phase::Loading;
        self.notifier.toast(ToastKind::Loading, "Loading more…");

        let outcome = self.run_load_protocol(false).await;
        let returned = outcome.records.len();

        if returned > 0 {
            self.log_duplicate_ids(&outcome.records);
            self.list.extend(outcome.records);
            self.cursor.advance();
        }
        self.apply_outcome_tail(outcome.has_more, outcome.total, outcome.error);

        if returned == 0 && self.cursor.page_index > 0 && self.state.error.is_none() {
            self.notifier.toast(ToastKind::Info, "No more data");
        }
    }

    /// Keyword search across the default search fields.
    ///
    /// Replaces the spec's filter with an any-field-matches predicate and
    /// refreshes from page 0. A blank keyword clears the filter instead.
    pub async fn search(&mut self, keyword: &str) {
        let fields = self.config.search_fields.clone();
        self.search_in(keyword, fields).await;
    }

    /// Keyword search across an explicit field list.
    ///
    /// Rejected outright while an operation is in flight -- the spec filter
    /// is not touched, so a half-applied search can never occur.
    pub async fn search_in(&mut self, keyword: &str, fields: Vec<String>) {
        if !self.state.is_idle() {
            return;
        }
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.clear_search().await;
            return;
        }

        self.spec.filter = Some(Filter::AnyFieldMatches {
            fields,
            keyword: keyword.to_string(),
        });
        self.cursor.rewind();
        self.refresh().await;
    }

    /// Drops the search filter and refreshes.
    pub async fn clear_search(&mut self) {
        if !self.state.is_idle() {
            return;
        }
        self.spec.filter = None;
        self.refresh().await;
    }

    /// Clears list, state, cursor, and total. Leaves the spec untouched.
    pub fn reset(&mut self) {
        self.list.clear();
        self.state = LoadState::default();
        self.cursor.rewind();
    }

    // ---- load protocol ----------------------------------------------------

    fn apply_outcome_tail(&mut self, has_more: bool, total: Option<u64>, error: Option<ErrorInfo>) {
        if let Some(total) = total {
            self.state.total = Some(total);
        }
        self.state.finished = !has_more;
        self.state.error = error;
        self.state.phase = Phase::Idle;
    }

    fn log_duplicate_ids(&self, incoming: &[T]) {
        let existing: HashSet<&str> =
            self.list.iter().map(|r| r.id()).filter(|id| !id.is_empty()).collect();
        for record in incoming {
            if existing.contains(record.id()) {
                // Known gap: cross-page de-duplication is not enforced.
                debug!(id = record.id(), "appended page contains an id already in the list");
            }
        }
    }

    fn local_outcome(&self) -> LoadOutcome<T> {
        let result = self.local.query(&self.collection, &self.spec, &self.cursor);
        match decode_records(result.records) {
            Ok(records) => LoadOutcome {
                records,
                has_more: result.has_more,
                total: Some(result.total as u64),
                error: None,
            },
            Err(err) => {
                error!(collection = %self.collection, error = %err, "local dataset failed to decode");
                LoadOutcome::empty_with_error(ErrorInfo::new(
                    ErrorCategory::Unknown,
                    err.to_string(),
                ))
            }
        }
    }

    /// One pass of the shared load protocol (spec and cursor already point
    /// at the page to fetch). The caller owns phase transitions and list
    /// application.
    async fn run_load_protocol(&mut self, refreshing: bool) -> LoadOutcome<T> {
        self.state.error = None;

        // Degraded mode is the normal path when the backend is unusable,
        // not an error: the local provider answers the same spec/cursor.
        if !self.probe.is_available() {
            debug!(collection = %self.collection, "backend unavailable, serving local dataset");
            return self.local_outcome();
        }

        let query = match self.builder.build(&self.collection, &self.spec, &self.cursor) {
            Ok(query) => query,
            Err(err) => {
                // Availability flipped between the probe check and the
                // build. Precondition violation: fatal to this call.
                error!(collection = %self.collection, error = %err, "query build failed");
                return LoadOutcome::empty_with_error(ErrorInfo::new(
                    ErrorCategory::Unknown,
                    err.to_string(),
                ));
            }
        };

        let fetched = self.transport.fetch(&query).await;
        match fetched {
            Ok(page) => {
                let mut data = page.data;

                // A sorted query that returns nothing is suspicious -- the
                // sort field may not exist on any record. Double-check once
                // without the sort clause before accepting zero as final.
                if data.is_empty() && self.spec.sort.is_some() && self.config.verify_empty_sorted {
                    data = self.verify_empty_sorted().await;
                }

                let returned = data.len();
                match decode_records(data) {
                    Ok(records) => {
                        let total = self.fetch_total_if_wanted(refreshing).await;
                        LoadOutcome {
                            records,
                            has_more: returned == self.cursor.page_size,
                            total,
                            error: None,
                        }
                    }
                    Err(err) => {
                        error!(collection = %self.collection, error = %err, "page failed to decode");
                        LoadOutcome::empty_with_error(ErrorInfo::new(
                            ErrorCategory::Unknown,
                            err.to_string(),
                        ))
                    }
                }
            }
            Err(err) => self.recover(&err.to_string()).await,
        }
    }

    /// Re-runs the current page without the sort clause; a non-empty result
    /// replaces the suspicious empty one.
    async fn verify_empty_sorted(&self) -> Vec<Value> {
        debug!(collection = %self.collection, "sorted query returned nothing, re-checking without sort");
        let Ok(query) = self.builder.build_without_sort(&self.collection, &self.spec, &self.cursor)
        else {
            return Vec::new();
        };
        match self.transport.fetch(&query).await {
            Ok(page) if !page.data.is_empty() => {
                warn!(
                    collection = %self.collection,
                    recovered = page.data.len(),
                    "sort clause was hiding records"
                );
                page.data
            }
            Ok(_) => Vec::new(),
            Err(err) => {
                debug!(collection = %self.collection, error = %err, "unsorted double-check failed");
                Vec::new()
            }
        }
    }

    /// Classifies a failed remote query and runs the recovery branch.
    async fn recover(&self, message: &str) -> LoadOutcome<T> {
        let category = classify(message);
        warn!(
            collection = %self.collection,
            category = %category,
            message,
            "remote query failed"
        );

        if category.is_systemic() {
            // Expected degraded operation: delegate to the local dataset
            // and stay silent beyond a neutral notice.
            self.notifier.toast(ToastKind::Info, "Showing offline data");
            return self.local_outcome();
        }

        if category == ErrorCategory::SortFieldInvalid {
            return self.retry_without_sort(message).await;
        }

        // Unknown: surface the error and return an empty result rather than
        // leaving possibly-stale page state behind.
        self.notifier
            .toast(ToastKind::Error, &format!("Load failed: {message}"));
        LoadOutcome::empty_with_error(ErrorInfo::new(category, message))
    }

    /// Degraded retry after a sort-field failure: same query minus the sort
    /// clause. Surfaces an error only when the retry fails too.
    async fn retry_without_sort(&self, original_message: &str) -> LoadOutcome<T> {
        let query = match self.builder.build_without_sort(&self.collection, &self.spec, &self.cursor)
        {
            Ok(query) => query,
            Err(err) => {
                return LoadOutcome::empty_with_error(ErrorInfo::new(
                    ErrorCategory::SortFieldInvalid,
                    err.to_string(),
                ))
            }
        };

        match self.transport.fetch(&query).await {
            Ok(page) => {
                let returned = page.data.len();
                match decode_records(page.data) {
                    Ok(records) => LoadOutcome {
                        records,
                        has_more: returned == self.cursor.page_size,
                        total: Some(returned as u64),
                        error: None,
                    },
                    Err(err) => LoadOutcome::empty_with_error(ErrorInfo::new(
                        ErrorCategory::Unknown,
                        err.to_string(),
                    )),
                }
            }
            Err(retry_err) => {
                warn!(
                    collection = %self.collection,
                    error = %retry_err,
                    "retry without sort also failed"
                );
                self.notifier
                    .toast(ToastKind::Error, "Sort field invalid; sorting disabled");
                LoadOutcome::empty_with_error(ErrorInfo::new(
                    ErrorCategory::SortFieldInvalid,
                    original_message,
                ))
            }
        }
    }

    /// Count fetch: refresh-only, independent call, failure swallowed.
    async fn fetch_total_if_wanted(&self, refreshing: bool) -> Option<u64> {
        if !(refreshing && self.spec.with_count) {
            return None;
        }
        match self
            .transport
            .count(&self.collection, self.spec.filter.as_ref())
            .await
        {
            Ok(total) => Some(total),
            Err(err) => {
                // Count is a display aid and never gates loading.
                warn!(collection = %self.collection, error = %err, "count fetch failed");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;
    use specdeck_core::{RemoteQuery, SortSpec};

    use super::*;
    use crate::local::LocalDatasetProvider;
    use crate::notify::tests::RecordingNotifier;
    use crate::probe::StaticProbe;
    use crate::transport::{MemoryTransport, QueryPage, TransportError};

    // ---- fakes ----

    fn clip(records: &[Value], query: &RemoteQuery) -> Vec<Value> {
        let skip = usize::try_from(query.skip()).unwrap_or(usize::MAX);
        let limit = query
            .limit()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);
        records.iter().skip(skip).take(limit).cloned().collect()
    }

    /// Rejects any sorted query the way a backend with a missing index does.
    struct SortRejectingTransport {
        records: Vec<Value>,
    }

    #[async_trait]
    impl QueryTransport for SortRejectingTransport {
        async fn fetch(&self, query: &RemoteQuery) -> Result<QueryPage, TransportError> {
            if query.sort().is_some() {
                return Err(TransportError::backend("invalid index: releaseDate"));
            }
            Ok(QueryPage {
                data: clip(&self.records, query),
            })
        }

        async fn count(&self, _c: &str, _f: Option<&Filter>) -> Result<u64, TransportError> {
            Ok(self.records.len() as u64)
        }
    }

    /// Fails every call with a fixed message.
    struct AlwaysFailTransport {
        message: String,
    }

    #[async_trait]
    impl QueryTransport for AlwaysFailTransport {
        async fn fetch(&self, _q: &RemoteQuery) -> Result<QueryPage, TransportError> {
            Err(TransportError::backend(self.message.clone()))
        }

        async fn count(&self, _c: &str, _f: Option<&Filter>) -> Result<u64, TransportError> {
            Err(TransportError::backend(self.message.clone()))
        }
    }

    /// Answers sorted queries with nothing and unsorted ones with data --
    /// the shape of a backend whose sort field exists on no record.
    struct EmptyWhenSortedTransport {
        records: Vec<Value>,
    }

    #[async_trait]
    impl QueryTransport for EmptyWhenSortedTransport {
        async fn fetch(&self, query: &RemoteQuery) -> Result<QueryPage, TransportError> {
            if query.sort().is_some() {
                return Ok(QueryPage::default());
            }
            Ok(QueryPage {
                data: clip(&self.records, query),
            })
        }

        async fn count(&self, _c: &str, _f: Option<&Filter>) -> Result<u64, TransportError> {
            Ok(self.records.len() as u64)
        }
    }

    /// Serves pages fine but cannot count.
    struct CountFailingTransport {
        records: Vec<Value>,
    }

    #[async_trait]
    impl QueryTransport for CountFailingTransport {
        async fn fetch(&self, query: &RemoteQuery) -> Result<QueryPage, TransportError> {
            Ok(QueryPage {
                data: clip(&self.records, query),
            })
        }

        async fn count(&self, _c: &str, _f: Option<&Filter>) -> Result<u64, TransportError> {
            Err(TransportError::backend("count aggregation unavailable"))
        }
    }

    // ---- helpers ----

    fn numbered(prefix: &str, n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({"id": format!("{prefix}{i}"), "model": format!("Model {i}"), "seq": i}))
            .collect()
    }

    fn local_with(collection: &str, records: Vec<Value>) -> Arc<LocalDatasetProvider> {
        let provider = LocalDatasetProvider::new();
        provider.register(collection, records);
        Arc::new(provider)
    }

    fn config(page_size: usize) -> LoaderConfig {
        LoaderConfig {
            page_size,
            ..LoaderConfig::default()
        }
    }

    fn loader(
        collection: &str,
        spec: QuerySpec,
        page_size: usize,
        probe_on: bool,
        transport: Arc<dyn QueryTransport>,
        local: Arc<LocalDatasetProvider>,
    ) -> DataLoader<Value> {
        DataLoader::new(
            collection,
            spec,
            config(page_size),
            Arc::new(StaticProbe(probe_on)),
            transport,
            local,
        )
        .with_notifier(Arc::new(crate::notify::NullNotifier))
    }

    // ---- offline / fallback ----

    #[tokio::test]
    async fn offline_refresh_serves_local_first_page() {
        let local = local_with("gpu", numbered("g", 25));
        let transport = Arc::new(MemoryTransport::new());
        let mut loader = loader("gpu", QuerySpec::default(), 10, false, transport, local.clone());

        loader.refresh().await;

        let expected = local.query("gpu", &QuerySpec::default(), &PageCursor::new(10));
        assert_eq!(loader.list(), expected.records.as_slice());
        assert_eq!(loader.error(), None);
        assert!(!loader.finished());
        assert_eq!(loader.page(), 1);
        assert_eq!(loader.total(), Some(25));
    }

    #[tokio::test]
    async fn local_round_trip_paginates_to_completion() {
        let local = local_with("cpu", numbered("c", 25));
        let transport = Arc::new(MemoryTransport::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, false, transport, local);

        loader.refresh().await;
        assert_eq!(loader.list().len(), 10);
        assert!(!loader.finished());

        loader.load_more().await;
        assert_eq!(loader.list().len(), 20);
        assert!(!loader.finished());

        loader.load_more().await;
        assert_eq!(loader.list().len(), 25);
        assert!(loader.finished());
    }

    #[tokio::test]
    async fn collection_missing_falls_back_to_local() {
        // The memory transport has no "gpu" collection, so the remote path
        // raises a collection-not-exist failure.
        let local = local_with("gpu", numbered("g", 7));
        let transport = Arc::new(MemoryTransport::new());
        let mut loader = loader("gpu", QuerySpec::default(), 10, true, transport, local.clone());

        loader.refresh().await;

        let expected = local.query("gpu", &QuerySpec::default(), &PageCursor::new(10));
        assert_eq!(loader.list(), expected.records.as_slice());
        assert_eq!(loader.error(), None);
        assert!(loader.finished());
    }

    #[tokio::test]
    async fn permission_denied_falls_back_to_local_with_notice() {
        let local = local_with("cpu", numbered("c", 3));
        let transport = Arc::new(AlwaysFailTransport {
            message: "no permission to perform read".to_string(),
        });
        let notifier = Arc::new(RecordingNotifier::new());
        let mut loader = DataLoader::<Value>::new(
            "cpu",
            QuerySpec::default(),
            config(10),
            Arc::new(StaticProbe(true)),
            transport,
            local,
        )
        .with_notifier(notifier.clone());

        loader.refresh().await;

        assert_eq!(loader.list().len(), 3);
        assert_eq!(loader.error(), None);
        let toasts = notifier.toasts.lock().unwrap();
        assert!(toasts
            .iter()
            .any(|(kind, msg)| *kind == ToastKind::Info && msg == "Showing offline data"));
    }

    // ---- refresh / load_more state machine ----

    #[tokio::test]
    async fn refresh_replaces_list_and_sets_page_one() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 5));
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport.clone(), local);

        loader.refresh().await;
        assert_eq!(loader.list().len(), 5);
        assert_eq!(loader.page(), 1);
        assert!(loader.finished()); // 5 < 10

        // A second refresh replaces rather than appends.
        loader.refresh().await;
        assert_eq!(loader.list().len(), 5);
        assert_eq!(loader.page(), 1);
    }

    #[tokio::test]
    async fn refresh_with_zero_results_leaves_page_zero() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", Vec::new());
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport, local);

        loader.refresh().await;
        assert!(loader.list().is_empty());
        assert_eq!(loader.page(), 0);
        assert!(loader.finished());
        assert_eq!(loader.error(), None);
    }

    #[tokio::test]
    async fn load_more_is_noop_when_finished() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 5));
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport, local);

        loader.refresh().await;
        assert!(loader.finished());
        let before = loader.list().to_vec();

        loader.load_more().await;
        assert_eq!(loader.list(), before.as_slice());
        assert_eq!(loader.page(), 1);
    }

    #[tokio::test]
    async fn operations_are_noops_while_in_flight() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 30));
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport, local);

        loader.refresh().await;
        let before = loader.list().to_vec();

        // Simulate an in-flight operation: every entry point must bail
        // without touching state.
        loader.state.phase = Phase::Loading;
        loader.load_more().await;
        assert_eq!(loader.list(), before.as_slice());
        assert_eq!(loader.page(), 1);

        loader.refresh().await;
        assert_eq!(loader.list(), before.as_slice());

        loader.search("anything").await;
        assert_eq!(loader.spec().filter, None);
        assert_eq!(loader.state.phase, Phase::Loading);
    }

    // ---- error classification branches ----

    #[tokio::test]
    async fn sort_field_invalid_retries_without_sort() {
        let transport = Arc::new(SortRejectingTransport {
            records: numbered("c", 3),
        });
        let local = Arc::new(LocalDatasetProvider::new());
        let spec = QuerySpec {
            sort: Some(SortSpec::desc("releaseDate")),
            ..QuerySpec::default()
        };
        let mut loader = loader("cpu", spec, 10, true, transport, local);

        loader.refresh().await;

        assert_eq!(loader.list().len(), 3);
        assert_eq!(loader.error(), None);
        assert_eq!(loader.total(), Some(3));
        assert!(loader.finished());
    }

    #[tokio::test]
    async fn sort_retry_failure_surfaces_error_with_empty_list() {
        let transport = Arc::new(AlwaysFailTransport {
            message: "invalid index: releaseDate".to_string(),
        });
        let local = Arc::new(LocalDatasetProvider::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let spec = QuerySpec {
            sort: Some(SortSpec::desc("releaseDate")),
            ..QuerySpec::default()
        };
        let mut loader = DataLoader::<Value>::new(
            "cpu",
            spec,
            config(10),
            Arc::new(StaticProbe(true)),
            transport,
            local,
        )
        .with_notifier(notifier.clone());

        loader.refresh().await;

        assert!(loader.list().is_empty());
        let err = loader.error().unwrap();
        assert_eq!(err.category, ErrorCategory::SortFieldInvalid);
        let toasts = notifier.toasts.lock().unwrap();
        assert!(toasts.iter().any(|(kind, _)| *kind == ToastKind::Error));
    }

    #[tokio::test]
    async fn unknown_error_empties_list_and_surfaces_error() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 5));
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport.clone(), local);

        loader.refresh().await;
        assert_eq!(loader.list().len(), 5);

        transport.inject_failure("socket hang up");
        loader.refresh().await;

        // Stale page state must not survive a visible failure.
        assert!(loader.list().is_empty());
        let err = loader.error().unwrap();
        assert_eq!(err.category, ErrorCategory::Unknown);
        assert_eq!(err.message, "socket hang up");
        assert!(loader.state().is_idle());
    }

    // ---- search ----

    #[tokio::test]
    async fn search_matches_case_insensitively_on_remote() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection(
            "cpu",
            vec![
                json!({"id": "1", "model": "Core i7-13700K", "brand": "Intel"}),
                json!({"id": "2", "model": "Ryzen 9 7950X", "brand": "AMD"}),
            ],
        );
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport, local);

        loader.search("i7").await;

        assert_eq!(loader.list().len(), 1);
        assert_eq!(loader.list()[0]["model"], "Core i7-13700K");
        assert!(matches!(
            loader.spec().filter,
            Some(Filter::AnyFieldMatches { .. })
        ));
    }

    #[tokio::test]
    async fn search_matches_case_sensitively_on_local_fallback() {
        let local = local_with(
            "cpu",
            vec![json!({"id": "1", "model": "Core i7-13700K", "brand": "Intel"})],
        );
        let transport = Arc::new(MemoryTransport::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, false, transport, local);

        loader.search("Core i7").await;
        assert_eq!(loader.list().len(), 1);

        loader.search("core i7").await;
        assert!(loader.list().is_empty());
    }

    #[tokio::test]
    async fn blank_search_clears_the_filter() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 4));
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport, local);

        loader.search("Model 1").await;
        assert_eq!(loader.list().len(), 1);

        loader.search("   ").await;
        assert_eq!(loader.spec().filter, None);
        assert_eq!(loader.list().len(), 4);
    }

    #[tokio::test]
    async fn clear_search_restores_unfiltered_results() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 4));
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader = loader("cpu", QuerySpec::default(), 10, true, transport, local);

        loader.search("Model 2").await;
        assert_eq!(loader.list().len(), 1);

        loader.clear_search().await;
        assert_eq!(loader.spec().filter, None);
        assert_eq!(loader.list().len(), 4);
    }

    // ---- count fetch ----

    #[tokio::test]
    async fn count_fetch_sets_total_on_refresh() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 30));
        let local = Arc::new(LocalDatasetProvider::new());
        let spec = QuerySpec {
            with_count: true,
            ..QuerySpec::default()
        };
        let mut loader = loader("cpu", spec, 10, true, transport, local);

        loader.refresh().await;
        assert_eq!(loader.total(), Some(30));
        assert_eq!(loader.list().len(), 10);
    }

    #[tokio::test]
    async fn count_failure_is_swallowed_and_total_kept() {
        let transport = Arc::new(CountFailingTransport {
            records: numbered("c", 8),
        });
        let local = Arc::new(LocalDatasetProvider::new());
        let spec = QuerySpec {
            with_count: true,
            ..QuerySpec::default()
        };
        let mut loader = loader("cpu", spec, 10, true, transport, local);

        loader.refresh().await;

        // The page load succeeded; only the display-aid count is missing.
        assert_eq!(loader.list().len(), 8);
        assert_eq!(loader.error(), None);
        assert_eq!(loader.total(), None);
    }

    // ---- empty-sorted verification ----

    #[tokio::test]
    async fn empty_sorted_result_is_double_checked_without_sort() {
        let transport = Arc::new(EmptyWhenSortedTransport {
            records: numbered("c", 2),
        });
        let local = Arc::new(LocalDatasetProvider::new());
        let spec = QuerySpec {
            sort: Some(SortSpec::asc("ghostField")),
            ..QuerySpec::default()
        };
        let mut loader = loader("cpu", spec, 10, true, transport, local);

        loader.refresh().await;
        assert_eq!(loader.list().len(), 2);
        assert_eq!(loader.error(), None);
    }

    #[tokio::test]
    async fn empty_sorted_verification_can_be_disabled() {
        let transport = Arc::new(EmptyWhenSortedTransport {
            records: numbered("c", 2),
        });
        let local = Arc::new(LocalDatasetProvider::new());
        let spec = QuerySpec {
            sort: Some(SortSpec::asc("ghostField")),
            ..QuerySpec::default()
        };
        let mut cfg = config(10);
        cfg.verify_empty_sorted = false;
        let mut loader = DataLoader::<Value>::new(
            "cpu",
            spec,
            cfg,
            Arc::new(StaticProbe(true)),
            transport,
            local,
        )
        .with_notifier(Arc::new(crate::notify::NullNotifier));

        loader.refresh().await;
        assert!(loader.list().is_empty());
        assert_eq!(loader.error(), None);
    }

    // ---- reset ----

    #[tokio::test]
    async fn reset_clears_state_but_keeps_spec() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection("cpu", numbered("c", 30));
        let local = Arc::new(LocalDatasetProvider::new());
        let spec = QuerySpec {
            with_count: true,
            ..QuerySpec::default()
        };
        let mut loader = loader("cpu", spec.clone(), 10, true, transport, local);

        loader.refresh().await;
        loader.load_more().await;
        assert_eq!(loader.list().len(), 20);

        loader.reset();
        assert!(loader.list().is_empty());
        assert_eq!(loader.page(), 0);
        assert!(!loader.finished());
        assert_eq!(loader.error(), None);
        assert_eq!(loader.total(), None);
        assert_eq!(loader.spec(), &spec);
    }

    // ---- typed records ----

    #[tokio::test]
    async fn loader_deserializes_into_typed_records() {
        let transport = Arc::new(MemoryTransport::new());
        transport.insert_collection(
            "cpu",
            vec![json!({
                "id": "cpu-001",
                "model": "Core i7-13700K",
                "brand": "Intel",
                "releaseDate": "2022-10-20",
                "price": 3299.0,
                "cores": "8P+8E",
                "baseClock": 3.4,
                "boostClock": 5.4,
                "socket": "LGA1700",
                "tdp": 125,
                "integratedGraphics": true,
                "cache": 30
            })],
        );
        let local = Arc::new(LocalDatasetProvider::new());
        let mut loader: DataLoader<specdeck_core::CpuRecord> = DataLoader::new(
            "cpu",
            QuerySpec::default(),
            config(10),
            Arc::new(StaticProbe(true)),
            transport,
            local,
        )
        .with_notifier(Arc::new(crate::notify::NullNotifier));

        loader.refresh().await;
        assert_eq!(loader.list().len(), 1);
        assert_eq!(loader.list()[0].socket, "LGA1700");
    }
}
