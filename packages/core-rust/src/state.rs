//! Incremental-loading state exposed to callers.

use serde::{Deserialize, Serialize};

use crate::classify::ErrorInfo;

/// Which operation, if any, is currently in flight.
///
/// At most one operation runs at a time; `Loading` and `Refreshing` are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Refreshing,
}

/// Observable loading state of one loader instance.
///
/// `finished == true` means the current page sequence has no more pages,
/// derived as `returned_count < page_size` after each load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadState {
    pub phase: Phase,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorInfo>,
    /// Total matching records, when a count fetch has run. Display aid only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total: Option<u64>,
}

impl LoadState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.phase == Phase::Refreshing
    }
}
