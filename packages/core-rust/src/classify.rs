//! Failure classification: maps a backend failure message to a recovery category.
//!
//! The remote query service reports failures as human-readable messages (in
//! practice a mix of English and Chinese). [`classify`] performs a
//! case-insensitive keyword match against fixed keyword sets and returns one
//! of a closed set of [`ErrorCategory`] values; the loader's recovery policy
//! branches on the category, never on the raw message.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Recovery-relevant failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// The collection does not exist on the backend.
    CollectionMissing,
    /// The caller lacks read permission on the collection.
    PermissionDenied,
    /// The backend environment is absent or misconfigured.
    EnvironmentMisconfigured,
    /// The sort field is unknown or unindexed on the backend.
    SortFieldInvalid,
    /// Anything that matched no keyword set.
    Unknown,
}

impl ErrorCategory {
    /// Systemic categories always warrant full fallback to the local dataset.
    #[must_use]
    pub fn is_systemic(self) -> bool {
        matches!(
            self,
            ErrorCategory::CollectionMissing
                | ErrorCategory::PermissionDenied
                | ErrorCategory::EnvironmentMisconfigured
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::CollectionMissing => "collection missing",
            ErrorCategory::PermissionDenied => "permission denied",
            ErrorCategory::EnvironmentMisconfigured => "environment misconfigured",
            ErrorCategory::SortFieldInvalid => "sort field invalid",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ErrorInfo
// ---------------------------------------------------------------------------

/// A classified failure: category plus the original backend message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{category}: {message}")]
pub struct ErrorInfo {
    pub category: ErrorCategory,
    pub message: String,
}

impl ErrorInfo {
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    /// Classifies `message` and wraps it.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            category: classify(&message),
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

const COLLECTION_KEYWORDS: &[&str] = &["collection", "not exist", "不存在"];
const PERMISSION_KEYWORDS: &[&str] = &["permission", "权限"];
const ENVIRONMENT_KEYWORDS: &[&str] = &["env", "环境"];
const SORT_KEYWORDS: &[&str] = &["orderby", "index", "排序"];

fn matches_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Maps a raw failure message to its [`ErrorCategory`].
///
/// Matching is case-insensitive and total: every input maps to exactly one
/// category. The three systemic categories are checked before
/// `SortFieldInvalid` -- a message matching both (e.g. "collection index
/// missing") is systemic, because those failures always warrant full local
/// fallback while a bad sort field only warrants a retry without the sort
/// clause.
#[must_use]
pub fn classify(raw: &str) -> ErrorCategory {
    let lower = raw.to_lowercase();

    if matches_any(&lower, COLLECTION_KEYWORDS) {
        ErrorCategory::CollectionMissing
    } else if matches_any(&lower, PERMISSION_KEYWORDS) {
        ErrorCategory::PermissionDenied
    } else if matches_any(&lower, ENVIRONMENT_KEYWORDS) {
        ErrorCategory::EnvironmentMisconfigured
    } else if matches_any(&lower, SORT_KEYWORDS) {
        ErrorCategory::SortFieldInvalid
    } else {
        ErrorCategory::Unknown
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
