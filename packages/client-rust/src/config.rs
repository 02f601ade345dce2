//! Loader configuration.

/// Tuning knobs for a [`DataLoader`](crate::loader::DataLoader).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Records per page.
    pub page_size: usize,
    /// Fields searched by the default keyword search.
    pub search_fields: Vec<String>,
    /// Whether an empty result from a sorted query is double-checked once
    /// without the sort clause before being accepted as final.
    pub verify_empty_sorted: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            search_fields: vec![
                "model".to_string(),
                "brand".to_string(),
                "description".to_string(),
            ],
            verify_empty_sorted: true,
        }
    }
}
