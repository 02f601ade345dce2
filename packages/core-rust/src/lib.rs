//! `specdeck` Core -- query model, page cursor, load state, error classifier,
//! and record schemas shared by remote transports and the local provider.

pub mod classify;
pub mod document;
pub mod query;
pub mod records;
pub mod state;

pub use classify::{classify, ErrorCategory, ErrorInfo};
pub use document::Document;
pub use query::{
    Clause, Comparator, FieldCondition, Filter, PageCursor, QuerySpec, RemoteQuery, SortDirection,
    SortSpec,
};
pub use records::{CpuRecord, GpuRecord};
pub use state::{LoadState, Phase};
