//! `specdeck` Client -- availability probing, query building, local fallback
//! datasets, and the incremental data loader.

pub mod builder;
pub mod config;
pub mod loader;
pub mod local;
pub mod notify;
pub mod probe;
pub mod transport;

mod value;

pub use builder::{BuildError, QueryBuilder};
pub use config::LoaderConfig;
pub use loader::DataLoader;
pub use local::{LocalDatasetProvider, LocalQueryResult};
pub use notify::{Notifier, NullNotifier, ToastKind, TracingNotifier};
pub use probe::{AvailabilityProbe, DatabaseFactory, DatabaseHandle, FactoryProbe, StaticProbe};
pub use transport::{MemoryTransport, QueryPage, QueryTransport, TransportError};
