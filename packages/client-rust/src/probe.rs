//! Backend availability probe.
//!
//! The loader asks the probe before every query -- availability is never
//! cached across the loader's lifetime, because the surrounding environment
//! can finish initializing or lose connectivity between calls. The probe is
//! query-only: it never mutates remote state and never throws; any internal
//! failure converts to `false`.

use std::sync::Arc;

use tracing::{debug, warn};

/// Answers "is the remote query backend usable right now?".
///
/// Injected into the loader so tests can substitute a deterministic fake
/// instead of relying on ambient runtime globals.
pub trait AvailabilityProbe: Send + Sync {
    /// Idempotent, side-effect free, safe to call repeatedly.
    fn is_available(&self) -> bool;
}

/// Handle to a cloud database environment, as reported by the factory.
#[derive(Debug, Clone)]
pub struct DatabaseHandle {
    /// Environment identifier. `None` means the handle exists but its
    /// environment was never confirmed -- still worth attempting queries.
    pub env_id: Option<String>,
}

/// Produces database handles on demand.
///
/// The open-ended `anyhow::Result` mirrors the fact that the runtime's
/// factory can fail in ways this crate cannot enumerate.
pub trait DatabaseFactory: Send + Sync {
    fn database(&self) -> anyhow::Result<DatabaseHandle>;
}

/// Probe over an optional [`DatabaseFactory`].
///
/// Unavailable when no factory is attached (runtime object absent) or the
/// factory errors. A handle without a configured environment identifier is
/// logged as a warning but still reported available.
pub struct FactoryProbe {
    factory: Option<Arc<dyn DatabaseFactory>>,
}

impl FactoryProbe {
    #[must_use]
    pub fn new(factory: Arc<dyn DatabaseFactory>) -> Self {
        Self {
            factory: Some(factory),
        }
    }

    /// A probe with no runtime attached; always unavailable.
    #[must_use]
    pub fn detached() -> Self {
        Self { factory: None }
    }
}

impl AvailabilityProbe for FactoryProbe {
    fn is_available(&self) -> bool {
        let Some(factory) = &self.factory else {
            debug!("query runtime absent, backend unavailable");
            return false;
        };
        match factory.database() {
            Ok(handle) => {
                match handle.env_id {
                    Some(env) => debug!(env = %env, "backend environment available"),
                    None => warn!("database handle has no environment id configured"),
                }
                true
            }
            Err(err) => {
                debug!(error = %err, "database factory failed, backend unavailable");
                false
            }
        }
    }
}

/// Fixed-answer probe for tests and forced-offline operation.
pub struct StaticProbe(pub bool);

impl AvailabilityProbe for StaticProbe {
    fn is_available(&self) -> bool {
        self.0
    }
}
