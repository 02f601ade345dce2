//! User-notification sink for transient toast-style messages.
//!
//! The loader reports loading/refreshing/error/empty transitions through a
//! [`Notifier`]; calls are fire-and-forget and no return value is consumed,
//! so a slow or absent UI can never stall a load.

/// Visual flavor of a toast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Error,
    Info,
}

/// Fire-and-forget sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn toast(&self, kind: ToastKind, message: &str);
}

/// Default sink: routes notices to `tracing` instead of a UI.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn toast(&self, kind: ToastKind, message: &str) {
        match kind {
            ToastKind::Error => tracing::warn!(target: "specdeck::toast", "{message}"),
            ToastKind::Loading | ToastKind::Success | ToastKind::Info => {
                tracing::info!(target: "specdeck::toast", "{message}");
            }
        }
    }
}

/// Discards every notice. Used in tests.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn toast(&self, _kind: ToastKind, _message: &str) {}
}
