//! Capability traits components opt into.
//!
//! Capabilities are declared by implementing these traits and checked at
//! descriptor-build time, not probed at runtime: a descriptor builder method
//! that needs a capability takes the trait as a bound.

use crate::dispatch::Retention;

/// Resource-holding components that want teardown at shutdown.
///
/// Disposal runs best-effort: a failing `dispose` is logged and ignored,
/// since resources may already be invalid during teardown.
pub trait Disposable: Send + Sync {
    fn dispose(&self) -> anyhow::Result<()>;
}

/// Components that receive typed events from the event dispatcher.
///
/// The return value is the retention signal: `Retention::Remove` drops the
/// subscription after this delivery.
pub trait EventListener<E>: Send + Sync {
    fn on_event(&self, event: &E) -> anyhow::Result<Retention>;
}

/// Components that receive string-keyed messages from the message dispatcher.
pub trait MessageListener: Send + Sync {
    fn on_message(&self, message: &str) -> anyhow::Result<Retention>;
}
