//! Built-in attribute processors.

mod dispose;
mod inject;
mod lifecycle;
mod register;
mod subscribe;

pub use dispose::DisposeProcessor;
pub use inject::InjectProcessor;
pub use lifecycle::{DestroyProcessor, InitiateProcessor};
pub use register::{AliasProcessor, ProcessorRegistrar, ProviderRegistrar};
pub use subscribe::SubscribeProcessor;
