//! # Wirekit - Declarative Component Engine
//!
//! A small inversion-of-control container: components describe themselves
//! through compile-time metadata descriptors, the initializer wires their
//! dependencies and sequences lifecycle methods by priority, and typed /
//! string-keyed dispatchers carry cross-component events.
//!
//! ## Declaring a component
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wirekit::{CatalogBuilder, DescriptorBuilder, Injected, TypeKey};
//!
//! #[derive(Default)]
//! struct ReportService {
//!     store: Injected<Store>,
//! }
//!
//! fn register(builder: &mut CatalogBuilder) {
//!     builder.register(
//!         DescriptorBuilder::<ReportService>::new("report_service")
//!             .field("store", |c| &c.store)
//!             .initiate("warm_up", 10, vec![], |c, _| {
//!                 c.store.get().preload();
//!                 Ok(())
//!             })
//!             .build(),
//!     );
//! }
//!
//! wirekit::register_components!(register);
//! ```
//!
//! Bootstrapping (`ContextEngine::bootstrap`) runs two phases: meta
//! components (contributed processors and providers) first, regular
//! components second, then every processor's finalization hook. Shutdown is
//! a single call into the destroyer, which runs teardown actions
//! best-effort and in registration order.

pub use anyhow::Result;

// Re-exported for component registrators.
pub use inventory;

pub mod catalog;
pub mod cell;
pub mod context;
pub mod contracts;
pub mod destroyer;
pub mod dispatch;
pub mod error;
pub mod initializer;
pub mod key;
pub mod processor;
pub mod processors;
pub mod provider;

pub use catalog::{
    Catalog, CatalogBuilder, ComponentDescriptor, DescriptorBuilder, Registrator, Role,
};
pub use cell::{Injected, LazyCell, SyncLazyCell};
pub use context::Context;
pub use contracts::{Disposable, EventListener, MessageListener};
pub use destroyer::ContextDestroyer;
pub use dispatch::{
    EventDispatcher, ListenerId, ListenerOptions, MessageDispatcher, Retention,
};
pub use error::ContextError;
pub use initializer::{ContextEngine, ContextInitializer, EngineOptions};
pub use key::{Args, Instance, TypeKey};
pub use processor::{AttributeProcessor, ProcessorSet, Scan};
pub use provider::{ConstructorProvider, FactoryProvider, MethodProvider, Provider};
