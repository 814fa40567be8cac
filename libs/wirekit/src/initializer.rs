//! Bootstrap orchestration.
//!
//! The initializer drives three strictly ordered phases: discovery
//! (classify descriptors, fill the constructor table), the meta phase
//! (processors and providers, wired first so everything they contribute is
//! available to regular components), and the regular phase (construct,
//! scan, finalize). The engine facade owns the long-lived pieces and is
//! what applications hold on to.

use std::sync::Arc;

use crate::catalog::{Catalog, ComponentDescriptor};
use crate::context::Context;
use crate::destroyer::ContextDestroyer;
use crate::dispatch::{EventDispatcher, MessageDispatcher};
use crate::error::ContextError;
use crate::key::Instance;
use crate::processor::{AttributeProcessor, ProcessorSet, Scan};
use crate::processors::{
    AliasProcessor, DestroyProcessor, DisposeProcessor, InitiateProcessor, InjectProcessor,
    ProcessorRegistrar, ProviderRegistrar, SubscribeProcessor,
};
use crate::provider::ConstructorProvider;

pub struct ContextInitializer {
    processors: ProcessorSet,
    initiator: Arc<InitiateProcessor>,
}

impl ContextInitializer {
    /// Builds the initializer with the default processor catalogue.
    ///
    /// Registration order is load-bearing: `after_scan` hooks run in this
    /// order, which is what guarantees destruction methods are registered
    /// with the destroyer before disposal actions.
    pub fn new(
        events: Arc<EventDispatcher>,
        messages: Arc<MessageDispatcher>,
    ) -> Result<Self, ContextError> {
        let processors = ProcessorSet::default();
        let initiator = Arc::new(InitiateProcessor::default());

        processors.register(Arc::new(AliasProcessor))?;
        processors.register(Arc::new(ProviderRegistrar))?;
        processors.register(Arc::new(ProcessorRegistrar))?;
        processors.register(Arc::new(InjectProcessor))?;
        processors.register(initiator.clone())?;
        processors.register(Arc::new(DestroyProcessor::default()))?;
        processors.register(Arc::new(DisposeProcessor::default()))?;
        processors.register(Arc::new(SubscribeProcessor::new(events, messages)))?;

        Ok(Self {
            processors,
            initiator,
        })
    }

    /// Adds an attribute processor to the active set. Contributed
    /// processors land here mid-scan and apply to every component scanned
    /// afterwards.
    pub fn register_processor(
        &self,
        processor: Arc<dyn AttributeProcessor>,
    ) -> Result<(), ContextError> {
        self.processors.register(processor)
    }

    /// Runs the full bootstrap over the given catalog.
    pub fn initiate(
        &self,
        catalog: Catalog,
        context: &Arc<Context>,
        destroyer: &Arc<ContextDestroyer>,
    ) -> Result<(), ContextError> {
        let scan = Scan {
            context,
            initializer: self,
            destroyer,
        };

        tracing::info!("Phase: discovery");
        let mut meta = Vec::new();
        let mut regular = Vec::new();
        for descriptor in catalog.into_descriptors() {
            context.register_constructor(Arc::new(ConstructorProvider::new(
                descriptor.key,
                descriptor.name,
                descriptor.construct.clone(),
            )));
            if descriptor.role.is_meta() {
                meta.push(descriptor);
            } else {
                regular.push(descriptor);
            }
        }
        tracing::info!(
            meta = meta.len(),
            regular = regular.len(),
            "component catalog classified"
        );

        tracing::info!("Phase: meta");
        let meta_instances = self.construct_all(&meta, context);
        for (descriptor, owner) in meta.iter().zip(&meta_instances) {
            self.scan_component(descriptor, owner, &scan)?;
        }
        // Meta-component lifecycles complete before any regular component
        // is even constructed.
        self.initiator.flush()?;

        tracing::info!("Phase: components");
        let regular_instances = self.construct_all(&regular, context);
        for (descriptor, owner) in regular.iter().zip(&regular_instances) {
            self.scan_component(descriptor, owner, &scan)?;
        }

        tracing::info!("Phase: finalize");
        for processor in self.processors.snapshot() {
            processor.after_scan(&scan)?;
        }

        Ok(())
    }

    /// Constructs and registers every component of a phase before any of
    /// them is scanned, so same-phase direct injection does not depend on
    /// declaration order.
    fn construct_all(
        &self,
        descriptors: &[ComponentDescriptor],
        context: &Arc<Context>,
    ) -> Vec<Instance> {
        descriptors
            .iter()
            .map(|descriptor| {
                tracing::debug!(component = descriptor.name, "constructing component");
                let instance = (descriptor.construct)();
                context.add_instance(instance.clone());
                instance
            })
            .collect()
    }

    fn scan_component(
        &self,
        descriptor: &ComponentDescriptor,
        owner: &Instance,
        scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        tracing::debug!(component = descriptor.name, "scanning component");
        for field in &descriptor.fields {
            let processor = self.lookup(field.attr.key(), descriptor.name)?;
            if !processor.supports_fields() {
                return Err(ContextError::UnsupportedMember {
                    attr: field.attr.key(),
                    member: "field",
                });
            }
            processor.process_field(field, owner, descriptor.name, scan)?;
        }
        for method in &descriptor.methods {
            let processor = self.lookup(method.attr.key(), descriptor.name)?;
            if !processor.supports_methods() {
                return Err(ContextError::UnsupportedMember {
                    attr: method.attr.key(),
                    member: "method",
                });
            }
            processor.process_method(method, owner, descriptor.name, scan)?;
        }
        for attr in &descriptor.type_attrs {
            let processor = self.lookup(attr.key(), descriptor.name)?;
            if !processor.supports_types() {
                return Err(ContextError::UnsupportedMember {
                    attr: attr.key(),
                    member: "type",
                });
            }
            processor.process_type(attr, descriptor, owner, scan)?;
        }
        Ok(())
    }

    fn lookup(
        &self,
        attr: crate::key::TypeKey,
        component: &'static str,
    ) -> Result<Arc<dyn AttributeProcessor>, ContextError> {
        self.processors
            .lookup(attr)
            .ok_or(ContextError::UnknownAttribute { attr, component })
    }
}

/// Engine construction options; the bootstrap crate maps its settings onto
/// this.
#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    /// Construct unsatisfied dependencies through their no-arg constructor
    /// instead of failing resolution.
    pub create_missing: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            create_missing: true,
        }
    }
}

/// The bootstrapped engine: registry, dispatchers, and the teardown handle.
pub struct ContextEngine {
    context: Arc<Context>,
    destroyer: Arc<ContextDestroyer>,
    events: Arc<EventDispatcher>,
    messages: Arc<MessageDispatcher>,
}

impl ContextEngine {
    /// Discovers components submitted through `inventory` and bootstraps.
    pub fn bootstrap(options: EngineOptions) -> Result<Self, ContextError> {
        Self::bootstrap_with(Catalog::discover()?, options)
    }

    /// Bootstraps from an explicit catalog; the entry point tests use.
    pub fn bootstrap_with(catalog: Catalog, options: EngineOptions) -> Result<Self, ContextError> {
        let context = Arc::new(Context::new(options.create_missing));
        let destroyer = Arc::new(ContextDestroyer::new());
        let events = Arc::new(EventDispatcher::new());
        let messages = Arc::new(MessageDispatcher::new());

        // The dispatchers are ordinary components too; anything can inject
        // them.
        context.add(events.clone());
        context.add(messages.clone());

        let initializer = ContextInitializer::new(events.clone(), messages.clone())?;
        initializer.initiate(catalog, &context, &destroyer)?;

        Ok(Self {
            context,
            destroyer,
            events,
            messages,
        })
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    pub fn messages(&self) -> &Arc<MessageDispatcher> {
        &self.messages
    }

    pub fn destroyer(&self) -> &Arc<ContextDestroyer> {
        &self.destroyer
    }

    /// Runs all registered teardown actions; safe to call once from the
    /// application's shutdown hook.
    pub fn shutdown(&self) {
        self.destroyer.destroy_all();
    }
}
