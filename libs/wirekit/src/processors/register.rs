//! Registration-side processors: aliases, contributed providers, and
//! contributed attribute processors.

use std::sync::Arc;

use crate::catalog::{Aliases, AttrData, ComponentDescriptor, ProcessorCapability, ProvideSource, Provides};
use crate::error::ContextError;
use crate::key::{Instance, TypeKey};
use crate::processor::{AttributeProcessor, Scan};
use crate::provider::MethodProvider;

/// Registers a component under its declared alternate type keys so one
/// concrete instance can satisfy several trait-typed dependencies.
pub struct AliasProcessor;

impl AttributeProcessor for AliasProcessor {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<Aliases>()
    }

    fn supports_types(&self) -> bool {
        true
    }

    fn process_type(
        &self,
        attr: &AttrData,
        descriptor: &ComponentDescriptor,
        owner: &Instance,
        scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let aliases = attr
            .downcast::<Aliases>()
            .ok_or(ContextError::MalformedAttribute {
                attr: attr.key(),
                component: descriptor.name,
            })?;
        for entry in &aliases.entries {
            let aliased = (entry.cast)(owner).ok_or(ContextError::TypeMismatch {
                key: entry.alias,
            })?;
            tracing::debug!(component = descriptor.name, alias = %entry.alias, "registering alias");
            scan.context.add_instance(aliased);
        }
        Ok(())
    }
}

/// Registers a meta-component's providers: the component itself when it
/// implements the provider capability, otherwise each declared provider
/// method individually.
pub struct ProviderRegistrar;

impl AttributeProcessor for ProviderRegistrar {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<Provides>()
    }

    fn supports_types(&self) -> bool {
        true
    }

    fn process_type(
        &self,
        attr: &AttrData,
        descriptor: &ComponentDescriptor,
        owner: &Instance,
        scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let provides = attr
            .downcast::<Provides>()
            .ok_or(ContextError::MalformedAttribute {
                attr: attr.key(),
                component: descriptor.name,
            })?;
        match &provides.source {
            ProvideSource::Object { cast } => {
                let provider = cast(owner).ok_or(ContextError::MissingCapability {
                    component: descriptor.name,
                    capability: "Provider",
                })?;
                tracing::debug!(
                    component = descriptor.name,
                    provides = %provider.provides(),
                    "registering provider object"
                );
                scan.context.add_provider(provider);
            }
            ProvideSource::Methods(methods) => {
                for method in methods {
                    tracing::debug!(
                        component = descriptor.name,
                        method = method.method,
                        provides = %method.provides,
                        "registering provider method"
                    );
                    scan.context.add_provider(Arc::new(MethodProvider::new(
                        method.provides,
                        method.method,
                        owner.clone(),
                        method.params.clone(),
                        method.invoke.clone(),
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Adds a contributed attribute processor to the active set, immediately —
/// it participates in scanning every subsequent component.
pub struct ProcessorRegistrar;

impl AttributeProcessor for ProcessorRegistrar {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<ProcessorCapability>()
    }

    fn supports_types(&self) -> bool {
        true
    }

    fn process_type(
        &self,
        attr: &AttrData,
        descriptor: &ComponentDescriptor,
        owner: &Instance,
        scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let capability =
            attr.downcast::<ProcessorCapability>()
                .ok_or(ContextError::MalformedAttribute {
                    attr: attr.key(),
                    component: descriptor.name,
                })?;
        let processor = (capability.cast)(owner).ok_or(ContextError::MissingCapability {
            component: descriptor.name,
            capability: "AttributeProcessor",
        })?;
        tracing::debug!(component = descriptor.name, "registering contributed processor");
        scan.initializer.register_processor(processor)
    }
}
