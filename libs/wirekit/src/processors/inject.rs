//! Field injection.
//!
//! Direct mode resolves through the context immediately. Deferred mode picks
//! a source at scan time — existing component, registered provider, or the
//! constructor fallback, in that order — and binds the field's lazy cell to
//! it without constructing anything. Fresh mode builds a container-untracked
//! instance on the spot.

use std::sync::Arc;

use crate::catalog::{Binding, DeferredProvider, FieldSpec, Inject, InjectMode};
use crate::error::ContextError;
use crate::key::{Instance, TypeKey};
use crate::processor::{AttributeProcessor, Scan};

pub struct InjectProcessor;

impl AttributeProcessor for InjectProcessor {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<Inject>()
    }

    fn supports_fields(&self) -> bool {
        true
    }

    fn process_field(
        &self,
        spec: &FieldSpec,
        owner: &Instance,
        component: &'static str,
        scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let inject = spec
            .attr
            .downcast::<Inject>()
            .ok_or(ContextError::MalformedAttribute {
                attr: spec.attr.key(),
                component,
            })?;
        let assign = spec
            .assign
            .as_ref()
            .ok_or(ContextError::MalformedAttribute {
                attr: spec.attr.key(),
                component,
            })?;
        let target = inject.target.unwrap_or(spec.declared);

        let binding = match inject.mode {
            InjectMode::Direct => Binding::Ready(scan.context.provide_erased(target)?),
            InjectMode::Deferred => Binding::Deferred(deferred_source(target, scan)?),
            InjectMode::Fresh => Binding::Ready(fresh_instance(target, scan)?),
        };

        assign(owner, binding).map_err(|source| ContextError::Scan {
            component,
            source: source.context(format!("injecting field '{}'", spec.name)),
        })
    }
}

/// Chooses the deferred source at scan time, failing immediately when none
/// of the three branches applies.
fn deferred_source(target: TypeKey, scan: &Scan<'_>) -> Result<DeferredProvider, ContextError> {
    if scan.context.is_present_key(target) {
        let existing = scan.context.provide_erased(target)?;
        return Ok(Arc::new(move || Ok(existing.clone())));
    }
    if let Some(provider) = scan.context.provider_for(target) {
        let context = Arc::clone(scan.context);
        return Ok(Arc::new(move || context.invoke_provider(&provider)));
    }
    if scan.context.create_missing() {
        if let Some(ctor) = scan.context.constructor_for(target) {
            return Ok(Arc::new(move || Ok(ctor.construct())));
        }
    }
    Err(ContextError::MissingDependency { key: target })
}

/// Builds a brand-new instance via provider or constructor, bypassing the
/// registry. The product's lifetime is not tracked by the container.
fn fresh_instance(target: TypeKey, scan: &Scan<'_>) -> Result<Instance, ContextError> {
    if let Some(provider) = scan.context.provider_for(target) {
        return scan.context.invoke_provider(&provider);
    }
    if let Some(ctor) = scan.context.constructor_for(target) {
        return Ok(ctor.construct());
    }
    Err(ContextError::MissingDependency { key: target })
}
