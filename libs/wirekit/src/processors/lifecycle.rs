//! Prioritized lifecycle invocation.
//!
//! Both processors collect `PrioritizedInvocation`s with arguments resolved
//! at scan time and sort priority-descending; the stable sort preserves
//! discovery order between equal priorities. Initiate invokes at
//! finalization (and again at the end of the meta phase, for meta-components
//! only); Destroy hands a single deferred invocation action to the
//! destroyer instead.

use parking_lot::Mutex;

use crate::catalog::{Destroy, Initiate, InvokeFn, MethodSpec};
use crate::error::ContextError;
use crate::key::{Args, Instance, TypeKey};
use crate::processor::{AttributeProcessor, Scan};

struct PrioritizedInvocation {
    component: &'static str,
    method: &'static str,
    owner: Instance,
    args: Args,
    invoke: InvokeFn,
    priority: i32,
}

fn collect(
    pending: &Mutex<Vec<PrioritizedInvocation>>,
    priority: i32,
    spec: &MethodSpec,
    owner: &Instance,
    component: &'static str,
    scan: &Scan<'_>,
) -> Result<(), ContextError> {
    let mut resolved = Vec::with_capacity(spec.params.len());
    for param in &spec.params {
        resolved.push(scan.context.provide_erased(*param)?);
    }
    pending.lock().push(PrioritizedInvocation {
        component,
        method: spec.name,
        owner: owner.clone(),
        args: Args::new(resolved),
        invoke: spec.invoke.clone(),
        priority,
    });
    Ok(())
}

fn take_sorted(pending: &Mutex<Vec<PrioritizedInvocation>>) -> Vec<PrioritizedInvocation> {
    let mut entries = std::mem::take(&mut *pending.lock());
    entries.sort_by(|a, b| b.priority.cmp(&a.priority));
    entries
}

/// Lifecycle-start processor.
#[derive(Default)]
pub struct InitiateProcessor {
    pending: Mutex<Vec<PrioritizedInvocation>>,
}

impl InitiateProcessor {
    /// Sorts, invokes, and clears the collected entries. Invocation errors
    /// are fatal: a component that cannot start aborts bootstrap.
    pub(crate) fn flush(&self) -> Result<(), ContextError> {
        for entry in take_sorted(&self.pending) {
            tracing::debug!(
                component = entry.component,
                method = entry.method,
                priority = entry.priority,
                "invoking initiation method"
            );
            (entry.invoke)(&entry.owner, &entry.args).map_err(|source| ContextError::Initiate {
                component: entry.component,
                method: entry.method,
                source,
            })?;
        }
        Ok(())
    }
}

impl AttributeProcessor for InitiateProcessor {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<Initiate>()
    }

    fn supports_methods(&self) -> bool {
        true
    }

    fn process_method(
        &self,
        spec: &MethodSpec,
        owner: &Instance,
        component: &'static str,
        scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let attr = spec
            .attr
            .downcast::<Initiate>()
            .ok_or(ContextError::MalformedAttribute {
                attr: spec.attr.key(),
                component,
            })?;
        collect(&self.pending, attr.priority, spec, owner, component, scan)
    }

    fn after_scan(&self, _scan: &Scan<'_>) -> Result<(), ContextError> {
        self.flush()
    }
}

/// Lifecycle-end processor.
#[derive(Default)]
pub struct DestroyProcessor {
    pending: Mutex<Vec<PrioritizedInvocation>>,
}

impl AttributeProcessor for DestroyProcessor {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<Destroy>()
    }

    fn supports_methods(&self) -> bool {
        true
    }

    fn process_method(
        &self,
        spec: &MethodSpec,
        owner: &Instance,
        component: &'static str,
        scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let attr = spec
            .attr
            .downcast::<Destroy>()
            .ok_or(ContextError::MalformedAttribute {
                attr: spec.attr.key(),
                component,
            })?;
        collect(&self.pending, attr.priority, spec, owner, component, scan)
    }

    /// Registers one destroyer action performing the sorted invocation at
    /// shutdown. Every entry is individually failure-isolated there.
    fn after_scan(&self, scan: &Scan<'_>) -> Result<(), ContextError> {
        let entries = take_sorted(&self.pending);
        if entries.is_empty() {
            return Ok(());
        }
        scan.destroyer.register("destruction-methods", move || {
            for entry in &entries {
                tracing::debug!(
                    component = entry.component,
                    method = entry.method,
                    priority = entry.priority,
                    "invoking destruction method"
                );
                if let Err(err) = (entry.invoke)(&entry.owner, &entry.args) {
                    tracing::warn!(
                        component = entry.component,
                        method = entry.method,
                        error = %err,
                        "destruction method failed; continuing"
                    );
                }
            }
            Ok(())
        });
        Ok(())
    }
}
