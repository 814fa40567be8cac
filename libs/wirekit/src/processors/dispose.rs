//! Resource disposal at shutdown.
//!
//! Collects disposal actions during scanning and registers them with the
//! destroyer in its own `after_scan`, which by catalogue order runs after
//! the destruction-method action has been registered — destruction methods
//! run first at shutdown, then disposal. Disposal failures are expected
//! (resources may already be invalid) and are logged at debug only.

use parking_lot::Mutex;

use crate::catalog::{AttrData, ComponentDescriptor, Dispose, DisposeAction, DisposeTarget, FieldSpec};
use crate::error::ContextError;
use crate::key::{Instance, TypeKey};
use crate::processor::{AttributeProcessor, Scan};

struct PendingDisposal {
    label: String,
    owner: Instance,
    action: DisposeAction,
}

#[derive(Default)]
pub struct DisposeProcessor {
    pending: Mutex<Vec<PendingDisposal>>,
}

impl AttributeProcessor for DisposeProcessor {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<Dispose>()
    }

    fn supports_fields(&self) -> bool {
        true
    }

    fn supports_types(&self) -> bool {
        true
    }

    fn process_field(
        &self,
        spec: &FieldSpec,
        owner: &Instance,
        component: &'static str,
        _scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let dispose = spec
            .attr
            .downcast::<Dispose>()
            .ok_or(ContextError::MalformedAttribute {
                attr: spec.attr.key(),
                component,
            })?;
        let action = match &dispose.target {
            DisposeTarget::Field { action } => action.clone(),
            DisposeTarget::Type { .. } => {
                return Err(ContextError::MalformedAttribute {
                    attr: spec.attr.key(),
                    component,
                })
            }
        };
        self.pending.lock().push(PendingDisposal {
            label: format!("dispose:{component}.{}", spec.name),
            owner: owner.clone(),
            action,
        });
        Ok(())
    }

    fn process_type(
        &self,
        attr: &AttrData,
        descriptor: &ComponentDescriptor,
        owner: &Instance,
        _scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let dispose = attr
            .downcast::<Dispose>()
            .ok_or(ContextError::MalformedAttribute {
                attr: attr.key(),
                component: descriptor.name,
            })?;
        let cast = match &dispose.target {
            DisposeTarget::Type { cast } => cast.clone(),
            DisposeTarget::Field { .. } => {
                return Err(ContextError::MalformedAttribute {
                    attr: attr.key(),
                    component: descriptor.name,
                })
            }
        };
        // The capability must hold at scan time, not at shutdown.
        if cast(owner).is_none() {
            return Err(ContextError::MissingCapability {
                component: descriptor.name,
                capability: "Disposable",
            });
        }
        let action: DisposeAction = std::sync::Arc::new(move |instance| match cast(instance) {
            Some(disposable) => disposable.dispose(),
            None => Ok(()),
        });
        self.pending.lock().push(PendingDisposal {
            label: format!("dispose:{}", descriptor.name),
            owner: owner.clone(),
            action,
        });
        Ok(())
    }

    fn after_scan(&self, scan: &Scan<'_>) -> Result<(), ContextError> {
        for disposal in std::mem::take(&mut *self.pending.lock()) {
            let PendingDisposal {
                label,
                owner,
                action,
            } = disposal;
            let log_label = label.clone();
            scan.destroyer.register(label, move || {
                if let Err(err) = action(&owner) {
                    tracing::debug!(action = %log_label, error = %err, "disposal failed; ignoring");
                }
                Ok(())
            });
        }
        Ok(())
    }
}
