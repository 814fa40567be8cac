//! Attribute processors: pluggable handlers invoked by the initializer for
//! every matching attribute record.
//!
//! A processor declares which member kinds it handles through the
//! `supports_*` flags; the initializer checks the flag before dispatching,
//! and a mismatch is a fatal configuration error. Exactly one processor may
//! handle a given attribute key.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::{AttrData, ComponentDescriptor, FieldSpec, MethodSpec};
use crate::context::Context;
use crate::destroyer::ContextDestroyer;
use crate::error::ContextError;
use crate::initializer::ContextInitializer;
use crate::key::{Instance, TypeKey};

/// Shared state handed to every processor callback.
pub struct Scan<'a> {
    pub context: &'a Arc<Context>,
    pub initializer: &'a ContextInitializer,
    pub destroyer: &'a Arc<ContextDestroyer>,
}

pub trait AttributeProcessor: Send + Sync {
    /// The attribute key this processor handles.
    fn attribute(&self) -> TypeKey;

    fn supports_fields(&self) -> bool {
        false
    }

    fn supports_methods(&self) -> bool {
        false
    }

    fn supports_types(&self) -> bool {
        false
    }

    fn process_field(
        &self,
        _spec: &FieldSpec,
        _owner: &Instance,
        _component: &'static str,
        _scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        Err(ContextError::UnsupportedMember {
            attr: self.attribute(),
            member: "field",
        })
    }

    fn process_method(
        &self,
        _spec: &MethodSpec,
        _owner: &Instance,
        _component: &'static str,
        _scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        Err(ContextError::UnsupportedMember {
            attr: self.attribute(),
            member: "method",
        })
    }

    fn process_type(
        &self,
        _attr: &AttrData,
        _descriptor: &ComponentDescriptor,
        _owner: &Instance,
        _scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        Err(ContextError::UnsupportedMember {
            attr: self.attribute(),
            member: "type",
        })
    }

    /// Runs once after every candidate component has been scanned; used for
    /// global finalization such as invoking collected lifecycle methods.
    fn after_scan(&self, _scan: &Scan<'_>) -> Result<(), ContextError> {
        Ok(())
    }
}

/// The active processor catalogue.
///
/// Interior mutability lets contributed processors join mid-scan (the
/// meta-processor registration path) while scanning holds only shared
/// references. Registration order is preserved for `after_scan`.
#[derive(Default)]
pub struct ProcessorSet {
    ordered: RwLock<Vec<Arc<dyn AttributeProcessor>>>,
    by_attr: RwLock<HashMap<TypeKey, Arc<dyn AttributeProcessor>>>,
}

impl ProcessorSet {
    pub fn register(&self, processor: Arc<dyn AttributeProcessor>) -> Result<(), ContextError> {
        let attr = processor.attribute();
        let mut by_attr = self.by_attr.write();
        if by_attr.contains_key(&attr) {
            return Err(ContextError::DuplicateProcessor { attr });
        }
        by_attr.insert(attr, processor.clone());
        self.ordered.write().push(processor);
        tracing::debug!(attr = %attr, "attribute processor registered");
        Ok(())
    }

    pub fn lookup(&self, attr: TypeKey) -> Option<Arc<dyn AttributeProcessor>> {
        self.by_attr.read().get(&attr).cloned()
    }

    /// Registration-ordered snapshot for finalization.
    pub fn snapshot(&self) -> Vec<Arc<dyn AttributeProcessor>> {
        self.ordered.read().clone()
    }

    pub fn len(&self) -> usize {
        self.ordered.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.read().is_empty()
    }
}
