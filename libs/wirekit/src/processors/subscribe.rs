//! Installs declared event and message subscriptions at scan time.

use std::sync::Arc;

use crate::catalog::{AttrData, ComponentDescriptor, Subscriptions};
use crate::dispatch::{EventDispatcher, MessageDispatcher};
use crate::error::ContextError;
use crate::key::{Instance, TypeKey};
use crate::processor::{AttributeProcessor, Scan};

pub struct SubscribeProcessor {
    events: Arc<EventDispatcher>,
    messages: Arc<MessageDispatcher>,
}

impl SubscribeProcessor {
    pub fn new(events: Arc<EventDispatcher>, messages: Arc<MessageDispatcher>) -> Self {
        Self { events, messages }
    }
}

impl AttributeProcessor for SubscribeProcessor {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<Subscriptions>()
    }

    fn supports_types(&self) -> bool {
        true
    }

    fn process_type(
        &self,
        attr: &AttrData,
        descriptor: &ComponentDescriptor,
        owner: &Instance,
        _scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        let subscriptions =
            attr.downcast::<Subscriptions>()
                .ok_or(ContextError::MalformedAttribute {
                    attr: attr.key(),
                    component: descriptor.name,
                })?;
        for subscription in &subscriptions.entries {
            tracing::debug!(
                component = descriptor.name,
                subscription = %subscription.label,
                "installing subscription"
            );
            (subscription.subscribe)(owner, &self.events, &self.messages).map_err(|source| {
                ContextError::Scan {
                    component: descriptor.name,
                    source,
                }
            })?;
        }
        Ok(())
    }
}
