use thiserror::Error;

use crate::key::TypeKey;

/// Structured errors for wiring and resolution.
///
/// Configuration errors abort bootstrap; resolution errors surface at the
/// `provide` call that triggered them. Teardown never reports through this
/// type — the destroyer logs and keeps going.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no component, provider, or constructor available for '{key}'")]
    MissingDependency { key: TypeKey },

    #[error("provider for '{key}' failed")]
    Provider {
        key: TypeKey,
        #[source]
        source: anyhow::Error,
    },

    #[error("cyclic provider chain detected: {}", path.join(" -> "))]
    ProviderCycle { path: Vec<&'static str> },

    #[error("value registered under '{key}' has an unexpected concrete type")]
    TypeMismatch { key: TypeKey },

    #[error("attribute '{attr}' on component '{component}' has no registered processor")]
    UnknownAttribute {
        attr: TypeKey,
        component: &'static str,
    },

    #[error("attribute '{attr}' already has a processor; one processor per attribute")]
    DuplicateProcessor { attr: TypeKey },

    #[error("processor for attribute '{attr}' does not handle {member} members")]
    UnsupportedMember {
        attr: TypeKey,
        member: &'static str,
    },

    #[error("attribute '{attr}' on component '{component}' carries malformed data")]
    MalformedAttribute {
        attr: TypeKey,
        component: &'static str,
    },

    #[error("component '{component}' is missing the {capability} capability")]
    MissingCapability {
        component: &'static str,
        capability: &'static str,
    },

    #[error("invalid component catalog:\n{errors:#?}")]
    InvalidCatalog { errors: Vec<String> },

    #[error("scanning component '{component}' failed")]
    Scan {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("initiation method '{method}' on '{component}' failed")]
    Initiate {
        component: &'static str,
        method: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
