//! Dependency providers: factories that produce one instance of a declared
//! type on demand.
//!
//! Three variants cover the registry's resolution chain: a manual factory
//! closure, a provider method on a meta-component whose own parameters are
//! resolved from the context at call time (provider chains), and the
//! no-argument constructor used as the fallback of last resort.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::context::Context;
use crate::error::ContextError;
use crate::key::{Args, Instance, TypeKey};

pub trait Provider: Send + Sync {
    /// The type this provider produces.
    fn provides(&self) -> TypeKey;

    /// Produces a fresh instance. Products are never cached by the registry.
    fn produce(&self, ctx: &Context) -> Result<Instance, ContextError>;
}

/// Manual provider over a user-supplied factory function.
pub struct FactoryProvider<T: ?Sized + Send + Sync + 'static> {
    factory: Box<dyn Fn(&Context) -> anyhow::Result<Arc<T>> + Send + Sync>,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> FactoryProvider<T> {
    pub fn new(factory: impl Fn(&Context) -> anyhow::Result<Arc<T>> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Provider for FactoryProvider<T> {
    fn provides(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn produce(&self, ctx: &Context) -> Result<Instance, ContextError> {
        (self.factory)(ctx)
            .map(Instance::new)
            .map_err(|source| ContextError::Provider {
                key: TypeKey::of::<T>(),
                source,
            })
    }
}

/// Provider backed by a method on a meta-component.
///
/// Parameters are resolved from the context when the provider runs, so a
/// provider's product may itself depend on other providers. Cycles in such
/// chains are caught by the context's resolution guard.
pub struct MethodProvider {
    provides: TypeKey,
    method: &'static str,
    owner: Instance,
    params: Vec<TypeKey>,
    invoke: Arc<dyn Fn(&Instance, &Args) -> anyhow::Result<Instance> + Send + Sync>,
}

impl MethodProvider {
    pub fn new(
        provides: TypeKey,
        method: &'static str,
        owner: Instance,
        params: Vec<TypeKey>,
        invoke: Arc<dyn Fn(&Instance, &Args) -> anyhow::Result<Instance> + Send + Sync>,
    ) -> Self {
        Self {
            provides,
            method,
            owner,
            params,
            invoke,
        }
    }
}

impl Provider for MethodProvider {
    fn provides(&self) -> TypeKey {
        self.provides
    }

    fn produce(&self, ctx: &Context) -> Result<Instance, ContextError> {
        let mut resolved = Vec::with_capacity(self.params.len());
        for param in &self.params {
            resolved.push(ctx.provide_erased(*param)?);
        }
        let args = Args::new(resolved);
        (self.invoke)(&self.owner, &args).map_err(|source| ContextError::Provider {
            key: self.provides,
            source: source.context(format!("provider method '{}'", self.method)),
        })
    }
}

/// Wraps a component's no-argument constructor.
///
/// Registered for every discovered component so the registry can fall back
/// to plain construction when nothing else satisfies a request.
pub struct ConstructorProvider {
    provides: TypeKey,
    component: &'static str,
    construct: Arc<dyn Fn() -> Instance + Send + Sync>,
}

impl ConstructorProvider {
    pub fn new(
        provides: TypeKey,
        component: &'static str,
        construct: Arc<dyn Fn() -> Instance + Send + Sync>,
    ) -> Self {
        Self {
            provides,
            component,
            construct,
        }
    }

    /// Constructor provider for any `Default` type, for manual registration.
    pub fn of<T: Default + Send + Sync + 'static>(component: &'static str) -> Self {
        Self {
            provides: TypeKey::of::<T>(),
            component,
            construct: Arc::new(|| Instance::new(Arc::new(T::default()))),
        }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn construct(&self) -> Instance {
        (self.construct)()
    }
}

impl Provider for ConstructorProvider {
    fn provides(&self) -> TypeKey {
        self.provides
    }

    fn produce(&self, _ctx: &Context) -> Result<Instance, ContextError> {
        Ok((self.construct)())
    }
}
