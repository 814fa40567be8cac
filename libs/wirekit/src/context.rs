//! The component registry.
//!
//! The context maps type keys to component instances, providers, and no-arg
//! constructors. It is single-writer during bootstrap and read-mostly
//! afterwards; locks are held only for map access, never across provider
//! invocations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ContextError;
use crate::key::{Instance, TypeKey};
use crate::provider::{ConstructorProvider, Provider};

thread_local! {
    // In-flight resolution keys, per thread. Guards provider chains against
    // a provider transitively requiring its own output.
    static RESOLVING: RefCell<Vec<TypeKey>> = const { RefCell::new(Vec::new()) };
}

pub struct Context {
    components: RwLock<HashMap<TypeKey, Instance>>,
    providers: RwLock<HashMap<TypeKey, Arc<dyn Provider>>>,
    constructors: RwLock<HashMap<TypeKey, Arc<ConstructorProvider>>>,
    create_missing: bool,
}

impl Context {
    /// `create_missing` enables the constructor fallback: when neither a
    /// component nor a provider exists for a requested type, the registry
    /// constructs one via the type's registered no-arg constructor.
    pub fn new(create_missing: bool) -> Self {
        Self {
            components: RwLock::new(HashMap::new()),
            providers: RwLock::new(HashMap::new()),
            constructors: RwLock::new(HashMap::new()),
            create_missing,
        }
    }

    pub fn create_missing(&self) -> bool {
        self.create_missing
    }

    /// Registers an instance under its own type key. Also used to alias an
    /// already-registered component under additional trait-object keys.
    pub fn add<T: ?Sized + Send + Sync + 'static>(&self, instance: Arc<T>) {
        self.add_instance(Instance::new(instance));
    }

    pub fn add_instance(&self, instance: Instance) {
        let key = instance.key();
        if self.components.write().insert(key, instance).is_some() {
            tracing::warn!(key = %key, "component registration replaced an earlier one");
        }
    }

    pub fn add_provider(&self, provider: Arc<dyn Provider>) {
        let key = provider.provides();
        if self.providers.write().insert(key, provider).is_some() {
            tracing::warn!(key = %key, "provider registration replaced an earlier one");
        }
    }

    pub fn register_constructor(&self, ctor: Arc<ConstructorProvider>) {
        self.constructors.write().insert(ctor.provides(), ctor);
    }

    /// Looks up a registered component without falling back to providers.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.components
            .read()
            .get(&TypeKey::of::<T>())
            .and_then(Instance::downcast)
    }

    pub fn is_present<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.is_present_key(TypeKey::of::<T>())
    }

    pub fn is_present_key(&self, key: TypeKey) -> bool {
        self.components.read().contains_key(&key)
    }

    pub fn has_provider<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.has_provider_key(TypeKey::of::<T>())
    }

    pub fn has_provider_key(&self, key: TypeKey) -> bool {
        self.providers.read().contains_key(&key)
    }

    pub fn has_constructor_key(&self, key: TypeKey) -> bool {
        self.constructors.read().contains_key(&key)
    }

    pub fn provider_for(&self, key: TypeKey) -> Option<Arc<dyn Provider>> {
        self.providers.read().get(&key).cloned()
    }

    pub fn constructor_for(&self, key: TypeKey) -> Option<Arc<ConstructorProvider>> {
        self.constructors.read().get(&key).cloned()
    }

    /// Resolves a dependency: registered component first, then a provider's
    /// product (never cached here), then the no-arg constructor fallback
    /// when enabled.
    pub fn provide<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ContextError> {
        let key = TypeKey::of::<T>();
        let instance = self.provide_erased(key)?;
        instance
            .downcast::<T>()
            .ok_or(ContextError::TypeMismatch { key })
    }

    pub fn provide_erased(&self, key: TypeKey) -> Result<Instance, ContextError> {
        if let Some(instance) = self.components.read().get(&key).cloned() {
            return Ok(instance);
        }
        if let Some(provider) = self.provider_for(key) {
            return self.invoke_provider(&provider);
        }
        if self.create_missing {
            if let Some(ctor) = self.constructor_for(key) {
                tracing::debug!(key = %key, component = ctor.component(), "constructing missing dependency");
                return Ok(ctor.construct());
            }
        }
        Err(ContextError::MissingDependency { key })
    }

    /// Runs a provider inside the cycle guard. Deferred injection uses this
    /// directly so lazily forced provider chains get the same protection as
    /// eager resolution.
    pub fn invoke_provider(&self, provider: &Arc<dyn Provider>) -> Result<Instance, ContextError> {
        let key = provider.provides();
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&key) {
                let mut path: Vec<&'static str> = stack.iter().map(TypeKey::name).collect();
                path.push(key.name());
                return Err(ContextError::ProviderCycle { path });
            }
            stack.push(key);
            Ok(())
        })?;
        let result = provider.produce(self);
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
        result
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("components", &self.components.read().len())
            .field("providers", &self.providers.read().len())
            .field("constructors", &self.constructors.read().len())
            .field("create_missing", &self.create_missing)
            .finish()
    }
}
