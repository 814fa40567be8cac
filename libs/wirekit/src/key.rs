//! Type keys and the erased instance currency used by the registry.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Identifies a component type inside the registry.
///
/// The `TypeId` is the actual map key; the type name rides along so errors
/// and logs can say which type was involved. Trait objects are valid keys
/// (`TypeKey::of::<dyn MyApi>()`), which is what makes multi-interface
/// registration work.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased, shareable component instance.
///
/// Internally this is an `Arc<dyn Any>` holding an `Arc<T>`, where `T` may be
/// a trait object. Storing the inner `Arc` as a sized value is what allows
/// `downcast` to recover `Arc<dyn SomeApi>` as well as `Arc<Concrete>`.
#[derive(Clone)]
pub struct Instance {
    key: TypeKey,
    cell: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            cell: Arc::new(value),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Recovers the typed `Arc` this instance was created from.
    ///
    /// Returns `None` when `T` is not the exact type the instance was
    /// registered under.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.cell.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("key", &self.key).finish()
    }
}

/// Resolved arguments for a lifecycle or provider method invocation.
#[derive(Clone, Debug, Default)]
pub struct Args(Vec<Instance>);

impl Args {
    pub fn new(values: Vec<Instance>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> anyhow::Result<Arc<T>> {
        let inst = self
            .0
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("argument {index} is missing"))?;
        inst.downcast::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "argument {index} is a '{}', not a '{}'",
                inst.key(),
                TypeKey::of::<T>()
            )
        })
    }
}
