//! The component catalog: compile-time metadata standing in for runtime
//! reflection.
//!
//! Components describe themselves through [`ComponentDescriptor`] values
//! built with the typed [`DescriptorBuilder`] and submitted through
//! [`Registrator`] functions collected by `inventory`. A descriptor carries
//! the component's constructor plus attribute records for its fields,
//! methods, and type — the same information an annotation scanner would
//! recover reflectively, assembled at build time instead.

use std::collections::HashSet;
use std::sync::Arc;

use crate::cell::{Injected, SyncLazyCell};
use crate::contracts::{Disposable, EventListener, MessageListener};
use crate::dispatch::{EventDispatcher, ListenerOptions, MessageDispatcher};
use crate::error::ContextError;
use crate::key::{Args, Instance, TypeKey};
use crate::processor::AttributeProcessor;
use crate::provider::Provider;

/// How the initializer classifies a component during discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Application-level unit, wired in the second bootstrap phase.
    Regular,
    /// Contributes an attribute processor; wired in the meta phase.
    Processor,
    /// Contributes providers; wired in the meta phase.
    Provider,
}

impl Role {
    pub fn is_meta(self) -> bool {
        !matches!(self, Role::Regular)
    }
}

/// A type-erased attribute record: the key identifies the attribute kind,
/// the value is its payload.
#[derive(Clone)]
pub struct AttrData {
    key: TypeKey,
    value: Arc<dyn std::any::Any + Send + Sync>,
}

impl AttrData {
    pub fn new<A: Send + Sync + 'static>(value: A) -> Self {
        Self {
            key: TypeKey::of::<A>(),
            value: Arc::new(value),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn downcast<A: Send + Sync + 'static>(&self) -> Option<Arc<A>> {
        self.value.clone().downcast::<A>().ok()
    }
}

impl std::fmt::Debug for AttrData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AttrData").field(&self.key).finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in attribute payloads
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectMode {
    /// Resolve now and assign the value.
    Direct,
    /// Bind a lazy cell; resolution happens on first access.
    Deferred,
    /// Construct a brand-new, container-untracked instance.
    Fresh,
}

/// Field attribute: dependency injection.
#[derive(Clone, Copy, Debug)]
pub struct Inject {
    pub mode: InjectMode,
    /// Optional resolution-key override; defaults to the field's own type.
    pub target: Option<TypeKey>,
}

/// Method attribute: lifecycle-start invocation, higher priority runs first.
#[derive(Clone, Copy, Debug)]
pub struct Initiate {
    pub priority: i32,
}

/// Method attribute: lifecycle-end invocation, higher priority runs first.
#[derive(Clone, Copy, Debug)]
pub struct Destroy {
    pub priority: i32,
}

pub type DisposeAction = Arc<dyn Fn(&Instance) -> anyhow::Result<()> + Send + Sync>;
pub type DisposableCast = Arc<dyn Fn(&Instance) -> Option<Arc<dyn Disposable>> + Send + Sync>;
pub type ProcessorCast =
    Arc<dyn Fn(&Instance) -> Option<Arc<dyn AttributeProcessor>> + Send + Sync>;
pub type ProviderCast = Arc<dyn Fn(&Instance) -> Option<Arc<dyn Provider>> + Send + Sync>;
pub type AliasCast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;
pub type SubscribeFn =
    Arc<dyn Fn(&Instance, &EventDispatcher, &MessageDispatcher) -> anyhow::Result<()> + Send + Sync>;
pub type AssignFn = Arc<dyn Fn(&Instance, Binding) -> anyhow::Result<()> + Send + Sync>;
pub type ProvideFn = Arc<dyn Fn(&Instance, &Args) -> anyhow::Result<Instance> + Send + Sync>;
pub type InvokeFn = Arc<dyn Fn(&Instance, &Args) -> anyhow::Result<()> + Send + Sync>;

/// Field or type attribute: teardown of held resources.
#[derive(Clone)]
pub struct Dispose {
    pub target: DisposeTarget,
}

#[derive(Clone)]
pub enum DisposeTarget {
    /// Dispose a field's value (a lazy field only if it was forced).
    Field { action: DisposeAction },
    /// Dispose the component itself via its `Disposable` capability.
    Type { cast: DisposableCast },
}

/// Type attribute: additional registry keys for one instance.
#[derive(Clone)]
pub struct Aliases {
    pub entries: Vec<AliasEntry>,
}

#[derive(Clone)]
pub struct AliasEntry {
    pub alias: TypeKey,
    pub cast: AliasCast,
}

/// Type attribute: the component contributes providers.
#[derive(Clone)]
pub struct Provides {
    pub source: ProvideSource,
}

#[derive(Clone)]
pub enum ProvideSource {
    /// The component itself implements `Provider`.
    Object { cast: ProviderCast },
    /// Declared provider methods, registered individually.
    Methods(Vec<ProviderMethodSpec>),
}

#[derive(Clone)]
pub struct ProviderMethodSpec {
    pub method: &'static str,
    pub provides: TypeKey,
    pub params: Vec<TypeKey>,
    pub invoke: ProvideFn,
}

/// Type attribute: the component is itself an attribute processor.
#[derive(Clone)]
pub struct ProcessorCapability {
    pub cast: ProcessorCast,
}

/// Type attribute: event/message subscriptions to install at scan time.
#[derive(Clone)]
pub struct Subscriptions {
    pub entries: Vec<SubscriptionSpec>,
}

#[derive(Clone)]
pub struct SubscriptionSpec {
    pub label: String,
    pub subscribe: SubscribeFn,
}

// ---------------------------------------------------------------------------
// Member specs
// ---------------------------------------------------------------------------

/// What the injection processor hands to a field's assignment closure.
pub enum Binding {
    Ready(Instance),
    Deferred(DeferredProvider),
}

pub type DeferredProvider = Arc<dyn Fn() -> Result<Instance, ContextError> + Send + Sync>;

pub struct FieldSpec {
    pub name: &'static str,
    /// The field's own declared target type.
    pub declared: TypeKey,
    pub attr: AttrData,
    /// Absent for marker-only attributes (e.g. dispose records).
    pub assign: Option<AssignFn>,
}

pub struct MethodSpec {
    pub name: &'static str,
    pub attr: AttrData,
    pub params: Vec<TypeKey>,
    pub invoke: InvokeFn,
}

pub struct ComponentDescriptor {
    pub name: &'static str,
    pub key: TypeKey,
    pub role: Role,
    pub construct: Arc<dyn Fn() -> Instance + Send + Sync>,
    pub type_attrs: Vec<AttrData>,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<MethodSpec>,
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("role", &self.role)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("type_attrs", &self.type_attrs.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Typed descriptor builder
// ---------------------------------------------------------------------------

/// Builds a [`ComponentDescriptor`] for component type `C`.
///
/// The builder generates every type-erased closure from typed accessors, so
/// capability requirements (`Disposable`, `AttributeProcessor`, listener
/// traits) are enforced as trait bounds at compile time.
pub struct DescriptorBuilder<C: Send + Sync + 'static> {
    name: &'static str,
    construct: Arc<dyn Fn() -> Instance + Send + Sync>,
    explicit_processor: Option<ProcessorCast>,
    provider_object: Option<ProviderCast>,
    provider_methods: Vec<ProviderMethodSpec>,
    aliases: Vec<AliasEntry>,
    subscriptions: Vec<SubscriptionSpec>,
    type_attrs: Vec<AttrData>,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
    _marker: std::marker::PhantomData<fn() -> C>,
}

impl<C: Send + Sync + 'static> DescriptorBuilder<C> {
    pub fn new(name: &'static str) -> Self
    where
        C: Default,
    {
        Self::with_constructor(name, C::default)
    }

    pub fn with_constructor(name: &'static str, ctor: fn() -> C) -> Self {
        Self {
            name,
            construct: Arc::new(move || Instance::new(Arc::new(ctor()))),
            explicit_processor: None,
            provider_object: None,
            provider_methods: Vec::new(),
            aliases: Vec::new(),
            subscriptions: Vec::new(),
            type_attrs: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    fn downcast_owner(owner: &Instance) -> anyhow::Result<Arc<C>> {
        owner
            .downcast::<C>()
            .ok_or_else(|| anyhow::anyhow!("owner is not a '{}'", TypeKey::of::<C>()))
    }

    /// Direct injection into an `Injected<T>` field.
    pub fn field<T: ?Sized + Send + Sync + 'static>(
        self,
        name: &'static str,
        access: fn(&C) -> &Injected<T>,
    ) -> Self {
        self.field_mode(name, InjectMode::Direct, None, access)
    }

    /// Direct injection resolving an explicit key instead of the field type.
    /// The instance stored under `target` must still hold an `Arc<T>`.
    pub fn field_keyed<T: ?Sized + Send + Sync + 'static>(
        self,
        name: &'static str,
        target: TypeKey,
        access: fn(&C) -> &Injected<T>,
    ) -> Self {
        self.field_mode(name, InjectMode::Direct, Some(target), access)
    }

    /// Fresh injection: a container-untracked instance built just for this
    /// field, via provider or no-arg constructor.
    pub fn fresh_field<T: ?Sized + Send + Sync + 'static>(
        self,
        name: &'static str,
        access: fn(&C) -> &Injected<T>,
    ) -> Self {
        self.field_mode(name, InjectMode::Fresh, None, access)
    }

    fn field_mode<T: ?Sized + Send + Sync + 'static>(
        mut self,
        name: &'static str,
        mode: InjectMode,
        target: Option<TypeKey>,
        access: fn(&C) -> &Injected<T>,
    ) -> Self {
        let assign: AssignFn = Arc::new(move |owner, binding| {
            let component = Self::downcast_owner(owner)?;
            match binding {
                Binding::Ready(value) => {
                    let got = value.key();
                    let typed = value.downcast::<T>().ok_or_else(|| {
                        anyhow::anyhow!(
                            "field '{name}' expected '{}', got '{got}'",
                            TypeKey::of::<T>()
                        )
                    })?;
                    access(&component).set(typed)
                }
                Binding::Deferred(_) => {
                    anyhow::bail!("field '{name}' takes a direct value, not a deferred provider")
                }
            }
        });
        self.fields.push(FieldSpec {
            name,
            declared: TypeKey::of::<T>(),
            attr: AttrData::new(Inject { mode, target }),
            assign: Some(assign),
        });
        self
    }

    /// Deferred injection: binds the field's lazy cell to a provider chosen
    /// at scan time; nothing is constructed until the cell is forced.
    pub fn lazy_field<T: ?Sized + Send + Sync + 'static>(
        mut self,
        name: &'static str,
        access: fn(&C) -> &SyncLazyCell<Arc<T>>,
    ) -> Self {
        let assign: AssignFn = Arc::new(move |owner, binding| {
            let component = Self::downcast_owner(owner)?;
            match binding {
                Binding::Deferred(provider) => access(&component).bind(Box::new(move || {
                    let value = provider()?;
                    let got = value.key();
                    value.downcast::<T>().ok_or_else(|| {
                        anyhow::anyhow!(
                            "lazy field '{name}' expected '{}', got '{got}'",
                            TypeKey::of::<T>()
                        )
                    })
                })),
                Binding::Ready(_) => {
                    anyhow::bail!("lazy field '{name}' takes a deferred provider")
                }
            }
        });
        self.fields.push(FieldSpec {
            name,
            declared: TypeKey::of::<T>(),
            attr: AttrData::new(Inject {
                mode: InjectMode::Deferred,
                target: None,
            }),
            assign: Some(assign),
        });
        self
    }

    /// Lifecycle-start method; `params` are resolved from the context at
    /// scan time and handed to `body` at invocation.
    pub fn initiate(
        mut self,
        method: &'static str,
        priority: i32,
        params: Vec<TypeKey>,
        body: impl Fn(&C, &Args) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        let invoke = Self::wrap_invoke(body);
        self.methods.push(MethodSpec {
            name: method,
            attr: AttrData::new(Initiate { priority }),
            params,
            invoke,
        });
        self
    }

    /// Lifecycle-end method; invoked during teardown, failure-isolated.
    pub fn destroy(
        mut self,
        method: &'static str,
        priority: i32,
        params: Vec<TypeKey>,
        body: impl Fn(&C, &Args) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        let invoke = Self::wrap_invoke(body);
        self.methods.push(MethodSpec {
            name: method,
            attr: AttrData::new(Destroy { priority }),
            params,
            invoke,
        });
        self
    }

    fn wrap_invoke(
        body: impl Fn(&C, &Args) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> InvokeFn {
        Arc::new(move |owner, args| {
            let component = Self::downcast_owner(owner)?;
            body(&component, args)
        })
    }

    /// Registers a plain disposable field for teardown.
    pub fn dispose_field<F: Disposable + 'static>(
        mut self,
        name: &'static str,
        access: fn(&C) -> &F,
    ) -> Self {
        let action: DisposeAction = Arc::new(move |owner| {
            let component = Self::downcast_owner(owner)?;
            access(&component).dispose()
        });
        self.fields.push(FieldSpec {
            name,
            declared: TypeKey::of::<F>(),
            attr: AttrData::new(Dispose {
                target: DisposeTarget::Field { action },
            }),
            assign: None,
        });
        self
    }

    /// Registers a lazily injected field for teardown; disposal runs only
    /// when the cell was actually forced.
    pub fn dispose_lazy_field<T: Disposable + ?Sized + Send + Sync + 'static>(
        mut self,
        name: &'static str,
        access: fn(&C) -> &SyncLazyCell<Arc<T>>,
    ) -> Self {
        let action: DisposeAction = Arc::new(move |owner| {
            let component = Self::downcast_owner(owner)?;
            match access(&component).peek() {
                Some(value) => value.dispose(),
                None => Ok(()),
            }
        });
        self.fields.push(FieldSpec {
            name,
            declared: TypeKey::of::<T>(),
            attr: AttrData::new(Dispose {
                target: DisposeTarget::Field { action },
            }),
            assign: None,
        });
        self
    }

    /// Marks the whole component for disposal at shutdown.
    pub fn disposable(mut self) -> Self
    where
        C: Disposable,
    {
        let cast: DisposableCast =
            Arc::new(|owner| owner.downcast::<C>().map(|c| c as Arc<dyn Disposable>));
        self.type_attrs.push(AttrData::new(Dispose {
            target: DisposeTarget::Type { cast },
        }));
        self
    }

    /// Registers the instance under an additional key, typically a trait
    /// object: `.alias(|c| c as Arc<dyn SomeApi>)`.
    pub fn alias<T: ?Sized + Send + Sync + 'static>(mut self, cast: fn(Arc<C>) -> Arc<T>) -> Self {
        self.aliases.push(AliasEntry {
            alias: TypeKey::of::<T>(),
            cast: Arc::new(move |owner| owner.downcast::<C>().map(|c| Instance::new(cast(c)))),
        });
        self
    }

    /// Declares a provider method on this (meta-)component.
    pub fn provides<T: ?Sized + Send + Sync + 'static>(
        mut self,
        method: &'static str,
        params: Vec<TypeKey>,
        body: impl Fn(&C, &Args) -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    ) -> Self {
        let invoke: ProvideFn = Arc::new(move |owner, args| {
            let component = Self::downcast_owner(owner)?;
            body(&component, args).map(Instance::new)
        });
        self.provider_methods.push(ProviderMethodSpec {
            method,
            provides: TypeKey::of::<T>(),
            params,
            invoke,
        });
        self
    }

    /// The component itself implements [`Provider`] and is registered as-is.
    pub fn provider_object(mut self) -> Self
    where
        C: Provider,
    {
        self.provider_object = Some(Arc::new(|owner| {
            owner.downcast::<C>().map(|c| c as Arc<dyn Provider>)
        }));
        self
    }

    /// The component is an attribute processor and joins the active set
    /// during the meta phase.
    pub fn processor(mut self) -> Self
    where
        C: AttributeProcessor,
    {
        self.explicit_processor = Some(Arc::new(|owner| {
            owner
                .downcast::<C>()
                .map(|c| c as Arc<dyn AttributeProcessor>)
        }));
        self
    }

    /// Subscribes the component to a typed event.
    pub fn on_event<E: Send + Sync + 'static>(mut self, options: ListenerOptions) -> Self
    where
        C: EventListener<E>,
    {
        let subscribe: SubscribeFn = Arc::new(move |owner, events, _messages| {
            let component = Self::downcast_owner(owner)?;
            events.add_listener::<E>(move |event| component.on_event(event), options);
            Ok(())
        });
        self.subscriptions.push(SubscriptionSpec {
            label: std::any::type_name::<E>().to_string(),
            subscribe,
        });
        self
    }

    /// Subscribes the component to a string-keyed message.
    pub fn on_message(mut self, key: impl Into<String>, options: ListenerOptions) -> Self
    where
        C: MessageListener,
    {
        let key = key.into();
        let label = key.clone();
        let subscribe: SubscribeFn = Arc::new(move |owner, _events, messages| {
            let component = Self::downcast_owner(owner)?;
            messages.add_listener(key.clone(), move |message| component.on_message(message), options);
            Ok(())
        });
        self.subscriptions.push(SubscriptionSpec { label, subscribe });
        self
    }

    /// Escape hatch for custom attributes handled by contributed processors.
    pub fn with_type_attr(mut self, attr: AttrData) -> Self {
        self.type_attrs.push(attr);
        self
    }

    /// Escape hatch for custom method attributes.
    pub fn method_with(
        mut self,
        method: &'static str,
        attr: AttrData,
        params: Vec<TypeKey>,
        body: impl Fn(&C, &Args) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        let invoke = Self::wrap_invoke(body);
        self.methods.push(MethodSpec {
            name: method,
            attr,
            params,
            invoke,
        });
        self
    }

    pub fn build(self) -> ComponentDescriptor {
        let role = if self.explicit_processor.is_some() {
            Role::Processor
        } else if self.provider_object.is_some() || !self.provider_methods.is_empty() {
            Role::Provider
        } else {
            Role::Regular
        };

        let mut type_attrs = self.type_attrs;
        if !self.aliases.is_empty() {
            type_attrs.push(AttrData::new(Aliases {
                entries: self.aliases,
            }));
        }
        if let Some(cast) = self.provider_object {
            type_attrs.push(AttrData::new(Provides {
                source: ProvideSource::Object { cast },
            }));
        } else if !self.provider_methods.is_empty() {
            type_attrs.push(AttrData::new(Provides {
                source: ProvideSource::Methods(self.provider_methods),
            }));
        }
        if let Some(cast) = self.explicit_processor {
            type_attrs.push(AttrData::new(ProcessorCapability { cast }));
        }
        if !self.subscriptions.is_empty() {
            type_attrs.push(AttrData::new(Subscriptions {
                entries: self.subscriptions,
            }));
        }

        ComponentDescriptor {
            name: self.name,
            key: TypeKey::of::<C>(),
            role,
            construct: self.construct,
            type_attrs,
            fields: self.fields,
            methods: self.methods,
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// The function type submitted via `inventory::submit!`; it receives the
/// builder, not a finished catalog.
pub struct Registrator(pub fn(&mut CatalogBuilder));

inventory::collect!(Registrator);

/// Submits a registrator function for link-time discovery.
#[macro_export]
macro_rules! register_components {
    ($registrator:path) => {
        $crate::inventory::submit! {
            $crate::catalog::Registrator($registrator)
        }
    };
}

/// Accumulates descriptors; uniqueness is enforced at build time so every
/// configuration problem is reported at once.
#[derive(Default)]
pub struct CatalogBuilder {
    descriptors: Vec<ComponentDescriptor>,
    names: HashSet<&'static str>,
    keys: HashSet<TypeKey>,
    errors: Vec<String>,
}

impl CatalogBuilder {
    pub fn register(&mut self, descriptor: ComponentDescriptor) {
        if !self.names.insert(descriptor.name) {
            self.errors
                .push(format!("component '{}' is already registered", descriptor.name));
            return;
        }
        if !self.keys.insert(descriptor.key) {
            self.errors.push(format!(
                "type '{}' is declared by more than one component",
                descriptor.key
            ));
            return;
        }
        self.descriptors.push(descriptor);
    }

    pub fn build(self) -> Result<Catalog, ContextError> {
        if !self.errors.is_empty() {
            return Err(ContextError::InvalidCatalog {
                errors: self.errors,
            });
        }
        Ok(Catalog {
            descriptors: self.descriptors,
        })
    }
}

/// The finished, discovery-ordered component catalog.
#[derive(Debug)]
pub struct Catalog {
    descriptors: Vec<ComponentDescriptor>,
}

impl Catalog {
    /// Runs every submitted registrator and builds the catalog.
    pub fn discover() -> Result<Self, ContextError> {
        let mut builder = CatalogBuilder::default();
        for registrator in inventory::iter::<Registrator> {
            registrator.0(&mut builder);
        }
        builder.build()
    }

    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<ComponentDescriptor> {
        self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Plain {
        dep: Injected<u32>,
    }

    #[test]
    fn builder_assigns_roles() {
        let regular = DescriptorBuilder::<Plain>::new("plain").build();
        assert_eq!(regular.role, Role::Regular);
        assert!(!regular.role.is_meta());

        let provider = DescriptorBuilder::<Plain>::new("factory")
            .provides::<String>("make", Vec::new(), |_, _| Ok(Arc::new(String::new())))
            .build();
        assert_eq!(provider.role, Role::Provider);
        assert!(provider.role.is_meta());
    }

    #[test]
    fn duplicate_components_are_reported() {
        let mut builder = CatalogBuilder::default();
        builder.register(DescriptorBuilder::<Plain>::new("plain").build());
        builder.register(DescriptorBuilder::<Plain>::new("plain").build());

        match builder.build() {
            Err(ContextError::InvalidCatalog { errors }) => {
                assert!(errors.iter().any(|e| e.contains("already registered")));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn duplicate_type_keys_are_reported() {
        let mut builder = CatalogBuilder::default();
        builder.register(DescriptorBuilder::<Plain>::new("one").build());
        builder.register(DescriptorBuilder::<Plain>::new("two").build());

        match builder.build() {
            Err(ContextError::InvalidCatalog { errors }) => {
                assert!(errors.iter().any(|e| e.contains("more than one component")));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn assignment_closures_type_check_values() {
        let descriptor = DescriptorBuilder::<Plain>::new("plain")
            .field("dep", |c| &c.dep)
            .build();
        let owner = (descriptor.construct)();
        let assign = descriptor.fields[0].assign.as_ref().unwrap();

        // Wrong payload type is rejected.
        let wrong = Instance::new(Arc::new("nope"));
        assert!(assign(&owner, Binding::Ready(wrong)).is_err());

        let right = Instance::new(Arc::new(9u32));
        assign(&owner, Binding::Ready(right)).unwrap();
        assert_eq!(**owner.downcast::<Plain>().unwrap().dep.get(), 9);
    }
}
