//! End-to-end bootstrap scenarios driven through the public engine API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wirekit::catalog::AttrData;
use wirekit::{
    AttributeProcessor, Catalog, CatalogBuilder, ContextEngine, ContextError, DescriptorBuilder,
    Disposable, EngineOptions, Injected, ListenerOptions, MessageListener, Retention, Scan,
    SyncLazyCell, TypeKey,
};

fn engine_from(
    build: impl FnOnce(&mut CatalogBuilder),
    options: EngineOptions,
) -> Result<ContextEngine, ContextError> {
    let mut builder = CatalogBuilder::default();
    build(&mut builder);
    let catalog = builder.build()?;
    ContextEngine::bootstrap_with(catalog, options)
}

// ---------------------------------------------------------------------------
// Multi-interface registration
// ---------------------------------------------------------------------------

trait AudioOut: Send + Sync {
    fn play(&self);
}

trait VideoOut: Send + Sync {
    fn draw(&self);
}

#[derive(Default)]
struct MediaDriver {
    calls: AtomicUsize,
}

impl AudioOut for MediaDriver {
    fn play(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl VideoOut for MediaDriver {
    fn draw(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn one_component_satisfies_every_declared_interface() {
    let engine = engine_from(
        |b| {
            b.register(
                DescriptorBuilder::<MediaDriver>::new("media_driver")
                    .alias(|c| c as Arc<dyn AudioOut>)
                    .alias(|c| c as Arc<dyn VideoOut>)
                    .build(),
            );
        },
        EngineOptions::default(),
    )
    .unwrap();

    let ctx = engine.context();
    ctx.provide::<dyn AudioOut>().unwrap().play();
    ctx.provide::<dyn VideoOut>().unwrap().draw();
    ctx.provide::<dyn VideoOut>().unwrap().draw();

    // All three keys resolve to the same underlying instance.
    let concrete = ctx.provide::<MediaDriver>().unwrap();
    assert_eq!(concrete.calls.load(Ordering::SeqCst), 3);
}

// ---------------------------------------------------------------------------
// Meta-before-regular ordering
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ConnectionFactory;

struct Connection {
    label: &'static str,
}

#[derive(Default)]
struct Consumer {
    conn: Injected<Connection>,
}

#[test]
fn meta_lifecycle_runs_before_regular_injection() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let factory_log = log.clone();
    let provider_log = log.clone();
    let engine = engine_from(
        move |b| {
            // Regular component first in discovery order on purpose: phase
            // ordering, not declaration order, must dominate.
            b.register(
                DescriptorBuilder::<Consumer>::new("consumer")
                    .field("conn", |c| &c.conn)
                    .build(),
            );
            let provider_log = provider_log.clone();
            let factory_log = factory_log.clone();
            b.register(
                DescriptorBuilder::<ConnectionFactory>::new("connection_factory")
                    .provides::<Connection>("open", Vec::new(), move |_, _| {
                        provider_log.lock().unwrap().push("provide");
                        Ok(Arc::new(Connection { label: "open" }))
                    })
                    .initiate("prepare", 0, Vec::new(), move |_, _| {
                        factory_log.lock().unwrap().push("meta-initiate");
                        Ok(())
                    })
                    .build(),
            );
        },
        EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["meta-initiate", "provide"]);
    let consumer = engine.context().provide::<Consumer>().unwrap();
    assert_eq!(consumer.conn.get().label, "open");
}

// ---------------------------------------------------------------------------
// Priority ordering and stability
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Staged;

#[test]
fn initiation_priorities_sort_descending_and_stable() {
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let engine = engine_from(
        |b| {
            let mut builder = DescriptorBuilder::<Staged>::new("staged");
            for (label, priority) in [("first-5", 5), ("only-1", 1), ("second-5", 5), ("mid-3", 3)]
            {
                let order = order.clone();
                builder = builder.initiate(label, priority, Vec::new(), move |_, _| {
                    order.lock().unwrap().push(label);
                    Ok(())
                });
            }
            b.register(builder.build());
        },
        EngineOptions::default(),
    );
    engine.unwrap();

    // Equal priorities keep their declaration order.
    assert_eq!(
        *order.lock().unwrap(),
        vec!["first-5", "second-5", "mid-3", "only-1"]
    );
}

// ---------------------------------------------------------------------------
// Lazy injection end to end
// ---------------------------------------------------------------------------

struct Widget {
    serial: u32,
}

#[derive(Default)]
struct WidgetFactory;

#[derive(Default)]
struct Panel {
    widget: SyncLazyCell<Arc<Widget>>,
}

#[test]
fn lazy_field_defers_provider_until_first_access() {
    let produced = Arc::new(AtomicUsize::new(0));

    let counter = produced.clone();
    let engine = engine_from(
        move |b| {
            let counter = counter.clone();
            b.register(
                DescriptorBuilder::<WidgetFactory>::new("widget_factory")
                    .provides::<Widget>("make_widget", Vec::new(), move |_, _| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(Arc::new(Widget { serial: 77 }))
                    })
                    .build(),
            );
            b.register(
                DescriptorBuilder::<Panel>::new("panel")
                    .lazy_field("widget", |c| &c.widget)
                    .build(),
            );
        },
        EngineOptions::default(),
    )
    .unwrap();

    let panel = engine.context().provide::<Panel>().unwrap();
    // Bootstrap completed without ever invoking the provider.
    assert_eq!(produced.load(Ordering::SeqCst), 0);
    assert!(panel.widget.peek().is_none());

    let widget = panel.widget.get().unwrap();
    assert_eq!(widget.serial, 77);
    assert_eq!(produced.load(Ordering::SeqCst), 1);

    // Repeated access neither re-invokes the provider nor changes identity.
    let again = panel.widget.get().unwrap();
    assert!(Arc::ptr_eq(widget, again));
    assert_eq!(produced.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_field_without_any_source_fails_bootstrap() {
    let result = engine_from(
        |b| {
            b.register(
                DescriptorBuilder::<Panel>::new("panel")
                    .lazy_field("widget", |c| &c.widget)
                    .build(),
            );
        },
        EngineOptions {
            create_missing: false,
        },
    );
    assert!(matches!(
        result,
        Err(ContextError::MissingDependency { .. })
    ));
}

// ---------------------------------------------------------------------------
// Fresh injection
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Scratch {
    id: u32,
}

#[derive(Default)]
struct WorkerA {
    scratch: Injected<Scratch>,
}

#[derive(Default)]
struct WorkerB {
    scratch: Injected<Scratch>,
}

#[test]
fn fresh_fields_get_container_untracked_instances() {
    let engine = engine_from(
        |b| {
            b.register(DescriptorBuilder::<Scratch>::new("scratch").build());
            b.register(
                DescriptorBuilder::<WorkerA>::new("worker_a")
                    .fresh_field("scratch", |c| &c.scratch)
                    .build(),
            );
            b.register(
                DescriptorBuilder::<WorkerB>::new("worker_b")
                    .fresh_field("scratch", |c| &c.scratch)
                    .build(),
            );
        },
        EngineOptions::default(),
    )
    .unwrap();

    let ctx = engine.context();
    let a = ctx.provide::<WorkerA>().unwrap();
    let b = ctx.provide::<WorkerB>().unwrap();
    // Each worker got its own instance, distinct from the registered
    // component of the same type.
    let shared = ctx.provide::<Scratch>().unwrap();
    assert!(!Arc::ptr_eq(a.scratch.get(), b.scratch.get()));
    assert!(!Arc::ptr_eq(a.scratch.get(), &shared));
    assert_eq!(a.scratch.get().id, 0);
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ShutterService;

#[test]
fn failing_destruction_method_does_not_stop_teardown() {
    let ran: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let engine = engine_from(
        |b| {
            let mut builder = DescriptorBuilder::<ShutterService>::new("shutter_service");
            for (label, priority, fail) in [
                ("close-high", 5, false),
                ("close-broken", 3, true),
                ("close-low", 1, false),
            ] {
                let ran = ran.clone();
                builder = builder.destroy(label, priority, Vec::new(), move |_, _| {
                    ran.lock().unwrap().push(label);
                    if fail {
                        anyhow::bail!("resource already gone")
                    }
                    Ok(())
                });
            }
            b.register(builder.build());
        },
        EngineOptions::default(),
    )
    .unwrap();

    assert!(ran.lock().unwrap().is_empty());
    engine.shutdown();
    assert_eq!(
        *ran.lock().unwrap(),
        vec!["close-high", "close-broken", "close-low"]
    );

    // Second shutdown is a no-op.
    engine.shutdown();
    assert_eq!(ran.lock().unwrap().len(), 3);
}

struct FileHandle {
    closed: Arc<AtomicUsize>,
}

impl Disposable for FileHandle {
    fn dispose(&self) -> anyhow::Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Repository {
    handle: FileHandle,
    cache: SyncLazyCell<Arc<FileHandle>>,
}

static REPO_CLOSED: Mutex<Option<Arc<AtomicUsize>>> = Mutex::new(None);

impl Default for Repository {
    fn default() -> Self {
        let closed = REPO_CLOSED
            .lock()
            .unwrap()
            .clone()
            .expect("test sets the counter before bootstrap");
        Self {
            handle: FileHandle {
                closed: closed.clone(),
            },
            cache: SyncLazyCell::new(move || Ok(Arc::new(FileHandle { closed }))),
        }
    }
}

#[test]
fn disposal_covers_fields_and_skips_unforced_lazies() {
    let closed = Arc::new(AtomicUsize::new(0));
    *REPO_CLOSED.lock().unwrap() = Some(closed.clone());

    let engine = engine_from(
        |b| {
            b.register(
                DescriptorBuilder::<Repository>::new("repository")
                    .dispose_field("handle", |c| &c.handle)
                    .dispose_lazy_field("cache", |c| &c.cache)
                    .build(),
            );
        },
        EngineOptions::default(),
    )
    .unwrap();

    engine.shutdown();
    // Only the plain field was disposed: the lazy cache was never forced.
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Messaging end to end
// ---------------------------------------------------------------------------

static REFRESH_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

#[derive(Default)]
struct ImmediateRefresher;

impl MessageListener for ImmediateRefresher {
    fn on_message(&self, _message: &str) -> anyhow::Result<Retention> {
        REFRESH_LOG.lock().unwrap().push("immediate");
        Ok(Retention::Keep)
    }
}

#[derive(Default)]
struct MainThreadRefresher;

impl MessageListener for MainThreadRefresher {
    fn on_message(&self, _message: &str) -> anyhow::Result<Retention> {
        REFRESH_LOG.lock().unwrap().push("deferred");
        Ok(Retention::Keep)
    }
}

#[test]
fn refresh_message_reaches_immediate_then_deferred_listeners() {
    let engine = engine_from(
        |b| {
            b.register(
                DescriptorBuilder::<ImmediateRefresher>::new("immediate_refresher")
                    .on_message("refresh", ListenerOptions::default())
                    .build(),
            );
            b.register(
                DescriptorBuilder::<MainThreadRefresher>::new("main_thread_refresher")
                    .on_message(
                        "refresh",
                        ListenerOptions {
                            main_thread: true,
                            ..Default::default()
                        },
                    )
                    .build(),
            );
        },
        EngineOptions::default(),
    )
    .unwrap();

    engine.messages().post("refresh").unwrap();
    assert_eq!(*REFRESH_LOG.lock().unwrap(), vec!["immediate"]);

    engine.messages().drain_deferred().unwrap();
    assert_eq!(*REFRESH_LOG.lock().unwrap(), vec!["immediate", "deferred"]);
}

// ---------------------------------------------------------------------------
// Contributed processors
// ---------------------------------------------------------------------------

struct AuditTag;

static AUDITED: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

#[derive(Default)]
struct AuditProcessor;

impl AttributeProcessor for AuditProcessor {
    fn attribute(&self) -> TypeKey {
        TypeKey::of::<AuditTag>()
    }

    fn supports_types(&self) -> bool {
        true
    }

    fn process_type(
        &self,
        _attr: &AttrData,
        descriptor: &wirekit::ComponentDescriptor,
        _owner: &wirekit::Instance,
        _scan: &Scan<'_>,
    ) -> Result<(), ContextError> {
        AUDITED.lock().unwrap().push(descriptor.name);
        Ok(())
    }
}

#[derive(Default)]
struct AuditedService;

#[test]
fn contributed_processor_handles_custom_attribute() {
    engine_from(
        |b| {
            b.register(
                DescriptorBuilder::<AuditProcessor>::new("audit_processor")
                    .processor()
                    .build(),
            );
            b.register(
                DescriptorBuilder::<AuditedService>::new("audited_service")
                    .with_type_attr(AttrData::new(AuditTag))
                    .build(),
            );
        },
        EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(*AUDITED.lock().unwrap(), vec!["audited_service"]);
}

#[derive(Default)]
struct Untagged;

struct UnknownTag;

#[test]
fn unknown_attribute_aborts_bootstrap() {
    let result = engine_from(
        |b| {
            b.register(
                DescriptorBuilder::<Untagged>::new("untagged")
                    .with_type_attr(AttrData::new(UnknownTag))
                    .build(),
            );
        },
        EngineOptions::default(),
    );
    assert!(matches!(
        result,
        Err(ContextError::UnknownAttribute { .. })
    ));
}

// ---------------------------------------------------------------------------
// Inventory discovery
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DiscoveredService {
    started: AtomicUsize,
}

fn register_discovered(builder: &mut CatalogBuilder) {
    builder.register(
        DescriptorBuilder::<DiscoveredService>::new("discovered_service")
            .initiate("start", 0, Vec::new(), |c, _| {
                c.started.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build(),
    );
}

wirekit::register_components!(register_discovered);

#[test]
fn inventory_submissions_are_discovered() {
    let catalog = Catalog::discover().unwrap();
    assert!(catalog
        .descriptors()
        .iter()
        .any(|d| d.name == "discovered_service"));

    let engine = ContextEngine::bootstrap(EngineOptions::default()).unwrap();
    let service = engine.context().provide::<DiscoveredService>().unwrap();
    assert_eq!(service.started.load(Ordering::SeqCst), 1);
}
