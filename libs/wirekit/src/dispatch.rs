//! Typed and string-keyed publish/subscribe.
//!
//! Two instances of one design: `EventDispatcher` keys listener sets by the
//! event's type, `MessageDispatcher` by a plain string. Immediate listeners
//! run synchronously on the posting thread; main-thread listeners are
//! batched onto an unbounded queue drained by exactly one designated
//! consumer via `drain_deferred`.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::key::TypeKey;

/// What a listener invocation tells the dispatcher about its registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retention {
    Keep,
    Remove,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ListenerOptions {
    /// Deliver on the designated drain point instead of the posting thread.
    pub main_thread: bool,
    /// Remove after the first invocation regardless of the returned signal.
    pub once: bool,
    /// Propagate callback errors to the poster instead of swallowing them.
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry<P> {
    id: ListenerId,
    callback: Arc<dyn Fn(&P) -> anyhow::Result<Retention> + Send + Sync>,
    once: bool,
    strict: bool,
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
            once: self.once,
            strict: self.strict,
        }
    }
}

/// Per-key listener sets plus the deferred-batch queue.
struct ListenerRegistry<K, P> {
    immediate: DashMap<K, Vec<Entry<P>>>,
    deferred: DashMap<K, Vec<Entry<P>>>,
    queue_tx: flume::Sender<(K, P)>,
    queue_rx: flume::Receiver<(K, P)>,
    next_id: AtomicU64,
}

impl<K, P> ListenerRegistry<K, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    P: Clone + Send + Sync + 'static,
{
    fn new() -> Self {
        let (queue_tx, queue_rx) = flume::unbounded();
        Self {
            immediate: DashMap::new(),
            deferred: DashMap::new(),
            queue_tx,
            queue_rx,
            next_id: AtomicU64::new(1),
        }
    }

    fn add(
        &self,
        key: K,
        callback: Arc<dyn Fn(&P) -> anyhow::Result<Retention> + Send + Sync>,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Entry {
            id,
            callback,
            once: options.once,
            strict: options.strict,
        };
        let map = if options.main_thread {
            &self.deferred
        } else {
            &self.immediate
        };
        map.entry(key).or_default().push(entry);
        id
    }

    fn remove(&self, key: &K, id: ListenerId) -> bool {
        let mut removed = false;
        for map in [&self.immediate, &self.deferred] {
            if let Some(mut entries) = map.get_mut(key) {
                let before = entries.len();
                entries.retain(|e| e.id != id);
                removed |= entries.len() != before;
            }
        }
        removed
    }

    fn post(&self, key: K, payload: P) -> anyhow::Result<()> {
        self.invoke_set(&self.immediate, &key, &payload)?;
        let has_deferred = self
            .deferred
            .get(&key)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false);
        if has_deferred {
            // One batch per post; the designated consumer drains it later.
            let _ = self.queue_tx.send((key, payload));
        }
        Ok(())
    }

    fn drain(&self) -> anyhow::Result<()> {
        for (key, payload) in self.queue_rx.try_iter() {
            self.invoke_set(&self.deferred, &key, &payload)?;
        }
        Ok(())
    }

    /// Invokes a snapshot of the set so listeners may add or remove peers
    /// reentrantly; removals are applied after the batch, never skipping or
    /// duplicating other listeners.
    fn invoke_set(
        &self,
        map: &DashMap<K, Vec<Entry<P>>>,
        key: &K,
        payload: &P,
    ) -> anyhow::Result<()> {
        let snapshot: Vec<Entry<P>> = match map.get(key) {
            Some(entries) => entries.value().clone(),
            None => return Ok(()),
        };
        let mut removals = Vec::new();
        let mut failure = None;
        for entry in &snapshot {
            match (entry.callback)(payload) {
                Ok(Retention::Keep) => {
                    if entry.once {
                        removals.push(entry.id);
                    }
                }
                Ok(Retention::Remove) => removals.push(entry.id),
                Err(err) => {
                    if entry.once {
                        removals.push(entry.id);
                    }
                    if entry.strict {
                        failure = Some(err);
                        break;
                    }
                    tracing::warn!(error = %err, "listener failed; continuing dispatch");
                }
            }
        }
        if !removals.is_empty() {
            if let Some(mut entries) = map.get_mut(key) {
                entries.retain(|e| !removals.contains(&e.id));
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn listener_count(&self, key: &K) -> usize {
        let immediate = self.immediate.get(key).map(|e| e.len()).unwrap_or(0);
        let deferred = self.deferred.get(key).map(|e| e.len()).unwrap_or(0);
        immediate + deferred
    }
}

type EventPayload = Arc<dyn std::any::Any + Send + Sync>;

/// Publish/subscribe keyed by event type.
pub struct EventDispatcher {
    inner: ListenerRegistry<TypeKey, EventPayload>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            inner: ListenerRegistry::new(),
        }
    }

    pub fn add_listener<E: Send + Sync + 'static>(
        &self,
        listener: impl Fn(&E) -> anyhow::Result<Retention> + Send + Sync + 'static,
        options: ListenerOptions,
    ) -> ListenerId {
        let callback = Arc::new(move |payload: &EventPayload| {
            let event = payload
                .downcast_ref::<E>()
                .ok_or_else(|| anyhow::anyhow!("event payload is not a '{}'", TypeKey::of::<E>()))?;
            listener(event)
        });
        self.inner.add(TypeKey::of::<E>(), callback, options)
    }

    pub fn remove_listener<E: Send + Sync + 'static>(&self, id: ListenerId) -> bool {
        self.inner.remove(&TypeKey::of::<E>(), id)
    }

    /// Delivers to immediate listeners synchronously and enqueues one batch
    /// for main-thread listeners. Errors surface only from strict listeners.
    pub fn post<E: Send + Sync + 'static>(&self, event: E) -> anyhow::Result<()> {
        self.inner.post(TypeKey::of::<E>(), Arc::new(event))
    }

    /// Runs queued main-thread batches; call from the designated thread.
    pub fn drain_deferred(&self) -> anyhow::Result<()> {
        self.inner.drain()
    }

    pub fn listener_count<E: Send + Sync + 'static>(&self) -> usize {
        self.inner.listener_count(&TypeKey::of::<E>())
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Publish/subscribe keyed by message string.
pub struct MessageDispatcher {
    inner: ListenerRegistry<String, Arc<str>>,
}

impl MessageDispatcher {
    pub fn new() -> Self {
        Self {
            inner: ListenerRegistry::new(),
        }
    }

    pub fn add_listener(
        &self,
        key: impl Into<String>,
        listener: impl Fn(&str) -> anyhow::Result<Retention> + Send + Sync + 'static,
        options: ListenerOptions,
    ) -> ListenerId {
        let callback = Arc::new(move |payload: &Arc<str>| listener(payload.as_ref()));
        self.inner.add(key.into(), callback, options)
    }

    pub fn remove_listener(&self, key: &str, id: ListenerId) -> bool {
        self.inner.remove(&key.to_string(), id)
    }

    pub fn post(&self, message: &str) -> anyhow::Result<()> {
        self.inner.post(message.to_string(), Arc::from(message))
    }

    pub fn drain_deferred(&self) -> anyhow::Result<()> {
        self.inner.drain()
    }

    pub fn listener_count(&self, key: &str) -> usize {
        self.inner.listener_count(&key.to_string())
    }
}

impl Default for MessageDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
