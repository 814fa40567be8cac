//! Lazy memoizing cells and the write-once injection holder.
//!
//! `LazyCell` is the single-threaded variant; it is deliberately `!Sync`.
//! `SyncLazyCell` guards the absent-to-present transition with a mutex so the
//! factory runs at most once even under concurrent first access. Both consume
//! their factory on first use.

use std::cell::{Cell, OnceCell};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::key::TypeKey;

type Factory<T> = Box<dyn FnOnce() -> anyhow::Result<T>>;
type SendFactory<T> = Box<dyn FnOnce() -> anyhow::Result<T> + Send>;

/// Single-threaded deferred value.
pub struct LazyCell<T> {
    factory: Cell<Option<Factory<T>>>,
    value: OnceCell<T>,
}

impl<T> LazyCell<T> {
    pub fn new(factory: impl FnOnce() -> anyhow::Result<T> + 'static) -> Self {
        Self {
            factory: Cell::new(Some(Box::new(factory))),
            value: OnceCell::new(),
        }
    }

    /// A cell with neither value nor factory; `bind` must be called before
    /// the first `get`.
    pub fn unbound() -> Self {
        Self {
            factory: Cell::new(None),
            value: OnceCell::new(),
        }
    }

    pub fn from_value(value: T) -> Self {
        let cell = Self::unbound();
        let _ = cell.value.set(value);
        cell
    }

    /// Attaches a factory to an unbound cell. Fails when the cell already
    /// has a factory or a value.
    pub fn bind(&self, factory: Factory<T>) -> anyhow::Result<()> {
        if self.value.get().is_some() {
            anyhow::bail!("lazy cell already holds a value");
        }
        let previous = self.factory.replace(Some(factory));
        if previous.is_some() {
            self.factory.set(previous);
            anyhow::bail!("lazy cell already has a factory");
        }
        Ok(())
    }

    /// Forces the cell, running the factory on first call and discarding it
    /// afterwards. Factory errors propagate and leave the cell unusable.
    pub fn get(&self) -> anyhow::Result<&T> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let factory = self
            .factory
            .take()
            .ok_or_else(|| anyhow::anyhow!("lazy cell has no factory"))?;
        let value = factory()?;
        Ok(self.value.get_or_init(|| value))
    }

    /// Reads the value without forcing construction.
    pub fn peek(&self) -> Option<&T> {
        self.value.get()
    }

    pub fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }
}

/// Thread-safe deferred value.
///
/// The factory mutex serializes first access: one winner runs the factory
/// while other callers block, then everyone reads the same stored value.
pub struct SyncLazyCell<T> {
    factory: Mutex<Option<SendFactory<T>>>,
    value: OnceLock<T>,
}

impl<T> SyncLazyCell<T> {
    pub fn new(factory: impl FnOnce() -> anyhow::Result<T> + Send + 'static) -> Self {
        Self {
            factory: Mutex::new(Some(Box::new(factory))),
            value: OnceLock::new(),
        }
    }

    pub fn unbound() -> Self {
        Self {
            factory: Mutex::new(None),
            value: OnceLock::new(),
        }
    }

    pub fn from_value(value: T) -> Self {
        let cell = Self::unbound();
        let _ = cell.value.set(value);
        cell
    }

    pub fn bind(&self, factory: SendFactory<T>) -> anyhow::Result<()> {
        if self.value.get().is_some() {
            anyhow::bail!("lazy cell already holds a value");
        }
        let mut slot = self.factory.lock();
        if slot.is_some() {
            anyhow::bail!("lazy cell already has a factory");
        }
        *slot = Some(factory);
        Ok(())
    }

    pub fn get(&self) -> anyhow::Result<&T> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let mut slot = self.factory.lock();
        // Another thread may have won the race while we waited on the lock.
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let factory = slot
            .take()
            .ok_or_else(|| anyhow::anyhow!("lazy cell has no factory"))?;
        let value = factory()?;
        Ok(self.value.get_or_init(|| value))
    }

    pub fn peek(&self) -> Option<&T> {
        self.value.get()
    }

    pub fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T> Default for SyncLazyCell<T> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<T> Default for LazyCell<T> {
    fn default() -> Self {
        Self::unbound()
    }
}

/// Write-once holder populated by the injection processor.
///
/// Component structs declare dependency fields as `Injected<T>`; bootstrap
/// fills them exactly once before any lifecycle method runs.
pub struct Injected<T: ?Sized> {
    slot: OnceLock<std::sync::Arc<T>>,
}

impl<T: ?Sized> Injected<T> {
    pub fn empty() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub fn set(&self, value: std::sync::Arc<T>) -> anyhow::Result<()>
    where
        T: 'static,
    {
        self.slot
            .set(value)
            .map_err(|_| anyhow::anyhow!("field of type '{}' injected twice", TypeKey::of::<T>()))
    }

    /// Reads the injected value.
    ///
    /// Panics when the component was not wired by the engine; that is a
    /// configuration error surfaced as close to the misuse as possible.
    pub fn get(&self) -> &std::sync::Arc<T>
    where
        T: 'static,
    {
        self.slot.get().unwrap_or_else(|| {
            panic!(
                "field of type '{}' was never injected; was this component wired by the engine?",
                TypeKey::of::<T>()
            )
        })
    }

    pub fn try_get(&self) -> Option<&std::sync::Arc<T>> {
        self.slot.get()
    }
}

impl<T: ?Sized> Default for Injected<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn lazy_cell_constructs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cell = LazyCell::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(7u32)
        });

        assert!(cell.peek().is_none());
        assert_eq!(*cell.get().unwrap(), 7);
        assert_eq!(*cell.get().unwrap(), 7);
        assert_eq!(*cell.get().unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lazy_cell_bind_after_unbound() {
        let cell: LazyCell<u32> = LazyCell::unbound();
        assert!(cell.get().is_err());

        let cell = LazyCell::unbound();
        cell.bind(Box::new(|| Ok("late"))).unwrap();
        assert_eq!(*cell.get().unwrap(), "late");
        assert!(cell.bind(Box::new(|| Ok("again"))).is_err());
    }

    #[test]
    fn lazy_cell_factory_error_propagates() {
        let cell: LazyCell<u32> = LazyCell::new(|| anyhow::bail!("boom"));
        assert!(cell.get().is_err());
        assert!(!cell.is_ready());
    }

    #[test]
    fn sync_lazy_cell_single_construction_under_contention() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cell = Arc::new(SyncLazyCell::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            // Widen the race window a little.
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(42u64)
        }));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cell = cell.clone();
            handles.push(std::thread::spawn(move || *cell.get().unwrap()));
        }
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn sync_lazy_cell_from_value_skips_factory() {
        let cell = SyncLazyCell::from_value(3u8);
        assert!(cell.is_ready());
        assert_eq!(*cell.get().unwrap(), 3);
        assert!(cell.bind(Box::new(|| Ok(9))).is_err());
    }

    #[test]
    fn injected_sets_once() {
        let holder: Injected<u32> = Injected::empty();
        assert!(holder.try_get().is_none());
        holder.set(Arc::new(5)).unwrap();
        assert_eq!(**holder.get(), 5);
        assert!(holder.set(Arc::new(6)).is_err());
    }

    #[test]
    #[should_panic(expected = "never injected")]
    fn injected_panics_when_unset() {
        let holder: Injected<u32> = Injected::empty();
        let _ = holder.get();
    }
}
