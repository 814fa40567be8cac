//! The context destroyer: prioritized teardown, best-effort.
//!
//! Processors register destruction and disposal actions during scanning; the
//! hosting application triggers `destroy_all` exactly once at shutdown. A
//! failing action is logged and skipped — teardown never aborts early.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

type Action = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

struct NamedAction {
    name: String,
    run: Action,
}

#[derive(Default)]
pub struct ContextDestroyer {
    actions: Mutex<Vec<NamedAction>>,
    executed: AtomicBool,
}

impl ContextDestroyer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        action: impl FnOnce() -> anyhow::Result<()> + Send + 'static,
    ) {
        let name = name.into();
        if self.executed.load(Ordering::SeqCst) {
            tracing::warn!(action = %name, "destroyer already ran; action dropped");
            return;
        }
        self.actions.lock().push(NamedAction {
            name,
            run: Box::new(action),
        });
    }

    pub fn pending(&self) -> usize {
        self.actions.lock().len()
    }

    /// Runs every registered action in registration order, once.
    ///
    /// Individual failures are logged and do not prevent the remaining
    /// actions from running. Subsequent calls are no-ops.
    pub fn destroy_all(&self) {
        if self.executed.swap(true, Ordering::SeqCst) {
            tracing::warn!("destroyer already ran; ignoring repeated shutdown");
            return;
        }
        let actions = std::mem::take(&mut *self.actions.lock());
        tracing::info!(actions = actions.len(), "Phase: teardown");
        for action in actions {
            tracing::debug!(action = %action.name, "running destruction action");
            if let Err(err) = (action.run)() {
                tracing::warn!(action = %action.name, error = %err, "destruction action failed; continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn actions_run_in_registration_order() {
        let destroyer = ContextDestroyer::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = order.clone();
            destroyer.register(label, move || {
                order.lock().push(label);
                Ok(())
            });
        }

        destroyer.destroy_all();
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_action_does_not_stop_the_rest() {
        let destroyer = ContextDestroyer::new();
        let ran = Arc::new(AtomicUsize::new(0));

        let counter = ran.clone();
        destroyer.register("ok-1", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let counter = ran.clone();
        destroyer.register("broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("teardown exploded")
        });
        let counter = ran.clone();
        destroyer.register("ok-2", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // No panic, no error escapes.
        destroyer.destroy_all();
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn destroyer_is_single_use() {
        let destroyer = ContextDestroyer::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        destroyer.register("only-once", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        destroyer.destroy_all();
        destroyer.destroy_all();
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        // Registrations after the run are dropped.
        let counter = ran.clone();
        destroyer.register("late", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(destroyer.pending(), 0);
    }
}
