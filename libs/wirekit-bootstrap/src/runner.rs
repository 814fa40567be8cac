//! The application runner: bootstrap → wait → teardown.
//!
//! Phase order: logging → discovery/bootstrap → wait for the shutdown
//! trigger → destroyer. The destroyer runs exactly once, on whichever path
//! ends the wait.

use std::{future::Future, pin::Pin, sync::Arc};

use tokio_util::sync::CancellationToken;
use wirekit::{ContextEngine, EngineOptions};

use crate::settings::EngineSettings;
use crate::signals;

/// How the runner decides when to stop.
pub enum ShutdownTrigger {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, teardown begins.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    pub settings: EngineSettings,
    pub shutdown: ShutdownTrigger,
    /// Skip subscriber installation when the host already configured one.
    pub init_logging: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            settings: EngineSettings::default(),
            shutdown: ShutdownTrigger::Signals,
            init_logging: true,
        }
    }
}

/// Full cycle: bootstrap the engine from inventory-discovered components,
/// park until the shutdown trigger fires, then run teardown.
///
/// Returns the bootstrapped engine to a callback before parking so the host
/// can grab dispatcher handles (e.g. to pump `drain_deferred` from its main
/// loop).
pub async fn run(
    opts: RunOptions,
    on_ready: impl FnOnce(&Arc<ContextEngine>),
) -> anyhow::Result<()> {
    if opts.init_logging {
        crate::logging::init_logging(&opts.settings.log_filter)?;
    }

    let cancel = match &opts.shutdown {
        ShutdownTrigger::Token(token) => token.clone(),
        _ => CancellationToken::new(),
    };

    match opts.shutdown {
        ShutdownTrigger::Signals => {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if let Err(err) = signals::wait_for_shutdown().await {
                    tracing::warn!(error = %err, "signal waiter failed; falling back to ctrl_c");
                    let _ = tokio::signal::ctrl_c().await;
                }
                cancel.cancel();
            });
        }
        ShutdownTrigger::Future(waiter) => {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("external shutdown future completed");
                cancel.cancel();
            });
        }
        ShutdownTrigger::Token(_) => {
            tracing::info!("external token controls the lifecycle");
        }
    }

    let engine = Arc::new(ContextEngine::bootstrap(EngineOptions {
        create_missing: opts.settings.create_missing_dependencies,
    })?);
    on_ready(&engine);

    cancel.cancelled().await;

    engine.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_trigger_drives_full_cycle() {
        let token = CancellationToken::new();
        let opts = RunOptions {
            settings: EngineSettings::default(),
            shutdown: ShutdownTrigger::Token(token.clone()),
            init_logging: false,
        };

        let stop = token.clone();
        let handle = tokio::spawn(async move {
            run(opts, |_| {}).await
        });

        stop.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn future_trigger_stops_the_runner() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let opts = RunOptions {
            settings: EngineSettings::default(),
            shutdown: ShutdownTrigger::Future(Box::pin(async move {
                let _ = rx.await;
            })),
            init_logging: false,
        };

        let handle = tokio::spawn(async move { run(opts, |_| {}).await });
        let _ = tx.send(());
        handle.await.unwrap().unwrap();
    }
}
