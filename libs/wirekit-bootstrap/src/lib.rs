//! Host-side plumbing for wirekit applications: logging initialization,
//! settings loading, shutdown-signal wiring, and the async runner driving
//! bootstrap → wait → teardown.

pub mod logging;
pub mod runner;
pub mod settings;
pub mod signals;

pub use logging::init_logging;
pub use runner::{run, RunOptions, ShutdownTrigger};
pub use settings::EngineSettings;
pub use signals::wait_for_shutdown;
