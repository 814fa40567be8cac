//! Engine settings, layered defaults → YAML file → environment.

use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Host-level knobs for the context engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Construct unsatisfied dependencies through their no-arg constructor
    /// instead of failing resolution.
    #[serde(default = "default_create_missing")]
    pub create_missing_dependencies: bool,
    /// Default tracing filter; `RUST_LOG` overrides it.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_create_missing() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            create_missing_dependencies: default_create_missing(),
            log_filter: default_log_filter(),
        }
    }
}

impl EngineSettings {
    /// Loads settings from `wirekit.yaml` in the working directory (when
    /// present) and `WIREKIT_`-prefixed environment variables, over the
    /// defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("wirekit.yaml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Figment::new()
            .merge(Serialized::defaults(EngineSettings::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("WIREKIT_"))
            .extract()
            .with_context(|| format!("failed to load engine settings from {}", path.display()))
    }
}
