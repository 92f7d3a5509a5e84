//! # Configuration
//!
//! Optional TOML file with defaults for the CLI. Command-line flags always win.
//!
//! ```toml
//! [storage]
//! database = "cities.redb"
//! backend = "redb"          # or "file" (JSON document on disk)
//!
//! [graph]
//! directed = false          # used when a new graph is created
//! weighted = true
//! ```
//!
//! Lookup order: `--config <path>`, then `$KVGRAPH_CONFIG`, then
//! `./kvgraph.toml` if it exists, then built-in defaults.

use clap::ValueEnum;
use kvgraph_core::{GraphError, GraphOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "KVGRAPH_CONFIG";

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "kvgraph.toml";

/// Database path when neither flag nor config names one.
pub const DEFAULT_DATABASE: &str = "kvgraph.redb";

/// Where the graph lives between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// redb database, every mutation committed in one transaction.
    #[default]
    Redb,
    /// JSON graph document, loaded into memory and rewritten after mutations.
    File,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redb => write!(f, "redb"),
            Self::File => write!(f, "file"),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub database: Option<PathBuf>,
    pub backend: Option<Backend>,
}

/// `[graph]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    pub directed: Option<bool>,
    pub weighted: Option<bool>,
}

/// Contents of a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage: StorageConfig,
    pub graph: GraphConfig,
}

impl Config {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, GraphError> {
        toml::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GraphError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Find and load the config file, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, GraphError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        Ok(Self::default())
    }
}

/// Effective settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub backend: Backend,
    /// Flags for graphs created by this invocation.
    pub options: GraphOptions,
}

impl Settings {
    /// Merge command-line values over `config`, then over the defaults.
    #[must_use]
    pub fn resolve(config: &Config, database: Option<PathBuf>, backend: Option<Backend>) -> Self {
        let defaults = GraphOptions::default();
        Self {
            database: database
                .or_else(|| config.storage.database.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            backend: backend.or(config.storage.backend).unwrap_or_default(),
            options: GraphOptions::new(
                config.graph.directed.unwrap_or(defaults.directed),
                config.graph.weighted.unwrap_or(defaults.weighted),
            ),
        }
    }
}
