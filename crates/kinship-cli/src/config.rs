//! Benchmark configuration.
//!
//! Settings come from `kinship.json` (written by `kinship init`), then
//! command-line flags override individual fields.

use kinship_graph::{
    EdgeStrategy, DEFAULT_PREFIX, DEFAULT_SUGGESTION_DEPTH, DEFAULT_SUGGESTION_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "kinship.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Graph and query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Node counts built one after another by `kinship bench`.
    pub sizes: Vec<usize>,
    /// Node count for one-shot query commands.
    pub query_nodes: usize,
    pub mean_degree: usize,
    /// Fixed seed; a random one is drawn when absent.
    pub seed: Option<u64>,
    pub strategy: EdgeStrategy,
    pub prefix: String,
    pub depth: usize,
    pub limit: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sizes: vec![10_000, 100_000, 1_000_000],
            query_nodes: 100_000,
            mean_degree: 50,
            seed: None,
            strategy: EdgeStrategy::Linked,
            prefix: DEFAULT_PREFIX.to_string(),
            depth: DEFAULT_SUGGESTION_DEPTH,
            limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub nodes: Option<usize>,
    pub mean_degree: Option<usize>,
    pub seed: Option<u64>,
    pub strategy: Option<EdgeStrategy>,
}

impl BenchConfig {
    /// Loads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `explicit` if given, else `kinship.json` in `dir` if present,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let implicit = dir.join(CONFIG_FILE);
        if implicit.exists() {
            tracing::debug!("using config {}", implicit.display());
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::Invalid("sizes must not be empty".into()));
        }
        if self.limit == 0 {
            return Err(ConfigError::Invalid("limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Applies command-line overrides. `nodes` replaces both the bench
    /// sizes and the query size.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(nodes) = overrides.nodes {
            self.sizes = vec![nodes];
            self.query_nodes = nodes;
        }
        if let Some(mean_degree) = overrides.mean_degree {
            self.mean_degree = mean_degree;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        self
    }
}
