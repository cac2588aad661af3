//! Batch configuration.
//!
//! Supports loading configuration from:
//! 1. A YAML file
//! 2. Environment variables (with `PBS_ARRAY_` prefix)
//!
//! Precedence (highest to lowest): environment, file, defaults. The CLI
//! applies its own flags on top of the loaded value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArrayError, ArrayResult};

/// Environment variable overriding [`BatchConfig::cores_per_node`].
pub const ENV_CORES_PER_NODE: &str = "PBS_ARRAY_CORES_PER_NODE";

/// Environment variable overriding [`BatchConfig::nodes_per_job`].
pub const ENV_NODES_PER_JOB: &str = "PBS_ARRAY_NODES_PER_JOB";

/// Resource request written into the `#PBS -l` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Processors per node (ppn).
    #[serde(default = "default_cores_per_node")]
    pub cores_per_node: u32,

    /// Nodes requested per array task.
    #[serde(default = "default_nodes_per_job")]
    pub nodes_per_job: u32,
}

fn default_cores_per_node() -> u32 {
    12
}

fn default_nodes_per_job() -> u32 {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            cores_per_node: default_cores_per_node(),
            nodes_per_job: default_nodes_per_job(),
        }
    }
}

impl BatchConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ArrayResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ArrayError::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        // An empty file means "all defaults".
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: BatchConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ArrayError::Config(format!("cannot parse {}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration: file (or defaults), then environment overrides.
    pub fn load(config_file: Option<&Path>) -> ArrayResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `PBS_ARRAY_*` environment variables.
    ///
    /// Unset or unparsable variables leave the field unchanged.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(ENV_CORES_PER_NODE) {
            if let Ok(val) = v.trim().parse() {
                self.cores_per_node = val;
            }
        }
        if let Some(v) = lookup(ENV_NODES_PER_JOB) {
            if let Ok(val) = v.trim().parse() {
                self.nodes_per_job = val;
            }
        }
        self
    }

    pub fn with_cores_per_node(mut self, cores: u32) -> Self {
        self.cores_per_node = cores;
        self
    }

    pub fn with_nodes_per_job(mut self, nodes: u32) -> Self {
        self.nodes_per_job = nodes;
        self
    }

    /// Reject resource requests PBS would refuse.
    pub fn validate(&self) -> ArrayResult<()> {
        if self.cores_per_node == 0 {
            return Err(ArrayError::Config(
                "cores_per_node must be at least 1".to_string(),
            ));
        }
        if self.nodes_per_job == 0 {
            return Err(ArrayError::Config(
                "nodes_per_job must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
