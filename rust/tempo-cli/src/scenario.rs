//! TOML scenario files.
//!
//! A scenario describes one or more containers:
//!
//! ```toml
//! name = "two queues"
//!
//! [[container]]
//! cores = 2
//! hpc_threads = 1
//! main_alg = "rr"
//! hpc_alg = "hpc"
//! budget = 100
//! main = [
//!     { burst = 4 },
//!     { burst = 6, priority = 2, arrival = 3 },
//! ]
//! hpc = [{ burst = 3, weight = 2.0 }]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use tempo_core::{ProcessSpec, SchedAlg};
use tempo_engine::{CancellationToken, Container, ContainerConfig};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("scenario has no containers")]
    Empty,
    #[error("unknown demo '{0}' (run `tempo demo` to list them)")]
    UnknownDemo(String),
    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// A whole scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub name: Option<String>,
    #[serde(rename = "container")]
    pub containers: Vec<ContainerDef>,
}

/// One container of a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerDef {
    #[serde(default = "default_cores")]
    pub cores: i32,
    #[serde(default)]
    pub hpc_threads: i32,
    pub main_alg: SchedAlg,
    #[serde(default = "default_hpc_alg")]
    pub hpc_alg: SchedAlg,
    pub budget: u64,
    #[serde(default)]
    pub main: Vec<ProcDef>,
    #[serde(default)]
    pub hpc: Vec<ProcDef>,
}

/// One process entry. Only `burst` is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcDef {
    pub burst: u64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub arrival: u64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_cores() -> i32 {
    1
}

fn default_hpc_alg() -> SchedAlg {
    SchedAlg::Hpc
}

fn default_weight() -> f64 {
    1.0
}

impl ProcDef {
    pub fn spec(&self) -> ProcessSpec {
        ProcessSpec::new(self.burst, self.priority, self.arrival, self.weight)
    }
}

/// Load and validate a scenario file.
pub fn load(path: &Path) -> Result<ScenarioFile, ScenarioError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: ScenarioFile = toml::from_str(&text).map_err(|source| ScenarioError::Parse {
        path: path.display().to_string(),
        source: Box::new(source),
    })?;
    if file.containers.is_empty() {
        return Err(ScenarioError::Empty);
    }
    Ok(file)
}

impl ScenarioFile {
    /// Turn the definitions into engine containers sharing one cancellation
    /// token.
    pub fn build(
        &self,
        tick: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<Container>, ScenarioError> {
        if self.containers.is_empty() {
            return Err(ScenarioError::Empty);
        }
        Ok(self
            .containers
            .iter()
            .map(|def| {
                let config = ContainerConfig {
                    cores: def.cores,
                    hpc_threads: def.hpc_threads,
                    main_alg: def.main_alg,
                    hpc_alg: def.hpc_alg,
                    budget: def.budget,
                    tick,
                    cancel: cancel.clone(),
                };
                Container::new(
                    config,
                    def.main.iter().map(ProcDef::spec).collect(),
                    def.hpc.iter().map(ProcDef::spec).collect(),
                )
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
