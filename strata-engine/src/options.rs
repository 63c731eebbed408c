//! Execution options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the nodes of a layer are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One node at a time, in listed order.
    #[default]
    Sequential,
    /// All of a layer's nodes concurrently, bounded by the parallelism cap.
    Parallel,
    /// Execution against a reused, precomputed plan. Scheduling within a
    /// layer follows the parallelism cap: 1 means sequential, more means
    /// parallel.
    Planned,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
            Self::Planned => write!(f, "planned"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            "planned" => Ok(Self::Planned),
            _ => Err("Unknown execution mode (expected sequential, parallel, or planned)"),
        }
    }
}

/// Options for a single execution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Scheduling mode.
    pub mode: ExecutionMode,
    /// Maximum node invocations concurrently in flight within one layer.
    /// Always at least 1.
    pub max_parallelism: usize,
    /// Recursion guard for nested group execution.
    pub max_group_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            max_parallelism: 16,
            max_group_depth: 64,
        }
    }
}

impl ExecutionOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `STRATA_MODE`: Scheduling mode (sequential, parallel, planned)
    /// - `STRATA_MAX_PARALLELISM`: Maximum concurrent node invocations
    /// - `STRATA_MAX_GROUP_DEPTH`: Nested group recursion guard
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mode = std::env::var("STRATA_MODE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.mode);

        let max_parallelism = std::env::var("STRATA_MAX_PARALLELISM")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_parallelism)
            .max(1);

        let max_group_depth = std::env::var("STRATA_MAX_GROUP_DEPTH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_group_depth);

        Self {
            mode,
            max_parallelism,
            max_group_depth,
        }
    }

    /// Set the scheduling mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the parallelism cap (clamped to at least 1).
    pub fn with_max_parallelism(mut self, max: usize) -> Self {
        self.max_parallelism = max.max(1);
        self
    }

    /// Set the nested group recursion guard.
    pub fn with_max_group_depth(mut self, max: usize) -> Self {
        self.max_group_depth = max;
        self
    }

    /// Whether a layer's nodes run concurrently under these options.
    pub fn layer_is_parallel(&self) -> bool {
        match self.mode {
            ExecutionMode::Sequential => false,
            ExecutionMode::Parallel => true,
            ExecutionMode::Planned => self.max_parallelism > 1,
        }
    }
}
