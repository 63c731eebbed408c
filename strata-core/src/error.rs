//! Error types for Strata.
//!
//! Errors are strongly typed with stable codes and carry the identifiers
//! (run ID, node id) needed to attribute a failure.
//!
//! The error taxonomy is deliberately narrow: planning anomalies (cycles,
//! unresolved dependencies) and input resolution gaps are *not* errors —
//! the planner degrades to a fallback layer and resolution degrades to
//! socket defaults. Node-scoped errors are caught by the orchestrator and
//! converted to `NodeFailed` events; only orchestrator faults terminate an
//! awaited run abnormally.

use crate::types::RunId;
use thiserror::Error;

/// The main error type for Strata operations.
#[derive(Error, Debug)]
pub enum StrataError {
    // =========================================================================
    // Node Logic Errors (E100-E199) — node-scoped, never abort a run
    // =========================================================================
    /// No provider entry exists for a node's definition id.
    #[error("E101: No node logic registered for definition '{definition_id}'")]
    LogicNotFound {
        /// The definition id that could not be resolved.
        definition_id: String,
    },

    /// Node logic returned an error.
    #[error("E102: Node '{node_id}' execution failed in {run_id}: {cause}")]
    NodeExecution {
        /// The node that failed to execute.
        node_id: String,
        /// The run in which execution occurred.
        run_id: RunId,
        /// Reason for the execution failure.
        cause: String,
    },

    /// Node logic panicked inside its task.
    #[error("E103: Node '{node_id}' panicked in {run_id}: {message}")]
    NodePanic {
        /// The node that panicked.
        node_id: String,
        /// The run in which the panic occurred.
        run_id: RunId,
        /// The panic message.
        message: String,
    },

    // =========================================================================
    // Group Execution Errors (E200-E299)
    // =========================================================================
    /// Nested group recursion exceeded the configured depth guard.
    #[error("E201: Group '{node_id}' exceeds max nesting depth ({depth}/{max})")]
    GroupDepthExceeded {
        /// The group node at which the guard tripped.
        node_id: String,
        /// The depth that was reached.
        depth: usize,
        /// The configured maximum depth.
        max: usize,
    },

    /// A group node's body is malformed.
    #[error("E202: Invalid group body for node '{node_id}': {cause}")]
    GroupBody {
        /// The group node with the invalid body.
        node_id: String,
        /// Description of the problem.
        cause: String,
    },

    // =========================================================================
    // Configuration Errors (E800-E899)
    // =========================================================================
    /// Invalid configuration value.
    #[error("E801: Invalid configuration '{field}': {cause}")]
    ConfigValue {
        /// The configuration field with the invalid value.
        field: String,
        /// Description of why the value is invalid.
        cause: String,
    },

    /// Serialization/deserialization error.
    #[error("E804: Serialization error: {0}")]
    Serialization(
        /// The serialization error message.
        String,
    ),
}

impl StrataError {
    /// Get the error code (e.g., "E101").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::LogicNotFound { .. } => "E101",
            Self::NodeExecution { .. } => "E102",
            Self::NodePanic { .. } => "E103",
            Self::GroupDepthExceeded { .. } => "E201",
            Self::GroupBody { .. } => "E202",
            Self::ConfigValue { .. } => "E801",
            Self::Serialization(_) => "E804",
        }
    }

    /// Check if this error is scoped to a single node.
    ///
    /// Node-scoped errors are converted to `NodeFailed` events and never
    /// abort sibling nodes or subsequent layers.
    #[must_use]
    pub fn is_node_scoped(&self) -> bool {
        matches!(
            self,
            Self::LogicNotFound { .. } | Self::NodeExecution { .. } | Self::NodePanic { .. }
        )
    }
}

/// Result type alias using `StrataError`.
pub type Result<T> = std::result::Result<T, StrataError>;
