//! Run-scoped execution context.
//!
//! One context is created per top-level run and owns every value that
//! crosses a socket boundary during that run, plus per-node state flags.
//! Nested group runs derive a fresh child context.
//!
//! A context is safe to share across the spawned node tasks of *one* run.
//! It is not meant to be shared by two concurrent runs; each run must own
//! a distinct context.

use crate::types::{RunId, SocketRef};
use crate::value::Value;
use dashmap::DashMap;
use std::collections::HashMap;

/// Execution state of a single node within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeState {
    /// Not yet executed.
    #[default]
    Pending,
    /// Executed successfully; outputs are in the context.
    Completed,
    /// Node logic failed; the error is recorded against the node.
    Failed,
    /// Skipped (callable node whose control flow never fired).
    Skipped,
}

/// Mutable, run-scoped value store shared across one run.
#[derive(Debug)]
pub struct ExecutionContext {
    run_id: RunId,
    parent_run: Option<RunId>,
    inputs: DashMap<SocketRef, Value>,
    outputs: DashMap<SocketRef, Value>,
    states: DashMap<String, NodeState>,
    errors: DashMap<String, String>,
}

impl ExecutionContext {
    /// Create a fresh context for a new top-level run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            parent_run: None,
            inputs: DashMap::new(),
            outputs: DashMap::new(),
            states: DashMap::new(),
            errors: DashMap::new(),
        }
    }

    /// Derive a fresh child context for a nested group run.
    ///
    /// The child starts empty; boundary values are copied in explicitly by
    /// the orchestrator.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            run_id: RunId::new(),
            parent_run: Some(self.run_id),
            inputs: DashMap::new(),
            outputs: DashMap::new(),
            states: DashMap::new(),
            errors: DashMap::new(),
        }
    }

    /// This run's id.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The parent run's id, for child contexts.
    pub fn parent_run(&self) -> Option<RunId> {
        self.parent_run
    }

    /// Store a resolved input value.
    pub fn set_input(&self, socket: SocketRef, value: Value) {
        self.inputs.insert(socket, value);
    }

    /// Store a node output value.
    pub fn set_output(&self, socket: SocketRef, value: Value) {
        self.outputs.insert(socket, value);
    }

    /// Read a resolved input value.
    pub fn input(&self, socket: &SocketRef) -> Option<Value> {
        self.inputs.get(socket).map(|v| v.clone())
    }

    /// Read a node output value.
    pub fn output(&self, socket: &SocketRef) -> Option<Value> {
        self.outputs.get(socket).map(|v| v.clone())
    }

    /// Mark a node as completed.
    pub fn mark_completed(&self, node_id: &str) {
        self.states.insert(node_id.to_string(), NodeState::Completed);
    }

    /// Mark a node as failed and record its error.
    pub fn mark_failed(&self, node_id: &str, error: impl Into<String>) {
        self.states.insert(node_id.to_string(), NodeState::Failed);
        self.errors.insert(node_id.to_string(), error.into());
    }

    /// Mark a node as skipped.
    pub fn mark_skipped(&self, node_id: &str) {
        self.states.insert(node_id.to_string(), NodeState::Skipped);
    }

    /// Get a node's execution state (`Pending` if never touched).
    pub fn state(&self, node_id: &str) -> NodeState {
        self.states.get(node_id).map(|s| *s).unwrap_or_default()
    }

    /// Get the error recorded against a node, if any.
    pub fn error(&self, node_id: &str) -> Option<String> {
        self.errors.get(node_id).map(|e| e.clone())
    }

    /// Number of stored output values.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// A read view restricted to one node id.
    pub fn node_view(&self, node_id: &str) -> NodeView<'_> {
        NodeView {
            context: self,
            node_id: node_id.to_string(),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Read view over a context restricted to a single node.
///
/// Handed to node logic so a provider only sees the slots belonging to the
/// node it is executing.
#[derive(Debug)]
pub struct NodeView<'a> {
    context: &'a ExecutionContext,
    node_id: String,
}

impl NodeView<'_> {
    /// The node this view is restricted to.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Read one of this node's resolved input values.
    pub fn input(&self, socket: &str) -> Option<Value> {
        self.context
            .input(&SocketRef::new(&self.node_id, socket))
    }

    /// Read one of this node's output values.
    pub fn output(&self, socket: &str) -> Option<Value> {
        self.context
            .output(&SocketRef::new(&self.node_id, socket))
    }

    /// Snapshot all of this node's resolved inputs by socket name.
    pub fn inputs(&self) -> HashMap<String, Value> {
        self.context
            .inputs
            .iter()
            .filter(|entry| entry.key().node == self.node_id)
            .map(|entry| (entry.key().socket.clone(), entry.value().clone()))
            .collect()
    }
}
