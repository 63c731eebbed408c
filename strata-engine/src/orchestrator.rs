//! Graph run orchestration.
//!
//! The orchestrator walks an execution plan layer by layer, resolving each
//! node's inputs, gating callable nodes on control flow, dispatching node
//! logic through the configured provider, and publishing progress events.
//!
//! Failure handling is asymmetric on purpose: an error inside one node's
//! logic is recorded and reported as a `NodeFailed` event while the rest of
//! the run continues, whereas an orchestrator fault (such as the group
//! recursion guard tripping) aborts the remainder of the run with an
//! `ExecutionFailed` event and an `Err` return. Cooperative cancellation is
//! neither: the run stops scheduling new nodes and returns a summary with
//! `Canceled` status.

use crate::options::ExecutionOptions;
use crate::planner::{build_plan, ExecutionLayer, ExecutionPlan};
use crate::resolve::{exec_gate_open, resolve_inputs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use strata_core::context::{ExecutionContext, NodeState};
use strata_core::error::{Result, StrataError};
use strata_core::events::{EventKind, EventSink, ExecutionEvent, NullSink};
use strata_core::graph::{ConnectionDescriptor, GroupNodeData, NodeDescriptor};
use strata_core::provider::{Inputs, LogicContext, LogicProvider, Outputs};
use strata_core::types::{RunId, SocketRef};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every layer was scheduled; individual nodes may still have failed.
    Completed,
    /// Cancellation was observed; remaining nodes were never scheduled.
    Canceled,
}

/// Outcome of one awaited run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The run this summary describes.
    pub run_id: RunId,
    /// How the run ended.
    pub status: RunStatus,
    /// Nodes that completed successfully.
    pub executed: usize,
    /// Nodes whose logic failed.
    pub failed: usize,
    /// Callable nodes whose control flow never fired.
    pub skipped: usize,
    /// Layers that were fully processed.
    pub layers_run: usize,
}

impl RunSummary {
    /// Check whether the run was canceled.
    pub fn is_canceled(&self) -> bool {
        self.status == RunStatus::Canceled
    }
}

/// Drives graph runs against a logic provider.
///
/// Cheap to clone; all configuration is behind `Arc`s. One orchestrator may
/// drive any number of concurrent runs as long as each run owns its own
/// [`ExecutionContext`].
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn LogicProvider>,
    events: Arc<dyn EventSink>,
    groups: Arc<HashMap<String, GroupNodeData>>,
    options: ExecutionOptions,
}

impl Orchestrator {
    /// Create an orchestrator with default options and no event sink.
    pub fn new(provider: Arc<dyn LogicProvider>) -> Self {
        Self {
            provider,
            events: Arc::new(NullSink),
            groups: Arc::new(HashMap::new()),
            options: ExecutionOptions::default(),
        }
    }

    /// Set the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Set the execution options.
    #[must_use]
    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a group node body. Nodes whose id matches a registered
    /// group are executed recursively instead of being dispatched to the
    /// provider.
    #[must_use]
    pub fn with_group(mut self, group: GroupNodeData) -> Self {
        Arc::make_mut(&mut self.groups).insert(group.id().to_string(), group);
        self
    }

    /// The configured options.
    pub fn options(&self) -> ExecutionOptions {
        self.options
    }

    /// Plan and execute a graph snapshot.
    #[instrument(skip_all, fields(run_id = %ctx.run_id()))]
    pub async fn execute(
        &self,
        nodes: &[NodeDescriptor],
        connections: &[ConnectionDescriptor],
        ctx: &Arc<ExecutionContext>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let plan = build_plan(nodes, connections);
        self.execute_planned(&plan, connections, ctx, cancel).await
    }

    /// Execute a precomputed plan.
    ///
    /// The plan may be reused across runs; each run still needs its own
    /// context.
    #[instrument(skip_all, fields(run_id = %ctx.run_id(), layers = plan.len()))]
    pub async fn execute_planned(
        &self,
        plan: &ExecutionPlan,
        connections: &[ConnectionDescriptor],
        ctx: &Arc<ExecutionContext>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let connections = Arc::new(connections.to_vec());
        self.run_plan(plan.clone(), connections, Arc::clone(ctx), cancel.clone(), 0)
            .await
    }

    /// Execute a group body directly as a nested run of the given context.
    ///
    /// Each declared input socket is seeded from the parent context's value
    /// for `(group id, socket)` when one is present, falling back to the
    /// socket's declared default.
    pub async fn execute_group(
        &self,
        group: &GroupNodeData,
        parent: &Arc<ExecutionContext>,
        cancel: &CancellationToken,
    ) -> Result<Outputs> {
        let mut seed = Inputs::new();
        for socket in group.node.data_inputs() {
            let value = parent
                .input(&SocketRef::new(group.id(), &socket.name))
                .or_else(|| socket.value.clone());
            if let Some(value) = value {
                seed.insert(socket.name.clone(), value);
            }
        }
        self.run_group(group, seed, parent, cancel, 0).await
    }

    fn emit(&self, run_id: RunId, kind: EventKind) {
        self.events.emit(ExecutionEvent::new(run_id, kind));
    }

    /// Recursive core. Boxed because group nodes re-enter it for their
    /// nested bodies.
    fn run_plan<'a>(
        &'a self,
        plan: ExecutionPlan,
        connections: Arc<Vec<ConnectionDescriptor>>,
        ctx: Arc<ExecutionContext>,
        cancel: CancellationToken,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<RunSummary>> + Send + 'a>> {
        Box::pin(async move {
            let run_id = ctx.run_id();
            let mut summary = RunSummary {
                run_id,
                status: RunStatus::Completed,
                executed: 0,
                failed: 0,
                skipped: 0,
                layers_run: 0,
            };

            let semaphore = Arc::new(Semaphore::new(self.options.max_parallelism));

            for (index, layer) in plan.layers().iter().enumerate() {
                if cancel.is_cancelled() {
                    tracing::info!(%run_id, layer = index, "Cancellation observed; stopping");
                    self.emit(run_id, EventKind::ExecutionCanceled);
                    summary.status = RunStatus::Canceled;
                    return Ok(summary);
                }

                self.emit(
                    run_id,
                    EventKind::LayerStarted {
                        index,
                        node_ids: layer.node_ids(),
                    },
                );

                let outcome = if self.options.layer_is_parallel() && layer.len() > 1 {
                    self.run_layer_parallel(layer, &connections, &ctx, &cancel, &semaphore, depth)
                        .await
                } else {
                    self.run_layer_sequential(layer, &connections, &ctx, &cancel, depth)
                        .await
                };

                match outcome {
                    Ok(Some(tally)) => {
                        summary.executed += tally.executed;
                        summary.failed += tally.failed;
                        summary.skipped += tally.skipped;
                        summary.layers_run += 1;
                        self.emit(run_id, EventKind::LayerCompleted { index });
                    }
                    Ok(None) => {
                        // Canceled mid-layer; the interrupted layer does not
                        // count as completed.
                        self.emit(run_id, EventKind::ExecutionCanceled);
                        summary.status = RunStatus::Canceled;
                        return Ok(summary);
                    }
                    Err(fault) => {
                        tracing::error!(%run_id, error = %fault, "Run aborted");
                        self.emit(
                            run_id,
                            EventKind::ExecutionFailed {
                                error: fault.to_string(),
                            },
                        );
                        return Err(fault);
                    }
                }
            }

            Ok(summary)
        })
    }

    async fn run_layer_sequential(
        &self,
        layer: &ExecutionLayer,
        connections: &Arc<Vec<ConnectionDescriptor>>,
        ctx: &Arc<ExecutionContext>,
        cancel: &CancellationToken,
        depth: usize,
    ) -> Result<Option<LayerTally>> {
        let mut tally = LayerTally::default();
        for node in &layer.nodes {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let state = self.run_node(node, connections, ctx, cancel, depth).await?;
            tally.record(state);
        }
        Ok(Some(tally))
    }

    async fn run_layer_parallel(
        &self,
        layer: &ExecutionLayer,
        connections: &Arc<Vec<ConnectionDescriptor>>,
        ctx: &Arc<ExecutionContext>,
        cancel: &CancellationToken,
        semaphore: &Arc<Semaphore>,
        depth: usize,
    ) -> Result<Option<LayerTally>> {
        let mut handles = Vec::with_capacity(layer.len());

        for node in &layer.nodes {
            let orchestrator = self.clone();
            let node = node.clone();
            let node_id = node.id.clone();
            let connections = Arc::clone(connections);
            let ctx = Arc::clone(ctx);
            let cancel = cancel.clone();
            let semaphore = Arc::clone(semaphore);

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("run semaphore is never closed");
                // Nodes still queued behind the permit are never dispatched
                // once the token fires.
                if cancel.is_cancelled() {
                    return None;
                }
                Some(
                    orchestrator
                        .run_node(&node, &connections, &ctx, &cancel, depth)
                        .await,
                )
            });
            handles.push((node_id, handle));
        }

        let mut tally = LayerTally::default();
        let mut fault = None;
        let mut canceled = false;
        for (node_id, handle) in handles {
            if fault.is_some() {
                // A sibling already faulted; abort the rest of the layer.
                handle.abort();
                continue;
            }
            match handle.await {
                Ok(Some(Ok(state))) => tally.record(state),
                Ok(Some(Err(layer_fault))) => fault = Some(layer_fault),
                Ok(None) => canceled = true,
                Err(join_error) if join_error.is_cancelled() => {}
                Err(join_error) => {
                    self.record_panic(ctx, node_id, join_error);
                    tally.record(NodeState::Failed);
                }
            }
        }

        if let Some(fault) = fault {
            return Err(fault);
        }
        if canceled {
            return Ok(None);
        }
        Ok(Some(tally))
    }

    fn record_panic(&self, ctx: &ExecutionContext, node_id: String, join_error: JoinError) {
        let error = StrataError::NodePanic {
            node_id: node_id.clone(),
            run_id: ctx.run_id(),
            message: panic_message(join_error),
        };
        tracing::error!(%node_id, error = %error, "Node task panicked");
        ctx.mark_failed(&node_id, error.to_string());
        self.emit(
            ctx.run_id(),
            EventKind::NodeFailed {
                node_id,
                error: error.to_string(),
            },
        );
    }

    /// Execute one node: gate, resolve, dispatch, record.
    ///
    /// Returns the node's final state. `Err` is reserved for orchestrator
    /// faults; every node-scoped error is converted to a `Failed` state and
    /// a `NodeFailed` event here.
    async fn run_node(
        &self,
        node: &NodeDescriptor,
        connections: &[ConnectionDescriptor],
        ctx: &Arc<ExecutionContext>,
        cancel: &CancellationToken,
        depth: usize,
    ) -> Result<NodeState> {
        let run_id = ctx.run_id();

        if !exec_gate_open(node, connections, ctx) {
            tracing::debug!(%run_id, node_id = %node.id, "Control flow gate closed; skipping");
            ctx.mark_skipped(&node.id);
            return Ok(NodeState::Skipped);
        }

        self.emit(
            run_id,
            EventKind::NodeStarted {
                node_id: node.id.clone(),
            },
        );
        let inputs = resolve_inputs(node, connections, ctx);

        let result = if let Some(group) = self.groups.get(node.id.as_str()) {
            self.run_group(group, inputs, ctx, cancel, depth).await
        } else {
            match &node.definition_id {
                Some(definition_id) => {
                    let logic_ctx = LogicContext::new(
                        node.id.clone(),
                        Arc::clone(ctx),
                        cancel.clone(),
                        Arc::clone(&self.events),
                    );
                    // Anything node logic returns is node-scoped; the fault
                    // path is reserved for errors the orchestrator itself
                    // raises.
                    self.provider
                        .execute(logic_ctx, definition_id, inputs)
                        .await
                        .map_err(|error| {
                            if error.is_node_scoped() {
                                error
                            } else {
                                StrataError::NodeExecution {
                                    node_id: node.id.clone(),
                                    run_id,
                                    cause: error.to_string(),
                                }
                            }
                        })
                }
                // Unbound nodes complete as no-ops, publishing their
                // declared output defaults.
                None => Ok(node
                    .data_outputs()
                    .filter_map(|s| s.value.clone().map(|v| (s.name.clone(), v)))
                    .collect()),
            }
        };

        match result {
            Ok(outputs) => {
                for (socket, value) in outputs {
                    ctx.set_output(SocketRef::new(&node.id, &socket), value);
                }
                ctx.mark_completed(&node.id);
                self.emit(
                    run_id,
                    EventKind::NodeCompleted {
                        node_id: node.id.clone(),
                    },
                );
                Ok(NodeState::Completed)
            }
            Err(error) if error.is_node_scoped() => {
                tracing::warn!(%run_id, node_id = %node.id, error = %error, "Node failed");
                ctx.mark_failed(&node.id, error.to_string());
                self.emit(
                    run_id,
                    EventKind::NodeFailed {
                        node_id: node.id.clone(),
                        error: error.to_string(),
                    },
                );
                Ok(NodeState::Failed)
            }
            Err(fault) => Err(fault),
        }
    }

    /// Run a group node's body as a nested run with a fresh child context.
    ///
    /// The group's own id acts as the boundary pseudo-node inside the body:
    /// resolved group inputs are published under it before the body runs,
    /// and inner connections targeting it define the boundary outputs.
    async fn run_group(
        &self,
        group: &GroupNodeData,
        inputs: Inputs,
        parent: &Arc<ExecutionContext>,
        cancel: &CancellationToken,
        depth: usize,
    ) -> Result<Outputs> {
        let depth = depth + 1;
        if depth > self.options.max_group_depth {
            return Err(StrataError::GroupDepthExceeded {
                node_id: group.id().to_string(),
                depth,
                max: self.options.max_group_depth,
            });
        }
        if group.nodes.iter().any(|n| n.id == group.id()) {
            return Err(StrataError::GroupBody {
                node_id: group.id().to_string(),
                cause: "body redeclares the group's own id".to_string(),
            });
        }

        let child = Arc::new(parent.child());
        tracing::debug!(
            group = %group.id(),
            parent_run = %parent.run_id(),
            child_run = %child.run_id(),
            depth,
            "Entering group body"
        );

        for (socket, value) in inputs {
            child.set_output(SocketRef::new(group.id(), &socket), value);
        }

        let plan = build_plan(&group.nodes, &group.connections);
        let connections = Arc::new(group.connections.clone());
        self.run_plan(plan, connections, Arc::clone(&child), cancel.clone(), depth)
            .await?;

        let mut outputs = Outputs::new();
        for conn in group.boundary_outputs() {
            if let Some(value) = child.output(&conn.source()) {
                outputs.insert(conn.input_socket.clone(), value);
            }
        }
        Ok(outputs)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("groups", &self.groups.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct LayerTally {
    executed: usize,
    failed: usize,
    skipped: usize,
}

impl LayerTally {
    fn record(&mut self, state: NodeState) {
        match state {
            NodeState::Completed => self.executed += 1,
            NodeState::Failed => self.failed += 1,
            NodeState::Skipped => self.skipped += 1,
            NodeState::Pending => {}
        }
    }
}

fn panic_message(join_error: JoinError) -> String {
    match join_error.try_into_panic() {
        Ok(payload) => {
            if let Some(message) = payload.downcast_ref::<&str>() {
                (*message).to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "unknown panic payload".to_string()
            }
        }
        Err(join_error) => join_error.to_string(),
    }
}
