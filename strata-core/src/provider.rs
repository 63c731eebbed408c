//! Node logic provider traits.
//!
//! A provider is the pluggable capability that executes a single node's
//! business logic given resolved inputs. The engine is agnostic to how the
//! logic was bound; it only needs a lookup from definition id to something
//! callable.
//!
//! Every call receives the active node id explicitly through
//! [`LogicContext`] — providers never track a shared "current node" field,
//! which keeps them safe under parallel execution.

use crate::context::{ExecutionContext, NodeView};
use crate::error::Result;
use crate::events::{EventKind, EventSink, ExecutionEvent};
use crate::types::RunId;
use crate::value::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Per-call identity and plumbing handed to node logic.
#[derive(Clone)]
pub struct LogicContext {
    /// The run this call belongs to.
    pub run_id: RunId,
    /// The node being executed.
    pub node_id: String,
    /// Cooperative cancellation signal for long-running logic.
    pub cancel: CancellationToken,
    /// The run's value store, exposed to logic only through [`Self::view`].
    context: Arc<ExecutionContext>,
    /// Sink for provider feedback, merged into the run's event stream.
    feedback: Arc<dyn EventSink>,
}

impl LogicContext {
    /// Create a new logic context for one node within a run.
    pub fn new(
        node_id: impl Into<String>,
        context: Arc<ExecutionContext>,
        cancel: CancellationToken,
        feedback: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            run_id: context.run_id(),
            node_id: node_id.into(),
            cancel,
            context,
            feedback,
        }
    }

    /// A read view over the run's context restricted to the active node.
    pub fn view(&self) -> NodeView<'_> {
        self.context.node_view(&self.node_id)
    }

    /// Emit a feedback message attributed to the active node.
    pub fn feedback(&self, message: impl Into<String>) {
        self.feedback.emit(ExecutionEvent::new(
            self.run_id,
            EventKind::ProviderFeedback {
                node_id: self.node_id.clone(),
                message: message.into(),
            },
        ));
    }
}

impl std::fmt::Debug for LogicContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicContext")
            .field("run_id", &self.run_id)
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}

/// Resolved input values by socket name.
pub type Inputs = HashMap<String, Value>;

/// Output values by socket name.
pub type Outputs = HashMap<String, Value>;

/// A boxed future for async node logic.
pub type LogicFuture<'a> = Pin<Box<dyn Future<Output = Result<Outputs>> + Send + 'a>>;

/// One node definition's executable logic.
///
/// # Example
///
/// ```
/// use strata_core::provider::{Inputs, LogicContext, LogicFuture, NodeLogic};
/// use strata_core::value::Value;
/// use std::collections::HashMap;
///
/// struct Add;
///
/// impl NodeLogic for Add {
///     fn execute<'a>(&'a self, _ctx: LogicContext, inputs: Inputs) -> LogicFuture<'a> {
///         Box::pin(async move {
///             let a = inputs.get("a").and_then(Value::as_f64).unwrap_or(0.0);
///             let b = inputs.get("b").and_then(Value::as_f64).unwrap_or(0.0);
///             let mut outputs = HashMap::new();
///             outputs.insert("sum".to_string(), Value::float(a + b));
///             Ok(outputs)
///         })
///     }
/// }
/// ```
pub trait NodeLogic: Send + Sync {
    /// Execute the logic with resolved inputs, producing output values by
    /// socket name.
    fn execute<'a>(&'a self, ctx: LogicContext, inputs: Inputs) -> LogicFuture<'a>;
}

/// Lookup + dispatch capability over a set of node definitions.
pub trait LogicProvider: Send + Sync {
    /// Check whether this provider can execute the given definition.
    fn contains(&self, definition_id: &str) -> bool;

    /// Execute the logic bound to `definition_id`.
    ///
    /// # Errors
    /// Returns [`crate::error::StrataError::LogicNotFound`] when the
    /// definition is unknown; any other error is a node-scoped invocation
    /// failure.
    fn execute<'a>(
        &'a self,
        ctx: LogicContext,
        definition_id: &'a str,
        inputs: Inputs,
    ) -> LogicFuture<'a>;
}
