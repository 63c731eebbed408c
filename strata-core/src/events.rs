//! Typed execution event stream.
//!
//! The orchestrator reports progress through a tagged event union rather
//! than callback delegate lists, so multiple consumers can subscribe
//! without shared mutable state. Emission is synchronous fan-out with no
//! backpressure: a slow sink stalls the emitting path.

use crate::types::RunId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Maximum number of events kept in the default buffered sink.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10_000;

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A node began executing.
    NodeStarted {
        /// The node that started.
        node_id: String,
    },
    /// A node finished successfully; its outputs are in the context.
    NodeCompleted {
        /// The node that completed.
        node_id: String,
    },
    /// A node's logic failed. Node-scoped; the run continues.
    NodeFailed {
        /// The node that failed.
        node_id: String,
        /// The failure message.
        error: String,
    },
    /// A plan layer began executing.
    LayerStarted {
        /// Zero-based layer index.
        index: usize,
        /// The ids of the nodes in the layer.
        node_ids: Vec<String>,
    },
    /// Every node of a plan layer has finished (success or failure).
    LayerCompleted {
        /// Zero-based layer index.
        index: usize,
    },
    /// Orchestrator-level fault; the remainder of the run is aborted.
    ExecutionFailed {
        /// The fault message.
        error: String,
    },
    /// Cooperative cancellation was observed; no further nodes scheduled.
    ExecutionCanceled,
    /// Free-form feedback from a node logic provider.
    ProviderFeedback {
        /// The node the provider was executing.
        node_id: String,
        /// The feedback message.
        message: String,
    },
}

/// An execution event, attributed to the run that emitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// The run this event belongs to. Nested group runs carry their own id.
    pub run_id: RunId,
    /// The event payload.
    pub kind: EventKind,
}

impl ExecutionEvent {
    /// Create a new event.
    pub fn new(run_id: RunId, kind: EventKind) -> Self {
        Self { run_id, kind }
    }

    /// The node id this event concerns, if any.
    pub fn node_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::NodeStarted { node_id }
            | EventKind::NodeCompleted { node_id }
            | EventKind::NodeFailed { node_id, .. }
            | EventKind::ProviderFeedback { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}

/// Trait for execution event consumers.
pub trait EventSink: Send + Sync {
    /// Receive an event. Must not block for long; emission is synchronous.
    fn emit(&self, event: ExecutionEvent);
}

/// Thread-safe sink with a bounded ring buffer and query helpers.
///
/// Useful for tests and for UI layers that poll rather than subscribe.
pub struct BufferedSink {
    buffer: RwLock<VecDeque<ExecutionEvent>>,
    capacity: usize,
}

impl BufferedSink {
    /// Create a new sink with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Create a sink with default capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }

    /// All buffered events, oldest first.
    pub fn all(&self) -> Vec<ExecutionEvent> {
        self.buffer.read().iter().cloned().collect()
    }

    /// Events for one run.
    pub fn by_run(&self, run_id: RunId) -> Vec<ExecutionEvent> {
        self.buffer
            .read()
            .iter()
            .filter(|e| e.run_id == run_id)
            .cloned()
            .collect()
    }

    /// Events concerning one node.
    pub fn by_node(&self, node_id: &str) -> Vec<ExecutionEvent> {
        self.buffer
            .read()
            .iter()
            .filter(|e| e.node_id() == Some(node_id))
            .cloned()
            .collect()
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.buffer.read().len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all buffered events.
    pub fn clear(&self) {
        self.buffer.write().clear();
    }
}

impl EventSink for BufferedSink {
    fn emit(&self, event: ExecutionEvent) {
        let mut buffer = self.buffer.write();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(event);
    }
}

impl Default for BufferedSink {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// A sink that discards all events.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ExecutionEvent) {}
}

/// A sink that fans events out to multiple sinks.
pub struct MultiSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl MultiSink {
    /// Create a new multi-sink.
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for MultiSink {
    fn emit(&self, event: ExecutionEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

/// A sink backed by a tokio broadcast channel.
///
/// Lets any number of consumers subscribe to the live event stream. Lagging
/// receivers drop old events rather than stalling the emitter.
pub struct BroadcastSink {
    tx: broadcast::Sender<ExecutionEvent>,
}

impl BroadcastSink {
    /// Create a new broadcast sink with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: ExecutionEvent) {
        // Send only fails when there are no receivers; that's fine.
        let _ = self.tx.send(event);
    }
}
