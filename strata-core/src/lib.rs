//! Strata Core Library
//!
//! Foundational types and traits for the Strata graph execution engine:
//! the immutable graph snapshot descriptors, the dynamic socket value
//! type, the run-scoped execution context, the typed event stream, and the
//! node logic provider abstraction.
//!
//! The engine itself (planner + orchestrator) lives in `strata-engine`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod events;
pub mod graph;
pub mod prelude;
pub mod provider;
pub mod types;
pub mod value;

// Re-export key types at crate root for convenience
pub use context::{ExecutionContext, NodeState, NodeView};
pub use error::{Result, StrataError};
pub use events::{EventKind, EventSink, ExecutionEvent};
pub use graph::{ConnectionDescriptor, GroupNodeData, NodeDescriptor, SocketDescriptor};
pub use provider::{LogicContext, LogicProvider, NodeLogic};
pub use types::{RunId, SocketRef};
pub use value::Value;
