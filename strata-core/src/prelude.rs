//! Prelude for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! # Example
//!
//! ```ignore
//! use strata_core::prelude::*;
//! ```

// Core types
pub use crate::types::{RunId, SocketRef};

// Error handling
pub use crate::error::{Result, StrataError};

// Graph snapshot
pub use crate::graph::{ConnectionDescriptor, GroupNodeData, NodeDescriptor, SocketDescriptor};

// Context
pub use crate::context::{ExecutionContext, NodeState, NodeView};

// Events
pub use crate::events::{
    BroadcastSink, BufferedSink, EventKind, EventSink, ExecutionEvent, MultiSink, NullSink,
};

// Providers
pub use crate::provider::{Inputs, LogicContext, LogicFuture, LogicProvider, NodeLogic, Outputs};

// Values
pub use crate::value::Value;
