//! Immutable graph snapshot descriptors.
//!
//! These types are produced by an external graph-authoring layer and are
//! read-only to the engine. Socket type compatibility is validated by the
//! authoring layer before a connection ever enters a snapshot.

mod connection;
mod group;
mod node;

pub use connection::ConnectionDescriptor;
pub use group::GroupNodeData;
pub use node::{NodeDescriptor, SocketDescriptor};
