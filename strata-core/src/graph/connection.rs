//! Connection descriptors.

use crate::types::SocketRef;
use serde::{Deserialize, Serialize};

/// A directed connection between an output socket and an input socket.
///
/// At most one connection may target a given input socket; the authoring
/// layer enforces this, and the engine tolerates violations by letting the
/// last-resolved value win. Connections whose endpoints do not exist in
/// the node set are ignored by the planner and by input resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// Source node id.
    pub output_node: String,
    /// Source socket name.
    pub output_socket: String,
    /// Target node id.
    pub input_node: String,
    /// Target socket name.
    pub input_socket: String,
    /// Whether this is an execution (control-flow) connection.
    #[serde(default)]
    pub is_execution: bool,
}

impl ConnectionDescriptor {
    /// Create a new data connection.
    pub fn new(
        output_node: impl Into<String>,
        output_socket: impl Into<String>,
        input_node: impl Into<String>,
        input_socket: impl Into<String>,
    ) -> Self {
        Self {
            output_node: output_node.into(),
            output_socket: output_socket.into(),
            input_node: input_node.into(),
            input_socket: input_socket.into(),
            is_execution: false,
        }
    }

    /// Create a new execution connection.
    pub fn execution(
        output_node: impl Into<String>,
        output_socket: impl Into<String>,
        input_node: impl Into<String>,
        input_socket: impl Into<String>,
    ) -> Self {
        Self {
            is_execution: true,
            ..Self::new(output_node, output_socket, input_node, input_socket)
        }
    }

    /// The source endpoint as a socket reference.
    pub fn source(&self) -> SocketRef {
        SocketRef::new(&self.output_node, &self.output_socket)
    }

    /// The target endpoint as a socket reference.
    pub fn target(&self) -> SocketRef {
        SocketRef::new(&self.input_node, &self.input_socket)
    }
}
