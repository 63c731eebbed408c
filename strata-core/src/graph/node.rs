//! Node and socket descriptors.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A socket on a node.
///
/// Sockets come in two flavors: data sockets, which carry a payload value,
/// and execution sockets, which carry only activation. An execution socket
/// never holds a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketDescriptor {
    /// Socket name (unique within node + direction).
    pub name: String,

    /// Semantic type tag (opaque to the engine, except for numeric
    /// widening during input resolution).
    #[serde(default)]
    pub type_name: String,

    /// Whether this is an input socket.
    pub is_input: bool,

    /// Whether this is an execution (control-flow) socket.
    #[serde(default)]
    pub is_execution: bool,

    /// Default/current value for data sockets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl SocketDescriptor {
    /// Create a data input socket.
    pub fn input(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_input: true,
            is_execution: false,
            value: None,
        }
    }

    /// Create a data output socket.
    pub fn output(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_input: false,
            is_execution: false,
            value: None,
        }
    }

    /// Create an execution input socket.
    pub fn exec_input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: String::new(),
            is_input: true,
            is_execution: true,
            value: None,
        }
    }

    /// Create an execution output socket.
    pub fn exec_output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: String::new(),
            is_input: false,
            is_execution: true,
            value: None,
        }
    }

    /// Set the default value. Ignored on execution sockets.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        if !self.is_execution {
            self.value = Some(value.into());
        }
        self
    }
}

/// A node in the graph snapshot.
///
/// Nodes are created by the authoring layer and read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Unique node id within a run.
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Whether this node has control-flow sockets and is activated by
    /// signaling rather than by data availability alone.
    #[serde(default)]
    pub callable: bool,

    /// Whether this node is an execution entry point (no incoming control
    /// flow expected).
    #[serde(default)]
    pub exec_init: bool,

    /// Ordered input sockets.
    #[serde(default)]
    pub inputs: Vec<SocketDescriptor>,

    /// Ordered output sockets.
    #[serde(default)]
    pub outputs: Vec<SocketDescriptor>,

    /// Link to a logic provider entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_id: Option<String>,
}

impl NodeDescriptor {
    /// Create a new node descriptor.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            callable: false,
            exec_init: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            definition_id: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark the node as callable (control-flow activated).
    pub fn callable(mut self) -> Self {
        self.callable = true;
        self
    }

    /// Mark the node as an execution entry point.
    pub fn exec_init(mut self) -> Self {
        self.exec_init = true;
        self.callable = true;
        self
    }

    /// Add an input socket.
    pub fn with_input(mut self, socket: SocketDescriptor) -> Self {
        self.inputs.push(socket);
        self
    }

    /// Add an output socket.
    pub fn with_output(mut self, socket: SocketDescriptor) -> Self {
        self.outputs.push(socket);
        self
    }

    /// Set the logic definition id.
    pub fn with_definition(mut self, definition_id: impl Into<String>) -> Self {
        self.definition_id = Some(definition_id.into());
        self
    }

    /// Get an input socket by name.
    pub fn input(&self, name: &str) -> Option<&SocketDescriptor> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Get an output socket by name.
    pub fn output(&self, name: &str) -> Option<&SocketDescriptor> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// Check if the node declares any execution input socket.
    pub fn has_exec_input(&self) -> bool {
        self.inputs.iter().any(|s| s.is_execution)
    }

    /// Iterate the data (non-execution) input sockets.
    pub fn data_inputs(&self) -> impl Iterator<Item = &SocketDescriptor> {
        self.inputs.iter().filter(|s| !s.is_execution)
    }

    /// Iterate the data (non-execution) output sockets.
    pub fn data_outputs(&self) -> impl Iterator<Item = &SocketDescriptor> {
        self.outputs.iter().filter(|s| !s.is_execution)
    }
}
