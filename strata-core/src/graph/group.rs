//! Group node data — a node whose body is itself a nested graph.

use super::{ConnectionDescriptor, NodeDescriptor};
use serde::{Deserialize, Serialize};

/// A group node together with its nested graph body.
///
/// The group's descriptor declares the boundary sockets; the body is
/// executed recursively as its own run. Inside the body, the group node's
/// own id acts as the boundary pseudo-node: inner connections may name it
/// as a source (to read boundary inputs) or as a target (to publish
/// boundary outputs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNodeData {
    /// The group node as seen by the parent graph.
    pub node: NodeDescriptor,
    /// Nodes of the nested body.
    #[serde(default)]
    pub nodes: Vec<NodeDescriptor>,
    /// Connections of the nested body.
    #[serde(default)]
    pub connections: Vec<ConnectionDescriptor>,
}

impl GroupNodeData {
    /// Create a new group from a descriptor and its body.
    pub fn new(
        node: NodeDescriptor,
        nodes: Vec<NodeDescriptor>,
        connections: Vec<ConnectionDescriptor>,
    ) -> Self {
        Self {
            node,
            nodes,
            connections,
        }
    }

    /// The group node's id.
    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// Inner connections that publish to the group's boundary outputs.
    pub fn boundary_outputs(&self) -> impl Iterator<Item = &ConnectionDescriptor> {
        let id = self.node.id.as_str();
        self.connections
            .iter()
            .filter(move |c| c.input_node == id && !c.is_execution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SocketDescriptor;

    #[test]
    fn boundary_output_connections() {
        let group = NodeDescriptor::new("group")
            .with_input(SocketDescriptor::input("x", "int"))
            .with_output(SocketDescriptor::output("y", "int"));
        let inner = NodeDescriptor::new("double");

        let data = GroupNodeData::new(
            group,
            vec![inner],
            vec![
                ConnectionDescriptor::new("group", "x", "double", "in"),
                ConnectionDescriptor::new("double", "out", "group", "y"),
            ],
        );

        assert_eq!(data.id(), "group");
        let outputs: Vec<_> = data.boundary_outputs().collect();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].output_node, "double");
    }
}
