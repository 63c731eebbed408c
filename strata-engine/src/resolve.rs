//! Input resolution and control-flow gating.
//!
//! Resolution happens just before a node is invoked, once its layer is
//! reached. It is deliberately forgiving: a missing upstream value degrades
//! to the socket's declared default, and a missing default simply leaves
//! the input absent. Resolution never fails a node.

use std::collections::HashMap;
use strata_core::context::{ExecutionContext, NodeState};
use strata_core::graph::{ConnectionDescriptor, NodeDescriptor};
use strata_core::provider::Inputs;
use strata_core::types::SocketRef;

/// Resolve a node's data inputs from the run context.
///
/// For each declared data input socket, data connections targeting it are
/// consulted in listed order and the last connection with an available
/// upstream value wins. Upstream values are widened toward the socket's
/// declared type tag (int to float only). When no connection delivers a
/// value, the socket's declared default is used; when there is no default
/// either, the socket is left out of the resolved map.
///
/// Every resolved value is also recorded in the context so that node views
/// and post-run inspection see what the node actually received.
pub fn resolve_inputs(
    node: &NodeDescriptor,
    connections: &[ConnectionDescriptor],
    ctx: &ExecutionContext,
) -> Inputs {
    let mut resolved: Inputs = HashMap::new();

    for socket in node.data_inputs() {
        let mut value = None;
        for conn in connections {
            if conn.is_execution || conn.input_node != node.id || conn.input_socket != socket.name
            {
                continue;
            }
            if let Some(upstream) = ctx.output(&conn.source()) {
                value = Some(upstream.widened_for(&socket.type_name));
            }
        }

        let value = match value.or_else(|| socket.value.clone()) {
            Some(v) => v,
            None => {
                tracing::trace!(
                    node_id = %node.id,
                    socket = %socket.name,
                    "No value and no default; leaving input absent"
                );
                continue;
            }
        };

        ctx.set_input(SocketRef::new(&node.id, &socket.name), value.clone());
        resolved.insert(socket.name.clone(), value);
    }

    resolved
}

/// Decide whether a callable node's control flow has fired.
///
/// Non-callable nodes and execution entry points are always open. A
/// callable node with no incoming execution connection has nothing to wait
/// for and is open as well. Otherwise the gate opens when at least one
/// incoming execution connection originates from a node that completed.
pub fn exec_gate_open(
    node: &NodeDescriptor,
    connections: &[ConnectionDescriptor],
    ctx: &ExecutionContext,
) -> bool {
    if !node.callable || node.exec_init {
        return true;
    }

    let mut has_incoming = false;
    for conn in connections {
        if !conn.is_execution || conn.input_node != node.id {
            continue;
        }
        has_incoming = true;
        if ctx.state(&conn.output_node) == NodeState::Completed {
            return true;
        }
    }

    !has_incoming
}
