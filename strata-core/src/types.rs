//! Strongly-typed identifiers for Strata entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a single execution run of a graph.
///
/// Each call to the orchestrator gets its own run ID; nested group runs
/// receive a fresh ID and record their parent's ID in the child context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a run ID from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parse a run ID from a UUID string.
    ///
    /// Returns `None` if the string is not a valid UUID.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run_{}", self.0)
    }
}

impl Serialize for RunId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Uuid::deserialize(deserializer).map(Self)
    }
}

/// Reference to a socket on a node.
///
/// Socket references key the value slots of an execution context, for both
/// inputs and outputs. Node ids are opaque strings assigned by the graph
/// authoring layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketRef {
    /// The node this socket belongs to.
    pub node: String,
    /// The socket name (unique within node + direction).
    pub socket: String,
}

impl SocketRef {
    /// Create a new socket reference.
    #[must_use]
    pub fn new(node: impl Into<String>, socket: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            socket: socket.into(),
        }
    }
}

impl fmt::Display for SocketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.socket)
    }
}

/// Parse a socket reference string like `"adder.result"`.
///
/// The node id is everything before the first dot; the socket name may
/// itself contain dots.
impl std::str::FromStr for SocketRef {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((node, socket)) = s.split_once('.') else {
            return Err("Socket reference must be in format '<node>.<socket>'");
        };
        if node.is_empty() {
            return Err("Node id cannot be empty");
        }
        if socket.is_empty() {
            return Err("Socket name cannot be empty");
        }
        Ok(Self::new(node, socket))
    }
}
