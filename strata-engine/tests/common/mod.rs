//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata_core::events::BufferedSink;
use strata_core::provider::{Inputs, LogicContext, LogicFuture, NodeLogic, Outputs};
use strata_core::graph::{ConnectionDescriptor, NodeDescriptor, SocketDescriptor};
use strata_core::value::Value;
use strata_engine::RegistryProvider;

static TRACING: std::sync::Once = std::sync::Once::new();

/// Install a tracing subscriber once per test binary; honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Standard test logic: constants, addition, relay, and a failing node.
pub fn test_provider() -> RegistryProvider {
    RegistryProvider::new()
        .register_fn("emit.one", |_, _| {
            let mut outputs = Outputs::new();
            outputs.insert("out".to_string(), Value::int(1));
            Ok(outputs)
        })
        .register_fn("math.add", |_, inputs| {
            let a = inputs.get("a").and_then(Value::as_i64).unwrap_or(0);
            let b = inputs.get("b").and_then(Value::as_i64).unwrap_or(0);
            let mut outputs = Outputs::new();
            outputs.insert("sum".to_string(), Value::int(a + b));
            Ok(outputs)
        })
        .register_fn("relay", |_, inputs| {
            let mut outputs = Outputs::new();
            let value = inputs.get("in").cloned().unwrap_or_else(Value::null);
            outputs.insert("out".to_string(), value);
            Ok(outputs)
        })
        .register_fn("always.fail", |_, _| {
            Err(strata_core::error::StrataError::Serialization(
                "intentional test failure".to_string(),
            ))
        })
}

/// A node that emits the constant 1 on socket `out`.
pub fn one_node(id: &str) -> NodeDescriptor {
    NodeDescriptor::new(id)
        .with_definition("emit.one")
        .with_output(SocketDescriptor::output("out", "int"))
}

/// A node that sums sockets `a` and `b` into `sum`.
pub fn add_node(id: &str) -> NodeDescriptor {
    NodeDescriptor::new(id)
        .with_definition("math.add")
        .with_input(SocketDescriptor::input("a", "int"))
        .with_input(SocketDescriptor::input("b", "int"))
        .with_output(SocketDescriptor::output("sum", "int"))
}

/// A node that copies socket `in` to socket `out`.
pub fn relay_node(id: &str) -> NodeDescriptor {
    NodeDescriptor::new(id)
        .with_definition("relay")
        .with_input(SocketDescriptor::input("in", "int"))
        .with_output(SocketDescriptor::output("out", "int"))
}

/// Build a linear graph: n0 -> n1 -> ... -> n{count-1}.
pub fn build_linear_graph(count: usize) -> (Vec<NodeDescriptor>, Vec<ConnectionDescriptor>) {
    let mut nodes = vec![one_node("n0")];
    let mut connections = Vec::new();
    for i in 1..count {
        nodes.push(relay_node(&format!("n{i}")));
        connections.push(ConnectionDescriptor::new(
            format!("n{}", i - 1),
            "out",
            format!("n{i}"),
            "in",
        ));
    }
    (nodes, connections)
}

/// Build the diamond graph: a and b feed sum, sum feeds two relays.
pub fn build_diamond_graph() -> (Vec<NodeDescriptor>, Vec<ConnectionDescriptor>) {
    let nodes = vec![
        one_node("a"),
        one_node("b"),
        add_node("sum"),
        relay_node("left"),
        relay_node("right"),
    ];
    let connections = vec![
        ConnectionDescriptor::new("a", "out", "sum", "a"),
        ConnectionDescriptor::new("b", "out", "sum", "b"),
        ConnectionDescriptor::new("sum", "sum", "left", "in"),
        ConnectionDescriptor::new("sum", "sum", "right", "in"),
    ];
    (nodes, connections)
}

/// A buffered event sink for assertions.
pub fn test_sink() -> Arc<BufferedSink> {
    Arc::new(BufferedSink::with_default_capacity())
}

/// Node logic that records the peak number of concurrent invocations.
pub struct ConcurrencyProbe {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    /// Highest number of invocations observed in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl NodeLogic for ConcurrencyProbe {
    fn execute<'a>(&'a self, _ctx: LogicContext, _inputs: Inputs) -> LogicFuture<'a> {
        Box::pin(async move {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Outputs::new())
        })
    }
}

/// Node logic that sleeps briefly, then emits the constant 1 on `out`.
pub struct SlowEmitLogic;

impl NodeLogic for SlowEmitLogic {
    fn execute<'a>(&'a self, _ctx: LogicContext, _inputs: Inputs) -> LogicFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            let mut outputs = Outputs::new();
            outputs.insert("out".to_string(), Value::int(1));
            Ok(outputs)
        })
    }
}

/// Node logic that cancels the shared run token, then succeeds.
pub struct CancelingLogic;

impl NodeLogic for CancelingLogic {
    fn execute<'a>(&'a self, ctx: LogicContext, _inputs: Inputs) -> LogicFuture<'a> {
        Box::pin(async move {
            ctx.cancel.cancel();
            Ok(Outputs::new())
        })
    }
}

/// Node logic that counts its invocations and cancels the run token on the
/// first one.
pub struct CountingCancelLogic {
    invocations: AtomicUsize,
}

impl CountingCancelLogic {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            invocations: AtomicUsize::new(0),
        })
    }

    /// How many times the logic actually ran.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl NodeLogic for CountingCancelLogic {
    fn execute<'a>(&'a self, ctx: LogicContext, _inputs: Inputs) -> LogicFuture<'a> {
        Box::pin(async move {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            ctx.cancel.cancel();
            Ok(Outputs::new())
        })
    }
}

/// Node logic that waits for cancellation before returning.
pub struct WaitForCancelLogic;

impl NodeLogic for WaitForCancelLogic {
    fn execute<'a>(&'a self, ctx: LogicContext, _inputs: Inputs) -> LogicFuture<'a> {
        Box::pin(async move {
            ctx.cancel.cancelled().await;
            let mut outputs = Outputs::new();
            outputs.insert("out".to_string(), Value::bool(true));
            Ok(outputs)
        })
    }
}
