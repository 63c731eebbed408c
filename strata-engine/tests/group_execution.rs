//! Integration tests for recursive group execution.

mod common;

use std::sync::Arc;
use strata_core::prelude::*;
use strata_engine::{ExecutionOptions, Orchestrator};
use tokio_util::sync::CancellationToken;

use common::{add_node, init_tracing, one_node, test_provider, test_sink};

fn doubling_group(id: &str) -> GroupNodeData {
    // Body: x + x published back to boundary output y.
    GroupNodeData::new(
        NodeDescriptor::new(id)
            .with_input(SocketDescriptor::input("x", "int"))
            .with_output(SocketDescriptor::output("y", "int")),
        vec![add_node("body_add")],
        vec![
            ConnectionDescriptor::new(id, "x", "body_add", "a"),
            ConnectionDescriptor::new(id, "x", "body_add", "b"),
            ConnectionDescriptor::new("body_add", "sum", id, "y"),
        ],
    )
}

#[tokio::test]
async fn group_reads_inputs_and_publishes_outputs() {
    init_tracing();
    let group = doubling_group("double");
    let orchestrator = Orchestrator::new(Arc::new(test_provider())).with_group(group.clone());

    let nodes = vec![one_node("src"), group.node.clone()];
    let connections = vec![ConnectionDescriptor::new("src", "out", "double", "x")];
    let ctx = Arc::new(ExecutionContext::new());

    let summary = orchestrator
        .execute(&nodes, &connections, &ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.executed, 2);
    assert_eq!(
        ctx.output(&SocketRef::new("double", "y")),
        Some(Value::int(2))
    );
    assert_eq!(ctx.state("double"), NodeState::Completed);
}

#[tokio::test]
async fn nested_groups_compose() {
    // outer wraps inner, so the doubling happens two levels deep.
    let inner = doubling_group("inner");
    let outer = GroupNodeData::new(
        NodeDescriptor::new("outer")
            .with_input(SocketDescriptor::input("x", "int"))
            .with_output(SocketDescriptor::output("y", "int")),
        vec![inner.node.clone()],
        vec![
            ConnectionDescriptor::new("outer", "x", "inner", "x"),
            ConnectionDescriptor::new("inner", "y", "outer", "y"),
        ],
    );

    let orchestrator = Orchestrator::new(Arc::new(test_provider()))
        .with_group(inner)
        .with_group(outer.clone());

    let nodes = vec![one_node("src"), outer.node.clone()];
    let connections = vec![ConnectionDescriptor::new("src", "out", "outer", "x")];
    let ctx = Arc::new(ExecutionContext::new());

    orchestrator
        .execute(&nodes, &connections, &ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        ctx.output(&SocketRef::new("outer", "y")),
        Some(Value::int(2))
    );
}

#[tokio::test]
async fn group_body_failure_stays_inside_the_group() {
    // The body node fails; the group node itself still completes with no
    // boundary outputs.
    let group = GroupNodeData::new(
        NodeDescriptor::new("grp").with_output(SocketDescriptor::output("y", "int")),
        vec![NodeDescriptor::new("body").with_definition("always.fail")],
        vec![ConnectionDescriptor::new("body", "out", "grp", "y")],
    );
    let orchestrator = Orchestrator::new(Arc::new(test_provider())).with_group(group.clone());
    let ctx = Arc::new(ExecutionContext::new());

    let summary = orchestrator
        .execute(&[group.node.clone()], &[], &ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.executed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(ctx.state("grp"), NodeState::Completed);
    assert!(ctx.output(&SocketRef::new("grp", "y")).is_none());
}

#[tokio::test]
async fn group_events_carry_the_child_run_id() {
    let sink = test_sink();
    let group = doubling_group("double");
    let orchestrator = Orchestrator::new(Arc::new(test_provider()))
        .with_events(sink.clone())
        .with_group(group.clone());

    let ctx = Arc::new(ExecutionContext::new());
    orchestrator
        .execute(&[group.node.clone()], &[], &ctx, &CancellationToken::new())
        .await
        .unwrap();

    let body_events = sink.by_node("body_add");
    assert!(!body_events.is_empty());
    for event in &body_events {
        assert_ne!(event.run_id, ctx.run_id());
    }

    // The group node's own events belong to the parent run.
    let group_events = sink.by_node("double");
    assert!(!group_events.is_empty());
    for event in &group_events {
        assert_eq!(event.run_id, ctx.run_id());
    }
}

#[tokio::test]
async fn runaway_nesting_trips_the_depth_guard() {
    let ping = GroupNodeData::new(
        NodeDescriptor::new("ping"),
        vec![NodeDescriptor::new("pong")],
        vec![],
    );
    let pong = GroupNodeData::new(
        NodeDescriptor::new("pong"),
        vec![NodeDescriptor::new("ping")],
        vec![],
    );
    let orchestrator = Orchestrator::new(Arc::new(test_provider()))
        .with_group(ping)
        .with_group(pong)
        .with_options(ExecutionOptions::default().with_max_group_depth(8));

    let ctx = Arc::new(ExecutionContext::new());
    let err = orchestrator
        .execute(
            &[NodeDescriptor::new("ping")],
            &[],
            &ctx,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "E201");
}
