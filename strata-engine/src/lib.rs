//! Strata execution engine.
//!
//! Plans graph snapshots into deterministic layered execution plans and
//! drives them asynchronously: bounded parallelism within layers, strict
//! barriers between them, cooperative cancellation, node-scoped failure
//! isolation, and recursive group execution.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_core::prelude::*;
//! use strata_engine::{Orchestrator, RegistryProvider};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let provider = Arc::new(RegistryProvider::new().register_fn("echo", |_, inputs| {
//!     Ok(inputs.clone())
//! }));
//! let orchestrator = Orchestrator::new(provider);
//!
//! let nodes = vec![NodeDescriptor::new("n")
//!     .with_definition("echo")
//!     .with_input(SocketDescriptor::input("msg", "string").with_value("hi"))];
//! let ctx = Arc::new(ExecutionContext::new());
//!
//! let summary = orchestrator
//!     .execute(&nodes, &[], &ctx, &CancellationToken::new())
//!     .await?;
//! assert_eq!(summary.executed, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod options;
pub mod orchestrator;
pub mod planner;
pub mod provider;
pub mod resolve;

pub use options::{ExecutionMode, ExecutionOptions};
pub use orchestrator::{Orchestrator, RunStatus, RunSummary};
pub use planner::{build_plan, ExecutionLayer, ExecutionPlan};
pub use provider::{CompositeProvider, RegistryProvider};
