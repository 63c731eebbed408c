//! In-process logic registry.

use std::collections::HashMap;
use std::sync::Arc;
use strata_core::error::{Result, StrataError};
use strata_core::provider::{Inputs, LogicContext, LogicFuture, LogicProvider, NodeLogic, Outputs};

/// A [`LogicProvider`] backed by an in-memory map of definition ids.
///
/// This is the simplest provider: logic is registered up front and looked
/// up by exact definition id. Registration is builder-style and happens
/// before the registry is shared with an orchestrator; the map is not
/// mutated afterwards.
#[derive(Default)]
pub struct RegistryProvider {
    entries: HashMap<String, Arc<dyn NodeLogic>>,
}

impl RegistryProvider {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register logic under a definition id, replacing any previous entry.
    pub fn register(mut self, definition_id: impl Into<String>, logic: Arc<dyn NodeLogic>) -> Self {
        self.entries.insert(definition_id.into(), logic);
        self
    }

    /// Register a synchronous closure as node logic.
    ///
    /// Convenient for built-in operations and tests that have no need for
    /// async work.
    pub fn register_fn<F>(self, definition_id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&LogicContext, &Inputs) -> Result<Outputs> + Send + Sync + 'static,
    {
        self.register(definition_id, Arc::new(FnLogic(f)))
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for RegistryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryProvider")
            .field("definitions", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LogicProvider for RegistryProvider {
    fn contains(&self, definition_id: &str) -> bool {
        self.entries.contains_key(definition_id)
    }

    fn execute<'a>(
        &'a self,
        ctx: LogicContext,
        definition_id: &'a str,
        inputs: Inputs,
    ) -> LogicFuture<'a> {
        match self.entries.get(definition_id) {
            Some(logic) => logic.execute(ctx, inputs),
            None => Box::pin(async move {
                Err(StrataError::LogicNotFound {
                    definition_id: definition_id.to_string(),
                })
            }),
        }
    }
}

struct FnLogic<F>(F);

impl<F> NodeLogic for FnLogic<F>
where
    F: Fn(&LogicContext, &Inputs) -> Result<Outputs> + Send + Sync + 'static,
{
    fn execute<'a>(&'a self, ctx: LogicContext, inputs: Inputs) -> LogicFuture<'a> {
        let result = (self.0)(&ctx, &inputs);
        Box::pin(async move { result })
    }
}
