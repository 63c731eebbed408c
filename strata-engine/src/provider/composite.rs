//! Provider composition.

use std::sync::Arc;
use strata_core::error::StrataError;
use strata_core::provider::{Inputs, LogicContext, LogicFuture, LogicProvider};

/// A [`LogicProvider`] that dispatches over an ordered list of providers.
///
/// The first provider claiming a definition id wins, so earlier providers
/// shadow later ones. Useful for layering built-in operations under
/// application-supplied logic.
#[derive(Default, Clone)]
pub struct CompositeProvider {
    providers: Vec<Arc<dyn LogicProvider>>,
}

impl CompositeProvider {
    /// Create an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider at the lowest priority.
    pub fn with(mut self, provider: Arc<dyn LogicProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Number of composed providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if the composite holds no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for CompositeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl LogicProvider for CompositeProvider {
    fn contains(&self, definition_id: &str) -> bool {
        self.providers.iter().any(|p| p.contains(definition_id))
    }

    fn execute<'a>(
        &'a self,
        ctx: LogicContext,
        definition_id: &'a str,
        inputs: Inputs,
    ) -> LogicFuture<'a> {
        match self.providers.iter().find(|p| p.contains(definition_id)) {
            Some(provider) => provider.execute(ctx, definition_id, inputs),
            None => Box::pin(async move {
                Err(StrataError::LogicNotFound {
                    definition_id: definition_id.to_string(),
                })
            }),
        }
    }
}
