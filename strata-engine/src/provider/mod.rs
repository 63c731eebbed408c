//! Node logic provider implementations.

mod composite;
mod registry;

pub use composite::CompositeProvider;
pub use registry::RegistryProvider;
