//! ConfGen Context - Live platform state snapshots
//!
//! Collects the state of all registered platform components (which are active,
//! their declared capabilities, their stored configuration) into an immutable
//! [`SystemContext`] that the synthesis pipeline reads.
//!
//! # Core Concepts
//!
//! - [`ComponentRegistry`]: explicit registration of components and their
//!   capabilities at startup (no reflection, no class probing)
//! - [`ConfigStore`]: key-value seam to the external configuration store
//! - [`ContextProvider`]: collects a snapshot, cached with a short TTL
//!
//! # Example
//!
//! ```rust,ignore
//! use confgen_context::{ContextProvider, InMemoryComponentRegistry, InMemoryConfigStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(InMemoryComponentRegistry::new());
//! let store = Arc::new(InMemoryConfigStore::new());
//! let provider = ContextProvider::new(registry, store);
//!
//! let ctx = provider.context().await?;
//! println!("{} components active", ctx.stats().components_active);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod provider;
mod registry;
mod store;
mod types;

pub use provider::{ContextError, ContextProvider, DEFAULT_CONTEXT_TTL};
pub use registry::{ComponentRegistry, InMemoryComponentRegistry, RegistryError};
pub use store::{ConfigStore, InMemoryConfigStore, StoreError};
pub use types::{
    CapabilityDescriptor, ComponentDescriptor, ComponentId, ContextStats, StorageInfo,
    SystemContext,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
