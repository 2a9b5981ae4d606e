//! ConfGen Core - Bundle engine facade
//!
//! The [`BundleEngine`] is the single entry point consumers wire up:
//! it resolves target domains from a requirement, synthesizes one typed
//! config per domain, runs cross-domain optimization and validation, and
//! applies the result transactionally with journaled rollback.
//!
//! # Example
//!
//! ```no_run
//! use confgen_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), EngineError> {
//! let registry = Arc::new(InMemoryComponentRegistry::new());
//! let store = Arc::new(InMemoryConfigStore::new());
//! let journal = Arc::new(InMemoryJournal::new());
//!
//! let engine = BundleEngine::builder(registry, store, journal).build();
//! let req = RequirementSpec::new("configure high-performance AI content generation")
//!     .with_performance(PerformanceLevel::High);
//!
//! let outcome = engine.generate(&req, &GenerateOptions::default()).await?;
//! if outcome.validation.valid {
//!     engine.apply(&outcome.bundle, &ApplyOptions::default()).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod analyzer;
mod engine;
mod error;

pub use analyzer::{AnalyzerError, RequirementAnalyzer};
pub use engine::{
    ApplyInstructions, ApplyOptions, ApplyOutcome, BundleEngine, BundleEngineBuilder,
    GenerateOptions, GenerateOutcome,
};
pub use error::EngineError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything needed to wire and drive an engine
pub mod prelude {
    pub use crate::{
        ApplyOptions, ApplyOutcome, BundleEngine, EngineError, GenerateOptions, GenerateOutcome,
        RequirementAnalyzer,
    };
    pub use confgen_apply::{
        ApplyReport, FileJournal, InMemoryJournal, RollbackReport, SessionJournal,
    };
    pub use confgen_context::{
        ComponentDescriptor, ComponentId, ComponentRegistry, ConfigStore,
        InMemoryComponentRegistry, InMemoryConfigStore, SystemContext,
    };
    pub use confgen_domain::{
        Bundle, Domain, DomainConfig, PerformanceLevel, RequirementSpec, SecurityLevel,
        StorageMode,
    };
    pub use confgen_synth::{TargetSelection, ValidationResult};
}
