//! ConfGen Domain - Typed configuration model
//!
//! Defines the configuration domains the engine can synthesize, one typed
//! struct per domain behind the [`DomainConfig`] tagged union, plus:
//!
//! - [`Bundle`]: an ordered map of per-domain configs with JSON/YAML
//!   round-trip and a blake3 fingerprint over canonical JSON
//! - [`TemplateRegistry`]: versioned process-wide defaults per domain
//! - [`RequirementSpec`]: the immutable synthesis input
//! - [`ValidationIssue`]: severity-tagged findings from context checks
//!
//! An unknown domain name is a programmer error and fails fast with
//! [`DomainError::UnknownDomain`]; it is never reported as a validation issue.

#![warn(unreachable_pub)]

mod bundle;
mod config;
mod configs;
mod domain;
mod requirement;
mod templates;
mod validation;

pub use bundle::{Bundle, BundleCodecError};
pub use config::{canonical_json, merge_json, DomainConfig};
pub use configs::{
    AuthSettings, ComputeEnginesConfig, EncryptionSettings, MemoryConfig, NetworkConfig,
    RateLimit, ReplicationSettings, RetryPolicy, SecurityConfig, StorageConfig, WorkflowConfig,
};
pub use domain::{Domain, DomainError};
pub use requirement::{
    PerformanceLevel, RequirementHints, RequirementSpec, SecurityLevel, StorageMode,
};
pub use templates::{Template, TemplateRegistry};
pub use validation::{
    IssueKind, Severity, ValidationIssue, CAP_TEXT_GENERATION, COMPONENT_PEER_NETWORK,
    COMPONENT_WORKFLOW_ENGINE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
