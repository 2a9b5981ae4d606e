//! Validation issues and per-domain context checks
//!
//! Per-domain rules live here next to the types they judge; cross-domain
//! rules live in the bundle validator. Severity `Error` blocks apply,
//! `Warning` and `Info` do not.

use crate::config::DomainConfig;
use crate::domain::Domain;
use confgen_context::{ComponentId, SystemContext};
use serde::{Deserialize, Serialize};

/// Component id of the workflow execution engine
pub const COMPONENT_WORKFLOW_ENGINE: &str = "workflow-engine";

/// Component id of the peer-network subsystem
pub const COMPONENT_PEER_NETWORK: &str = "peer-network";

/// Capability declared by compute engine providers
pub const CAP_TEXT_GENERATION: &str = "text-generation";

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Degraded but functional
    Warning,
    /// Cannot function; blocks apply
    Error,
}

/// Issue classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// Referenced provider is not available in the context
    ProviderUnavailable,
    /// Referenced storage backend is not available in the context
    BackendUnavailable,
    /// A required component is missing or inactive
    ComponentInactive,
    /// A config in one domain needs a config in another domain
    MissingDependency,
    /// Encryption settings disagree across domains
    EncryptionMismatch,
    /// A value is outside its usable range
    InvalidValue,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Domain the finding belongs to
    pub domain: Domain,
    /// Classification
    pub kind: IssueKind,
    /// Human-readable message
    pub message: String,
    /// Severity
    pub severity: Severity,
}

impl ValidationIssue {
    /// Create an info finding
    #[inline]
    #[must_use]
    pub fn info(domain: Domain, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            domain,
            kind,
            message: message.into(),
            severity: Severity::Info,
        }
    }

    /// Create a warning finding
    #[inline]
    #[must_use]
    pub fn warning(domain: Domain, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            domain,
            kind,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// Create an error finding
    #[inline]
    #[must_use]
    pub fn error(domain: Domain, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            domain,
            kind,
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

impl DomainConfig {
    /// Check this config against the live context
    ///
    /// Per-domain rules only; cross-domain rules belong to the bundle
    /// validator. Adding issues is monotone: a rule never removes or
    /// downgrades another rule's finding.
    #[must_use]
    pub fn validate(&self, ctx: &SystemContext) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        match self {
            DomainConfig::ComputeEngines(config) => {
                let providers = ctx.providers_of(CAP_TEXT_GENERATION);
                let available = |name: &str| providers.iter().any(|id| id.as_str() == name);

                if !available(&config.default_provider) {
                    issues.push(ValidationIssue::warning(
                        Domain::ComputeEngines,
                        IssueKind::ProviderUnavailable,
                        format!(
                            "default provider '{}' is not available in the current context",
                            config.default_provider
                        ),
                    ));
                }
                if let Some(fallback) = &config.fallback_provider {
                    if !available(fallback) {
                        issues.push(ValidationIssue::info(
                            Domain::ComputeEngines,
                            IssueKind::ProviderUnavailable,
                            format!("fallback provider '{fallback}' is not available"),
                        ));
                    }
                }
            }
            DomainConfig::Storage(config) => {
                let backends = &ctx.storage().available_backends;
                if !backends.contains(&config.primary_backend) {
                    issues.push(ValidationIssue::warning(
                        Domain::Storage,
                        IssueKind::BackendUnavailable,
                        format!(
                            "primary backend '{}' is not available in the current context",
                            config.primary_backend
                        ),
                    ));
                }
                if let Some(secondary) = &config.secondary_backend {
                    if !backends.contains(secondary) {
                        issues.push(ValidationIssue::info(
                            Domain::Storage,
                            IssueKind::BackendUnavailable,
                            format!("secondary backend '{secondary}' is not available"),
                        ));
                    }
                }
            }
            DomainConfig::Memory(config) => {
                if config.max_entries == 0 {
                    issues.push(ValidationIssue::error(
                        Domain::Memory,
                        IssueKind::InvalidValue,
                        "maxEntries must be greater than zero",
                    ));
                }
            }
            DomainConfig::Workflow(config) => {
                if config.max_concurrent_executions == 0 {
                    issues.push(ValidationIssue::error(
                        Domain::Workflow,
                        IssueKind::InvalidValue,
                        "maxConcurrentExecutions must be greater than zero",
                    ));
                }
            }
            DomainConfig::Security(config) => {
                if config.encryption.algorithm.is_none() {
                    issues.push(ValidationIssue::info(
                        Domain::Security,
                        IssueKind::EncryptionMismatch,
                        "encryption at rest is disabled",
                    ));
                }
            }
            DomainConfig::Network(_) => {
                if !ctx.is_active(&ComponentId::new(COMPONENT_PEER_NETWORK)) {
                    issues.push(ValidationIssue::error(
                        Domain::Network,
                        IssueKind::ComponentInactive,
                        format!("component '{COMPONENT_PEER_NETWORK}' is not active"),
                    ));
                }
            }
        }

        issues
    }
}
