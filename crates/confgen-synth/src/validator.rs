//! Bundle validation
//!
//! Per-domain checks delegate to each config; cross-domain checks live here.
//! A bundle is valid iff no finding anywhere has severity `Error`.

use confgen_context::{ComponentId, SystemContext};
use confgen_domain::{
    Bundle, Domain, DomainConfig, IssueKind, Severity, ValidationIssue, COMPONENT_WORKFLOW_ENGINE,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Outcome of validating a bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no issue has severity `Error`
    pub valid: bool,
    /// Findings per domain; domains without findings are omitted
    pub issues: IndexMap<Domain, Vec<ValidationIssue>>,
}

impl ValidationResult {
    /// Total findings across all domains
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    /// Iterate over every finding
    pub fn all_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.values().flatten()
    }

    /// Findings with severity `Error`
    #[must_use]
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.all_issues().filter(|i| i.severity == Severity::Error).collect()
    }
}

/// Validates bundles against the live context
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleValidator;

impl BundleValidator {
    /// Create a validator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run all per-domain and cross-domain checks
    #[must_use]
    pub fn validate(&self, bundle: &Bundle, ctx: &SystemContext) -> ValidationResult {
        let mut issues: IndexMap<Domain, Vec<ValidationIssue>> = IndexMap::new();

        for (domain, config) in bundle.iter() {
            let found = config.validate(ctx);
            if !found.is_empty() {
                issues.entry(domain).or_default().extend(found);
            }
        }

        for issue in cross_domain_issues(bundle, ctx) {
            issues.entry(issue.domain).or_default().push(issue);
        }

        let valid = issues.values().flatten().all(|i| i.severity != Severity::Error);
        if !valid {
            tracing::warn!(
                errors = issues.values().flatten().filter(|i| i.severity == Severity::Error).count(),
                "bundle validation failed"
            );
        }

        ValidationResult { valid, issues }
    }
}

/// Rules that look at more than one domain at once
fn cross_domain_issues(bundle: &Bundle, ctx: &SystemContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // A workflow config is useless without the execution engine.
    if bundle.contains(Domain::Workflow)
        && !ctx.is_active(&ComponentId::new(COMPONENT_WORKFLOW_ENGINE))
    {
        issues.push(ValidationIssue::error(
            Domain::Workflow,
            IssueKind::MissingDependency,
            format!("component '{COMPONENT_WORKFLOW_ENGINE}' must be active for workflow configuration"),
        ));
    }

    // Wire encryption needs key material from the security domain.
    let network_encrypted = bundle
        .get(Domain::Network)
        .and_then(DomainConfig::as_network)
        .is_some_and(|n| n.encryption);
    if network_encrypted {
        let security_encrypted = bundle
            .get(Domain::Security)
            .and_then(DomainConfig::as_security)
            .is_some_and(|s| s.encryption.algorithm.is_some());
        if !security_encrypted {
            issues.push(ValidationIssue::warning(
                Domain::Network,
                IssueKind::EncryptionMismatch,
                "network encryption is enabled but no matching security encryption configuration is present",
            ));
        }
    }

    issues
}
