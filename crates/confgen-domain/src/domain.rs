//! Configuration domain names
//!
//! Every bundle key must be one of these; parsing an unknown name fails fast.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Domain errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Name does not match any known domain (programmer error, fail fast)
    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    /// Template registry has no entry for the domain
    #[error("no template registered for domain: {0}")]
    MissingTemplate(Domain),

    /// Config could not be encoded/decoded for the domain
    #[error("codec failure for domain {domain}: {reason}")]
    Codec {
        /// Affected domain
        domain: Domain,
        /// Underlying serde message
        reason: String,
    },
}

/// A configuration domain
///
/// Variant order is the registration order; resolution and bundles preserve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// AI compute engine providers, rate limits, retries
    ComputeEngines,
    /// Object/file storage backends
    Storage,
    /// Short-lived memory / caching layer
    Memory,
    /// Workflow execution limits
    Workflow,
    /// Authentication and encryption policy
    Security,
    /// Peer networking
    Network,
}

impl Domain {
    /// All domains, in registration order
    pub const ALL: [Domain; 6] = [
        Domain::ComputeEngines,
        Domain::Storage,
        Domain::Memory,
        Domain::Workflow,
        Domain::Security,
        Domain::Network,
    ];

    /// Stable string name (kebab-case)
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Domain::ComputeEngines => "compute-engines",
            Domain::Storage => "storage",
            Domain::Memory => "memory",
            Domain::Workflow => "workflow",
            Domain::Security => "security",
            Domain::Network => "network",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compute-engines" => Ok(Domain::ComputeEngines),
            "storage" => Ok(Domain::Storage),
            "memory" => Ok(Domain::Memory),
            "workflow" => Ok(Domain::Workflow),
            "security" => Ok(Domain::Security),
            "network" => Ok(Domain::Network),
            other => Err(DomainError::UnknownDomain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_round_trips_through_str() {
        for domain in Domain::ALL {
            assert_eq!(Domain::from_str(domain.as_str()).unwrap(), domain);
        }
    }

    #[test]
    fn domain_unknown_fails_fast() {
        let err = Domain::from_str("telemetry").unwrap_err();
        assert!(matches!(err, DomainError::UnknownDomain(name) if name == "telemetry"));
    }

    #[test]
    fn domain_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Domain::ComputeEngines).unwrap();
        assert_eq!(json, "\"compute-engines\"");

        let back: Domain = serde_json::from_str("\"compute-engines\"").unwrap();
        assert_eq!(back, Domain::ComputeEngines);
    }

    #[test]
    fn domain_all_is_registration_order() {
        assert_eq!(Domain::ALL[0], Domain::ComputeEngines);
        assert_eq!(Domain::ALL[5], Domain::Network);
    }
}
