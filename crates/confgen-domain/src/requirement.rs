//! Requirement inputs to synthesis
//!
//! A [`RequirementSpec`] is supplied by the caller and never mutated by the
//! pipeline; the optional analyzer collaborator produces [`RequirementHints`]
//! that fill fields the caller left unset.

use crate::domain::Domain;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Requested performance posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    /// Favor low resource use
    Low,
    /// Template defaults
    Balanced,
    /// Raise throughput knobs
    High,
}

/// Requested security posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// Template defaults
    Standard,
    /// Tighten expiry, rotation, and connection knobs
    Strict,
}

/// Requested storage layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Single local backend
    Local,
    /// Replicated/sharded secondary backend
    Distributed,
}

/// The input to a synthesis request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSpec {
    /// Free-text prompt
    #[serde(default)]
    pub prompt: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Performance posture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceLevel>,
    /// Security posture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_level: Option<SecurityLevel>,
    /// Storage layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_mode: Option<StorageMode>,
    /// Explicit per-domain overrides, deep-merged after requirement transforms
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub overrides: IndexMap<Domain, JsonValue>,
}

impl RequirementSpec {
    /// Create a spec from a free-text prompt
    #[inline]
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Set the description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the performance posture
    #[inline]
    #[must_use]
    pub fn with_performance(mut self, level: PerformanceLevel) -> Self {
        self.performance = Some(level);
        self
    }

    /// Set the security posture
    #[inline]
    #[must_use]
    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = Some(level);
        self
    }

    /// Set the storage layout
    #[inline]
    #[must_use]
    pub fn with_storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = Some(mode);
        self
    }

    /// Add an explicit per-domain override
    #[inline]
    #[must_use]
    pub fn with_override(mut self, domain: Domain, value: JsonValue) -> Self {
        self.overrides.insert(domain, value);
        self
    }

    /// Full text the target resolver tokenizes
    ///
    /// Combines prompt, description, and a JSON rendering of the structured
    /// fields so a spec like `{securityLevel: "strict"}` still resolves the
    /// security domain without free text.
    #[must_use]
    pub fn search_text(&self) -> String {
        let mut text = self.prompt.clone();
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(description);
        }
        if let Ok(structured) = serde_json::to_string(&StructuredFields {
            performance: self.performance,
            security_level: self.security_level,
            storage_mode: self.storage_mode,
        }) {
            text.push(' ');
            text.push_str(&structured);
        }
        text
    }

    /// Fill unset fields from analyzer hints; caller-set fields always win
    #[must_use]
    pub fn enriched_with(mut self, hints: &RequirementHints) -> Self {
        if self.performance.is_none() {
            self.performance = hints.performance;
        }
        if self.security_level.is_none() {
            self.security_level = hints.security_level;
        }
        if self.storage_mode.is_none() {
            self.storage_mode = hints.storage_mode;
        }
        self
    }
}

/// Serialized view of the structured fields, for resolver tokenization
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    performance: Option<PerformanceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    security_level: Option<SecurityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_mode: Option<StorageMode>,
}

/// Structured hints from the optional text-analysis collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementHints {
    /// Suggested performance posture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceLevel>,
    /// Suggested security posture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_level: Option<SecurityLevel>,
    /// Suggested storage layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_mode: Option<StorageMode>,
    /// Domains the analyzer believes are involved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<Domain>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_builder() {
        let spec = RequirementSpec::new("configure storage")
            .with_performance(PerformanceLevel::High)
            .with_override(Domain::Storage, json!({"maxObjectMb": 256}));

        assert_eq!(spec.prompt, "configure storage");
        assert_eq!(spec.performance, Some(PerformanceLevel::High));
        assert_eq!(spec.overrides[&Domain::Storage], json!({"maxObjectMb": 256}));
    }

    #[test]
    fn search_text_includes_structured_fields() {
        let spec = RequirementSpec::default().with_security_level(SecurityLevel::Strict);
        let text = spec.search_text();
        assert!(text.contains("securityLevel"));
        assert!(text.contains("strict"));
    }

    #[test]
    fn enriched_with_fills_only_unset() {
        let spec = RequirementSpec::new("x").with_performance(PerformanceLevel::Low);
        let hints = RequirementHints {
            performance: Some(PerformanceLevel::High),
            security_level: Some(SecurityLevel::Strict),
            ..RequirementHints::default()
        };

        let enriched = spec.enriched_with(&hints);
        // Caller's setting wins
        assert_eq!(enriched.performance, Some(PerformanceLevel::Low));
        // Unset field filled
        assert_eq!(enriched.security_level, Some(SecurityLevel::Strict));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = RequirementSpec::new("high performance ai")
            .with_storage_mode(StorageMode::Distributed)
            .with_override(Domain::Network, json!({"maxPeers": 5}));

        let json = serde_json::to_string(&spec).unwrap();
        let back: RequirementSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}
