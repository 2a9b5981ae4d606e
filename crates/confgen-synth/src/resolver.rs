//! Target domain resolution
//!
//! Decides which domains a requirement touches. Explicit targets win; free
//! text falls back to keyword matching; no match at all selects everything
//! (configure everything rather than silently nothing).

use confgen_domain::{
    Domain, PerformanceLevel, RequirementHints, RequirementSpec, SecurityLevel, StorageMode,
};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Keywords owned by each domain
const KEYWORD_TABLE: &[(Domain, &[&str])] = &[
    (
        Domain::ComputeEngines,
        &[
            "ai", "engine", "engines", "llm", "model", "models", "generation", "generate",
            "content", "inference", "completion", "chat",
        ],
    ),
    (
        Domain::Storage,
        &[
            "storage", "database", "save", "store", "persist", "file", "files", "upload",
            "distributed",
        ],
    ),
    (Domain::Memory, &["memory", "cache", "caching", "remember"]),
    (
        Domain::Workflow,
        &["workflow", "workflows", "pipeline", "automation", "orchestration", "steps"],
    ),
    (
        Domain::Security,
        &[
            "security", "secure", "auth", "authentication", "encryption", "encrypt",
            "permission", "permissions", "token", "strict",
        ],
    ),
    (
        Domain::Network,
        &["network", "peer", "peers", "p2p", "sync", "node", "nodes"],
    ),
];

/// Token → owning domains, built once from the table
static KEYWORD_INDEX: Lazy<HashMap<&'static str, Vec<Domain>>> = Lazy::new(|| {
    let mut index: HashMap<&'static str, Vec<Domain>> = HashMap::new();
    for (domain, keywords) in KEYWORD_TABLE {
        for keyword in *keywords {
            index.entry(keyword).or_default().push(*domain);
        }
    }
    index
});

/// How the caller scoped the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetSelection {
    /// Resolve from the requirement text
    #[default]
    Auto,
    /// The "all" sentinel: every known domain
    All,
    /// Explicit domain list, returned verbatim
    Domains(Vec<Domain>),
}

/// Keyword-table target resolver
///
/// Resolution is a pure function of the input text and the static table:
/// the same input always yields the same domains, in registration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetResolver;

impl TargetResolver {
    /// Create a resolver
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve the domains a requirement touches
    #[must_use]
    pub fn resolve(&self, req: &RequirementSpec, selection: &TargetSelection) -> Vec<Domain> {
        self.resolve_with_hints(req, selection, None)
    }

    /// Resolve with optional analyzer hints unioned into the keyword matches
    #[must_use]
    pub fn resolve_with_hints(
        &self,
        req: &RequirementSpec,
        selection: &TargetSelection,
        hints: Option<&RequirementHints>,
    ) -> Vec<Domain> {
        match selection {
            TargetSelection::Domains(domains) if !domains.is_empty() => {
                tracing::debug!(?domains, "explicit targets, caller intent wins");
                let mut seen = HashSet::new();
                domains.iter().copied().filter(|d| seen.insert(*d)).collect()
            }
            TargetSelection::All => Domain::ALL.to_vec(),
            TargetSelection::Auto | TargetSelection::Domains(_) => {
                let tokens = tokenize(&req.search_text());
                let mut matched: HashSet<Domain> = tokens
                    .iter()
                    .filter_map(|t| KEYWORD_INDEX.get(t.as_str()))
                    .flatten()
                    .copied()
                    .collect();

                if let Some(hints) = hints {
                    matched.extend(hints.domains.iter().copied());
                }

                if matched.is_empty() {
                    // Safe default: configure everything
                    tracing::debug!("no keyword match, selecting all domains");
                    return Domain::ALL.to_vec();
                }

                // Stable registration order regardless of match order
                Domain::ALL.into_iter().filter(|d| matched.contains(d)).collect()
            }
        }
    }
}

/// Lowercased alphanumeric tokens
/// Tokens implying a lowered performance posture; checked before the raisers
/// so "low performance" reads as low
const LOW_PERFORMANCE_KEYWORDS: &[&str] = &["low", "slow", "minimal", "lightweight"];

/// Tokens implying a raised performance posture
const HIGH_PERFORMANCE_KEYWORDS: &[&str] =
    &["high", "fast", "quick", "performance", "performant", "throughput"];

/// Tokens implying a strict security posture
const STRICT_SECURITY_KEYWORDS: &[&str] = &["strict", "hardened", "lockdown"];

/// Tokens implying a distributed storage layout
const DISTRIBUTED_STORAGE_KEYWORDS: &[&str] = &["distributed", "replicated", "ipfs"];

/// Derive posture hints from the requirement's free text
///
/// "configure high-performance AI content generation" carries its posture in
/// the prompt alone, so the keyword pass mirrors the domain table: tokenize,
/// intersect with fixed posture lists. Fields the caller set explicitly are
/// untouched when the result is merged via
/// [`RequirementSpec::enriched_with`].
#[must_use]
pub fn infer_posture(req: &RequirementSpec) -> RequirementHints {
    let tokens = tokenize(&req.search_text());
    let has = |keywords: &[&str]| tokens.iter().any(|t| keywords.contains(&t.as_str()));

    RequirementHints {
        performance: if has(LOW_PERFORMANCE_KEYWORDS) {
            Some(PerformanceLevel::Low)
        } else if has(HIGH_PERFORMANCE_KEYWORDS) {
            Some(PerformanceLevel::High)
        } else {
            None
        },
        security_level: has(STRICT_SECURITY_KEYWORDS).then_some(SecurityLevel::Strict),
        storage_mode: has(DISTRIBUTED_STORAGE_KEYWORDS).then_some(StorageMode::Distributed),
        domains: Vec::new(),
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use confgen_domain::SecurityLevel;

    #[test]
    fn resolver_keyword_match_single_domain() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("configure high-performance AI content generation");

        let domains = resolver.resolve(&req, &TargetSelection::Auto);
        assert_eq!(domains, vec![Domain::ComputeEngines]);
    }

    #[test]
    fn resolver_multiple_domains_in_registration_order() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("sync files across peers with encryption");

        let domains = resolver.resolve(&req, &TargetSelection::Auto);
        assert_eq!(domains, vec![Domain::Storage, Domain::Security, Domain::Network]);
    }

    #[test]
    fn resolver_no_match_selects_all() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("make it nicer please");

        let domains = resolver.resolve(&req, &TargetSelection::Auto);
        assert_eq!(domains, Domain::ALL.to_vec());
    }

    #[test]
    fn resolver_explicit_targets_win() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("configure ai generation");

        let domains = resolver.resolve(
            &req,
            &TargetSelection::Domains(vec![Domain::Security, Domain::Network]),
        );
        assert_eq!(domains, vec![Domain::Security, Domain::Network]);
    }

    #[test]
    fn resolver_all_sentinel() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("anything");

        let domains = resolver.resolve(&req, &TargetSelection::All);
        assert_eq!(domains, Domain::ALL.to_vec());
    }

    #[test]
    fn resolver_empty_explicit_falls_back_to_auto() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("tune the workflow pipeline");

        let domains = resolver.resolve(&req, &TargetSelection::Domains(vec![]));
        assert_eq!(domains, vec![Domain::Workflow]);
    }

    #[test]
    fn resolver_structured_fields_match() {
        // No free text at all; the JSON-serialized structured form still matches
        let resolver = TargetResolver::new();
        let req = RequirementSpec::default().with_security_level(SecurityLevel::Strict);

        let domains = resolver.resolve(&req, &TargetSelection::Auto);
        assert_eq!(domains, vec![Domain::Security]);
    }

    #[test]
    fn resolver_is_deterministic() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("store ai models on the network");

        let first = resolver.resolve(&req, &TargetSelection::Auto);
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&req, &TargetSelection::Auto), first);
        }
    }

    #[test]
    fn resolver_hints_unioned_in_auto() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::new("tune caching");
        let hints = RequirementHints {
            domains: vec![Domain::Storage],
            ..RequirementHints::default()
        };

        let domains = resolver.resolve_with_hints(&req, &TargetSelection::Auto, Some(&hints));
        assert_eq!(domains, vec![Domain::Storage, Domain::Memory]);
    }

    #[test]
    fn posture_inferred_from_high_performance_text() {
        let req = RequirementSpec::new("configure high-performance AI content generation");

        let hints = infer_posture(&req);
        assert_eq!(hints.performance, Some(PerformanceLevel::High));
        assert_eq!(hints.security_level, None);
        assert_eq!(hints.storage_mode, None);
    }

    #[test]
    fn posture_low_wins_over_high_in_mixed_text() {
        let req = RequirementSpec::new("low performance background sync is fine");

        let hints = infer_posture(&req);
        assert_eq!(hints.performance, Some(PerformanceLevel::Low));
    }

    #[test]
    fn posture_strict_and_distributed_from_text() {
        let req = RequirementSpec::new("strict auth with distributed storage");

        let hints = infer_posture(&req);
        assert_eq!(hints.security_level, Some(SecurityLevel::Strict));
        assert_eq!(hints.storage_mode, Some(StorageMode::Distributed));
    }

    #[test]
    fn posture_plain_text_infers_nothing() {
        let hints = infer_posture(&RequirementSpec::new("tune caching"));
        assert_eq!(hints, RequirementHints::default());
    }

    #[test]
    fn resolver_explicit_duplicates_collapsed() {
        let resolver = TargetResolver::new();
        let req = RequirementSpec::default();

        let domains = resolver.resolve(
            &req,
            &TargetSelection::Domains(vec![Domain::Storage, Domain::Storage]),
        );
        assert_eq!(domains, vec![Domain::Storage]);
    }
}
