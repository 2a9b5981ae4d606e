//! Testing utilities for ConfGen workspace
//!
//! Shared fixtures: populated registries, canned contexts, requirements.

#![allow(missing_docs)]

use confgen_context::{
    ComponentDescriptor, InMemoryComponentRegistry, StorageInfo, SystemContext,
};
use confgen_domain::{RequirementSpec, SecurityLevel};
use serde_json::json;

/// Install a test-friendly tracing subscriber; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An OpenAI provider declaring text generation
pub fn openai_provider() -> ComponentDescriptor {
    ComponentDescriptor::new("openai").with_capability("text-generation")
}

/// An Anthropic provider declaring text generation
pub fn anthropic_provider() -> ComponentDescriptor {
    ComponentDescriptor::new("anthropic").with_capability("text-generation")
}

/// An active workflow engine
pub fn workflow_engine() -> ComponentDescriptor {
    ComponentDescriptor::new("workflow-engine").with_capability("workflow-execution")
}

/// A peer network with two known peers
pub fn peer_network() -> ComponentDescriptor {
    ComponentDescriptor::new("peer-network")
        .with_capability("peer-network")
        .with_config(json!({"peers": ["/dns4/peer-a/tcp/4001", "/dns4/peer-b/tcp/4001"]}))
}

/// An IPFS storage backend
pub fn ipfs_storage() -> ComponentDescriptor {
    ComponentDescriptor::new("ipfs-storage")
        .with_capability("storage-backend")
        .with_endpoint("ipfs")
}

/// A configured CDN edge
pub fn cdn_edge() -> ComponentDescriptor {
    ComponentDescriptor::new("cdn-edge").with_capability("cdn")
}

/// Every fixture component, all active
pub fn full_component_set() -> Vec<ComponentDescriptor> {
    vec![
        openai_provider(),
        anthropic_provider(),
        workflow_engine(),
        peer_network(),
        ipfs_storage(),
        cdn_edge(),
    ]
}

/// Registry populated with [`full_component_set`]
pub fn full_registry() -> InMemoryComponentRegistry {
    let registry = InMemoryComponentRegistry::new();
    for component in full_component_set() {
        registry.register(component);
    }
    registry
}

/// Context snapshot over [`full_component_set`], as the provider would build it
pub fn full_context() -> SystemContext {
    SystemContext::from_components(
        full_component_set(),
        StorageInfo {
            available_backends: vec!["local".to_string(), "ipfs".to_string()],
            cdn_configured: true,
        },
    )
}

/// Context with no components and only local storage
pub fn empty_context() -> SystemContext {
    SystemContext::from_components(
        Vec::new(),
        StorageInfo {
            available_backends: vec!["local".to_string()],
            cdn_configured: false,
        },
    )
}

/// The canonical high-performance generation prompt; posture lives in the
/// text alone
pub fn high_perf_generation_requirement() -> RequirementSpec {
    RequirementSpec::new("configure high-performance AI content generation")
}

/// A strict-security requirement touching auth
pub fn strict_security_requirement() -> RequirementSpec {
    RequirementSpec::new("secure authentication for the platform")
        .with_security_level(SecurityLevel::Strict)
}
