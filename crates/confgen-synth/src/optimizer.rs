//! Cross-domain bundle optimization
//!
//! A small, explicit rule set run after all domains are synthesized. Every
//! rule is idempotent and a no-op when either side of the interaction is
//! absent from the bundle.

use confgen_context::SystemContext;
use confgen_domain::{Bundle, Domain, DomainConfig};

/// Backends that count as distributed for the memory derivation rule
const DISTRIBUTED_BACKENDS: &[&str] = &["ipfs", "arweave", "distributed"];

/// Cross-domain consistency rules
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleOptimizer;

impl BundleOptimizer {
    /// Create an optimizer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Apply all rules; running twice yields the same bundle
    ///
    /// The current rule set relates bundle members to each other and does
    /// not consult the context.
    #[must_use]
    pub fn optimize(&self, mut bundle: Bundle, _ctx: &SystemContext) -> Bundle {
        self.align_rate_limit_with_concurrency(&mut bundle);
        self.force_network_encryption(&mut bundle);
        self.derive_memory_backend(&mut bundle);
        bundle
    }

    /// Workflow fan-out must fit inside the compute rate limit
    fn align_rate_limit_with_concurrency(&self, bundle: &mut Bundle) {
        let Some(max_concurrent) = bundle
            .get(Domain::Workflow)
            .and_then(DomainConfig::as_workflow)
            .map(|w| w.max_concurrent_executions)
        else {
            return;
        };

        if let Some(DomainConfig::ComputeEngines(compute)) = bundle.get_mut(Domain::ComputeEngines)
        {
            // Widen before multiplying; caller overrides can push the
            // concurrency far beyond u32 * 15.
            let rpm = u64::from(compute.rate_limiting.requests_per_minute);
            let demand = u64::from(max_concurrent).saturating_mul(10);
            if demand > rpm {
                let raised = u64::from(max_concurrent)
                    .saturating_mul(15)
                    .min(u64::from(u32::MAX)) as u32;
                tracing::debug!(rpm, raised, "optimizer: raising compute rate limit");
                compute.rate_limiting.requests_per_minute = raised;
            }
        }
    }

    /// Encryption at rest implies encryption on the wire
    fn force_network_encryption(&self, bundle: &mut Bundle) {
        let encrypted = bundle
            .get(Domain::Security)
            .and_then(DomainConfig::as_security)
            .is_some_and(|s| s.encryption.algorithm.is_some());
        if !encrypted {
            return;
        }

        if let Some(DomainConfig::Network(network)) = bundle.get_mut(Domain::Network) {
            network.encryption = true;
        }
    }

    /// Memory backing store follows the storage primary backend
    fn derive_memory_backend(&self, bundle: &mut Bundle) {
        let Some(primary) = bundle
            .get(Domain::Storage)
            .and_then(DomainConfig::as_storage)
            .map(|s| s.primary_backend.clone())
        else {
            return;
        };

        if let Some(DomainConfig::Memory(memory)) = bundle.get_mut(Domain::Memory) {
            memory.storage_backend = if DISTRIBUTED_BACKENDS.contains(&primary.as_str()) {
                "distributed".to_string()
            } else {
                "local".to_string()
            };
        }
    }
}
