//! Per-domain configuration synthesis
//!
//! Five stages, in strict order, each allowed to overwrite the previous:
//! template copy, requirement transforms, explicit overrides, context
//! adjustments, registered hooks.

use confgen_context::SystemContext;
use confgen_domain::{
    Domain, DomainConfig, DomainError, PerformanceLevel, RequirementSpec, SecurityLevel,
    StorageMode, TemplateRegistry, CAP_TEXT_GENERATION,
};
use std::sync::Arc;

/// Maximum bootstrap peers seeded from the context
const BOOTSTRAP_PEER_LIMIT: usize = 5;

/// A registered transform, run after the built-in stages
pub type TransformHook = Arc<dyn Fn(DomainConfig, &RequirementSpec) -> DomainConfig + Send + Sync>;

/// Ordered registry of transform hooks
///
/// Hooks run in registration order; a hook registered for a domain only runs
/// for that domain, a global hook runs for every domain.
#[derive(Clone, Default)]
pub struct TransformHookRegistry {
    hooks: Vec<(Option<Domain>, TransformHook)>,
}

impl std::fmt::Debug for TransformHookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformHookRegistry")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl TransformHookRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for one domain
    pub fn register(&mut self, domain: Domain, hook: TransformHook) {
        self.hooks.push((Some(domain), hook));
    }

    /// Register a hook that runs for every domain
    pub fn register_global(&mut self, hook: TransformHook) {
        self.hooks.push((None, hook));
    }

    /// Number of registered hooks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run the matching hooks, in registration order
    #[must_use]
    fn apply(&self, config: DomainConfig, req: &RequirementSpec) -> DomainConfig {
        let domain = config.domain();
        self.hooks
            .iter()
            .filter(|(scope, _)| scope.is_none() || *scope == Some(domain))
            .fold(config, |config, (_, hook)| hook(config, req))
    }
}

/// Per-domain configuration synthesizer
#[derive(Debug, Clone)]
pub struct Synthesizer {
    templates: TemplateRegistry,
    hooks: TransformHookRegistry,
}

impl Synthesizer {
    /// Create a synthesizer over a template registry
    #[inline]
    #[must_use]
    pub fn new(templates: TemplateRegistry) -> Self {
        Self {
            templates,
            hooks: TransformHookRegistry::new(),
        }
    }

    /// Attach a hook registry
    #[inline]
    #[must_use]
    pub fn with_hooks(mut self, hooks: TransformHookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// The template registry in use
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Synthesize one domain's config
    ///
    /// # Errors
    /// Fails fast on a missing template ([`DomainError::MissingTemplate`]) or
    /// an override that breaks the domain's shape ([`DomainError::Codec`]).
    pub fn synthesize(
        &self,
        domain: Domain,
        req: &RequirementSpec,
        ctx: &SystemContext,
    ) -> Result<DomainConfig, DomainError> {
        // Stage 1: template copy
        let mut config = self.templates.instantiate(domain)?;
        tracing::debug!(%domain, "synthesis: template instantiated");

        // Stage 2: requirement-keyed transforms
        config = apply_requirements(config, req);

        // Stage 3: explicit per-domain overrides, deep-merged
        if let Some(overlay) = req.overrides.get(&domain) {
            config = config.merge_value(overlay)?;
            tracing::debug!(%domain, "synthesis: overrides merged");
        }

        // Stage 4: context-aware adjustments
        config = apply_context(config, ctx);

        // Stage 5: registered hooks, in order
        config = self.hooks.apply(config, req);

        Ok(config)
    }
}

/// Stage 2: map structured requirement fields onto domain knobs
fn apply_requirements(config: DomainConfig, req: &RequirementSpec) -> DomainConfig {
    let mut config = config;

    match req.performance {
        Some(PerformanceLevel::High) => match &mut config {
            DomainConfig::ComputeEngines(c) => {
                c.rate_limiting.requests_per_minute = 120;
                c.rate_limiting.burst_size = 20;
                c.retry.max_attempts = 5;
            }
            DomainConfig::Workflow(c) => {
                c.max_concurrent_executions = 10;
                c.default_timeout_secs = 600;
            }
            DomainConfig::Memory(c) => {
                c.max_entries = 50_000;
            }
            DomainConfig::Storage(c) => {
                c.max_object_mb = 256;
            }
            DomainConfig::Network(c) => {
                c.max_peers = 50;
            }
            DomainConfig::Security(_) => {}
        },
        Some(PerformanceLevel::Low) => match &mut config {
            DomainConfig::ComputeEngines(c) => {
                c.rate_limiting.requests_per_minute = 30;
                c.rate_limiting.burst_size = 5;
            }
            DomainConfig::Workflow(c) => {
                c.max_concurrent_executions = 2;
            }
            DomainConfig::Memory(c) => {
                c.max_entries = 2_000;
            }
            _ => {}
        },
        Some(PerformanceLevel::Balanced) | None => {}
    }

    if req.security_level == Some(SecurityLevel::Strict) {
        match &mut config {
            DomainConfig::Security(c) => {
                c.authentication.jwt_expiry = 3_600;
                c.encryption.algorithm = Some("aes-256-gcm".to_string());
                c.encryption.key_rotation_days = 30;
                c.max_sessions_per_user = 3;
            }
            DomainConfig::Network(c) => {
                c.encryption = true;
                c.max_peers = c.max_peers.min(10);
            }
            _ => {}
        }
    }

    if req.storage_mode == Some(StorageMode::Distributed) {
        match &mut config {
            DomainConfig::Storage(c) => {
                c.secondary_backend = Some("ipfs".to_string());
                c.replication.enabled = true;
                c.sharding_enabled = true;
            }
            DomainConfig::Memory(c) => {
                c.storage_backend = "distributed".to_string();
            }
            _ => {}
        }
    }

    config
}

/// Stage 4: adjust to what the live platform actually offers
fn apply_context(config: DomainConfig, ctx: &SystemContext) -> DomainConfig {
    let mut config = config;

    match &mut config {
        DomainConfig::ComputeEngines(c) => {
            let providers = ctx.providers_of(CAP_TEXT_GENERATION);
            let active = |name: &str| providers.iter().any(|id| id.as_str() == name);

            if !active(&c.default_provider) {
                if let Some(fallback) = c.fallback_provider.clone() {
                    if active(&fallback) {
                        tracing::debug!(
                            from = %c.default_provider,
                            to = %fallback,
                            "synthesis: default provider inactive, swapping to fallback"
                        );
                        c.fallback_provider = Some(std::mem::replace(&mut c.default_provider, fallback));
                    }
                }
            }
        }
        DomainConfig::Storage(c) => {
            let available = &ctx.storage().available_backends;
            if !available.contains(&c.primary_backend) {
                if let Some(first) = available.first() {
                    tracing::debug!(
                        from = %c.primary_backend,
                        to = %first,
                        "synthesis: primary backend unavailable, swapping"
                    );
                    c.primary_backend = first.clone();
                }
            }
            if ctx.storage().cdn_configured {
                c.cdn_offload = true;
            }
        }
        DomainConfig::Network(c) => {
            if c.bootstrap_peers.is_empty() {
                c.bootstrap_peers = ctx
                    .known_peers()
                    .into_iter()
                    .take(BOOTSTRAP_PEER_LIMIT)
                    .collect();
            }
        }
        DomainConfig::Memory(_) | DomainConfig::Workflow(_) | DomainConfig::Security(_) => {}
    }

    config
}
