//! Versioned configuration templates
//!
//! One canonical registry of default configs, read-only at run time. A bundle
//! referencing a domain without a template is a synthesis bug and fails fast.

use crate::config::DomainConfig;
use crate::configs::{
    ComputeEnginesConfig, MemoryConfig, NetworkConfig, SecurityConfig, StorageConfig,
    WorkflowConfig,
};
use crate::domain::{Domain, DomainError};
use indexmap::IndexMap;

/// A named, versioned default configuration for one domain
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Template version
    pub version: String,
    /// Default configuration
    pub config: DomainConfig,
}

impl Template {
    /// Create a template
    #[inline]
    #[must_use]
    pub fn new(version: impl Into<String>, config: DomainConfig) -> Self {
        Self {
            version: version.into(),
            config,
        }
    }
}

/// Registry of per-domain templates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRegistry {
    templates: IndexMap<Domain, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in defaults for every domain
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Template::new(
            "1.0",
            DomainConfig::ComputeEngines(ComputeEnginesConfig::default()),
        ));
        registry.register(Template::new("1.0", DomainConfig::Storage(StorageConfig::default())));
        registry.register(Template::new("1.0", DomainConfig::Memory(MemoryConfig::default())));
        registry.register(Template::new("1.0", DomainConfig::Workflow(WorkflowConfig::default())));
        registry.register(Template::new("1.0", DomainConfig::Security(SecurityConfig::default())));
        registry.register(Template::new("1.0", DomainConfig::Network(NetworkConfig::default())));
        registry
    }

    /// Register (or replace) a template; keyed by the config's own domain
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.config.domain(), template);
    }

    /// Look up a template
    ///
    /// # Errors
    /// Returns [`DomainError::MissingTemplate`] when no template is registered.
    pub fn get(&self, domain: Domain) -> Result<&Template, DomainError> {
        self.templates.get(&domain).ok_or(DomainError::MissingTemplate(domain))
    }

    /// Deep copy of a domain's default config (synthesis stage 1)
    ///
    /// # Errors
    /// Returns [`DomainError::MissingTemplate`] when no template is registered.
    pub fn instantiate(&self, domain: Domain) -> Result<DomainConfig, DomainError> {
        Ok(self.get(domain)?.config.clone())
    }

    /// Domains with a registered template, in registration order
    #[must_use]
    pub fn domains(&self) -> Vec<Domain> {
        self.templates.keys().copied().collect()
    }

    /// Number of registered templates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
