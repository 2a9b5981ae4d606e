//! Bundle engine facade
//!
//! Wires the context provider, target resolver, synthesizer, optimizer,
//! validator, and transactional applier behind one command surface.
//! Every collaborator is injected explicitly; the engine holds no global
//! state beyond what its parts own.

use crate::analyzer::RequirementAnalyzer;
use crate::error::EngineError;
use confgen_apply::{
    config_key, ApplyOperation, ApplyReport, BundleDiff, RollbackPlan, RollbackReport,
    RollbackStep, SessionJournal, Snapshot, TransactionalApplier,
};
use confgen_context::{ComponentRegistry, ConfigStore, ContextProvider};
use confgen_domain::{Bundle, RequirementHints, RequirementSpec, TemplateRegistry};
use confgen_synth::{
    infer_posture, BundleOptimizer, BundleValidator, Synthesizer, TargetResolver, TargetSelection,
    TransformHookRegistry, ValidationResult,
};
use std::sync::Arc;
use std::time::Duration;
use ulid::Ulid;

/// Knobs for [`BundleEngine::generate`]
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Which domains to synthesize
    pub selection: TargetSelection,
    /// Run the cross-domain optimizer over the synthesized bundle
    pub optimize: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            selection: TargetSelection::Auto,
            optimize: true,
        }
    }
}

/// Knobs for [`BundleEngine::apply`]
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Diff and validate only; no writes, no session
    pub dry_run: bool,
    /// Apply even when validation reports errors
    pub force: bool,
    /// Execution id to apply under; generated when absent
    pub execution_id: Option<String>,
}

/// Everything a caller needs to apply a generated bundle later
#[derive(Debug, Clone)]
pub struct ApplyInstructions {
    /// Execution id reserved for this bundle
    pub execution_id: String,
    /// blake3 fingerprint of the bundle's canonical JSON
    pub fingerprint: String,
    /// Pending changes against the live store
    pub diff: BundleDiff,
}

/// Result of [`BundleEngine::generate`]
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    /// Synthesized (and optionally optimized) bundle
    pub bundle: Bundle,
    /// Validation findings; the bundle is returned even when invalid
    pub validation: ValidationResult,
    /// Apply handoff: execution id, fingerprint, diff
    pub apply_instructions: ApplyInstructions,
    /// Restore plan built from the store's current values
    pub rollback_plan: RollbackPlan,
}

/// Result of [`BundleEngine::apply`]
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// Execution id the apply ran (or would run) under
    pub execution_id: String,
    /// Pre-apply validation findings
    pub validation: ValidationResult,
    /// Changes against the store at apply time
    pub diff: BundleDiff,
    /// Per-domain outcome; `None` for a dry run
    pub report: Option<ApplyReport>,
}

impl ApplyOutcome {
    /// True when some domains applied and some failed
    #[inline]
    #[must_use]
    pub fn partial_failure(&self) -> bool {
        self.report.as_ref().is_some_and(|r| r.partial_failure)
    }

    /// Turn a partial failure into [`EngineError::ApplyPartialFailure`]
    ///
    /// For callers that treat a half-applied bundle as fatal rather than
    /// inspecting the report.
    pub fn require_complete(self) -> Result<Self, EngineError> {
        match &self.report {
            Some(report) if report.partial_failure => Err(EngineError::ApplyPartialFailure {
                execution_id: self.execution_id.clone(),
                failed: report.summary.failed,
                total: report.summary.total,
            }),
            _ => Ok(self),
        }
    }
}

/// Builder for [`BundleEngine`]
pub struct BundleEngineBuilder {
    registry: Arc<dyn ComponentRegistry>,
    store: Arc<dyn ConfigStore>,
    journal: Arc<dyn SessionJournal>,
    templates: TemplateRegistry,
    hooks: TransformHookRegistry,
    analyzer: Option<Arc<dyn RequirementAnalyzer>>,
    context_ttl: Option<Duration>,
}

impl BundleEngineBuilder {
    /// Builder over the three required collaborators
    #[must_use]
    pub fn new(
        registry: Arc<dyn ComponentRegistry>,
        store: Arc<dyn ConfigStore>,
        journal: Arc<dyn SessionJournal>,
    ) -> Self {
        Self {
            registry,
            store,
            journal,
            templates: TemplateRegistry::with_defaults(),
            hooks: TransformHookRegistry::new(),
            analyzer: None,
            context_ttl: None,
        }
    }

    /// Replace the default template registry
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Install transform hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: TransformHookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Install a requirement analyzer
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Arc<dyn RequirementAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Override the context snapshot TTL
    #[must_use]
    pub fn with_context_ttl(mut self, ttl: Duration) -> Self {
        self.context_ttl = Some(ttl);
        self
    }

    /// Assemble the engine
    #[must_use]
    pub fn build(self) -> BundleEngine {
        let provider = match self.context_ttl {
            Some(ttl) => ContextProvider::with_ttl(self.registry, self.store.clone(), ttl),
            None => ContextProvider::new(self.registry, self.store.clone()),
        };
        BundleEngine {
            provider,
            resolver: TargetResolver::new(),
            synthesizer: Synthesizer::new(self.templates).with_hooks(self.hooks),
            optimizer: BundleOptimizer::new(),
            validator: BundleValidator::new(),
            applier: TransactionalApplier::new(self.store.clone(), self.journal.clone()),
            store: self.store,
            journal: self.journal,
            analyzer: self.analyzer,
        }
    }
}

/// Command surface over bundle synthesis, validation, apply, and rollback
pub struct BundleEngine {
    provider: ContextProvider,
    store: Arc<dyn ConfigStore>,
    journal: Arc<dyn SessionJournal>,
    resolver: TargetResolver,
    synthesizer: Synthesizer,
    optimizer: BundleOptimizer,
    validator: BundleValidator,
    applier: TransactionalApplier,
    analyzer: Option<Arc<dyn RequirementAnalyzer>>,
}

impl BundleEngine {
    /// Builder entry point
    #[must_use]
    pub fn builder(
        registry: Arc<dyn ComponentRegistry>,
        store: Arc<dyn ConfigStore>,
        journal: Arc<dyn SessionJournal>,
    ) -> BundleEngineBuilder {
        BundleEngineBuilder::new(registry, store, journal)
    }

    /// The engine's context provider
    #[inline]
    #[must_use]
    pub fn provider(&self) -> &ContextProvider {
        &self.provider
    }

    /// Synthesize, optimize, and validate a bundle for a requirement
    ///
    /// The bundle is always returned, even when validation fails; the
    /// caller decides whether to apply it.
    ///
    /// # Errors
    ///
    /// Fails on context collection, synthesis, or store-diff errors.
    pub async fn generate(
        &self,
        req: &RequirementSpec,
        options: &GenerateOptions,
    ) -> Result<GenerateOutcome, EngineError> {
        let ctx = self.provider.context().await?;

        let hints = self.analyzer_hints(req).await;
        let enriched = match &hints {
            Some(hints) => req.clone().enriched_with(hints),
            None => req.clone(),
        };
        // Posture stated only in the free text still drives synthesis.
        let posture = infer_posture(&enriched);
        let enriched = enriched.enriched_with(&posture);

        let domains = self
            .resolver
            .resolve_with_hints(&enriched, &options.selection, hints.as_ref());
        tracing::info!(?domains, "synthesis targets resolved");

        let mut bundle = Bundle::new();
        for domain in &domains {
            bundle.insert(self.synthesizer.synthesize(*domain, &enriched, &ctx)?);
        }

        if options.optimize {
            bundle = self.optimizer.optimize(bundle, &ctx);
        }

        let validation = self.validator.validate(&bundle, &ctx);
        let execution_id = Ulid::new().to_string();
        let fingerprint = bundle.fingerprint()?;
        let diff = BundleDiff::compute(self.store.as_ref(), &bundle).await?;
        let rollback_plan = self.pre_apply_plan(&execution_id, &bundle).await?;

        tracing::info!(
            %execution_id,
            domains = bundle.len(),
            valid = validation.valid,
            "bundle generated"
        );
        Ok(GenerateOutcome {
            bundle,
            validation,
            apply_instructions: ApplyInstructions {
                execution_id,
                fingerprint,
                diff,
            },
            rollback_plan,
        })
    }

    /// Validate a bundle against the current context
    ///
    /// # Errors
    ///
    /// Fails when the context cannot be collected.
    pub async fn validate(&self, bundle: &Bundle) -> Result<ValidationResult, EngineError> {
        let ctx = self.provider.context().await?;
        Ok(self.validator.validate(bundle, &ctx))
    }

    /// Apply a bundle to the store under one session
    ///
    /// Refuses invalid bundles unless `options.force`. A dry run returns
    /// validation and diff without opening a session. Partial failure is
    /// reported as data on the outcome, never rolled back automatically.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationFailed`] for an invalid bundle
    /// without `force`, plus context, session, and journal errors.
    pub async fn apply(
        &self,
        bundle: &Bundle,
        options: &ApplyOptions,
    ) -> Result<ApplyOutcome, EngineError> {
        let ctx = self.provider.context().await?;
        let validation = self.validator.validate(bundle, &ctx);
        if !validation.valid && !options.force {
            return Err(EngineError::ValidationFailed {
                errors: validation.errors().len(),
            });
        }

        let diff = BundleDiff::compute(self.store.as_ref(), bundle).await?;
        let execution_id = options
            .execution_id
            .clone()
            .unwrap_or_else(|| Ulid::new().to_string());

        if options.dry_run {
            tracing::info!(%execution_id, "dry run, no writes");
            return Ok(ApplyOutcome {
                execution_id,
                validation,
                diff,
                report: None,
            });
        }

        let report = self.applier.apply_bundle(&execution_id, bundle).await?;
        Ok(ApplyOutcome {
            execution_id,
            validation,
            diff,
            report: Some(report),
        })
    }

    /// Restore the snapshots journaled under an execution id
    ///
    /// # Errors
    ///
    /// Returns [`confgen_apply::ApplyError::RollbackNotFound`] (wrapped)
    /// for an id that was never journaled.
    pub async fn rollback(&self, execution_id: &str) -> Result<RollbackReport, EngineError> {
        Ok(self.applier.rollback(execution_id).await?)
    }

    /// Journaled operations, newest session first
    ///
    /// # Errors
    ///
    /// Fails when the journal cannot be read.
    pub async fn history(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ApplyOperation>, EngineError> {
        Ok(self.journal.history(limit, offset).await?)
    }

    /// Run the analyzer, falling back to nothing on failure
    async fn analyzer_hints(&self, req: &RequirementSpec) -> Option<RequirementHints> {
        let analyzer = self.analyzer.as_deref()?;
        match analyzer.analyze(req).await {
            Ok(hints) => Some(hints),
            Err(e) => {
                tracing::warn!(error = %e, "analyzer failed, falling back to keywords");
                None
            }
        }
    }

    /// Restore plan from the store's values as they are right now
    async fn pre_apply_plan(
        &self,
        execution_id: &str,
        bundle: &Bundle,
    ) -> Result<RollbackPlan, EngineError> {
        let mut steps = Vec::with_capacity(bundle.len());
        for (domain, _) in bundle.iter() {
            let original = self.store.get(&config_key(domain)).await.map_err(
                confgen_apply::ApplyError::from,
            )?;
            steps.push(RollbackStep {
                domain,
                snapshot: Snapshot::capture(domain, original),
            });
        }
        Ok(RollbackPlan {
            execution_id: execution_id.to_string(),
            steps,
        })
    }
}

impl std::fmt::Debug for BundleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleEngine")
            .field("has_analyzer", &self.analyzer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confgen_apply::ApplySummary;
    use confgen_domain::Domain;

    fn outcome(report: Option<ApplyReport>) -> ApplyOutcome {
        ApplyOutcome {
            execution_id: "exec-1".to_string(),
            validation: ValidationResult {
                valid: true,
                issues: Default::default(),
            },
            diff: BundleDiff::default(),
            report,
        }
    }

    #[test]
    fn require_complete_rejects_a_half_applied_bundle() {
        let report = ApplyReport {
            execution_id: "exec-1".to_string(),
            summary: ApplySummary {
                total: 2,
                succeeded: 1,
                failed: 1,
            },
            operations: vec![
                ApplyOperation::succeeded(Domain::ComputeEngines),
                ApplyOperation::failed(Domain::Storage, "write refused"),
            ],
            partial_failure: true,
        };

        let err = outcome(Some(report)).require_complete().unwrap_err();
        match err {
            EngineError::ApplyPartialFailure {
                execution_id,
                failed,
                total,
            } => {
                assert_eq!(execution_id, "exec-1");
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn require_complete_passes_clean_and_dry_run_outcomes() {
        let report = ApplyReport {
            execution_id: "exec-1".to_string(),
            summary: ApplySummary {
                total: 1,
                succeeded: 1,
                failed: 0,
            },
            operations: vec![ApplyOperation::succeeded(Domain::ComputeEngines)],
            partial_failure: false,
        };

        assert!(outcome(Some(report)).require_complete().is_ok());
        assert!(outcome(None).require_complete().is_ok());
    }
}
