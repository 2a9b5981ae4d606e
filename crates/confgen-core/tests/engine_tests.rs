//! End-to-end engine flows: generate, validate, apply, rollback, history.

use confgen_apply::{config_key, FileJournal, InMemoryJournal};
use confgen_context::{ConfigStore, InMemoryComponentRegistry, InMemoryConfigStore};
use confgen_core::prelude::*;
use confgen_domain::{DomainConfig, NetworkConfig, SecurityConfig, WorkflowConfig};
use confgen_test_utils::{
    full_registry, high_perf_generation_requirement, strict_security_requirement,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn engine_over(
    registry: InMemoryComponentRegistry,
    store: Arc<InMemoryConfigStore>,
) -> BundleEngine {
    BundleEngine::builder(Arc::new(registry), store, Arc::new(InMemoryJournal::new())).build()
}

fn full_engine(store: Arc<InMemoryConfigStore>) -> BundleEngine {
    engine_over(full_registry(), store)
}

#[tokio::test]
async fn high_perf_generation_targets_compute_only() {
    let engine = full_engine(Arc::new(InMemoryConfigStore::new()));

    let outcome = engine
        .generate(&high_perf_generation_requirement(), &GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.bundle.domains(), vec![Domain::ComputeEngines]);
    assert!(outcome.validation.valid);

    let compute = outcome
        .bundle
        .get(Domain::ComputeEngines)
        .unwrap()
        .to_value()
        .unwrap();
    assert_eq!(compute["rateLimiting"]["requestsPerMinute"], 120);
}

#[tokio::test]
async fn strict_security_tightens_jwt_expiry() {
    let engine = full_engine(Arc::new(InMemoryConfigStore::new()));

    let outcome = engine
        .generate(&strict_security_requirement(), &GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.bundle.domains(), vec![Domain::Security]);
    let security = outcome
        .bundle
        .get(Domain::Security)
        .unwrap()
        .to_value()
        .unwrap();
    assert_eq!(security["authentication"]["jwtExpiry"], 3_600);
    assert_eq!(security["encryption"]["algorithm"], "aes-256-gcm");
}

#[tokio::test]
async fn optimizer_raises_rate_limit_for_concurrency() {
    let engine = full_engine(Arc::new(InMemoryConfigStore::new()));

    let req = RequirementSpec::new("tune the platform")
        .with_override(Domain::Workflow, json!({"maxConcurrentExecutions": 10}));
    let options = GenerateOptions {
        selection: TargetSelection::Domains(vec![Domain::ComputeEngines, Domain::Workflow]),
        optimize: true,
    };

    let outcome = engine.generate(&req, &options).await.unwrap();
    let compute = outcome
        .bundle
        .get(Domain::ComputeEngines)
        .unwrap()
        .to_value()
        .unwrap();
    assert_eq!(compute["rateLimiting"]["requestsPerMinute"], 150);
}

#[tokio::test]
async fn network_encryption_without_security_is_one_warning() {
    let engine = full_engine(Arc::new(InMemoryConfigStore::new()));

    let bundle: Bundle = [DomainConfig::Network(NetworkConfig {
        encryption: true,
        ..NetworkConfig::default()
    })]
    .into_iter()
    .collect();

    let validation = engine.validate(&bundle).await.unwrap();
    assert!(validation.valid);
    assert_eq!(validation.issue_count(), 1);
    assert!(validation.errors().is_empty());
}

#[tokio::test]
async fn invalid_bundle_is_returned_but_refused_on_apply() {
    // No workflow engine registered, so a workflow config is an error.
    let store = Arc::new(InMemoryConfigStore::new());
    let engine = engine_over(InMemoryComponentRegistry::new(), store.clone());

    let bundle: Bundle = [DomainConfig::Workflow(WorkflowConfig::default())]
        .into_iter()
        .collect();
    let validation = engine.validate(&bundle).await.unwrap();
    assert!(!validation.valid);

    let err = engine
        .apply(&bundle, &ApplyOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ValidationFailed { errors: 1 }));

    // Force pushes it through anyway.
    let outcome = engine
        .apply(
            &bundle,
            &ApplyOptions {
                force: true,
                ..ApplyOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.report.unwrap().summary.succeeded, 1);
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let store = Arc::new(InMemoryConfigStore::new());
    let engine = full_engine(store.clone());

    let bundle: Bundle = [DomainConfig::Security(SecurityConfig::default())]
        .into_iter()
        .collect();
    let outcome = engine
        .apply(
            &bundle,
            &ApplyOptions {
                dry_run: true,
                ..ApplyOptions::default()
            },
        )
        .await
        .unwrap();

    assert!(outcome.report.is_none());
    assert_eq!(outcome.diff.changed_domains(), vec![Domain::Security]);
    assert!(store
        .get(&config_key(Domain::Security))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn rollback_restores_the_overwritten_config() {
    let store = Arc::new(InMemoryConfigStore::new());
    let original = json!({"maxSessionsPerUser": 3});
    store
        .set(&config_key(Domain::Security), original.clone())
        .await
        .unwrap();

    let engine = full_engine(store.clone());
    let bundle: Bundle = [DomainConfig::Security(SecurityConfig::default())]
        .into_iter()
        .collect();

    let outcome = engine.apply(&bundle, &ApplyOptions::default()).await.unwrap();
    assert!(!outcome.partial_failure());
    assert_ne!(
        store.get(&config_key(Domain::Security)).await.unwrap(),
        Some(original.clone())
    );

    let report = engine.rollback(&outcome.execution_id).await.unwrap();
    assert_eq!(report.total_rolled_back, 1);
    assert_eq!(
        store.get(&config_key(Domain::Security)).await.unwrap(),
        Some(original)
    );
}

#[tokio::test]
async fn apply_leaves_no_session_open() {
    let store = Arc::new(InMemoryConfigStore::new());
    let engine = full_engine(store);
    let bundle: Bundle = [DomainConfig::Security(SecurityConfig::default())]
        .into_iter()
        .collect();

    engine.apply(&bundle, &ApplyOptions::default()).await.unwrap();
    // A lingering session would make this second apply fail.
    engine.apply(&bundle, &ApplyOptions::default()).await.unwrap();
}

#[tokio::test]
async fn history_lists_applied_operations() {
    let store = Arc::new(InMemoryConfigStore::new());
    let engine = full_engine(store);
    let bundle: Bundle = [
        DomainConfig::Security(SecurityConfig::default()),
        DomainConfig::Workflow(WorkflowConfig::default()),
    ]
    .into_iter()
    .collect();

    engine.apply(&bundle, &ApplyOptions::default()).await.unwrap();

    let ops = engine.history(10, 0).await.unwrap();
    assert_eq!(ops.len(), 2);
    let page = engine.history(1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn rollback_works_after_restart_with_file_journal() -> anyhow::Result<()> {
    confgen_test_utils::init_tracing();
    let dir = tempfile::tempdir()?;
    let journal_path = dir.path().join("sessions.jsonl");
    let store = Arc::new(InMemoryConfigStore::new());
    let original = json!({"primaryBackend": "ipfs"});
    store
        .set(&config_key(Domain::Storage), original.clone())
        .await?;

    let bundle: Bundle = [DomainConfig::Storage(Default::default())]
        .into_iter()
        .collect();

    let execution_id = {
        let engine = BundleEngine::builder(
            Arc::new(full_registry()),
            store.clone(),
            Arc::new(FileJournal::new(&journal_path)),
        )
        .build();
        let outcome = engine.apply(&bundle, &ApplyOptions::default()).await?;
        outcome.execution_id
    };

    // Fresh engine over the same store and journal file.
    let engine = BundleEngine::builder(
        Arc::new(full_registry()),
        store.clone(),
        Arc::new(FileJournal::new(&journal_path)),
    )
    .build();
    let report = engine.rollback(&execution_id).await?;
    assert_eq!(report.total_rolled_back, 1);
    assert_eq!(
        store.get(&config_key(Domain::Storage)).await?,
        Some(original)
    );
    Ok(())
}

mockall::mock! {
    Analyzer {}

    #[async_trait::async_trait]
    impl RequirementAnalyzer for Analyzer {
        async fn analyze(
            &self,
            req: &RequirementSpec,
        ) -> Result<confgen_domain::RequirementHints, confgen_core::AnalyzerError>;
    }
}

#[tokio::test]
async fn analyzer_hints_extend_keyword_targets() {
    let mut analyzer = MockAnalyzer::new();
    analyzer.expect_analyze().returning(|_| {
        Ok(confgen_domain::RequirementHints {
            domains: vec![Domain::Memory],
            ..Default::default()
        })
    });

    let engine = BundleEngine::builder(
        Arc::new(full_registry()),
        Arc::new(InMemoryConfigStore::new()),
        Arc::new(InMemoryJournal::new()),
    )
    .with_analyzer(Arc::new(analyzer))
    .build();

    let outcome = engine
        .generate(&high_perf_generation_requirement(), &GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(
        outcome.bundle.domains(),
        vec![Domain::ComputeEngines, Domain::Memory]
    );
}

#[tokio::test]
async fn failing_analyzer_falls_back_to_keywords() {
    let mut analyzer = MockAnalyzer::new();
    analyzer
        .expect_analyze()
        .returning(|_| Err("model unavailable".into()));

    let engine = BundleEngine::builder(
        Arc::new(full_registry()),
        Arc::new(InMemoryConfigStore::new()),
        Arc::new(InMemoryJournal::new()),
    )
    .with_analyzer(Arc::new(analyzer))
    .build();

    let outcome = engine
        .generate(&high_perf_generation_requirement(), &GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome.bundle.domains(), vec![Domain::ComputeEngines]);
}

#[tokio::test]
async fn generate_outcome_carries_fingerprint_and_rollback_plan() {
    let store = Arc::new(InMemoryConfigStore::new());
    store
        .set(&config_key(Domain::Security), json!({"old": true}))
        .await
        .unwrap();
    let engine = full_engine(store);

    let outcome = engine
        .generate(&strict_security_requirement(), &GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.apply_instructions.fingerprint.len(), 64);
    assert_eq!(outcome.rollback_plan.steps.len(), 1);
    assert_eq!(
        outcome.rollback_plan.steps[0].snapshot.original,
        Some(json!({"old": true}))
    );
}
