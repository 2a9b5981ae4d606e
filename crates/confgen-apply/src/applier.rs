//! Transactional bundle application
//!
//! Applies one domain at a time against a [`ConfigStore`], capturing a
//! pre-write snapshot per domain. A failed domain is recorded and the
//! remaining domains still apply; rollback is an explicit, separate call.

use crate::journal::{JournalError, SessionJournal};
use crate::session::{
    ApplyOperation, ApplySession, ApplySummary, RollbackPlan, RollbackReport, Snapshot,
};
use confgen_context::{ConfigStore, StoreError};
use confgen_domain::{Bundle, Domain, DomainConfig, DomainError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Store key for a domain's live configuration
#[inline]
#[must_use]
pub fn config_key(domain: Domain) -> String {
    format!("config:{}", domain.as_str())
}

/// Apply and rollback errors
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// `start_session` was called while a session is open
    #[error("an apply session is already open")]
    SessionAlreadyOpen,

    /// A per-domain operation was attempted with no open session
    #[error("no apply session is open")]
    NoOpenSession,

    /// Rollback was requested for an execution id the journal does not hold
    #[error("no journaled session for execution id {0}")]
    RollbackNotFound(String),

    /// Store access failed outside a per-domain operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Journal access failed
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Config encoding failed
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Outcome of a closed apply session
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub execution_id: String,
    pub summary: ApplySummary,
    pub operations: Vec<ApplyOperation>,
    /// True when at least one domain applied and at least one failed
    pub partial_failure: bool,
}

/// Applies bundles to a config store with snapshot-based rollback
pub struct TransactionalApplier {
    store: Arc<dyn ConfigStore>,
    journal: Arc<dyn SessionJournal>,
    session: Mutex<Option<ApplySession>>,
}

impl TransactionalApplier {
    /// Create an applier over a store and a journal
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>, journal: Arc<dyn SessionJournal>) -> Self {
        Self {
            store,
            journal,
            session: Mutex::new(None),
        }
    }

    /// Open an apply session under an execution id
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::SessionAlreadyOpen`] if a session is open.
    pub async fn start_session(&self, execution_id: impl Into<String>) -> Result<(), ApplyError> {
        let mut guard = self.session.lock().await;
        if guard.is_some() {
            return Err(ApplyError::SessionAlreadyOpen);
        }
        let execution_id = execution_id.into();
        tracing::info!(%execution_id, "apply session opened");
        *guard = Some(ApplySession::new(execution_id));
        Ok(())
    }

    /// Apply one domain config inside the open session
    ///
    /// The current store value is snapshotted before the write. A store
    /// failure is recorded as a failed operation on the session rather
    /// than returned, so remaining domains can still apply.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::NoOpenSession`] if no session is open, or
    /// [`ApplyError::Domain`] if the config cannot be encoded.
    pub async fn apply_domain(&self, config: &DomainConfig) -> Result<(), ApplyError> {
        let domain = config.domain();
        let value = config.to_value()?;

        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(ApplyError::NoOpenSession)?;

        let key = config_key(domain);
        let original = match self.store.get(&key).await {
            Ok(original) => original,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "snapshot read failed");
                session.record(ApplyOperation::failed(domain, e.to_string()));
                return Ok(());
            }
        };
        session.keep_snapshot(Snapshot::capture(domain, original));

        match self.store.set(&key, value).await {
            Ok(()) => {
                tracing::debug!(domain = %domain, "domain config applied");
                session.record(ApplyOperation::succeeded(domain));
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "domain write failed");
                session.record(ApplyOperation::failed(domain, e.to_string()));
            }
        }
        Ok(())
    }

    /// Close the open session, journal it, and report the outcome
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::NoOpenSession`] if no session is open, or
    /// [`ApplyError::Journal`] if the session cannot be journaled.
    pub async fn end_session(&self) -> Result<ApplyReport, ApplyError> {
        let mut guard = self.session.lock().await;
        let session = guard.take().ok_or(ApplyError::NoOpenSession)?;
        drop(guard);

        self.journal.record(&session).await?;

        let summary = session.summary();
        tracing::info!(
            execution_id = %session.execution_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "apply session closed"
        );
        Ok(ApplyReport {
            execution_id: session.execution_id,
            partial_failure: summary.succeeded > 0 && summary.failed > 0,
            operations: session.operations,
            summary,
        })
    }

    /// Apply a whole bundle in one session
    ///
    /// # Errors
    ///
    /// Propagates session, encoding, and journal errors; per-domain store
    /// failures land in the report instead.
    pub async fn apply_bundle(
        &self,
        execution_id: impl Into<String>,
        bundle: &Bundle,
    ) -> Result<ApplyReport, ApplyError> {
        self.start_session(execution_id).await?;
        for (_, config) in bundle.iter() {
            if let Err(e) = self.apply_domain(config).await {
                // Abandon the session so the applier is usable afterwards.
                let _ = self.session.lock().await.take();
                return Err(e);
            }
        }
        self.end_session().await
    }

    /// Restore the snapshots of a journaled session
    ///
    /// Domains whose snapshot held no prior value are deleted; the rest
    /// are set back to the captured value. Replaying a rollback is
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::RollbackNotFound`] if the execution id was
    /// never journaled, or [`ApplyError::Store`] if a restore write fails.
    pub async fn rollback(&self, execution_id: &str) -> Result<RollbackReport, ApplyError> {
        let session = self
            .journal
            .load(execution_id)
            .await?
            .ok_or_else(|| ApplyError::RollbackNotFound(execution_id.to_string()))?;

        let plan = RollbackPlan::from_session(&session);
        let mut total_rolled_back = 0usize;
        for step in &plan.steps {
            let key = config_key(step.domain);
            match &step.snapshot.original {
                Some(value) => self.store.set(&key, value.clone()).await?,
                None => self.store.delete(&key).await?,
            }
            total_rolled_back += 1;
        }

        tracing::info!(%execution_id, total_rolled_back, "rollback complete");
        Ok(RollbackReport {
            execution_id: execution_id.to_string(),
            total_rolled_back,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::InMemoryJournal;
    use async_trait::async_trait;
    use confgen_context::InMemoryConfigStore;
    use confgen_domain::{ComputeEnginesConfig, SecurityConfig, StorageConfig};
    use serde_json::Value as JsonValue;

    fn applier_over(store: Arc<dyn ConfigStore>) -> TransactionalApplier {
        TransactionalApplier::new(store, Arc::new(InMemoryJournal::new()))
    }

    fn sample_bundle() -> Bundle {
        [
            DomainConfig::ComputeEngines(ComputeEnginesConfig::default()),
            DomainConfig::Storage(StorageConfig::default()),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let applier = applier_over(Arc::new(InMemoryConfigStore::new()));
        applier.start_session("exec-1").await.unwrap();
        let err = applier.start_session("exec-2").await.unwrap_err();
        assert!(matches!(err, ApplyError::SessionAlreadyOpen));
    }

    #[tokio::test]
    async fn apply_outside_session_is_rejected() {
        let applier = applier_over(Arc::new(InMemoryConfigStore::new()));
        let config = DomainConfig::Storage(StorageConfig::default());
        let err = applier.apply_domain(&config).await.unwrap_err();
        assert!(matches!(err, ApplyError::NoOpenSession));
    }

    #[tokio::test]
    async fn bundle_applies_to_store() {
        let store = Arc::new(InMemoryConfigStore::new());
        let applier = applier_over(store.clone());

        let report = applier.apply_bundle("exec-1", &sample_bundle()).await.unwrap();
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 0);
        assert!(!report.partial_failure);

        let stored = store
            .get(&config_key(Domain::ComputeEngines))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["rateLimiting"]["requestsPerMinute"], 60);
    }

    #[tokio::test]
    async fn rollback_restores_prior_value_and_deletes_fresh_keys() {
        let store = Arc::new(InMemoryConfigStore::new());
        let original = serde_json::json!({"primaryBackend": "ipfs"});
        store
            .set(&config_key(Domain::Storage), original.clone())
            .await
            .unwrap();

        let applier = applier_over(store.clone());
        let bundle: Bundle = [DomainConfig::Storage(StorageConfig::default())]
            .into_iter()
            .collect();
        applier.apply_bundle("exec-1", &bundle).await.unwrap();
        assert_ne!(
            store.get(&config_key(Domain::Storage)).await.unwrap(),
            Some(original.clone())
        );

        let report = applier.rollback("exec-1").await.unwrap();
        assert_eq!(report.total_rolled_back, 1);
        assert_eq!(
            store.get(&config_key(Domain::Storage)).await.unwrap(),
            Some(original)
        );
    }

    #[tokio::test]
    async fn rollback_unknown_execution_fails() {
        let applier = applier_over(Arc::new(InMemoryConfigStore::new()));
        let err = applier.rollback("never-ran").await.unwrap_err();
        assert!(matches!(err, ApplyError::RollbackNotFound(id) if id == "never-ran"));
    }

    /// Store that rejects writes to one key
    struct FlakyStore {
        inner: InMemoryConfigStore,
        poison_key: String,
    }

    #[async_trait]
    impl ConfigStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
            if key == self.poison_key {
                return Err(StoreError::WriteFailed {
                    key: key.to_string(),
                    reason: "disk full".to_string(),
                });
            }
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn failed_domain_does_not_stop_the_rest() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryConfigStore::new(),
            poison_key: config_key(Domain::ComputeEngines),
        });
        let applier = applier_over(store.clone());

        let mut bundle = sample_bundle();
        bundle.insert(DomainConfig::Security(SecurityConfig::default()));

        let report = applier.apply_bundle("exec-1", &bundle).await.unwrap();
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.succeeded, 2);
        assert!(report.partial_failure);

        let failed: Vec<_> = report
            .operations
            .iter()
            .filter(|op| op.status == crate::session::OperationStatus::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].domain, Domain::ComputeEngines);
        assert!(store
            .get(&config_key(Domain::Security))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn rollback_replay_is_idempotent() {
        let store = Arc::new(InMemoryConfigStore::new());
        let applier = applier_over(store.clone());
        applier.apply_bundle("exec-1", &sample_bundle()).await.unwrap();

        applier.rollback("exec-1").await.unwrap();
        let report = applier.rollback("exec-1").await.unwrap();
        assert_eq!(report.total_rolled_back, 2);
        assert!(store
            .get(&config_key(Domain::Storage))
            .await
            .unwrap()
            .is_none());
    }
}
