//! Apply sessions, snapshots, and rollback plans

use chrono::{DateTime, Utc};
use confgen_domain::Domain;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Pre-write capture of a domain's stored configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Domain the snapshot belongs to
    pub domain: Domain,
    /// Stored config at capture time; `None` when the key had never been written
    pub original: Option<JsonValue>,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Capture a snapshot now
    #[inline]
    #[must_use]
    pub fn capture(domain: Domain, original: Option<JsonValue>) -> Self {
        Self {
            domain,
            original,
            captured_at: Utc::now(),
        }
    }
}

/// Outcome of a single domain write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Write landed
    Succeeded,
    /// Write failed; recorded, session continues
    Failed,
}

/// One recorded domain write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyOperation {
    /// Domain written
    pub domain: Domain,
    /// Outcome
    pub status: OperationStatus,
    /// Failure detail, when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the write was attempted
    pub applied_at: DateTime<Utc>,
}

impl ApplyOperation {
    /// Record a successful write
    #[inline]
    #[must_use]
    pub fn succeeded(domain: Domain) -> Self {
        Self {
            domain,
            status: OperationStatus::Succeeded,
            error: None,
            applied_at: Utc::now(),
        }
    }

    /// Record a failed write
    #[inline]
    #[must_use]
    pub fn failed(domain: Domain, error: impl Into<String>) -> Self {
        Self {
            domain,
            status: OperationStatus::Failed,
            error: Some(error.into()),
            applied_at: Utc::now(),
        }
    }
}

/// Session close summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    /// Operations attempted
    pub total: usize,
    /// Operations that landed
    pub succeeded: usize,
    /// Operations that failed
    pub failed: usize,
}

/// One apply session: operations and snapshots under a single execution id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplySession {
    /// Caller-supplied execution id
    pub execution_id: String,
    /// When the session opened
    pub started_at: DateTime<Utc>,
    /// Recorded writes, in order
    pub operations: Vec<ApplyOperation>,
    /// Pre-write snapshots, one per domain
    pub snapshots: Vec<Snapshot>,
}

impl ApplySession {
    /// Open a session
    #[inline]
    #[must_use]
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            started_at: Utc::now(),
            operations: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    /// Append an operation record
    pub fn record(&mut self, operation: ApplyOperation) {
        self.operations.push(operation);
    }

    /// Keep a snapshot
    pub fn keep_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    /// Summarize the recorded operations
    #[must_use]
    pub fn summary(&self) -> ApplySummary {
        let succeeded = self
            .operations
            .iter()
            .filter(|o| o.status == OperationStatus::Succeeded)
            .count();
        ApplySummary {
            total: self.operations.len(),
            succeeded,
            failed: self.operations.len() - succeeded,
        }
    }
}

/// One restore step of a rollback plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackStep {
    /// Domain to restore
    pub domain: Domain,
    /// Snapshot to restore from
    pub snapshot: Snapshot,
}

/// Everything needed to restore a session's pre-apply state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackPlan {
    /// Session the plan restores
    pub execution_id: String,
    /// Restore steps, one per snapshotted domain
    pub steps: Vec<RollbackStep>,
}

impl RollbackPlan {
    /// Derive a plan from a session's snapshots
    #[must_use]
    pub fn from_session(session: &ApplySession) -> Self {
        Self {
            execution_id: session.execution_id.clone(),
            steps: session
                .snapshots
                .iter()
                .map(|s| RollbackStep {
                    domain: s.domain,
                    snapshot: s.clone(),
                })
                .collect(),
        }
    }
}

/// Rollback outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackReport {
    /// Session rolled back
    pub execution_id: String,
    /// Domains restored
    pub total_rolled_back: usize,
}
