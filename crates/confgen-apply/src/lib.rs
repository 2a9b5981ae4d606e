//! ConfGen Apply - Transactional configuration writes
//!
//! One [`ApplySession`] at a time per applier: each domain write is preceded
//! by a [`Snapshot`] of the stored config (read-before-write), individual
//! failures are recorded rather than aborting, and sessions are durably
//! journaled so [`TransactionalApplier::rollback`] works after a restart.

#![warn(unreachable_pub)]

mod applier;
mod diff;
mod journal;
mod session;

pub use applier::{config_key, ApplyError, ApplyReport, TransactionalApplier};
pub use diff::{BundleDiff, DomainDiff};
pub use journal::{FileJournal, InMemoryJournal, JournalError, SessionJournal};
pub use session::{
    ApplyOperation, ApplySession, ApplySummary, OperationStatus, RollbackPlan, RollbackReport,
    RollbackStep, Snapshot,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
