//! Top-level engine errors

use confgen_apply::{ApplyError, JournalError};
use confgen_context::ContextError;
use confgen_domain::{BundleCodecError, DomainError};

/// Errors surfaced by the [`BundleEngine`](crate::BundleEngine)
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Context collection failed; nothing was synthesized
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Synthesis or config encoding failed
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Apply session or store failure
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// Journal read failed
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Bundle serialization failed
    #[error(transparent)]
    Codec(#[from] BundleCodecError),

    /// Apply refused because the bundle has validation errors
    #[error("bundle has {errors} validation error(s); pass force to apply anyway")]
    ValidationFailed {
        /// Number of error-severity findings
        errors: usize,
    },

    /// Typed form of a partially failed apply, for callers that prefer
    /// an error over inspecting the report
    #[error("apply {execution_id} partially failed: {failed} of {total} domain(s)")]
    ApplyPartialFailure {
        execution_id: String,
        failed: usize,
        total: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failed_names_the_count() {
        let err = EngineError::ValidationFailed { errors: 2 };
        assert!(err.to_string().contains("2 validation error"));
    }

    #[test]
    fn apply_error_converts() {
        let err: EngineError = ApplyError::SessionAlreadyOpen.into();
        assert!(matches!(err, EngineError::Apply(ApplyError::SessionAlreadyOpen)));
    }
}
