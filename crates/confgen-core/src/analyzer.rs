//! Optional requirement analysis collaborator
//!
//! An analyzer turns a free-form prompt into structured
//! [`RequirementHints`]. The engine treats it as advisory: when no
//! analyzer is configured, or when analysis fails, resolution falls back
//! to keyword matching alone.

use async_trait::async_trait;
use confgen_domain::{RequirementHints, RequirementSpec};

/// Analyzer failures are opaque to the engine; it logs and falls back.
pub type AnalyzerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Derives structured hints from a requirement's free text
#[async_trait]
pub trait RequirementAnalyzer: Send + Sync {
    /// Analyze a requirement into hints
    ///
    /// # Errors
    ///
    /// Any failure; the caller falls back to keyword resolution.
    async fn analyze(&self, req: &RequirementSpec) -> Result<RequirementHints, AnalyzerError>;
}
