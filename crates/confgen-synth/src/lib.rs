//! ConfGen Synth - From requirement to validated bundle
//!
//! The pure middle of the engine:
//!
//! - [`TargetResolver`]: which domains a requirement touches (keyword table)
//! - [`Synthesizer`]: template → requirement transforms → overrides →
//!   context adjustments → registered hooks, per domain
//! - [`BundleOptimizer`]: idempotent cross-domain consistency rules
//! - [`BundleValidator`]: per-domain and cross-domain checks against the
//!   live context
//!
//! Everything here is side-effect-free; domains are independent until the
//! optimizer pass, which runs after all domains are synthesized.

#![warn(unreachable_pub)]

mod optimizer;
mod resolver;
mod synthesizer;
mod validator;

pub use optimizer::BundleOptimizer;
pub use resolver::{infer_posture, TargetResolver, TargetSelection};
pub use synthesizer::{Synthesizer, TransformHook, TransformHookRegistry};
pub use validator::{BundleValidator, ValidationResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
