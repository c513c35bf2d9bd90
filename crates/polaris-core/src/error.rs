//! # Error Hierarchy
//!
//! Structured error types for the audit stack core, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Adapter-level failures live in `polaris-sources` because they carry
//! source identity; this module holds the errors every crate shares.

use thiserror::Error;

/// Top-level error type for the audit core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A targeted policy reached report assembly without a verdict entry.
    ///
    /// This is a programming-contract violation in the pipeline wiring,
    /// not bad external data. The engine surfaces it as an `Inconsistent`
    /// report entry rather than silently dropping the policy.
    #[error("pipeline inconsistency: targeted policy {policy_id} has no verdict entry")]
    PipelineInconsistency {
        /// The targeted policy that lacks a verdict.
        policy_id: String,
    },
}

/// Validation errors for domain primitive newtypes.
///
/// Backend identifiers are opaque, so the only format constraint is
/// non-emptiness; each variant names the identifier type so operators can
/// locate the defective snapshot field without guesswork.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Device identifier is empty.
    #[error("invalid device ID: must be non-empty")]
    EmptyDeviceId,

    /// Group identifier is empty.
    #[error("invalid group ID: must be non-empty")]
    EmptyGroupId,

    /// Policy identifier is empty.
    #[error("invalid policy ID: must be non-empty")]
    EmptyPolicyId,

    /// Assignment filter identifier is empty.
    #[error("invalid filter ID: must be non-empty")]
    EmptyFilterId,
}
