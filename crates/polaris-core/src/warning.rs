//! # Data-Integrity Warnings
//!
//! A dangling reference in an assignment — a `group_id` that resolves to
//! no known group, or a `filter_id` that resolves to no known filter — is
//! recoverable: the assignment's include/exclude contribution is skipped
//! and the evaluation continues. It is still backend data rot worth
//! surfacing, so every occurrence is recorded as exactly one
//! [`DataIntegrityWarning`] on the run context.

use serde::{Deserialize, Serialize};

use crate::identity::PolicyId;

/// The kind of dangling reference encountered during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityWarningKind {
    /// An assignment referenced a group id absent from the membership
    /// snapshot and the directory data available to the run.
    DanglingGroup,
    /// An assignment referenced a filter id absent from the filter catalog.
    DanglingFilter,
}

impl std::fmt::Display for IntegrityWarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingGroup => write!(f, "dangling_group"),
            Self::DanglingFilter => write!(f, "dangling_filter"),
        }
    }
}

/// One recorded data-integrity warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIntegrityWarning {
    /// The policy whose assignment carried the dangling reference.
    pub policy_id: PolicyId,
    /// What kind of reference failed to resolve.
    pub kind: IntegrityWarningKind,
    /// The unresolved identifier, verbatim.
    pub reference: String,
    /// Human-readable explanation for the report.
    pub detail: String,
}
