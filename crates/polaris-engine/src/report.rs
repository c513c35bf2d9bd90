//! # Audit Report Shapes
//!
//! The report is the whole product of a run: one entry per catalog
//! policy, the run's data-integrity warnings, and explicit markers for
//! everything that kept the run from being complete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use polaris_core::{DataIntegrityWarning, DeviceId};
use polaris_reconcile::ReconciledVerdict;
use polaris_sources::SourceId;
use polaris_targeting::{Policy, TargetingResult, STATUS_NOT_TARGETED};

/// Why a source contributed no reading for a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GapReason {
    /// The fetch returned an error.
    Failure {
        /// The error's display text.
        detail: String,
    },
    /// The fetch exceeded the per-adapter timeout.
    Timeout,
    /// The run was cancelled before the fetch completed.
    Cancelled,
}

impl std::fmt::Display for GapReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failure { detail } => write!(f, "failed: {detail}"),
            Self::Timeout => write!(f, "timed out"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One missing reading: which source did not answer, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceGap {
    /// The source that contributed no reading.
    pub source: SourceId,
    /// Why it did not answer.
    pub reason: GapReason,
}

/// The audit's full account of one policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAudit {
    /// The policy as fetched from the backend.
    pub policy: Policy,
    /// How targeting resolved for the device.
    pub targeting: TargetingResult,
    /// The reconciled compliance verdict. Present for every targeted
    /// policy; absent for policies the device is not targeted by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<ReconciledVerdict>,
    /// Sources that produced no reading for this policy.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub gaps: Vec<SourceGap>,
    /// Set when a targeted policy reached report assembly without a
    /// verdict. A pipeline-contract violation, surfaced rather than
    /// dropped.
    #[serde(default)]
    pub inconsistent: bool,
}

impl PolicyAudit {
    /// Whether every applicable source answered and the entry is sound.
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty() && !self.inconsistent
    }
}

/// One full audit run's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// The device that was audited.
    pub device_id: DeviceId,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// One entry per catalog policy, in catalog order.
    pub entries: Vec<PolicyAudit>,
    /// Data-integrity warnings recorded during targeting evaluation.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<DataIntegrityWarning>,
    /// Whether the run was cancelled before all fetches completed.
    #[serde(default)]
    pub cancelled: bool,
}

/// Roll-up counts over a report, for log lines and CLI footers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Policies in the catalog.
    pub total: usize,
    /// Policies targeted at the device.
    pub targeted: usize,
    /// Policies excluded from the device by a group match.
    pub excluded: usize,
    /// Policies with no matching assignment.
    pub not_targeted: usize,
    /// Targeted policies whose verdict is a problem state.
    pub problems: usize,
    /// Targeted policies whose sources disagreed.
    pub contested: usize,
    /// Entries missing at least one source reading or marked
    /// inconsistent.
    pub incomplete: usize,
    /// Data-integrity warnings recorded during the run.
    pub warnings: usize,
}

impl AuditReport {
    /// Compute the roll-up counts for this report.
    pub fn summary(&self) -> AuditSummary {
        let mut summary = AuditSummary {
            total: self.entries.len(),
            targeted: 0,
            excluded: 0,
            not_targeted: 0,
            problems: 0,
            contested: 0,
            incomplete: 0,
            warnings: self.warnings.len(),
        };
        for entry in &self.entries {
            if entry.targeting.excluded {
                summary.excluded += 1;
            } else if entry.targeting.status == STATUS_NOT_TARGETED {
                summary.not_targeted += 1;
            } else {
                summary.targeted += 1;
            }
            if let Some(verdict) = &entry.verdict {
                if verdict.state.is_problem() {
                    summary.problems += 1;
                }
                if verdict.is_contested() {
                    summary.contested += 1;
                }
            }
            if !entry.is_complete() {
                summary.incomplete += 1;
            }
        }
        summary
    }
}

impl std::fmt::Display for AuditSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} policies: {} targeted, {} excluded, {} not targeted; \
             {} problems, {} contested, {} incomplete, {} warnings",
            self.total,
            self.targeted,
            self.excluded,
            self.not_targeted,
            self.problems,
            self.contested,
            self.incomplete,
            self.warnings
        )
    }
}
