//! # Verdicts and the Consensus Procedure
//!
//! A [`ReconciledVerdict`] is the audit's answer for one policy: one
//! state, a confidence grade, and the full roll call of who agreed and
//! who dissented. Nothing is averaged away — a dissenting reading stays
//! in the verdict so an operator can judge it directly.

use serde::{Deserialize, Serialize};

use polaris_core::{ComplianceState, PolicyId};
use polaris_sources::{ComplianceRecord, SourceId, TrustPriority};

/// How much the cross-source evidence supports the verdict's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Sources disagreed, or no source produced a determinate reading.
    Low,
    /// Exactly one determinate reading, uncorroborated.
    Medium,
    /// Two or more determinate readings agree.
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// The reconciled answer for one policy on one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledVerdict {
    /// The policy this verdict is about.
    pub policy_id: PolicyId,
    /// The winning state.
    pub state: ComplianceState,
    /// Evidence grade for the winning state.
    pub confidence: Confidence,
    /// Sources whose determinate reading matches the winning state.
    pub agreeing_sources: Vec<SourceId>,
    /// Determinate dissenters, with the state each reported.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub disagreeing_sources: Vec<(SourceId, ComplianceState)>,
}

impl ReconciledVerdict {
    /// Whether any source dissented from the winning state.
    pub fn is_contested(&self) -> bool {
        !self.disagreeing_sources.is_empty()
    }
}

/// Collapse one policy's readings into a single verdict.
///
/// `NotFound` readings are excluded from the vote. With no determinate
/// reading at all, the verdict is `Unknown` at low confidence: the audit
/// could not establish the device's standing against this policy, and
/// that absence is itself reportable.
pub fn reconcile(policy_id: &PolicyId, records: &[ComplianceRecord]) -> ReconciledVerdict {
    let determinate: Vec<&ComplianceRecord> = records
        .iter()
        .filter(|r| r.state.is_determinate())
        .collect();

    if determinate.is_empty() {
        return ReconciledVerdict {
            policy_id: policy_id.clone(),
            state: ComplianceState::Unknown,
            confidence: Confidence::Low,
            agreeing_sources: Vec::new(),
            disagreeing_sources: Vec::new(),
        };
    }

    let unanimous = determinate
        .iter()
        .all(|r| r.state == determinate[0].state);

    if unanimous {
        let confidence = if determinate.len() >= 2 {
            Confidence::High
        } else {
            Confidence::Medium
        };
        return ReconciledVerdict {
            policy_id: policy_id.clone(),
            state: determinate[0].state,
            confidence,
            agreeing_sources: determinate.iter().map(|r| r.source).collect(),
            disagreeing_sources: Vec::new(),
        };
    }

    // Disagreement: highest trust priority wins; a tie at the same
    // priority resolves fail-safe to the worst of the tied states.
    let top_priority = determinate
        .iter()
        .map(|r| r.source.priority())
        .max()
        .unwrap_or(TrustPriority::Low);
    let mut winning_state: Option<ComplianceState> = None;
    for record in &determinate {
        if record.source.priority() == top_priority {
            winning_state = Some(match winning_state {
                Some(current) => current.worse(record.state),
                None => record.state,
            });
        }
    }
    // At least one record carries the maximum priority.
    let state = winning_state.unwrap_or(ComplianceState::Unknown);

    let agreeing_sources: Vec<SourceId> = determinate
        .iter()
        .filter(|r| r.state == state)
        .map(|r| r.source)
        .collect();
    let disagreeing_sources: Vec<(SourceId, ComplianceState)> = determinate
        .iter()
        .filter(|r| r.state != state)
        .map(|r| (r.source, r.state))
        .collect();

    tracing::warn!(
        policy_id = %policy_id,
        state = %state,
        dissenters = disagreeing_sources.len(),
        "compliance sources disagree; resolved by trust priority"
    );

    ReconciledVerdict {
        policy_id: policy_id.clone(),
        state,
        confidence: Confidence::Low,
        agreeing_sources,
        disagreeing_sources,
    }
}
