//! # Compliance State Enumeration
//!
//! The closed set of per-policy compliance states produced at the adapter
//! boundary. The management backend reports status as free text that
//! varies by API shape and locale; adapters normalize that text into
//! [`ComplianceState`] exactly once, and everything downstream —
//! reconciliation, reporting, rendering — matches on the enum.
//!
//! ## Severity Ordering
//!
//! States carry a fail-safe severity ordering used when same-priority
//! sources disagree: surfacing a possible problem is preferred over hiding
//! it, so `NonCompliant` and `Error` outrank `Compliant`.
//!
//! ```text
//! Ordering (worst → best):
//!   NonCompliant < Error < Conflict < Unknown < NotApplicable < Compliant
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// The compliance verdict for a single (device, policy) reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceState {
    /// The device satisfies the policy.
    Compliant,
    /// The device violates the policy — specific failures exist.
    NonCompliant,
    /// The backend failed to evaluate the policy on the device.
    Error,
    /// Two backend evaluations of the same policy contradict each other.
    Conflict,
    /// The backend has no evaluation yet, or could not classify the state.
    Unknown,
    /// The policy does not apply to the device's platform or type.
    NotApplicable,
    /// The backend query completed but held no record for this
    /// (device, policy) pair at all.
    NotFound,
}

impl ComplianceState {
    /// Fail-safe severity rank. Lower is worse.
    fn severity(self) -> u8 {
        match self {
            Self::NonCompliant => 0,
            Self::Error => 1,
            Self::Conflict => 2,
            Self::Unknown => 3,
            Self::NotApplicable => 4,
            Self::Compliant => 5,
            // NotFound never competes in a tie-break; it is excluded from
            // the consensus vote before severity is consulted.
            Self::NotFound => 6,
        }
    }

    /// Pick the worse (more alarming) of two states.
    ///
    /// Used to break ties among sources of equal trust priority: given
    /// `Compliant` and `NonCompliant` from two equally trusted sources,
    /// the reconciled state is `NonCompliant`.
    pub fn worse(self, other: Self) -> Self {
        if self.severity() <= other.severity() {
            self
        } else {
            other
        }
    }

    /// Whether this state is a determinate backend reading.
    ///
    /// `NotFound` means "the source had nothing to say" and is excluded
    /// from reconciliation consensus; every other state is a real reading.
    pub fn is_determinate(self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// Whether this state indicates an actionable problem.
    pub fn is_problem(self) -> bool {
        matches!(self, Self::NonCompliant | Self::Error | Self::Conflict)
    }

    /// All states, in severity order (worst first).
    pub fn all() -> &'static [ComplianceState] {
        &[
            Self::NonCompliant,
            Self::Error,
            Self::Conflict,
            Self::Unknown,
            Self::NotApplicable,
            Self::Compliant,
            Self::NotFound,
        ]
    }
}

impl fmt::Display for ComplianceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::NonCompliant => write!(f, "non_compliant"),
            Self::Error => write!(f, "error"),
            Self::Conflict => write!(f, "conflict"),
            Self::Unknown => write!(f, "unknown"),
            Self::NotApplicable => write!(f, "not_applicable"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worse_prefers_non_compliant_over_compliant() {
        assert_eq!(
            ComplianceState::Compliant.worse(ComplianceState::NonCompliant),
            ComplianceState::NonCompliant
        );
        assert_eq!(
            ComplianceState::NonCompliant.worse(ComplianceState::Compliant),
            ComplianceState::NonCompliant
        );
    }

    #[test]
    fn worse_prefers_error_over_compliant() {
        assert_eq!(
            ComplianceState::Error.worse(ComplianceState::Compliant),
            ComplianceState::Error
        );
    }

    #[test]
    fn worse_is_commutative() {
        for &a in ComplianceState::all() {
            for &b in ComplianceState::all() {
                assert_eq!(a.worse(b), b.worse(a), "worse({a}, {b}) != worse({b}, {a})");
            }
        }
    }

    #[test]
    fn worse_is_idempotent() {
        for &s in ComplianceState::all() {
            assert_eq!(s.worse(s), s);
        }
    }

    #[test]
    fn only_not_found_is_indeterminate() {
        for &s in ComplianceState::all() {
            assert_eq!(s.is_determinate(), s != ComplianceState::NotFound);
        }
    }

    #[test]
    fn problem_classification() {
        assert!(ComplianceState::NonCompliant.is_problem());
        assert!(ComplianceState::Error.is_problem());
        assert!(ComplianceState::Conflict.is_problem());
        assert!(!ComplianceState::Compliant.is_problem());
        assert!(!ComplianceState::Unknown.is_problem());
        assert!(!ComplianceState::NotApplicable.is_problem());
        assert!(!ComplianceState::NotFound.is_problem());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&ComplianceState::NonCompliant).unwrap(),
            "\"non_compliant\""
        );
        assert_eq!(
            serde_json::to_string(&ComplianceState::NotApplicable).unwrap(),
            "\"not_applicable\""
        );
    }

    #[test]
    fn serde_roundtrip_all_states() {
        for &s in ComplianceState::all() {
            let json = serde_json::to_string(&s).unwrap();
            let back: ComplianceState = serde_json::from_str(&json).unwrap();
            assert_eq!(s, back);
        }
    }
}
