//! # Source Identity, Trust Priority, and Compliance Records
//!
//! Each query strategy carries a declared trust priority used by the
//! reconciler when sources disagree. Priorities are fixed properties of
//! the strategy, not tunables: they encode how resistant each API shape is
//! to the failure modes observed in the field (display-name collisions,
//! incomplete listings, reporting latency).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use polaris_core::{ComplianceState, PolicyId};

/// Trust priority of a compliance source, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustPriority {
    /// Vulnerable to name collisions or indirect matching.
    Low,
    /// Keyed by opaque id but subject to listing completeness or
    /// derivation from partial data.
    Medium,
    /// Authoritative per-device collection or backend-maintained rollup.
    High,
}

impl std::fmt::Display for TrustPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// The six backend query strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Per-device compliance listing matched by policy display name.
    /// First-match semantics over a name that is not unique across
    /// tenants or locales.
    DisplayNameMatch,
    /// The same listing matched by opaque policy id.
    PolicyIdMatch,
    /// Per-policy device-status collection, filtered server-side to the
    /// device.
    DeviceFilteredQuery,
    /// The same collection scanned page by page without server-side
    /// filtering, bounded by a page ceiling.
    PaginatedScan,
    /// Overall verdict derived from per-setting state records.
    PerSettingAggregation,
    /// Backend-maintained rollup report filtered to the device. Fast and
    /// authoritative when present, but may lag real-time state.
    PrecomputedReport,
}

impl SourceId {
    /// The declared trust priority of this strategy.
    pub fn priority(self) -> TrustPriority {
        match self {
            Self::DisplayNameMatch => TrustPriority::Low,
            Self::PolicyIdMatch => TrustPriority::Medium,
            Self::DeviceFilteredQuery => TrustPriority::High,
            Self::PaginatedScan => TrustPriority::High,
            Self::PerSettingAggregation => TrustPriority::Medium,
            Self::PrecomputedReport => TrustPriority::High,
        }
    }

    /// All strategies, in declaration order.
    pub fn all() -> &'static [SourceId] {
        &[
            Self::DisplayNameMatch,
            Self::PolicyIdMatch,
            Self::DeviceFilteredQuery,
            Self::PaginatedScan,
            Self::PerSettingAggregation,
            Self::PrecomputedReport,
        ]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DisplayNameMatch => write!(f, "display_name_match"),
            Self::PolicyIdMatch => write!(f, "policy_id_match"),
            Self::DeviceFilteredQuery => write!(f, "device_filtered_query"),
            Self::PaginatedScan => write!(f, "paginated_scan"),
            Self::PerSettingAggregation => write!(f, "per_setting_aggregation"),
            Self::PrecomputedReport => write!(f, "precomputed_report"),
        }
    }
}

impl std::error::Error for SourceId {}

/// One normalized compliance reading: what one strategy said about one
/// policy on one device, plus the raw backend material it said it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    /// The policy this reading is about.
    pub policy_id: PolicyId,
    /// The strategy that produced the reading.
    pub source: SourceId,
    /// The normalized state.
    pub state: ComplianceState,
    /// Backend-reported observation time, when the shape carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
    /// The raw backend record(s) behind the reading, for audit display.
    pub raw: serde_json::Value,
}

impl ComplianceRecord {
    /// A `NotFound` record: the strategy completed but held nothing for
    /// this (device, policy) pair.
    pub fn not_found(policy_id: PolicyId, source: SourceId) -> Self {
        Self {
            policy_id,
            source,
            state: ComplianceState::NotFound,
            observed_at: None,
            raw: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_match_the_declared_table() {
        assert_eq!(SourceId::DisplayNameMatch.priority(), TrustPriority::Low);
        assert_eq!(SourceId::PolicyIdMatch.priority(), TrustPriority::Medium);
        assert_eq!(
            SourceId::DeviceFilteredQuery.priority(),
            TrustPriority::High
        );
        assert_eq!(SourceId::PaginatedScan.priority(), TrustPriority::High);
        assert_eq!(
            SourceId::PerSettingAggregation.priority(),
            TrustPriority::Medium
        );
        assert_eq!(SourceId::PrecomputedReport.priority(), TrustPriority::High);
    }

    #[test]
    fn trust_priority_is_ordered() {
        assert!(TrustPriority::Low < TrustPriority::Medium);
        assert!(TrustPriority::Medium < TrustPriority::High);
    }

    #[test]
    fn all_lists_six_strategies() {
        assert_eq!(SourceId::all().len(), 6);
    }

    #[test]
    fn not_found_record_is_indeterminate() {
        let record = ComplianceRecord::not_found(
            PolicyId::new("pol-1").unwrap(),
            SourceId::PaginatedScan,
        );
        assert!(!record.state.is_determinate());
        assert!(record.raw.is_null());
        assert!(record.observed_at.is_none());
    }

    #[test]
    fn source_id_serde_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&SourceId::DeviceFilteredQuery).unwrap(),
            "\"device_filtered_query\""
        );
    }
}
