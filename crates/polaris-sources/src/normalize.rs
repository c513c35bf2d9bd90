//! # Boundary Normalization
//!
//! The backend reports compliance status as free text whose casing and
//! vocabulary vary by API shape (`"compliant"`, `"Compliant"`,
//! `"noncompliant"`, `"nonCompliant"`, `"error"`, …). This module turns
//! that text into the closed [`ComplianceState`] enumeration exactly once.
//! Downstream code never inspects status strings.

use chrono::{DateTime, Utc};

use polaris_core::ComplianceState;

/// Normalize a backend status string into a [`ComplianceState`].
///
/// Unrecognized vocabulary maps to `Unknown` rather than an error: the
/// reading still exists, the backend just classified it with a term this
/// version does not know. A warning is logged so new vocabulary surfaces
/// in diagnostics.
pub fn parse_state(raw: &str) -> ComplianceState {
    match raw.trim().to_ascii_lowercase().as_str() {
        "compliant" => ComplianceState::Compliant,
        "noncompliant" | "non_compliant" | "non-compliant" => ComplianceState::NonCompliant,
        "error" => ComplianceState::Error,
        "conflict" => ComplianceState::Conflict,
        "unknown" | "inprogress" | "in_progress" | "pending" => ComplianceState::Unknown,
        "notapplicable" | "not_applicable" | "not-applicable" => ComplianceState::NotApplicable,
        "notassigned" | "not_assigned" => ComplianceState::NotFound,
        other => {
            tracing::warn!(status = other, "unrecognized backend status vocabulary");
            ComplianceState::Unknown
        }
    }
}

/// Pull the status string out of a raw backend record.
///
/// Different shapes use different keys; the known ones are tried in order.
pub fn extract_state(record: &serde_json::Value) -> Option<ComplianceState> {
    const STATE_KEYS: [&str; 3] = ["state", "status", "complianceState"];
    STATE_KEYS
        .iter()
        .find_map(|key| record.get(key).and_then(|v| v.as_str()))
        .map(parse_state)
}

/// Pull the observation timestamp out of a raw backend record, when the
/// shape carries one. Unparseable timestamps are dropped, not fatal.
pub fn extract_observed_at(record: &serde_json::Value) -> Option<DateTime<Utc>> {
    const TIME_KEYS: [&str; 2] = ["lastReportedDateTime", "reportedDateTime"];
    TIME_KEYS
        .iter()
        .find_map(|key| record.get(key).and_then(|v| v.as_str()))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
