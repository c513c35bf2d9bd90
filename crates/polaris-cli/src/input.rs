//! # Audit Snapshot Loading
//!
//! Polaris audits run offline against one captured snapshot: everything
//! the backend said about the device, bundled into a single JSON file.
//! This module owns the file format and turns it into the in-memory
//! inputs the engine consumes.
//!
//! ## Format
//!
//! ```json
//! {
//!   "device_id": "dev-1",
//!   "groups": [{"id": "g1", "display_name": "Finance"}],
//!   "filters": [{"id": "f1", "display_name": "Corp laptops",
//!                "platform": "windows", "rule": "(device.model -eq \"X\")"}],
//!   "policies": [{"id": "pol-1", "display_name": "Baseline",
//!                 "platform": "windows", "kind": "compliance",
//!                 "assignments": [{"target": {"kind": "all_devices"}}]}],
//!   "sources": { "policy_states": [], "device_statuses": {},
//!                "setting_states": {}, "report_rows": {} }
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use polaris_core::DeviceId;
use polaris_sources::SourceSnapshot;
use polaris_targeting::{
    AssignmentFilter, AssignmentFilterCatalog, Group, GroupMembershipSet, Policy, PolicyCatalog,
};

/// One captured audit input bundle, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSnapshot {
    /// The device under audit.
    pub device_id: DeviceId,
    /// The device's group memberships at capture time.
    #[serde(default)]
    pub groups: Vec<Group>,
    /// The tenant's assignment filters.
    #[serde(default)]
    pub filters: Vec<AssignmentFilter>,
    /// Every policy fetched for the run, across all kinds.
    #[serde(default)]
    pub policies: Vec<Policy>,
    /// Raw backend responses for the compliance sources to replay.
    #[serde(default)]
    pub sources: SourceSnapshot,
}

impl AuditSnapshot {
    /// The membership set the evaluator consumes.
    pub fn memberships(&self) -> GroupMembershipSet {
        GroupMembershipSet::from_groups(self.groups.iter().cloned())
    }

    /// The filter catalog the evaluator consumes.
    pub fn filter_catalog(&self) -> AssignmentFilterCatalog {
        AssignmentFilterCatalog::from_filters(self.filters.iter().cloned())
    }

    /// The policy catalog the engine iterates.
    pub fn policy_catalog(&self) -> PolicyCatalog {
        PolicyCatalog::from_policies(self.policies.clone())
    }
}

/// Load and parse a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<AuditSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot: AuditSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        policies = snapshot.policies.len(),
        groups = snapshot.groups.len(),
        filters = snapshot.filters.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "device_id": "dev-1",
        "groups": [{"id": "g1", "display_name": "Finance"}],
        "policies": [{
            "id": "pol-1",
            "display_name": "Baseline",
            "platform": "windows",
            "kind": "compliance",
            "assignments": [{"target": {"kind": "all_devices"}}]
        }],
        "sources": {
            "policy_states": [{"policyId": "pol-1", "state": "compliant"}]
        }
    }"#;

    #[test]
    fn sample_snapshot_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.device_id.as_str(), "dev-1");
        assert_eq!(snapshot.policies.len(), 1);
        assert_eq!(snapshot.memberships().len(), 1);
        assert!(snapshot.filter_catalog().is_empty());
        assert_eq!(snapshot.sources.policy_states.len(), 1);
    }

    #[test]
    fn missing_file_is_a_context_error() {
        let err = load_snapshot(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read snapshot"));
    }

    #[test]
    fn malformed_json_is_a_context_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse snapshot"));
    }

    #[test]
    fn empty_sections_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"device_id": "dev-1"}"#).unwrap();
        let snapshot = load_snapshot(file.path()).unwrap();
        assert!(snapshot.policies.is_empty());
        assert!(snapshot.groups.is_empty());
        assert!(snapshot.sources.policy_states.is_empty());
    }
}
