//! # Snapshot Replay Transport
//!
//! Polaris runs on one fully-fetched snapshot per audit. For offline
//! debugging and tests, a captured snapshot of the backend's raw responses
//! can stand in for the live transport: [`SnapshotTransport`] replays a
//! [`SourceSnapshot`] through the [`BackendTransport`] seam, including
//! page-by-page replay of the unfiltered device-status collection.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use polaris_core::{DeviceId, PolicyId};

use crate::transport::{BackendTransport, StatusPage, TransportError};

fn default_page_size() -> usize {
    25
}

/// Captured raw backend responses, keyed the way the strategies query them.
///
/// All values are raw backend JSON, exactly as the capture saw them —
/// camelCase keys and free-text status vocabulary included. Normalization
/// happens in the adapters, same as against a live backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSnapshot {
    /// The per-device compliance-policy listing.
    #[serde(default)]
    pub policy_states: Vec<serde_json::Value>,
    /// Per-policy device-status collections, keyed by policy id.
    #[serde(default)]
    pub device_statuses: HashMap<String, Vec<serde_json::Value>>,
    /// Per-policy per-setting state records, keyed by policy id.
    #[serde(default)]
    pub setting_states: HashMap<String, Vec<serde_json::Value>>,
    /// Per-policy rollup report rows, keyed by policy id.
    #[serde(default)]
    pub report_rows: HashMap<String, Vec<serde_json::Value>>,
    /// Page size used when replaying the unfiltered scan.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SourceSnapshot {
    fn default() -> Self {
        Self {
            policy_states: Vec::new(),
            device_statuses: HashMap::new(),
            setting_states: HashMap::new(),
            report_rows: HashMap::new(),
            page_size: default_page_size(),
        }
    }
}

/// Replays a [`SourceSnapshot`] through the transport seam.
#[derive(Debug, Clone)]
pub struct SnapshotTransport {
    snapshot: SourceSnapshot,
}

impl SnapshotTransport {
    /// Wrap a captured snapshot.
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self { snapshot }
    }

    fn statuses_for(&self, policy_id: &PolicyId) -> &[serde_json::Value] {
        self.snapshot
            .device_statuses
            .get(policy_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn matches_device(record: &serde_json::Value, device_id: &DeviceId) -> bool {
    record
        .get("deviceId")
        .and_then(|v| v.as_str())
        .is_some_and(|id| id == device_id.as_str())
}

#[async_trait]
impl BackendTransport for SnapshotTransport {
    async fn list_policy_states(
        &self,
        _device_id: &DeviceId,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        Ok(self.snapshot.policy_states.clone())
    }

    async fn device_status_filtered(
        &self,
        policy_id: &PolicyId,
        device_id: &DeviceId,
    ) -> Result<Option<serde_json::Value>, TransportError> {
        Ok(self
            .statuses_for(policy_id)
            .iter()
            .find(|record| matches_device(record, device_id))
            .cloned())
    }

    async fn device_status_page(
        &self,
        policy_id: &PolicyId,
        page: usize,
    ) -> Result<StatusPage, TransportError> {
        let statuses = self.statuses_for(policy_id);
        let page_size = self.snapshot.page_size.max(1);
        let start = page.saturating_mul(page_size);
        let end = (start + page_size).min(statuses.len());
        let items = if start < statuses.len() {
            statuses[start..end].to_vec()
        } else {
            Vec::new()
        };
        Ok(StatusPage {
            items,
            has_more: end < statuses.len(),
        })
    }

    async fn setting_states(
        &self,
        policy_id: &PolicyId,
        device_id: &DeviceId,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        Ok(self
            .snapshot
            .setting_states
            .get(policy_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            // Captures may mix devices; keep records without a deviceId
            // key since single-device captures often omit it.
            .filter(|record| record.get("deviceId").is_none() || matches_device(record, device_id))
            .cloned()
            .collect())
    }

    async fn report_rows(
        &self,
        policy_id: &PolicyId,
        device_id: &DeviceId,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        Ok(self
            .snapshot
            .report_rows
            .get(policy_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter(|record| record.get("deviceId").is_none() || matches_device(record, device_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device() -> DeviceId {
        DeviceId::new("dev-1").unwrap()
    }

    fn policy() -> PolicyId {
        PolicyId::new("pol-1").unwrap()
    }

    #[tokio::test]
    async fn filtered_lookup_finds_matching_device() {
        let mut snapshot = SourceSnapshot::default();
        snapshot.device_statuses.insert(
            "pol-1".to_string(),
            vec![
                json!({"deviceId": "dev-other", "state": "compliant"}),
                json!({"deviceId": "dev-1", "state": "nonCompliant"}),
            ],
        );
        let transport = SnapshotTransport::new(snapshot);
        let found = transport
            .device_status_filtered(&policy(), &device())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["state"], "nonCompliant");
    }

    #[tokio::test]
    async fn filtered_lookup_returns_none_for_absent_device() {
        let transport = SnapshotTransport::new(SourceSnapshot::default());
        let found = transport
            .device_status_filtered(&policy(), &device())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn pagination_chunks_and_reports_has_more() {
        let mut snapshot = SourceSnapshot {
            page_size: 2,
            ..SourceSnapshot::default()
        };
        snapshot.device_statuses.insert(
            "pol-1".to_string(),
            (0..5)
                .map(|i| json!({"deviceId": format!("dev-{i}"), "state": "compliant"}))
                .collect(),
        );
        let transport = SnapshotTransport::new(snapshot);

        let first = transport.device_status_page(&policy(), 0).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.has_more);

        let last = transport.device_status_page(&policy(), 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);

        let past_end = transport.device_status_page(&policy(), 3).await.unwrap();
        assert!(past_end.items.is_empty());
        assert!(!past_end.has_more);
    }

    #[tokio::test]
    async fn setting_states_keep_records_without_device_key() {
        let mut snapshot = SourceSnapshot::default();
        snapshot.setting_states.insert(
            "pol-1".to_string(),
            vec![
                json!({"settingName": "bitlocker", "state": "compliant"}),
                json!({"deviceId": "dev-other", "settingName": "firewall", "state": "error"}),
            ],
        );
        let transport = SnapshotTransport::new(snapshot);
        let settings = transport.setting_states(&policy(), &device()).await.unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0]["settingName"], "bitlocker");
    }
}
