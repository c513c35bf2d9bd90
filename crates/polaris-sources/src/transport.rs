//! # Backend Transport Seam
//!
//! HTTP, session management, throttling, and page-token mechanics belong
//! to an external collaborator. [`BackendTransport`] is the seam: five
//! call shapes returning raw backend JSON, one per query-strategy family.
//! Implementations include the live HTTP client (out of this repository's
//! scope) and [`SnapshotTransport`](crate::snapshot::SnapshotTransport),
//! which replays a captured snapshot for offline audits and tests.

use async_trait::async_trait;
use thiserror::Error;

use polaris_core::{DeviceId, PolicyId};

/// Failure of a transport-level backend call.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The backend rejected or failed the call.
    #[error("backend call failed: {detail}")]
    Backend {
        /// Status or diagnostic text from the collaborator.
        detail: String,
    },

    /// The snapshot or live payload could not be decoded as JSON.
    #[error("payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One page of a per-policy device-status collection.
#[derive(Debug, Clone, Default)]
pub struct StatusPage {
    /// Raw per-device status records on this page.
    pub items: Vec<serde_json::Value>,
    /// Whether the backend reports more pages after this one.
    pub has_more: bool,
}

/// The backend call shapes the compliance strategies consume.
///
/// Every method returns raw `serde_json::Value` material; shape validation
/// and state normalization happen in the adapters, at the boundary.
/// Implementations must be `Send + Sync` so adapters can share one
/// transport behind an `Arc` across concurrent fetch tasks.
#[async_trait]
pub trait BackendTransport: Send + Sync {
    /// The per-device compliance-policy listing. Used by the display-name
    /// and policy-id match strategies.
    async fn list_policy_states(
        &self,
        device_id: &DeviceId,
    ) -> Result<Vec<serde_json::Value>, TransportError>;

    /// The per-policy device-status collection, filtered server-side to
    /// one device. `None` when the backend holds no record.
    async fn device_status_filtered(
        &self,
        policy_id: &PolicyId,
        device_id: &DeviceId,
    ) -> Result<Option<serde_json::Value>, TransportError>;

    /// One page of the per-policy device-status collection, unfiltered.
    /// `page` is zero-based; pagination tokens are a collaborator concern.
    async fn device_status_page(
        &self,
        policy_id: &PolicyId,
        page: usize,
    ) -> Result<StatusPage, TransportError>;

    /// Per-setting state records for one policy on one device.
    async fn setting_states(
        &self,
        policy_id: &PolicyId,
        device_id: &DeviceId,
    ) -> Result<Vec<serde_json::Value>, TransportError>;

    /// Rows of the backend-maintained rollup report, filtered to the
    /// device.
    async fn report_rows(
        &self,
        policy_id: &PolicyId,
        device_id: &DeviceId,
    ) -> Result<Vec<serde_json::Value>, TransportError>;
}
