//! # The Six Query Strategies
//!
//! One adapter per backend API shape. Each wraps the shared
//! [`BackendTransport`] and normalizes its shape's answer into a
//! [`ComplianceRecord`] at the boundary.
//!
//! ## Trust Priorities (declared, not tuned)
//!
//! | Strategy                | Priority | Weakness                           |
//! |-------------------------|----------|------------------------------------|
//! | `DisplayNameMatch`      | low      | name collisions, first-match       |
//! | `PolicyIdMatch`         | medium   | listing completeness               |
//! | `DeviceFilteredQuery`   | high     | —                                  |
//! | `PaginatedScan`         | high     | ambiguous when exhausted           |
//! | `PerSettingAggregation` | medium   | derived from partial data          |
//! | `PrecomputedReport`     | high     | reporting latency                  |

use std::sync::Arc;

use async_trait::async_trait;

use polaris_core::{ComplianceState, DeviceId};
use polaris_targeting::{Policy, PolicyKind};

use crate::error::SourceError;
use crate::normalize::{extract_observed_at, extract_state};
use crate::record::{ComplianceRecord, SourceId};
use crate::source::ComplianceSource;
use crate::transport::BackendTransport;

/// Page ceiling for the unfiltered scan. A tenant-wide device-status
/// collection can run to thousands of pages; past this many the scan
/// stops and reports `NotFound` rather than hammering the backend.
pub const MAX_SCAN_PAGES: usize = 50;

fn transport_err(source: SourceId) -> impl FnOnce(crate::transport::TransportError) -> SourceError {
    move |cause| SourceError::Transport { source, cause }
}

fn normalized(
    policy: &Policy,
    source: SourceId,
    raw: serde_json::Value,
) -> Result<ComplianceRecord, SourceError> {
    let state = extract_state(&raw).ok_or_else(|| SourceError::Malformed {
        source,
        detail: "record carries no recognizable state field".to_string(),
    })?;
    Ok(ComplianceRecord {
        policy_id: policy.id.clone(),
        source,
        state,
        observed_at: extract_observed_at(&raw),
        raw,
    })
}

/// Strategy 1 — match the per-device listing by policy display name.
///
/// First-match semantics over a non-unique name make this the least
/// trustworthy shape; it exists because some backend object types are only
/// reachable by name in the listing.
pub struct DisplayNameMatchSource {
    transport: Arc<dyn BackendTransport>,
}

impl DisplayNameMatchSource {
    /// Build over the shared transport.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ComplianceSource for DisplayNameMatchSource {
    fn source_id(&self) -> SourceId {
        SourceId::DisplayNameMatch
    }

    async fn fetch(
        &self,
        device_id: &DeviceId,
        policy: &Policy,
    ) -> Result<ComplianceRecord, SourceError> {
        let listing = self
            .transport
            .list_policy_states(device_id)
            .await
            .map_err(transport_err(self.source_id()))?;

        // First match wins, as the backend lookup behaves.
        let hit = listing.into_iter().find(|record| {
            record
                .get("displayName")
                .and_then(|v| v.as_str())
                .is_some_and(|name| name == policy.display_name)
        });

        match hit {
            Some(raw) => normalized(policy, self.source_id(), raw),
            None => Ok(ComplianceRecord::not_found(
                policy.id.clone(),
                self.source_id(),
            )),
        }
    }
}

/// Strategy 2 — match the same listing by opaque policy id.
///
/// Immune to name collisions but still subject to listing completeness.
pub struct PolicyIdMatchSource {
    transport: Arc<dyn BackendTransport>,
}

impl PolicyIdMatchSource {
    /// Build over the shared transport.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ComplianceSource for PolicyIdMatchSource {
    fn source_id(&self) -> SourceId {
        SourceId::PolicyIdMatch
    }

    async fn fetch(
        &self,
        device_id: &DeviceId,
        policy: &Policy,
    ) -> Result<ComplianceRecord, SourceError> {
        let listing = self
            .transport
            .list_policy_states(device_id)
            .await
            .map_err(transport_err(self.source_id()))?;

        let hit = listing.into_iter().find(|record| {
            ["policyId", "id"].iter().any(|key| {
                record
                    .get(key)
                    .and_then(|v| v.as_str())
                    .is_some_and(|id| id == policy.id.as_str())
            })
        });

        match hit {
            Some(raw) => normalized(policy, self.source_id(), raw),
            None => Ok(ComplianceRecord::not_found(
                policy.id.clone(),
                self.source_id(),
            )),
        }
    }
}

/// Strategy 3 — the per-policy device-status collection, filtered
/// server-side to the device. Authoritative when the backend holds a
/// record.
pub struct DeviceFilteredQuerySource {
    transport: Arc<dyn BackendTransport>,
}

impl DeviceFilteredQuerySource {
    /// Build over the shared transport.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ComplianceSource for DeviceFilteredQuerySource {
    fn source_id(&self) -> SourceId {
        SourceId::DeviceFilteredQuery
    }

    async fn fetch(
        &self,
        device_id: &DeviceId,
        policy: &Policy,
    ) -> Result<ComplianceRecord, SourceError> {
        let hit = self
            .transport
            .device_status_filtered(&policy.id, device_id)
            .await
            .map_err(transport_err(self.source_id()))?;

        match hit {
            Some(raw) => normalized(policy, self.source_id(), raw),
            None => Ok(ComplianceRecord::not_found(
                policy.id.clone(),
                self.source_id(),
            )),
        }
    }
}

/// Strategy 4 — the same authoritative collection scanned page by page
/// without server-side filtering, bounded by [`MAX_SCAN_PAGES`].
///
/// Functionally equivalent to [`DeviceFilteredQuerySource`] when it
/// terminates with a match. Exhaustion is ambiguous — "not evaluated yet"
/// and "backend gap" look identical — so an exhausted scan yields
/// `NotFound`, which the reconciler excludes from the consensus vote.
pub struct PaginatedScanSource {
    transport: Arc<dyn BackendTransport>,
    max_pages: usize,
}

impl PaginatedScanSource {
    /// Build over the shared transport with the default page ceiling.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self::with_page_ceiling(transport, MAX_SCAN_PAGES)
    }

    /// Build with an explicit page ceiling (tests, constrained tenants).
    pub fn with_page_ceiling(transport: Arc<dyn BackendTransport>, max_pages: usize) -> Self {
        Self {
            transport,
            max_pages: max_pages.max(1),
        }
    }
}

#[async_trait]
impl ComplianceSource for PaginatedScanSource {
    fn source_id(&self) -> SourceId {
        SourceId::PaginatedScan
    }

    async fn fetch(
        &self,
        device_id: &DeviceId,
        policy: &Policy,
    ) -> Result<ComplianceRecord, SourceError> {
        for page in 0..self.max_pages {
            let status_page = self
                .transport
                .device_status_page(&policy.id, page)
                .await
                .map_err(transport_err(self.source_id()))?;

            let hit = status_page.items.into_iter().find(|record| {
                record
                    .get("deviceId")
                    .and_then(|v| v.as_str())
                    .is_some_and(|id| id == device_id.as_str())
            });

            if let Some(raw) = hit {
                return normalized(policy, self.source_id(), raw);
            }
            if !status_page.has_more {
                return Ok(ComplianceRecord::not_found(
                    policy.id.clone(),
                    self.source_id(),
                ));
            }
        }

        tracing::warn!(
            policy_id = %policy.id,
            device_id = %device_id,
            max_pages = self.max_pages,
            "paginated scan hit page ceiling without finding the device"
        );
        Ok(ComplianceRecord::not_found(
            policy.id.clone(),
            self.source_id(),
        ))
    }
}

/// Strategy 5 — derive an overall-policy verdict from per-setting states.
///
/// Aggregation order: `NonCompliant` if any setting is non-compliant;
/// else `Error` if any errored; else `Conflict`, `Unknown`,
/// `NotApplicable` in that order; else `Compliant`.
///
/// Only compliance policies and configuration profiles carry per-setting
/// states in the backend.
pub struct PerSettingAggregationSource {
    transport: Arc<dyn BackendTransport>,
}

impl PerSettingAggregationSource {
    /// Build over the shared transport.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }

    fn aggregate(states: &[ComplianceState]) -> ComplianceState {
        for candidate in [
            ComplianceState::NonCompliant,
            ComplianceState::Error,
            ComplianceState::Conflict,
            ComplianceState::Unknown,
            ComplianceState::NotApplicable,
        ] {
            if states.contains(&candidate) {
                return candidate;
            }
        }
        ComplianceState::Compliant
    }
}

#[async_trait]
impl ComplianceSource for PerSettingAggregationSource {
    fn source_id(&self) -> SourceId {
        SourceId::PerSettingAggregation
    }

    fn supports(&self, kind: PolicyKind) -> bool {
        matches!(kind, PolicyKind::Compliance | PolicyKind::Configuration)
    }

    async fn fetch(
        &self,
        device_id: &DeviceId,
        policy: &Policy,
    ) -> Result<ComplianceRecord, SourceError> {
        let settings = self
            .transport
            .setting_states(&policy.id, device_id)
            .await
            .map_err(transport_err(self.source_id()))?;

        if settings.is_empty() {
            return Ok(ComplianceRecord::not_found(
                policy.id.clone(),
                self.source_id(),
            ));
        }

        let states = settings
            .iter()
            .map(|record| {
                extract_state(record).ok_or_else(|| SourceError::Malformed {
                    source: self.source_id(),
                    detail: "setting record carries no recognizable state field".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let observed_at = settings.iter().find_map(extract_observed_at);

        Ok(ComplianceRecord {
            policy_id: policy.id.clone(),
            source: self.source_id(),
            state: Self::aggregate(&states),
            observed_at,
            raw: serde_json::Value::Array(settings),
        })
    }
}

/// Strategy 6 — the backend-maintained rollup report filtered to the
/// device. Fastest and authoritative when present, but refreshed on the
/// backend's reporting cadence, so it may lag real-time state.
///
/// The rollup only exists for compliance policies.
pub struct PrecomputedReportSource {
    transport: Arc<dyn BackendTransport>,
}

impl PrecomputedReportSource {
    /// Build over the shared transport.
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ComplianceSource for PrecomputedReportSource {
    fn source_id(&self) -> SourceId {
        SourceId::PrecomputedReport
    }

    fn supports(&self, kind: PolicyKind) -> bool {
        matches!(kind, PolicyKind::Compliance)
    }

    async fn fetch(
        &self,
        device_id: &DeviceId,
        policy: &Policy,
    ) -> Result<ComplianceRecord, SourceError> {
        let rows = self
            .transport
            .report_rows(&policy.id, device_id)
            .await
            .map_err(transport_err(self.source_id()))?;

        match rows.into_iter().next() {
            Some(raw) => normalized(policy, self.source_id(), raw),
            None => Ok(ComplianceRecord::not_found(
                policy.id.clone(),
                self.source_id(),
            )),
        }
    }
}

/// The full standard registry: all six strategies over one shared
/// transport.
pub fn standard_sources(transport: Arc<dyn BackendTransport>) -> Vec<Arc<dyn ComplianceSource>> {
    vec![
        Arc::new(DisplayNameMatchSource::new(transport.clone())),
        Arc::new(PolicyIdMatchSource::new(transport.clone())),
        Arc::new(DeviceFilteredQuerySource::new(transport.clone())),
        Arc::new(PaginatedScanSource::new(transport.clone())),
        Arc::new(PerSettingAggregationSource::new(transport.clone())),
        Arc::new(PrecomputedReportSource::new(transport)),
    ]
}
