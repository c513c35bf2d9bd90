//! # Compliance Source Trait
//!
//! One [`ComplianceSource`] per backend query strategy. The trait is
//! object-safe so the engine can hold a heterogeneous registry behind
//! `Arc<dyn ComplianceSource>` and fan fetches out across tasks.

use async_trait::async_trait;

use polaris_core::DeviceId;
use polaris_targeting::{Policy, PolicyKind};

use crate::error::SourceError;
use crate::record::{ComplianceRecord, SourceId, TrustPriority};

/// One backend query strategy for a device's compliance against a policy.
///
/// Contract: `fetch` must resolve to a terminal [`ComplianceRecord`]
/// (`NotFound` when the strategy completed with nothing to say) or a
/// [`SourceError`] — it never leaves the call unresolved. Internal
/// pagination is the adapter's business, bounded where unfiltered.
#[async_trait]
pub trait ComplianceSource: Send + Sync {
    /// Which strategy this is.
    fn source_id(&self) -> SourceId;

    /// The strategy's declared trust priority.
    fn priority(&self) -> TrustPriority {
        self.source_id().priority()
    }

    /// Whether this strategy exists for the given policy kind. Some API
    /// shapes only exist for some management object types.
    fn supports(&self, kind: PolicyKind) -> bool {
        let _ = kind;
        true
    }

    /// Query the backend for this device's compliance against the policy
    /// and normalize the answer.
    async fn fetch(
        &self,
        device_id: &DeviceId,
        policy: &Policy,
    ) -> Result<ComplianceRecord, SourceError>;
}
