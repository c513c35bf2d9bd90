//! # polaris-sources — Compliance Query Strategies
//!
//! The management backend exposes a device's compliance state through
//! several API shapes that frequently disagree: a per-device listing
//! matchable by display name or id, a per-policy device-status collection
//! (filtered or paginated), per-setting states, and a precomputed rollup
//! report. The diagnostic origin of this stack queried all of them and
//! compared the answers by eye; this crate formalizes each shape as a
//! [`ComplianceSource`] with a declared trust priority so reconciliation
//! is a reusable rule instead of a one-off script.
//!
//! ## Boundary Normalization
//!
//! Backend status text is normalized into
//! [`ComplianceState`](polaris_core::ComplianceState) exactly once, here.
//! Nothing downstream ever matches on status strings.
//!
//! ## Transport
//!
//! HTTP, authentication, and pagination mechanics are external
//! collaborators behind the [`BackendTransport`] trait. Every `fetch`
//! resolves to a terminal record or a [`SourceError`] — never an
//! unresolved call.

pub mod error;
pub mod normalize;
pub mod record;
pub mod snapshot;
pub mod source;
pub mod strategies;
pub mod transport;

pub use error::SourceError;
pub use record::{ComplianceRecord, SourceId, TrustPriority};
pub use snapshot::{SnapshotTransport, SourceSnapshot};
pub use source::ComplianceSource;
pub use strategies::{
    standard_sources, DeviceFilteredQuerySource, DisplayNameMatchSource, PaginatedScanSource,
    PerSettingAggregationSource, PolicyIdMatchSource, PrecomputedReportSource,
};
pub use transport::{BackendTransport, StatusPage, TransportError};
