//! # polaris-engine — Audit Orchestration
//!
//! Runs one full audit: targeting evaluation for every policy in the
//! catalog, bounded-concurrency compliance fetches across the source
//! registry for the targeted subset, cross-source reconciliation, and
//! assembly into an [`AuditReport`].
//!
//! ## Partial Results Over No Results
//!
//! A source that fails, times out, or is cancelled contributes a
//! [`SourceGap`] instead of a reading. Gaps are absences, never
//! `NotFound`: a strategy that did not answer must not vote, and must not
//! be confused with a strategy that answered "nothing there". The report
//! is always produced, marked incomplete where evidence is missing.

#![deny(missing_docs)]

mod report;
mod runner;

pub use report::{AuditReport, AuditSummary, GapReason, PolicyAudit, SourceGap};
pub use runner::{run_audit, AuditOptions};
