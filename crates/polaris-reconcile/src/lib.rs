//! # polaris-reconcile
//!
//! Cross-source reconciliation: collapse the readings the query
//! strategies produced for one policy into a single verdict with an
//! explicit confidence grade.
//!
//! ## Consensus Rules
//!
//! Only determinate readings vote — `NotFound` means "this strategy had
//! nothing to say", not "non-compliant", and it never outvotes a real
//! reading. When determinate readings disagree, the highest trust
//! priority wins; a tie at the same priority resolves fail-safe to the
//! worst state, because surfacing a possible problem beats hiding one.
//! Disagreement always caps confidence at low and leaves the dissenting
//! readings visible in the verdict.

#![deny(missing_docs)]

mod verdict;

pub use verdict::{reconcile, Confidence, ReconciledVerdict};
