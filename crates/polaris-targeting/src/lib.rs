//! # polaris-targeting — Assignment Resolution
//!
//! Answers the question administrators actually ask: *which policies are
//! targeted at this device, and why?* Given a device's group memberships,
//! the assignment-filter catalog, and a policy's assignment rules, the
//! evaluator produces a deterministic [`TargetingResult`] with
//! human-readable provenance for every match.
//!
//! ## Architecture
//!
//! ```text
//! snapshot data          this crate                   downstream
//! memberships  ───►  GroupMembershipSet  ─┐
//! filter list  ───►  AssignmentFilterCatalog ─►  TargetingEvaluator ─► TargetingResult
//! policy list  ───►  PolicyCatalog  ──────┘          (pure)
//! ```
//!
//! Evaluation is pure and order-independent: any permutation of a policy's
//! assignment list yields an identical result, and an `ExcludeGroup` match
//! is terminal regardless of scan order.

pub mod catalog;
pub mod evaluator;
pub mod filters;
pub mod membership;
pub mod model;

pub use catalog::PolicyCatalog;
pub use evaluator::{evaluate, TargetingResult, STATUS_EXCLUDED, STATUS_NOT_TARGETED};
pub use filters::AssignmentFilterCatalog;
pub use membership::GroupMembershipSet;
pub use model::{
    Assignment, AssignmentFilter, AssignmentTarget, FilterMode, Group, Platform, Policy,
    PolicyKind,
};
