//! # Policy Catalog
//!
//! Holds every policy of every kind fetched from the backend for the run,
//! and applies the targeting evaluator across all of them to produce the
//! targeted subset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use polaris_core::RunContext;

use crate::evaluator::{self, TargetingResult};
use crate::filters::AssignmentFilterCatalog;
use crate::membership::GroupMembershipSet;
use crate::model::{Policy, PolicyKind};

/// All policies fetched for the run, across every policy kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyCatalog {
    policies: Vec<Policy>,
}

impl PolicyCatalog {
    /// Build the catalog from already-fetched policy records.
    pub fn from_policies(policies: Vec<Policy>) -> Self {
        Self { policies }
    }

    /// Iterate all policies.
    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    /// Number of policies in the catalog.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Group policies by kind, preserving fetch order within each kind.
    pub fn by_kind(&self) -> HashMap<PolicyKind, Vec<&Policy>> {
        let mut grouped: HashMap<PolicyKind, Vec<&Policy>> = HashMap::new();
        for policy in &self.policies {
            grouped.entry(policy.kind).or_default().push(policy);
        }
        grouped
    }

    /// Evaluate targeting for every policy and retain only those actually
    /// targeted at the device — status neither `"Not Targeted"` nor
    /// `"Excluded"`.
    pub fn filter_targeted(
        &self,
        memberships: &GroupMembershipSet,
        filters: &AssignmentFilterCatalog,
        ctx: &RunContext,
    ) -> Vec<(Policy, TargetingResult)> {
        self.policies
            .iter()
            .filter_map(|policy| {
                let result = evaluator::evaluate(policy, memberships, filters, ctx);
                if result.is_targeted() {
                    Some((policy.clone(), result))
                } else {
                    tracing::debug!(
                        policy_id = %policy.id,
                        status = %result.status,
                        "policy filtered out of targeted set"
                    );
                    None
                }
            })
            .collect()
    }
}
