//! # Targeting Evaluator
//!
//! Pure, order-independent evaluation of one policy's assignment rules
//! against a device's membership snapshot.
//!
//! ## Invariants
//!
//! - **Order independence**: any permutation of the assignment list yields
//!   an identical [`TargetingResult`]. Matched group names are sorted by
//!   display name before joining, and the applied-filter pick is
//!   deterministic.
//! - **Exclusion dominance**: one matching `ExcludeGroup` assignment makes
//!   the final status `"Excluded"` no matter how many include rules also
//!   match.
//! - **Unknown-reference tolerance**: a dangling group or filter id skips
//!   that assignment's contribution and records exactly one
//!   [`DataIntegrityWarning`](polaris_core::DataIntegrityWarning) — never
//!   a crash.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use polaris_core::{DataIntegrityWarning, IntegrityWarningKind, RunContext};

use crate::filters::AssignmentFilterCatalog;
use crate::membership::GroupMembershipSet;
use crate::model::{AssignmentFilter, AssignmentTarget, Policy};

/// Status string for a policy none of whose assignments match the device.
pub const STATUS_NOT_TARGETED: &str = "Not Targeted";

/// Status string for a policy excluded from the device by a group match.
pub const STATUS_EXCLUDED: &str = "Excluded";

/// Provenance label recorded for an `AllDevices` assignment.
const LABEL_ALL_DEVICES: &str = "All Devices";

/// Provenance label recorded for an `AllUsers` assignment.
const LABEL_ALL_USERS: &str = "All Licensed Users";

/// Prefix marking exclusion provenance on a matched group name.
const EXCLUDED_PREFIX: &str = "Excluded: ";

/// The outcome of evaluating one policy against one device.
///
/// Created fresh per evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingResult {
    /// Human-readable targeting status: `"Not Targeted"`, `"Excluded"`, or
    /// the comma-separated sorted list of matched provenance labels.
    pub status: String,
    /// Provenance of every match, sorted by display name. When the device
    /// is excluded, excluding group names carry the `"Excluded: "` prefix.
    pub matched_groups: Vec<String>,
    /// Whether an `ExcludeGroup` assignment matched the device.
    pub excluded: bool,
    /// Informational metadata: the assignment filter attached to a matching
    /// rule, resolved from the catalog. Does not alter the
    /// include/exclude decision — the filter's device-scoping is assumed
    /// already reflected upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_filter: Option<AssignmentFilter>,
}

impl TargetingResult {
    /// Whether the policy is actually targeted at the device: neither
    /// `"Not Targeted"` nor `"Excluded"`.
    pub fn is_targeted(&self) -> bool {
        !self.excluded && self.status != STATUS_NOT_TARGETED
    }
}

/// Evaluate one policy's assignments against the device snapshot.
///
/// Scans every assignment independent of list order:
///
/// - `AllDevices` records `"All Devices"`; `AllUsers` records
///   `"All Licensed Users"`.
/// - `IncludeGroup` whose group is in the membership set records the
///   group's display name.
/// - `ExcludeGroup` whose group is in the membership set marks the result
///   excluded — terminal and unconditional.
/// - A resolvable `filter_id` on any assignment attaches the filter as
///   informational metadata.
///
/// Dangling group/filter references are skipped with one data-integrity
/// warning each on `ctx`.
pub fn evaluate(
    policy: &Policy,
    memberships: &GroupMembershipSet,
    filters: &AssignmentFilterCatalog,
    ctx: &RunContext,
) -> TargetingResult {
    // BTreeSet gives the sorted, deduplicated join order for free and
    // keeps the result independent of assignment list order.
    let mut matched: BTreeSet<String> = BTreeSet::new();
    let mut excluded_by: BTreeSet<String> = BTreeSet::new();
    let mut applied_filter: Option<AssignmentFilter> = None;

    for assignment in &policy.assignments {
        let mut rule_matched = false;

        match &assignment.target {
            AssignmentTarget::AllDevices => {
                matched.insert(LABEL_ALL_DEVICES.to_string());
                rule_matched = true;
            }
            AssignmentTarget::AllUsers => {
                matched.insert(LABEL_ALL_USERS.to_string());
                rule_matched = true;
            }
            AssignmentTarget::IncludeGroup { group_id } => {
                if let Some(name) = memberships.display_name(group_id) {
                    matched.insert(name.to_string());
                    rule_matched = true;
                } else {
                    // The membership snapshot is the only group directory
                    // the core receives, so an id that does not resolve in
                    // it contributes nothing and is flagged.
                    ctx.warn_integrity(DataIntegrityWarning {
                        policy_id: policy.id.clone(),
                        kind: IntegrityWarningKind::DanglingGroup,
                        reference: group_id.as_str().to_string(),
                        detail: format!(
                            "assignment of policy \"{}\" includes unknown group {group_id}",
                            policy.display_name
                        ),
                    });
                }
            }
            AssignmentTarget::ExcludeGroup { group_id } => {
                if let Some(name) = memberships.display_name(group_id) {
                    excluded_by.insert(format!("{EXCLUDED_PREFIX}{name}"));
                    rule_matched = true;
                } else {
                    ctx.warn_integrity(DataIntegrityWarning {
                        policy_id: policy.id.clone(),
                        kind: IntegrityWarningKind::DanglingGroup,
                        reference: group_id.as_str().to_string(),
                        detail: format!(
                            "assignment of policy \"{}\" excludes unknown group {group_id}",
                            policy.display_name
                        ),
                    });
                }
            }
        }

        if let Some(filter_id) = &assignment.filter_id {
            match filters.get(filter_id) {
                Some(filter) => {
                    // Informational only. When several matching rules carry
                    // filters, keep the smallest (display name, id) pair so
                    // the pick is permutation-stable.
                    if rule_matched {
                        let replace = match &applied_filter {
                            Some(current) => {
                                (&filter.display_name, &filter.id)
                                    < (&current.display_name, &current.id)
                            }
                            None => true,
                        };
                        if replace {
                            applied_filter = Some(filter.clone());
                        }
                    }
                }
                None => {
                    ctx.warn_integrity(DataIntegrityWarning {
                        policy_id: policy.id.clone(),
                        kind: IntegrityWarningKind::DanglingFilter,
                        reference: filter_id.as_str().to_string(),
                        detail: format!(
                            "assignment of policy \"{}\" references unknown filter {filter_id}",
                            policy.display_name
                        ),
                    });
                }
            }
        }
    }

    if !excluded_by.is_empty() {
        // Exclusion is terminal. Keep both the exclusion provenance and
        // any include matches so the report shows what would have applied.
        let mut provenance: Vec<String> = excluded_by.into_iter().collect();
        provenance.extend(matched);
        provenance.sort();
        return TargetingResult {
            status: STATUS_EXCLUDED.to_string(),
            matched_groups: provenance,
            excluded: true,
            applied_filter,
        };
    }

    if matched.is_empty() {
        return TargetingResult {
            status: STATUS_NOT_TARGETED.to_string(),
            matched_groups: Vec::new(),
            excluded: false,
            applied_filter,
        };
    }

    let matched: Vec<String> = matched.into_iter().collect();
    TargetingResult {
        status: matched.join(", "),
        matched_groups: matched,
        excluded: false,
        applied_filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, FilterMode, Group, Platform, PolicyKind};
    use polaris_core::{DeviceId, FilterId, GroupId, PolicyId};

    fn ctx() -> RunContext {
        RunContext::new(DeviceId::new("dev-1").unwrap())
    }

    fn memberships(pairs: &[(&str, &str)]) -> GroupMembershipSet {
        GroupMembershipSet::from_groups(pairs.iter().map(|(id, name)| Group {
            id: GroupId::new(*id).unwrap(),
            display_name: name.to_string(),
        }))
    }

    fn include(group: &str) -> Assignment {
        Assignment::to_target(AssignmentTarget::IncludeGroup {
            group_id: GroupId::new(group).unwrap(),
        })
    }

    fn exclude(group: &str) -> Assignment {
        Assignment::to_target(AssignmentTarget::ExcludeGroup {
            group_id: GroupId::new(group).unwrap(),
        })
    }

    fn policy(assignments: Vec<Assignment>) -> Policy {
        Policy {
            id: PolicyId::new("pol-1").unwrap(),
            display_name: "Test Policy".to_string(),
            platform: Platform::Windows,
            kind: PolicyKind::Configuration,
            assignments,
        }
    }

    #[test]
    fn all_devices_targets_everything() {
        let p = policy(vec![Assignment::to_target(AssignmentTarget::AllDevices)]);
        let result = evaluate(&p, &memberships(&[]), &AssignmentFilterCatalog::default(), &ctx());
        assert_eq!(result.status, "All Devices");
        assert_eq!(result.matched_groups, vec!["All Devices"]);
        assert!(!result.excluded);
        assert!(result.is_targeted());
    }

    #[test]
    fn all_users_records_licensed_users_label() {
        let p = policy(vec![Assignment::to_target(AssignmentTarget::AllUsers)]);
        let result = evaluate(&p, &memberships(&[]), &AssignmentFilterCatalog::default(), &ctx());
        assert_eq!(result.status, "All Licensed Users");
    }

    #[test]
    fn exclusion_beats_include_regardless_of_order() {
        let m = memberships(&[("g1", "Finance"), ("g2", "Blocked")]);
        let forward = policy(vec![include("g1"), exclude("g2")]);
        let reversed = policy(vec![exclude("g2"), include("g1")]);
        for p in [forward, reversed] {
            let result = evaluate(&p, &m, &AssignmentFilterCatalog::default(), &ctx());
            assert_eq!(result.status, STATUS_EXCLUDED);
            assert!(result.excluded);
            assert!(!result.is_targeted());
            assert!(result
                .matched_groups
                .iter()
                .any(|g| g == "Excluded: Blocked"));
        }
    }

    #[test]
    fn matched_groups_sorted_by_display_name() {
        let m = memberships(&[("g1", "Finance"), ("g3", "Engineering")]);
        let p = policy(vec![include("g1"), include("g3")]);
        let result = evaluate(&p, &m, &AssignmentFilterCatalog::default(), &ctx());
        assert_eq!(result.matched_groups, vec!["Engineering", "Finance"]);
        assert_eq!(result.status, "Engineering, Finance");
    }

    #[test]
    fn no_match_yields_not_targeted() {
        let m = memberships(&[("g1", "Finance")]);
        let p = policy(vec![]);
        let result = evaluate(&p, &m, &AssignmentFilterCatalog::default(), &ctx());
        assert_eq!(result.status, STATUS_NOT_TARGETED);
        assert!(result.matched_groups.is_empty());
        assert!(!result.is_targeted());
    }

    #[test]
    fn unknown_group_is_skipped_with_one_warning() {
        let run = ctx();
        let m = memberships(&[("g1", "Finance")]);
        let p = policy(vec![include("g-missing"), include("g1")]);
        let result = evaluate(&p, &m, &AssignmentFilterCatalog::default(), &run);
        assert_eq!(result.status, "Finance");
        assert_eq!(run.warning_count(), 1);
        let warning = &run.warnings()[0];
        assert_eq!(warning.kind, IntegrityWarningKind::DanglingGroup);
        assert_eq!(warning.reference, "g-missing");
    }

    #[test]
    fn unknown_filter_is_skipped_with_one_warning() {
        let run = ctx();
        let mut a = Assignment::to_target(AssignmentTarget::AllDevices);
        a.filter_id = Some(FilterId::new("f-missing").unwrap());
        a.filter_mode = Some(FilterMode::Include);
        let p = policy(vec![a]);
        let result = evaluate(&p, &memberships(&[]), &AssignmentFilterCatalog::default(), &run);
        assert_eq!(result.status, "All Devices");
        assert!(result.applied_filter.is_none());
        assert_eq!(run.warning_count(), 1);
        assert_eq!(run.warnings()[0].kind, IntegrityWarningKind::DanglingFilter);
    }

    #[test]
    fn resolved_filter_attaches_as_metadata_only() {
        let filter = AssignmentFilter {
            id: FilterId::new("f1").unwrap(),
            display_name: "Corporate Surfaces".to_string(),
            platform: Platform::Windows,
            rule: "(device.model -eq \"Surface\")".to_string(),
        };
        let catalog = AssignmentFilterCatalog::from_filters([filter.clone()]);
        let mut a = Assignment::to_target(AssignmentTarget::AllDevices);
        a.filter_id = Some(FilterId::new("f1").unwrap());
        a.filter_mode = Some(FilterMode::Exclude);
        let p = policy(vec![a]);
        let result = evaluate(&p, &memberships(&[]), &catalog, &ctx());
        // Filter is informational: status is unaffected even in exclude mode.
        assert_eq!(result.status, "All Devices");
        assert_eq!(result.applied_filter, Some(filter));
    }

    #[test]
    fn duplicate_assignments_collapse() {
        let m = memberships(&[("g1", "Finance")]);
        let p = policy(vec![include("g1"), include("g1"), include("g1")]);
        let result = evaluate(&p, &m, &AssignmentFilterCatalog::default(), &ctx());
        assert_eq!(result.matched_groups, vec!["Finance"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Build an assignment pool covering every rule shape, then check
        /// the invariants hold for arbitrary permutations and subsets.
        fn assignment_pool() -> Vec<Assignment> {
            vec![
                Assignment::to_target(AssignmentTarget::AllDevices),
                Assignment::to_target(AssignmentTarget::AllUsers),
                include("g1"),
                include("g2"),
                include("g-missing"),
                exclude("g3"),
                exclude("g-other"),
            ]
        }

        fn sample_memberships() -> GroupMembershipSet {
            memberships(&[("g1", "Finance"), ("g2", "Engineering"), ("g3", "Blocked")])
        }

        proptest! {
            #[test]
            fn evaluation_is_order_independent(mut indices in proptest::collection::vec(0usize..7, 1..7)) {
                indices.sort_unstable();
                indices.dedup();
                let pool = assignment_pool();
                let chosen: Vec<Assignment> =
                    indices.iter().map(|&i| pool[i].clone()).collect();

                let mut permuted = chosen.clone();
                permuted.reverse();

                let m = sample_memberships();
                let catalog = AssignmentFilterCatalog::default();
                let a = evaluate(&policy(chosen), &m, &catalog, &ctx());
                let b = evaluate(&policy(permuted), &m, &catalog, &ctx());
                prop_assert_eq!(a, b);
            }

            #[test]
            fn exclusion_dominates_any_permutation(mut indices in proptest::collection::vec(0usize..5, 0..5)) {
                indices.sort_unstable();
                indices.dedup();
                let pool = assignment_pool();
                // Always include the matching exclusion (index 5 in the pool).
                let mut chosen: Vec<Assignment> =
                    indices.iter().map(|&i| pool[i].clone()).collect();
                chosen.push(exclude("g3"));

                let m = sample_memberships();
                let result = evaluate(
                    &policy(chosen),
                    &m,
                    &AssignmentFilterCatalog::default(),
                    &ctx(),
                );
                prop_assert_eq!(result.status.as_str(), STATUS_EXCLUDED);
                prop_assert!(result.excluded);
            }
        }
    }
}
