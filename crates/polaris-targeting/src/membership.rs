//! # Group Membership Snapshot
//!
//! The device's group memberships, captured once at the start of a run.
//! Read-only thereafter: all concurrent evaluations share the same
//! snapshot without locking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use polaris_core::GroupId;

use crate::model::Group;

/// Immutable set of group identifiers the device belongs to, with display
/// names retained for targeting provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupMembershipSet {
    groups: HashMap<GroupId, String>,
}

impl GroupMembershipSet {
    /// Build the snapshot from fetched `{group_id, display_name}` entries.
    ///
    /// Duplicate ids collapse to the last entry; the backend occasionally
    /// repeats a group across membership pages.
    pub fn from_groups(groups: impl IntoIterator<Item = Group>) -> Self {
        Self {
            groups: groups
                .into_iter()
                .map(|g| (g.id, g.display_name))
                .collect(),
        }
    }

    /// Whether the device is a member of the given group.
    pub fn contains(&self, group_id: &GroupId) -> bool {
        self.groups.contains_key(group_id)
    }

    /// Display name of a member group, if the device belongs to it.
    pub fn display_name(&self, group_id: &GroupId) -> Option<&str> {
        self.groups.get(group_id).map(String::as_str)
    }

    /// Number of groups in the snapshot.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the device belongs to no groups at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str) -> Group {
        Group {
            id: GroupId::new(id).unwrap(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn contains_and_display_name() {
        let set = GroupMembershipSet::from_groups([group("g1", "Finance"), group("g2", "Eng")]);
        assert!(set.contains(&GroupId::new("g1").unwrap()));
        assert_eq!(set.display_name(&GroupId::new("g2").unwrap()), Some("Eng"));
        assert!(!set.contains(&GroupId::new("g3").unwrap()));
        assert_eq!(set.display_name(&GroupId::new("g3").unwrap()), None);
    }

    #[test]
    fn duplicate_ids_collapse() {
        let set = GroupMembershipSet::from_groups([group("g1", "Old"), group("g1", "New")]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.display_name(&GroupId::new("g1").unwrap()), Some("New"));
    }

    #[test]
    fn empty_snapshot() {
        let set = GroupMembershipSet::default();
        assert!(set.is_empty());
        assert!(!set.contains(&GroupId::new("g1").unwrap()));
    }
}
