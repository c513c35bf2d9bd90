//! # Targeting Data Model
//!
//! Typed entities for the targeting pipeline. The diagnostic inputs arrive
//! as loosely-shaped backend JSON; the snapshot loader validates shape at
//! the boundary and everything in this module is a tagged struct or enum —
//! evaluation logic never inspects raw hashtables.
//!
//! All entities are created once at the start of a run from already-fetched
//! data and are read-only for the remainder of the run.

use serde::{Deserialize, Serialize};

use polaris_core::{FilterId, GroupId, PolicyId};

/// A directory group, referenced by id from assignments and memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Backend group identifier.
    pub id: GroupId,
    /// Human-readable group name used in targeting provenance.
    pub display_name: String,
}

/// Device platform a policy or filter is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Windows endpoints.
    Windows,
    /// macOS endpoints.
    Macos,
    /// iOS/iPadOS endpoints.
    Ios,
    /// Android endpoints.
    Android,
    /// Linux endpoints.
    Linux,
    /// Platform-agnostic or not declared by the backend.
    Any,
}

impl Default for Platform {
    fn default() -> Self {
        Self::Any
    }
}

/// An assignment filter definition — immutable reference data loaded once
/// per run. The filter's device-scoping rule is evaluated upstream by the
/// backend; here it is informational provenance only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFilter {
    /// Backend filter identifier.
    pub id: FilterId,
    /// Human-readable filter name.
    pub display_name: String,
    /// Platform the filter is declared for.
    #[serde(default)]
    pub platform: Platform,
    /// The filter's rule expression, verbatim from the backend.
    pub rule: String,
}

/// Whether an assignment filter includes or excludes matching devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Devices matching the filter rule are in scope.
    Include,
    /// Devices matching the filter rule are out of scope.
    Exclude,
}

/// The target of one assignment rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignmentTarget {
    /// Every enrolled device.
    AllDevices,
    /// Every licensed user.
    AllUsers,
    /// Devices (or users) in the named group.
    IncludeGroup {
        /// The included group.
        group_id: GroupId,
    },
    /// Devices (or users) in the named group are excluded. Exclusion is
    /// terminal: no include match can override it.
    ExcludeGroup {
        /// The excluded group.
        group_id: GroupId,
    },
}

/// One assignment rule within a policy.
///
/// Order within a policy's assignment list carries no semantic weight;
/// evaluation is order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// What the rule targets.
    pub target: AssignmentTarget,
    /// Optional scoping filter attached to the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_id: Option<FilterId>,
    /// Include/exclude mode of the attached filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_mode: Option<FilterMode>,
}

impl Assignment {
    /// Assignment with a bare target and no filter.
    pub fn to_target(target: AssignmentTarget) -> Self {
        Self {
            target,
            filter_id: None,
            filter_mode: None,
        }
    }
}

/// The kind of management object a policy record represents.
///
/// Targeting evaluation is kind-agnostic; the kind only determines which
/// compliance query strategies apply to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Device compliance policy.
    Compliance,
    /// Configuration profile.
    Configuration,
    /// Managed application.
    Application,
    /// Remediation/detection script.
    Script,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliance => write!(f, "compliance"),
            Self::Configuration => write!(f, "configuration"),
            Self::Application => write!(f, "application"),
            Self::Script => write!(f, "script"),
        }
    }
}

/// One management policy record with its assignment rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Backend policy identifier.
    pub id: PolicyId,
    /// Human-readable policy name.
    pub display_name: String,
    /// Platform the policy is declared for.
    #[serde(default)]
    pub platform: Platform,
    /// What kind of management object this is.
    pub kind: PolicyKind,
    /// The policy's assignment rules, as fetched. Order is not semantic.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}
