//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the audit stack.
//! Each identifier is a distinct type — you cannot pass a [`GroupId`]
//! where a [`PolicyId`] is expected.
//!
//! ## Validation
//!
//! Backend identifiers are opaque strings (the management backend issues
//! GUIDs for most object types, but the format is not contractual). The
//! only constraint enforced at construction is non-emptiness: an empty
//! identifier is always a data defect upstream and must never enter the
//! evaluation pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! backend_id {
    ($(#[$doc:meta])* $name:ident, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from a backend string, rejecting
            /// empty or whitespace-only input.
            pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(ValidationError::$variant);
                }
                Ok(Self(raw))
            }

            /// Access the underlying backend identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

backend_id!(
    /// Identifier of the endpoint device under audit.
    DeviceId,
    EmptyDeviceId
);

backend_id!(
    /// Identifier of a directory group referenced by memberships and
    /// assignment rules.
    GroupId,
    EmptyGroupId
);

backend_id!(
    /// Identifier of a management policy (compliance policy, configuration
    /// profile, application, or remediation script).
    PolicyId,
    EmptyPolicyId
);

backend_id!(
    /// Identifier of an assignment filter referenced from an assignment.
    FilterId,
    EmptyFilterId
);
