//! Identity types for stored records
//!
//! Every table allocates its own ids, so each record kind gets its own
//! newtype to keep a `LibraryId` from being passed where a `ProjectId` is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new ID
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw ID value
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

record_id!(
    /// Identifier of a Namespace row
    NamespaceId,
    "namespace"
);
record_id!(
    /// Identifier of a Library row
    LibraryId,
    "library"
);
record_id!(
    /// Identifier of a Project row
    ProjectId,
    "project"
);
record_id!(
    /// Identifier of an activation key
    ActivationKeyId,
    "activation_key"
);
record_id!(
    /// Identifier of an activation event
    ActivationEventId,
    "activation_event"
);
record_id!(
    /// Identifier of an account owned by the outer application
    AccountId,
    "account"
);
