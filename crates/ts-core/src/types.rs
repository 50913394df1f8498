//! Identifier newtypes shared across the workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an identifier cannot be parsed from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseIdError {
    kind: &'static str,
    value: String,
}

/// Generates an integer ID newtype with common trait implementations.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self).map_err(|_| ParseIdError {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

define_id!(
    /// A user account identifier.
    UserId, "user ID"
);

define_id!(
    /// A project identifier.
    ProjectId, "project ID"
);

define_id!(
    /// An issue identifier.
    IssueId, "issue ID"
);

define_id!(
    /// An activity (work category) identifier.
    ActivityId, "activity ID"
);

define_id!(
    /// A deliverable identifier.
    ///
    /// Deliverables tag time entries with the piece of work they were billed
    /// against and can further restrict a report.
    DeliverableId, "deliverable ID"
);

define_id!(
    /// A time entry identifier.
    EntryId, "time entry ID"
);
