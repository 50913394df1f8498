//! Core logic for timesheet reports.
//!
//! This crate contains the types and logic for:
//! - Periods: resolving named periods into date windows
//! - Quotas: expected working hours over a window
//! - Access: which entries an actor may see on a project
//! - Aggregation: grouping visible entries by project, user or issue
//! - Export: flattening grouped entries into CSV rows
//!
//! Persistence, permissions and output customization are supplied by the
//! caller through the traits in [`ports`].

pub mod access;
pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod model;
pub mod period;
pub mod ports;
pub mod quota;
pub mod request;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use access::{Actor, Capability, Grants, UnknownCapability, Visibility};
pub use aggregate::{
    Aggregator, ByIssue, ByProject, ByUser, GroupingStrategy, IssueLogs, IssueProjectLogs,
    ProjectLogs, TimeEntries, UserLogs,
};
pub use error::TimesheetError;
pub use export::{HEADER, TabularExporter, format_hours};
pub use filter::{EntryFilter, EntrySelection};
pub use model::{ActivityRef, Issue, IssueRef, ParentProject, Project, ProjectRef, TimeEntry, User};
pub use period::{DateRange, Period, PeriodType, UnknownPeriod};
pub use ports::{
    Directory, EntryRepository, EntryScope, Include, NoHooks, PermissionOracle, TimesheetHooks,
};
pub use quota::WORKING_HOURS;
pub use request::{Sort, TimesheetOptions, TimesheetParams, TimesheetRequest};
pub use types::{ActivityId, DeliverableId, EntryId, IssueId, ParseIdError, ProjectId, UserId};
