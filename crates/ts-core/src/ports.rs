//! Collaborators the engine consumes but does not implement.
//!
//! Stores implement [`EntryRepository`], [`Directory`] and
//! [`PermissionOracle`]; callers customize output through
//! [`TimesheetHooks`]. All of them are `Send + Sync` because per-group
//! fetches run in parallel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::access::{Actor, Capability};
use crate::error::TimesheetError;
use crate::filter::EntryFilter;
use crate::model::{Issue, Project, TimeEntry, User};
use crate::types::{ActivityId, IssueId, ProjectId, UserId};

/// The association a fetch runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryScope {
    /// Entries logged on a project.
    Project(ProjectId),
    /// Entries logged on an issue.
    Issue(IssueId),
    /// Every entry; the filter alone decides.
    Any,
}

impl EntryScope {
    /// Returns true if the entry belongs to this scope.
    pub fn contains(&self, entry: &TimeEntry) -> bool {
        match self {
            Self::Project(id) => entry.project.id == *id,
            Self::Issue(id) => entry.issue.as_ref().is_some_and(|issue| issue.id == *id),
            Self::Any => true,
        }
    }
}

impl fmt::Display for EntryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project {id}"),
            Self::Issue(id) => write!(f, "issue {id}"),
            Self::Any => f.write_str("all entries"),
        }
    }
}

/// Associations a store should load alongside each entry.
///
/// Activity, user, project and issue tracker columns are part of every
/// [`TimeEntry`]; the issue assignee and priority are optional extras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Include {
    Activity,
    User,
    Project,
    Issue,
    IssueTracker,
    IssueAssignee,
    IssuePriority,
}

impl Include {
    /// Includes for project- and user-scoped fetches.
    pub fn entry_defaults() -> Vec<Self> {
        vec![
            Self::Activity,
            Self::User,
            Self::Project,
            Self::Issue,
            Self::IssueTracker,
            Self::IssueAssignee,
            Self::IssuePriority,
        ]
    }

    /// Includes for issue-scoped fetches.
    pub fn issue_defaults() -> Vec<Self> {
        vec![Self::Activity, Self::User]
    }
}

/// Source of time entries.
pub trait EntryRepository: Send + Sync {
    /// Returns entries in `scope` matching `filter`, ordered by `spent_on`
    /// ascending. Entries with the same date keep the store's natural order.
    fn find(
        &self,
        scope: EntryScope,
        filter: &EntryFilter,
        includes: &[Include],
    ) -> Result<Vec<TimeEntry>, TimesheetError>;
}

/// Lookups for users, projects, issues and activities.
pub trait Directory: Send + Sync {
    fn find_user(&self, id: UserId) -> Result<Option<User>, TimesheetError>;

    /// Issues belonging to a project, in ID order.
    fn issues_for_project(&self, project: ProjectId) -> Result<Vec<Issue>, TimesheetError>;

    fn all_user_ids(&self) -> Result<Vec<UserId>, TimesheetError>;

    fn all_activity_ids(&self) -> Result<Vec<ActivityId>, TimesheetError>;

    fn all_projects(&self) -> Result<Vec<Project>, TimesheetError>;
}

/// Role-based permission checks.
pub trait PermissionOracle: Send + Sync {
    fn is_admin(&self, actor: &Actor) -> bool;

    fn has_capability(&self, actor: &Actor, capability: Capability, project: ProjectId) -> bool;
}

/// Extension points invoked at fixed stages of fetching and exporting.
///
/// Every method defaults to the identity transform.
pub trait TimesheetHooks: Send + Sync {
    /// Adjusts the export header row.
    fn augment_header(&self, columns: Vec<String>) -> Vec<String> {
        columns
    }

    /// Adjusts the export row built from `entry`.
    fn augment_row(&self, entry: &TimeEntry, columns: Vec<String>) -> Vec<String> {
        let _ = entry;
        columns
    }

    /// Adjusts the filter before each fetch.
    fn augment_filter(&self, filter: EntryFilter) -> EntryFilter {
        filter
    }

    /// Adjusts the associations loaded by each fetch.
    fn augment_fetch_includes(&self, includes: Vec<Include>) -> Vec<Include> {
        includes
    }
}

/// Hooks that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl TimesheetHooks for NoHooks {}
