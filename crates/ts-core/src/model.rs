//! Records supplied by the persistence layer.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ActivityId, DeliverableId, EntryId, IssueId, ProjectId, UserId};

/// A user account.
///
/// Users order by display name, with the ID as a tiebreaker, which is the
/// order used for the `users` list of a report group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The parent of a subproject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentProject {
    pub id: ProjectId,
    pub name: String,
}

/// A project that time can be logged against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentProject>,
}

impl Project {
    /// Display label used as the report group key.
    ///
    /// Subprojects are prefixed with their parent: `"Parent / Child"`.
    pub fn label(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{} / {}", parent.name, self.name),
            None => self.name.clone(),
        }
    }
}

/// An issue within a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub project_id: ProjectId,
    pub tracker: String,
    pub subject: String,
}

/// Project columns carried on a time entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: ProjectId,
    pub name: String,
}

/// Activity columns carried on a time entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityRef {
    pub id: ActivityId,
    pub name: String,
    /// Broader category this activity is filed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ActivityId>,
    /// Project that owns a project-specific activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

/// Issue columns carried on a time entry.
///
/// `assigned_to` and `priority` are only loaded when the fetch asked for
/// them (see [`Include`](crate::ports::Include)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: IssueId,
    pub tracker: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl IssueRef {
    /// Short reference such as `"Bug #12"`.
    pub fn reference(&self) -> String {
        format!("{} #{}", self.tracker, self.id)
    }
}

/// A single recorded unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: EntryId,
    pub spent_on: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub billable_hours: f64,
    pub user: User,
    pub project: ProjectRef,
    pub activity: ActivityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverable_id: Option<DeliverableId>,
    #[serde(default)]
    pub comments: String,
}
