//! Aggregation of time entries into report groups.
//!
//! Each grouping ([`Sort`]) is a [`GroupingStrategy`]: it enumerates the
//! group keys of a request, fetches the visible entries for one key, and
//! builds the group from them. Fetches for different keys are independent and
//! run in parallel; results are merged into a sorted map, so the outcome does
//! not depend on completion order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::access::{Actor, Visibility, project_visibility, user_visibility};
use crate::error::TimesheetError;
use crate::filter::EntryFilter;
use crate::model::{IssueRef, Project, TimeEntry, User};
use crate::ports::{
    Directory, EntryRepository, EntryScope, Include, NoHooks, PermissionOracle, TimesheetHooks,
};
use crate::request::{Sort, TimesheetRequest};
use crate::types::{IssueId, UserId};

/// Entries for one project, keyed by the project label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectLogs {
    pub logs: Vec<TimeEntry>,
    /// Users appearing in `logs`, in display order.
    pub users: Vec<User>,
}

/// Entries for one user, keyed by the user's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLogs {
    pub user: User,
    pub logs: Vec<TimeEntry>,
}

/// Entries for one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLogs {
    pub issue: IssueRef,
    pub logs: Vec<TimeEntry>,
}

/// Entries for one project, split by issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueProjectLogs {
    pub project: Project,
    pub issues: BTreeMap<IssueId, IssueLogs>,
    /// Users appearing in any issue's logs, in display order.
    pub users: Vec<User>,
}

/// The aggregated result. The nesting depends on the grouping.
///
/// Groups are held in key order, which is also the export order. Groups
/// without visible entries are never present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sort", content = "groups", rename_all = "lowercase")]
pub enum TimeEntries {
    Project(BTreeMap<String, ProjectLogs>),
    User(BTreeMap<String, UserLogs>),
    Issue(BTreeMap<String, IssueProjectLogs>),
}

impl Default for TimeEntries {
    fn default() -> Self {
        Self::empty(Sort::Project)
    }
}

impl TimeEntries {
    pub const fn empty(sort: Sort) -> Self {
        match sort {
            Sort::Project => Self::Project(BTreeMap::new()),
            Sort::User => Self::User(BTreeMap::new()),
            Sort::Issue => Self::Issue(BTreeMap::new()),
        }
    }

    pub const fn sort(&self) -> Sort {
        match self {
            Self::Project(_) => Sort::Project,
            Self::User(_) => Sort::User,
            Self::Issue(_) => Sort::Issue,
        }
    }

    pub fn group_count(&self) -> usize {
        match self {
            Self::Project(groups) => groups.len(),
            Self::User(groups) => groups.len(),
            Self::Issue(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group_count() == 0
    }

    /// Group keys in order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Project(groups) => groups.keys().map(String::as_str).collect(),
            Self::User(groups) => groups.keys().map(String::as_str).collect(),
            Self::Issue(groups) => groups.keys().map(String::as_str).collect(),
        }
    }

    /// Every entry in export order: groups by key, issues by ID, then the
    /// stored log order.
    pub fn logs(&self) -> Box<dyn Iterator<Item = &TimeEntry> + '_> {
        match self {
            Self::Project(groups) => Box::new(groups.values().flat_map(|group| &group.logs)),
            Self::User(groups) => Box::new(groups.values().flat_map(|group| &group.logs)),
            Self::Issue(groups) => Box::new(
                groups
                    .values()
                    .flat_map(|group| group.issues.values())
                    .flat_map(|issue| &issue.logs),
            ),
        }
    }

    pub fn log_count(&self) -> usize {
        self.logs().count()
    }

    /// Sum of hours over every entry.
    pub fn total(&self) -> f64 {
        self.logs().map(|entry| entry.hours).sum()
    }

    /// Sum of billable hours over every entry.
    pub fn billed(&self) -> f64 {
        self.logs().map(|entry| entry.billable_hours).sum()
    }

    pub fn unbilled(&self) -> f64 {
        self.total() - self.billed()
    }
}

/// Everything a strategy needs to fetch one group.
pub struct FetchContext<'a> {
    pub request: &'a TimesheetRequest,
    pub actor: &'a Actor,
    pub entries: &'a dyn EntryRepository,
    pub directory: &'a dyn Directory,
    pub permissions: &'a dyn PermissionOracle,
    pub hooks: &'a dyn TimesheetHooks,
}

impl FetchContext<'_> {
    /// Fetches entries in `scope` for `users`; `None` fetches nothing.
    pub fn find(
        &self,
        scope: EntryScope,
        users: Option<BTreeSet<UserId>>,
        includes: Vec<Include>,
    ) -> Result<Vec<TimeEntry>, TimesheetError> {
        let Some(users) = users else {
            tracing::trace!(%scope, "no visible entries");
            return Ok(Vec::new());
        };
        let filter = self
            .hooks
            .augment_filter(EntryFilter::for_request(self.request, users));
        let includes = self.hooks.augment_fetch_includes(includes);
        let logs = self.entries.find(scope, &filter, &includes)?;
        tracing::debug!(%scope, count = logs.len(), "fetched time entries");
        Ok(logs)
    }
}

/// One way of grouping a request's entries.
pub trait GroupingStrategy: Sync {
    type Key: Sync;
    type Group: Send;

    /// The keys to fetch, in request order.
    fn enumerate_keys(&self, request: &TimesheetRequest) -> Result<Vec<Self::Key>, TimesheetError>;

    /// The entries the actor may see for `key`.
    fn fetch(&self, ctx: &FetchContext<'_>, key: &Self::Key)
    -> Result<Vec<TimeEntry>, TimesheetError>;

    /// Builds the labelled group from non-empty `logs`, or `None` to omit it.
    fn build_entry(
        &self,
        ctx: &FetchContext<'_>,
        key: &Self::Key,
        logs: Vec<TimeEntry>,
    ) -> Result<Option<(String, Self::Group)>, TimesheetError>;
}

/// Groups by project label.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByProject;

impl GroupingStrategy for ByProject {
    type Key = Project;
    type Group = ProjectLogs;

    fn enumerate_keys(&self, request: &TimesheetRequest) -> Result<Vec<Project>, TimesheetError> {
        Ok(request.projects.clone())
    }

    fn fetch(
        &self,
        ctx: &FetchContext<'_>,
        project: &Project,
    ) -> Result<Vec<TimeEntry>, TimesheetError> {
        let visibility = project_visibility(ctx.permissions, ctx.actor, project.id);
        tracing::trace!(project = %project.id, ?visibility, "project visibility");
        ctx.find(
            EntryScope::Project(project.id),
            visibility.users(&ctx.request.users, ctx.actor),
            Include::entry_defaults(),
        )
    }

    fn build_entry(
        &self,
        _ctx: &FetchContext<'_>,
        project: &Project,
        logs: Vec<TimeEntry>,
    ) -> Result<Option<(String, ProjectLogs)>, TimesheetError> {
        let users = distinct_users(&logs);
        Ok(Some((project.label(), ProjectLogs { logs, users })))
    }
}

/// Groups by user name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByUser;

impl GroupingStrategy for ByUser {
    type Key = UserId;
    type Group = UserLogs;

    fn enumerate_keys(&self, request: &TimesheetRequest) -> Result<Vec<UserId>, TimesheetError> {
        Ok(request.users.clone())
    }

    fn fetch(&self, ctx: &FetchContext<'_>, user: &UserId) -> Result<Vec<TimeEntry>, TimesheetError> {
        let visibility = user_visibility(ctx.permissions, ctx.actor, *user);
        let users = (visibility != Visibility::None).then(|| BTreeSet::from([*user]));
        ctx.find(EntryScope::Any, users, Include::entry_defaults())
    }

    fn build_entry(
        &self,
        ctx: &FetchContext<'_>,
        user: &UserId,
        logs: Vec<TimeEntry>,
    ) -> Result<Option<(String, UserLogs)>, TimesheetError> {
        let Some(user) = ctx.directory.find_user(*user)? else {
            tracing::debug!(%user, "skipping entries of unknown user");
            return Ok(None);
        };
        Ok(Some((user.name.clone(), UserLogs { user, logs })))
    }
}

/// Groups by project label, then by issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByIssue;

impl GroupingStrategy for ByIssue {
    type Key = Project;
    type Group = IssueProjectLogs;

    fn enumerate_keys(&self, request: &TimesheetRequest) -> Result<Vec<Project>, TimesheetError> {
        Ok(request.projects.clone())
    }

    /// Concatenates the entries of every issue, dropping repeats.
    fn fetch(
        &self,
        ctx: &FetchContext<'_>,
        project: &Project,
    ) -> Result<Vec<TimeEntry>, TimesheetError> {
        let issues = ctx.directory.issues_for_project(project.id)?;
        let mut seen = HashSet::new();
        let mut logs = Vec::new();
        for issue in &issues {
            let visibility = project_visibility(ctx.permissions, ctx.actor, issue.project_id);
            let found = ctx.find(
                EntryScope::Issue(issue.id),
                visibility.users(&ctx.request.users, ctx.actor),
                Include::issue_defaults(),
            )?;
            logs.extend(found.into_iter().filter(|entry| seen.insert(entry.id)));
        }
        Ok(logs)
    }

    fn build_entry(
        &self,
        _ctx: &FetchContext<'_>,
        project: &Project,
        logs: Vec<TimeEntry>,
    ) -> Result<Option<(String, IssueProjectLogs)>, TimesheetError> {
        let users = distinct_users(&logs);
        let mut issues: BTreeMap<IssueId, IssueLogs> = BTreeMap::new();
        for entry in logs {
            let Some(issue) = entry.issue.clone() else {
                tracing::trace!(entry = %entry.id, "entry has no issue");
                continue;
            };
            issues
                .entry(issue.id)
                .or_insert_with(|| IssueLogs {
                    issue,
                    logs: Vec::new(),
                })
                .logs
                .push(entry);
        }
        let group = IssueProjectLogs {
            project: project.clone(),
            issues,
            users,
        };
        Ok(Some((project.label(), group)))
    }
}

fn distinct_users(logs: &[TimeEntry]) -> Vec<User> {
    logs.iter()
        .map(|entry| entry.user.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Runs a strategy over every key and merges the non-empty groups.
fn collect_groups<S: GroupingStrategy>(
    strategy: &S,
    ctx: &FetchContext<'_>,
) -> Result<BTreeMap<String, S::Group>, TimesheetError> {
    let keys = strategy.enumerate_keys(ctx.request)?;
    let groups = keys
        .par_iter()
        .map(|key| {
            let logs = strategy.fetch(ctx, key)?;
            if logs.is_empty() {
                return Ok(None);
            }
            strategy.build_entry(ctx, key, logs)
        })
        .collect::<Result<Vec<_>, TimesheetError>>()?;
    Ok(groups.into_iter().flatten().collect())
}

/// Builds [`TimeEntries`] from the injected collaborators.
#[derive(Clone, Copy)]
pub struct Aggregator<'a> {
    entries: &'a dyn EntryRepository,
    directory: &'a dyn Directory,
    permissions: &'a dyn PermissionOracle,
    hooks: &'a dyn TimesheetHooks,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        entries: &'a dyn EntryRepository,
        directory: &'a dyn Directory,
        permissions: &'a dyn PermissionOracle,
    ) -> Self {
        Self {
            entries,
            directory,
            permissions,
            hooks: &NoHooks,
        }
    }

    #[must_use]
    pub const fn with_hooks(mut self, hooks: &'a dyn TimesheetHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Groups the entries `actor` may see according to `request.sort()`.
    pub fn aggregate(
        &self,
        request: &TimesheetRequest,
        actor: &Actor,
    ) -> Result<TimeEntries, TimesheetError> {
        let ctx = FetchContext {
            request,
            actor,
            entries: self.entries,
            directory: self.directory,
            permissions: self.permissions,
            hooks: self.hooks,
        };
        let entries = match request.sort() {
            Sort::Project => TimeEntries::Project(collect_groups(&ByProject, &ctx)?),
            Sort::User => TimeEntries::User(collect_groups(&ByUser, &ctx)?),
            Sort::Issue => TimeEntries::Issue(collect_groups(&ByIssue, &ctx)?),
        };
        tracing::debug!(
            sort = %request.sort(),
            actor = %actor.id,
            groups = entries.group_count(),
            entries = entries.log_count(),
            "aggregated timesheet"
        );
        Ok(entries)
    }
}
