//! In-memory collaborators and a shared fixture for unit tests.

use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::TimesheetError;
use crate::filter::EntryFilter;
use crate::model::{ActivityRef, Issue, IssueRef, ParentProject, Project, ProjectRef, TimeEntry, User};
use crate::ports::{Directory, EntryRepository, EntryScope, Include};
use crate::types::{ActivityId, DeliverableId, EntryId, IssueId, ProjectId, UserId};

pub type Fetch = (EntryScope, EntryFilter, Vec<Include>);

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub issues: Vec<Issue>,
    pub activities: Vec<ActivityRef>,
    pub entries: Vec<TimeEntry>,
    fetches: Mutex<Vec<Fetch>>,
}

impl MemoryStore {
    pub fn activity_ids(&self) -> Vec<ActivityId> {
        self.activities.iter().map(|a| a.id).collect()
    }

    /// Every `find` call so far.
    pub fn fetches(&self) -> Vec<Fetch> {
        self.fetches.lock().unwrap().clone()
    }
}

impl EntryRepository for MemoryStore {
    fn find(
        &self,
        scope: EntryScope,
        filter: &EntryFilter,
        includes: &[Include],
    ) -> Result<Vec<TimeEntry>, TimesheetError> {
        self.fetches
            .lock()
            .unwrap()
            .push((scope, filter.clone(), includes.to_vec()));

        let mut found: Vec<TimeEntry> = self
            .entries
            .iter()
            .filter(|entry| scope.contains(entry) && filter.matches(entry))
            .cloned()
            .map(|mut entry| {
                if let Some(issue) = entry.issue.as_mut() {
                    if !includes.contains(&Include::IssueAssignee) {
                        issue.assigned_to = None;
                    }
                    if !includes.contains(&Include::IssuePriority) {
                        issue.priority = None;
                    }
                }
                entry
            })
            .collect();
        found.sort_by_key(|entry| entry.spent_on);
        Ok(found)
    }
}

impl Directory for MemoryStore {
    fn find_user(&self, id: UserId) -> Result<Option<User>, TimesheetError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    fn issues_for_project(&self, project: ProjectId) -> Result<Vec<Issue>, TimesheetError> {
        let mut issues: Vec<Issue> = self
            .issues
            .iter()
            .filter(|issue| issue.project_id == project)
            .cloned()
            .collect();
        issues.sort_by_key(|issue| issue.id);
        Ok(issues)
    }

    fn all_user_ids(&self) -> Result<Vec<UserId>, TimesheetError> {
        Ok(self.users.iter().map(|u| u.id).collect())
    }

    fn all_activity_ids(&self) -> Result<Vec<ActivityId>, TimesheetError> {
        Ok(self.activity_ids())
    }

    fn all_projects(&self) -> Result<Vec<Project>, TimesheetError> {
        Ok(self.projects.clone())
    }
}

/// A repository whose every fetch fails.
pub struct FailingStore;

impl EntryRepository for FailingStore {
    fn find(
        &self,
        _scope: EntryScope,
        _filter: &EntryFilter,
        _includes: &[Include],
    ) -> Result<Vec<TimeEntry>, TimesheetError> {
        Err(TimesheetError::repository("database is locked"))
    }
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
    }
}

pub fn project(id: i64, name: &str, parent: Option<(i64, &str)>) -> Project {
    Project {
        id: ProjectId::new(id),
        name: name.to_string(),
        parent: parent.map(|(id, name)| ParentProject {
            id: ProjectId::new(id),
            name: name.to_string(),
        }),
    }
}

fn activity(id: i64, name: &str, parent: Option<i64>, project: Option<i64>) -> ActivityRef {
    ActivityRef {
        id: ActivityId::new(id),
        name: name.to_string(),
        parent_id: parent.map(ActivityId::new),
        project_id: project.map(ProjectId::new),
    }
}

fn issue(id: i64, project: i64, tracker: &str, subject: &str) -> Issue {
    Issue {
        id: IssueId::new(id),
        project_id: ProjectId::new(project),
        tracker: tracker.to_string(),
        subject: subject.to_string(),
    }
}

/// Builder-style arguments for one fixture entry.
struct Row<'a> {
    id: i64,
    day: u32,
    user: &'a User,
    project: &'a Project,
    activity: &'a ActivityRef,
    issue: Option<IssueRef>,
    hours: f64,
    billable: f64,
    deliverable: Option<i64>,
    comments: &'a str,
}

fn entry(row: Row<'_>) -> TimeEntry {
    TimeEntry {
        id: EntryId::new(row.id),
        spent_on: NaiveDate::from_ymd_opt(2025, 1, row.day).unwrap(),
        hours: row.hours,
        billable_hours: row.billable,
        user: row.user.clone(),
        project: ProjectRef {
            id: row.project.id,
            name: row.project.name.clone(),
        },
        activity: row.activity.clone(),
        issue: row.issue,
        deliverable_id: row.deliverable.map(DeliverableId::new),
        comments: row.comments.to_string(),
    }
}

fn issue_ref(issue: &Issue, assigned_to: Option<&str>, priority: &str) -> IssueRef {
    IssueRef {
        id: issue.id,
        tracker: issue.tracker.clone(),
        subject: issue.subject.clone(),
        assigned_to: assigned_to.map(str::to_string),
        priority: Some(priority.to_string()),
    }
}

/// Four users, three projects (one a subproject), three issues and five
/// entries in the week of 2025-01-27.
///
/// | entry | date  | user  | project | activity | issue | hours | billable |
/// |-------|-------|-------|---------|----------|-------|-------|----------|
/// | 1     | 01-28 | Grace | Website | 100      | 500   | 3.0   | 2.0      |
/// | 2     | 01-27 | Ivan  | Website | 101      | 501   | 2.0   | 2.0      |
/// | 3     | 01-29 | Grace | Backend | 110      | 600   | 4.0   | 0.0      |
/// | 4     | 01-30 | Ivan  | Backend | 100      | -     | 1.5   | 1.5      |
/// | 5     | 01-27 | Grace | Website | 100      | 500   | 1.0   | 0.5      |
pub fn fixture() -> MemoryStore {
    let users = vec![
        user(1, "Alice"),
        user(7, "Grace"),
        user(9, "Ivan"),
        user(3, "Carol"),
    ];
    let projects = vec![
        project(1, "Website", None),
        project(2, "Backend", Some((10, "Platform"))),
        project(3, "Mobile", None),
    ];
    let activities = vec![
        activity(100, "Development", None, None),
        activity(101, "Design", None, None),
        activity(110, "Backend development", Some(100), Some(2)),
    ];
    let issues = vec![
        issue(500, 1, "Bug", "Login fails"),
        issue(501, 1, "Feature", "Dark mode"),
        issue(600, 2, "Task", "Migrate queue"),
    ];

    let (grace, ivan) = (&users[1], &users[2]);
    let (website, backend) = (&projects[0], &projects[1]);
    let login = issue_ref(&issues[0], Some("Grace"), "High");
    let dark_mode = issue_ref(&issues[1], None, "Normal");
    let migrate = issue_ref(&issues[2], Some("Ivan"), "Low");

    let entries = vec![
        entry(Row {
            id: 1,
            day: 28,
            user: grace,
            project: website,
            activity: &activities[0],
            issue: Some(login.clone()),
            hours: 3.0,
            billable: 2.0,
            deliverable: Some(3),
            comments: "Reproduce login bug",
        }),
        entry(Row {
            id: 2,
            day: 27,
            user: ivan,
            project: website,
            activity: &activities[1],
            issue: Some(dark_mode),
            hours: 2.0,
            billable: 2.0,
            deliverable: None,
            comments: "Palette",
        }),
        entry(Row {
            id: 3,
            day: 29,
            user: grace,
            project: backend,
            activity: &activities[2],
            issue: Some(migrate),
            hours: 4.0,
            billable: 0.0,
            deliverable: Some(4),
            comments: "Queue consumer",
        }),
        entry(Row {
            id: 4,
            day: 30,
            user: ivan,
            project: backend,
            activity: &activities[0],
            issue: None,
            hours: 1.5,
            billable: 1.5,
            deliverable: None,
            comments: "Code review, cleanup",
        }),
        entry(Row {
            id: 5,
            day: 27,
            user: grace,
            project: website,
            activity: &activities[0],
            issue: Some(login),
            hours: 1.0,
            billable: 0.5,
            deliverable: None,
            comments: "",
        }),
    ];

    MemoryStore {
        users,
        projects,
        issues,
        activities,
        entries,
        fetches: Mutex::default(),
    }
}
