//! Storage layer for timesheet reports.
//!
//! Persists users, projects, issues, activities, capability grants and time
//! entries using `rusqlite`, and serves them to the report engine through the
//! [`EntryRepository`] and [`Directory`] traits.
//!
//! # Thread Safety
//!
//! Report groups are fetched in parallel, so the collaborator traits require
//! `Sync`. A `rusqlite::Connection` is `Send` but not `Sync`; [`Database`]
//! wraps it in a `Mutex`, which serializes queries.
//!
//! # Schema
//!
//! Dates are stored as TEXT in `YYYY-MM-DD` form, so lexicographic ordering
//! matches chronological ordering and range filters can use `BETWEEN`.
//!
//! Capabilities are stored by name (`see_project_timesheets`,
//! `view_time_entries`) and loaded into a [`Grants`] table up front, so
//! permission checks during aggregation never touch the database.

use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::types::{ToSql, Value};
use rusqlite::vtab::array::{self, Array};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_core::{
    ActivityId, ActivityRef, Capability, DeliverableId, Directory, EntryFilter, EntryId,
    EntryRepository, EntryScope, EntrySelection, Grants, Include, Issue, IssueId, IssueRef,
    ParentProject, Project, ProjectId, ProjectRef, TimeEntry, TimesheetError, UnknownCapability,
    User, UserId,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A thread panicked while holding the connection.
    #[error("database connection lock poisoned")]
    Poisoned,
    /// Failed to parse a stored entry date.
    #[error("invalid date for time entry {entry_id}: {value}")]
    DateParse {
        entry_id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored capability name is not recognized.
    #[error("invalid capability for user {user_id}")]
    Capability {
        user_id: i64,
        #[source]
        source: UnknownCapability,
    },
    /// An import document could not be parsed.
    #[error("invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),
}

/// A user row. `admin` users see every project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ProjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ActivityId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: IssueId,
    pub project_id: ProjectId,
    pub tracker: String,
    pub subject: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// A capability granted to a user on one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub capability: Capability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntryRecord {
    pub id: EntryId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub activity_id: ActivityId,
    #[serde(default)]
    pub issue_id: Option<IssueId>,
    #[serde(default)]
    pub deliverable_id: Option<DeliverableId>,
    pub spent_on: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub billable_hours: f64,
    #[serde(default)]
    pub comments: String,
}

/// A document of records to import, as read by `timesheet import`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub users: Vec<UserRecord>,
    pub projects: Vec<ProjectRecord>,
    pub activities: Vec<ActivityRecord>,
    pub issues: Vec<IssueRecord>,
    pub capabilities: Vec<CapabilityRecord>,
    pub time_entries: Vec<TimeEntryRecord>,
}

impl Dataset {
    /// Parses a JSON dataset.
    pub fn from_reader(reader: impl Read) -> Result<Self, DbError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub users: usize,
    pub projects: usize,
    pub activities: usize,
    pub issues: usize,
    pub capabilities: usize,
    pub time_entries: usize,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let db = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.init()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        array::load_module(&conn)?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                admin INTEGER NOT NULL DEFAULT 0
            );

            -- parent_id: a project may be listed before its parent, so no foreign key
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                parent_id INTEGER
            );

            -- parent_id: the shared activity a project-specific one refines
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                parent_id INTEGER,
                project_id INTEGER,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS issues (
                id INTEGER PRIMARY KEY,
                project_id INTEGER NOT NULL,
                tracker TEXT NOT NULL,
                subject TEXT NOT NULL,
                assigned_to TEXT,
                priority TEXT,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_issues_project ON issues(project_id);

            CREATE TABLE IF NOT EXISTS capabilities (
                user_id INTEGER NOT NULL,
                project_id INTEGER NOT NULL,
                capability TEXT NOT NULL,
                PRIMARY KEY (user_id, project_id, capability),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            -- spent_on: 'YYYY-MM-DD'
            CREATE TABLE IF NOT EXISTS time_entries (
                id INTEGER PRIMARY KEY,
                project_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                activity_id INTEGER NOT NULL,
                issue_id INTEGER,
                deliverable_id INTEGER,
                spent_on TEXT NOT NULL,
                hours REAL NOT NULL,
                billable_hours REAL NOT NULL DEFAULT 0,
                comments TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (activity_id) REFERENCES activities(id),
                FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_time_entries_spent_on ON time_entries(spent_on);
            CREATE INDEX IF NOT EXISTS idx_time_entries_project ON time_entries(project_id);
            CREATE INDEX IF NOT EXISTS idx_time_entries_issue ON time_entries(issue_id);
            CREATE INDEX IF NOT EXISTS idx_time_entries_user ON time_entries(user_id);
            ",
        )?;
        Ok(())
    }

    /// Imports a dataset in one transaction, updating rows with the same ID.
    ///
    /// Returns the number of rows written per table; grants that already
    /// exist are not counted.
    pub fn import(&self, dataset: &Dataset) -> Result<RecordCounts, DbError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut written = RecordCounts::default();
        {
            let mut stmt =
                tx.prepare("
                INSERT INTO users (id, name, admin) VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name, admin = excluded.admin
                ")?;
            for user in &dataset.users {
                written.users += stmt.execute(params![user.id.get(), user.name, user.admin])?;
            }

            let mut stmt = tx
                .prepare("
                INSERT INTO projects (id, name, parent_id) VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name, parent_id = excluded.parent_id
                ")?;
            for project in &dataset.projects {
                written.projects += stmt.execute(params![
                    project.id.get(),
                    project.name,
                    project.parent_id.map(ProjectId::get),
                ])?;
            }

            let mut stmt = tx.prepare(
                "
                INSERT INTO activities (id, name, parent_id, project_id) VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    parent_id = excluded.parent_id,
                    project_id = excluded.project_id
                ",
            )?;
            for activity in &dataset.activities {
                written.activities += stmt.execute(params![
                    activity.id.get(),
                    activity.name,
                    activity.parent_id.map(ActivityId::get),
                    activity.project_id.map(ProjectId::get),
                ])?;
            }

            let mut stmt = tx.prepare(
                "
                INSERT INTO issues
                (id, project_id, tracker, subject, assigned_to, priority)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    project_id = excluded.project_id,
                    tracker = excluded.tracker,
                    subject = excluded.subject,
                    assigned_to = excluded.assigned_to,
                    priority = excluded.priority
                ",
            )?;
            for issue in &dataset.issues {
                written.issues += stmt.execute(params![
                    issue.id.get(),
                    issue.project_id.get(),
                    issue.tracker,
                    issue.subject,
                    issue.assigned_to,
                    issue.priority,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO capabilities (user_id, project_id, capability) VALUES (?, ?, ?)",
            )?;
            for grant in &dataset.capabilities {
                written.capabilities += stmt.execute(params![
                    grant.user_id.get(),
                    grant.project_id.get(),
                    grant.capability.as_str(),
                ])?;
            }

            let mut stmt = tx.prepare(
                "
                INSERT INTO time_entries
                (id, project_id, user_id, activity_id, issue_id, deliverable_id, spent_on, hours, billable_hours, comments)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    project_id = excluded.project_id,
                    user_id = excluded.user_id,
                    activity_id = excluded.activity_id,
                    issue_id = excluded.issue_id,
                    deliverable_id = excluded.deliverable_id,
                    spent_on = excluded.spent_on,
                    hours = excluded.hours,
                    billable_hours = excluded.billable_hours,
                    comments = excluded.comments
                ",
            )?;
            for entry in &dataset.time_entries {
                written.time_entries += stmt.execute(params![
                    entry.id.get(),
                    entry.project_id.get(),
                    entry.user_id.get(),
                    entry.activity_id.get(),
                    entry.issue_id.map(IssueId::get),
                    entry.deliverable_id.map(DeliverableId::get),
                    entry.spent_on.format(DATE_FORMAT).to_string(),
                    entry.hours,
                    entry.billable_hours,
                    entry.comments,
                ])?;
            }
        }
        tx.commit()?;
        tracing::info!(?written, "imported dataset");
        Ok(written)
    }

    /// Current row counts per table.
    pub fn counts(&self) -> Result<RecordCounts, DbError> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<usize, DbError> {
            let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get::<_, usize>(0)
            })?;
            Ok(n)
        };
        Ok(RecordCounts {
            users: count("users")?,
            projects: count("projects")?,
            activities: count("activities")?,
            issues: count("issues")?,
            capabilities: count("capabilities")?,
            time_entries: count("time_entries")?,
        })
    }

    /// Loads admin flags and capability grants.
    pub fn grants(&self) -> Result<Grants, DbError> {
        let conn = self.conn()?;
        let mut grants = Grants::new();

        let mut stmt = conn.prepare("SELECT id FROM users WHERE admin = 1 ORDER BY id")?;
        let admins = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        for admin in admins {
            grants.insert_admin(UserId::new(admin?));
        }

        let mut stmt = conn.prepare(
            "SELECT user_id, project_id, capability FROM capabilities ORDER BY user_id, project_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (user_id, project_id, name) = row?;
            let capability = name
                .parse::<Capability>()
                .map_err(|source| DbError::Capability { user_id, source })?;
            grants.insert_grant(UserId::new(user_id), capability, ProjectId::new(project_id));
        }
        Ok(grants)
    }

    /// Lists entries in `scope` matching `filter`, ordered by date then ID.
    pub fn find_entries(
        &self,
        scope: EntryScope,
        filter: &EntryFilter,
        includes: &[Include],
    ) -> Result<Vec<TimeEntry>, DbError> {
        let Some(query) = EntryQuery::build(scope, filter, includes) else {
            tracing::trace!(%scope, "filter cannot match any entry");
            return Ok(Vec::new());
        };
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt.query_map(params_from_iter(query.params.iter()), RawEntry::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        tracing::debug!(%scope, count = entries.len(), "loaded time entries");
        Ok(entries)
    }

    pub fn find_user(&self, id: UserId) -> Result<Option<User>, DbError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, name FROM users WHERE id = ?",
                [id.get()],
                |row| {
                    Ok(User {
                        id: UserId::new(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Issues of a project, ordered by ID.
    pub fn list_issues(&self, project: ProjectId) -> Result<Vec<Issue>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, tracker, subject FROM issues WHERE project_id = ? ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([project.get()], |row| {
            Ok(Issue {
                id: IssueId::new(row.get(0)?),
                project_id: ProjectId::new(row.get(1)?),
                tracker: row.get(2)?,
                subject: row.get(3)?,
            })
        })?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        Ok(issues)
    }

    /// Every project with its parent, ordered by ID.
    pub fn list_projects(&self) -> Result<Vec<Project>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "
            SELECT p.id, p.name, parent.id, parent.name
            FROM projects p
            LEFT JOIN projects parent ON parent.id = p.parent_id
            ORDER BY p.id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let parent_id: Option<i64> = row.get(2)?;
            let parent_name: Option<String> = row.get(3)?;
            Ok(Project {
                id: ProjectId::new(row.get(0)?),
                name: row.get(1)?,
                parent: parent_id
                    .zip(parent_name)
                    .map(|(id, name)| ParentProject {
                        id: ProjectId::new(id),
                        name,
                    }),
            })
        })?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    fn list_ids(&self, table: &str) -> Result<Vec<i64>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT id FROM {table} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

impl EntryRepository for Database {
    fn find(
        &self,
        scope: EntryScope,
        filter: &EntryFilter,
        includes: &[Include],
    ) -> Result<Vec<TimeEntry>, TimesheetError> {
        self.find_entries(scope, filter, includes)
            .map_err(TimesheetError::repository)
    }
}

impl Directory for Database {
    fn find_user(&self, id: UserId) -> Result<Option<User>, TimesheetError> {
        Self::find_user(self, id).map_err(TimesheetError::repository)
    }

    fn issues_for_project(&self, project: ProjectId) -> Result<Vec<Issue>, TimesheetError> {
        self.list_issues(project).map_err(TimesheetError::repository)
    }

    fn all_user_ids(&self) -> Result<Vec<UserId>, TimesheetError> {
        let ids = self.list_ids("users").map_err(TimesheetError::repository)?;
        Ok(ids.into_iter().map(UserId::new).collect())
    }

    fn all_activity_ids(&self) -> Result<Vec<ActivityId>, TimesheetError> {
        let ids = self
            .list_ids("activities")
            .map_err(TimesheetError::repository)?;
        Ok(ids.into_iter().map(ActivityId::new).collect())
    }

    fn all_projects(&self) -> Result<Vec<Project>, TimesheetError> {
        self.list_projects().map_err(TimesheetError::repository)
    }
}

/// SQL and positional parameters for one entry lookup.
///
/// ID sets are bound as single `rarray` parameters, so their size is not
/// limited by SQLite's host parameter cap.
struct EntryQuery {
    sql: String,
    params: Vec<Box<dyn ToSql>>,
}

impl EntryQuery {
    /// Returns `None` when the filter cannot match anything.
    fn build(scope: EntryScope, filter: &EntryFilter, includes: &[Include]) -> Option<Self> {
        if filter.users.is_empty() {
            return None;
        }
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        match scope {
            EntryScope::Project(id) => {
                conditions.push("e.project_id = ?".to_string());
                params.push(Box::new(id.get()));
            }
            EntryScope::Issue(id) => {
                conditions.push("e.issue_id = ?".to_string());
                params.push(Box::new(id.get()));
            }
            EntryScope::Any => {}
        }

        conditions.push(in_list(
            "e.user_id",
            filter.users.iter().map(|id| id.get()),
            &mut params,
        ));

        match &filter.selection {
            EntrySelection::Explicit { entry_ids } => {
                if entry_ids.is_empty() {
                    return None;
                }
                conditions.push(in_list(
                    "e.id",
                    entry_ids.iter().map(|id| id.get()),
                    &mut params,
                ));
            }
            EntrySelection::Window {
                range,
                projects,
                activities,
            } => {
                if projects.is_empty() || activities.is_empty() {
                    return None;
                }
                if let Some(range) = range {
                    conditions.push("e.spent_on BETWEEN ? AND ?".to_string());
                    params.push(Box::new(range.from.format(DATE_FORMAT).to_string()));
                    params.push(Box::new(range.to.format(DATE_FORMAT).to_string()));
                }
                let project_ids = || projects.iter().map(|id| id.get());
                let activity_ids = || activities.iter().map(|id| id.get());
                conditions.push(in_list("e.project_id", project_ids(), &mut params));
                let direct = in_list("e.activity_id", activity_ids(), &mut params);
                let parent = in_list("a.parent_id", activity_ids(), &mut params);
                let owner = in_list("a.project_id", project_ids(), &mut params);
                conditions.push(format!("({direct} OR ({parent} AND {owner}))"));
            }
        }

        if !filter.deliverables.is_empty() {
            conditions.push(in_list(
                "e.deliverable_id",
                filter.deliverables.iter().map(|id| id.get()),
                &mut params,
            ));
        }

        let assigned_to = if includes.contains(&Include::IssueAssignee) {
            "i.assigned_to"
        } else {
            "NULL"
        };
        let priority = if includes.contains(&Include::IssuePriority) {
            "i.priority"
        } else {
            "NULL"
        };
        let sql = format!(
            "
            SELECT e.id, e.spent_on, e.hours, e.billable_hours, e.deliverable_id, e.comments,
                   u.id, u.name, p.id, p.name,
                   a.id, a.name, a.parent_id, a.project_id,
                   i.id, i.tracker, i.subject, {assigned_to}, {priority}
            FROM time_entries e
            JOIN users u ON u.id = e.user_id
            JOIN projects p ON p.id = e.project_id
            JOIN activities a ON a.id = e.activity_id
            LEFT JOIN issues i ON i.id = e.issue_id
            WHERE {}
            ORDER BY e.spent_on ASC, e.id ASC
            ",
            conditions.join(" AND ")
        );
        Some(Self { sql, params })
    }
}

/// Binds `ids` as one array parameter and returns `column IN rarray(?)`.
fn in_list(
    column: &str,
    ids: impl Iterator<Item = i64>,
    params: &mut Vec<Box<dyn ToSql>>,
) -> String {
    let values: Array = Rc::new(ids.map(Value::Integer).collect());
    params.push(Box::new(values));
    format!("{column} IN rarray(?)")
}

/// An entry row before its date is parsed.
struct RawEntry {
    entry: TimeEntry,
    spent_on: String,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let issue_id: Option<i64> = row.get(14)?;
        let issue = match issue_id {
            Some(id) => Some(IssueRef {
                id: IssueId::new(id),
                tracker: row.get(15)?,
                subject: row.get(16)?,
                assigned_to: row.get(17)?,
                priority: row.get(18)?,
            }),
            None => None,
        };
        let entry = TimeEntry {
            id: EntryId::new(row.get(0)?),
            spent_on: NaiveDate::MIN,
            hours: row.get(2)?,
            billable_hours: row.get(3)?,
            deliverable_id: row.get::<_, Option<i64>>(4)?.map(DeliverableId::new),
            comments: row.get(5)?,
            user: User {
                id: UserId::new(row.get(6)?),
                name: row.get(7)?,
            },
            project: ProjectRef {
                id: ProjectId::new(row.get(8)?),
                name: row.get(9)?,
            },
            activity: ActivityRef {
                id: ActivityId::new(row.get(10)?),
                name: row.get(11)?,
                parent_id: row.get::<_, Option<i64>>(12)?.map(ActivityId::new),
                project_id: row.get::<_, Option<i64>>(13)?.map(ProjectId::new),
            },
            issue,
        };
        Ok(Self {
            entry,
            spent_on: row.get(1)?,
        })
    }

    fn into_entry(self) -> Result<TimeEntry, DbError> {
        let Self { mut entry, spent_on } = self;
        entry.spent_on =
            NaiveDate::parse_from_str(&spent_on, DATE_FORMAT).map_err(|source| {
                DbError::DateParse {
                    entry_id: entry.id.get(),
                    value: spent_on.clone(),
                    source,
                }
            })?;
        Ok(entry)
    }
}
