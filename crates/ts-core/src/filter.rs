//! The predicate handed to the entry repository.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::TimeEntry;
use crate::period::DateRange;
use crate::request::TimesheetRequest;
use crate::types::{ActivityId, DeliverableId, EntryId, ProjectId, UserId};

/// Which entries are candidates before the user and deliverable filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntrySelection {
    /// Entries within a date window, on the given projects and activities.
    Window {
        /// `None` means all time.
        range: Option<DateRange>,
        projects: BTreeSet<ProjectId>,
        /// Matches an entry's activity, or its parent category when the
        /// activity belongs to one of `projects`.
        activities: BTreeSet<ActivityId>,
    },
    /// An explicit set of entries; dates, projects and activities are ignored.
    Explicit { entry_ids: BTreeSet<EntryId> },
}

/// A structured filter over time entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub selection: EntrySelection,
    pub users: BTreeSet<UserId>,
    /// Empty means no deliverable restriction.
    pub deliverables: BTreeSet<DeliverableId>,
}

impl EntryFilter {
    /// Builds the filter for `request`, restricted to `users`.
    ///
    /// A non-empty `potential_time_entry_ids` replaces the date, project and
    /// activity conditions.
    pub fn for_request(request: &TimesheetRequest, users: BTreeSet<UserId>) -> Self {
        let selection = if request.potential_time_entry_ids.is_empty() {
            EntrySelection::Window {
                range: request.date_range(),
                projects: request.projects.iter().map(|p| p.id).collect(),
                activities: request.activities.iter().copied().collect(),
            }
        } else {
            EntrySelection::Explicit {
                entry_ids: request.potential_time_entry_ids.iter().copied().collect(),
            }
        };
        Self {
            selection,
            users,
            deliverables: request.deliverables.iter().copied().collect(),
        }
    }

    /// Evaluates the filter against an entry.
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        if !self.users.contains(&entry.user.id) {
            return false;
        }
        if !self.deliverables.is_empty()
            && !entry
                .deliverable_id
                .is_some_and(|id| self.deliverables.contains(&id))
        {
            return false;
        }
        match &self.selection {
            EntrySelection::Explicit { entry_ids } => entry_ids.contains(&entry.id),
            EntrySelection::Window {
                range,
                projects,
                activities,
            } => {
                range.is_none_or(|range| range.contains(entry.spent_on))
                    && projects.contains(&entry.project.id)
                    && activity_matches(entry, projects, activities)
            }
        }
    }
}

fn activity_matches(
    entry: &TimeEntry,
    projects: &BTreeSet<ProjectId>,
    activities: &BTreeSet<ActivityId>,
) -> bool {
    let activity = &entry.activity;
    if activities.contains(&activity.id) {
        return true;
    }
    activity
        .parent_id
        .is_some_and(|parent| activities.contains(&parent))
        && activity
            .project_id
            .is_some_and(|project| projects.contains(&project))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::model::{ActivityRef, ProjectRef, User};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: i64, user: i64, project: i64, activity: ActivityRef) -> TimeEntry {
        TimeEntry {
            id: EntryId::new(id),
            spent_on: date(2025, 1, 29),
            hours: 2.0,
            billable_hours: 1.0,
            user: User {
                id: UserId::new(user),
                name: format!("user {user}"),
            },
            project: ProjectRef {
                id: ProjectId::new(project),
                name: format!("project {project}"),
            },
            activity,
            issue: None,
            deliverable_id: None,
            comments: String::new(),
        }
    }

    fn activity(id: i64, parent: Option<i64>, project: Option<i64>) -> ActivityRef {
        ActivityRef {
            id: ActivityId::new(id),
            name: format!("activity {id}"),
            parent_id: parent.map(ActivityId::new),
            project_id: project.map(ProjectId::new),
        }
    }

    fn window(range: Option<DateRange>, projects: &[i64], activities: &[i64]) -> EntryFilter {
        EntryFilter {
            selection: EntrySelection::Window {
                range,
                projects: projects.iter().copied().map(ProjectId::new).collect(),
                activities: activities.iter().copied().map(ActivityId::new).collect(),
            },
            users: BTreeSet::from([UserId::new(1)]),
            deliverables: BTreeSet::new(),
        }
    }

    #[test]
    fn window_checks_dates_projects_and_users() {
        let filter = window(
            Some(DateRange::new(date(2025, 1, 27), date(2025, 1, 31))),
            &[1],
            &[9],
        );
        assert!(filter.matches(&entry(1, 1, 1, activity(9, None, None))));
        assert!(!filter.matches(&entry(2, 2, 1, activity(9, None, None))));
        assert!(!filter.matches(&entry(3, 1, 2, activity(9, None, None))));

        let mut outside = entry(4, 1, 1, activity(9, None, None));
        outside.spent_on = date(2025, 2, 1);
        assert!(!filter.matches(&outside));
    }

    #[test]
    fn unbounded_window_accepts_any_date() {
        let filter = window(None, &[1], &[9]);
        let mut old = entry(1, 1, 1, activity(9, None, None));
        old.spent_on = date(1999, 1, 1);
        assert!(filter.matches(&old));
    }

    #[test]
    fn child_activity_matches_parent_only_within_scoped_projects() {
        let filter = window(None, &[1], &[9]);
        // Project-specific child of activity 9, owned by project 1
        assert!(filter.matches(&entry(1, 1, 1, activity(20, Some(9), Some(1)))));
        // Child owned by a project outside the filter
        assert!(!filter.matches(&entry(2, 1, 1, activity(21, Some(9), Some(5)))));
        // Child of an activity not in the filter
        assert!(!filter.matches(&entry(3, 1, 1, activity(22, Some(8), Some(1)))));
    }

    #[test]
    fn explicit_ids_ignore_dates_projects_and_activities() {
        let filter = EntryFilter {
            selection: EntrySelection::Explicit {
                entry_ids: BTreeSet::from([EntryId::new(5)]),
            },
            users: BTreeSet::from([UserId::new(1)]),
            deliverables: BTreeSet::new(),
        };
        let mut candidate = entry(5, 1, 77, activity(99, None, None));
        candidate.spent_on = date(1999, 1, 1);
        assert!(filter.matches(&candidate));
        assert!(!filter.matches(&entry(6, 1, 77, activity(99, None, None))));
        assert!(!filter.matches(&entry(5, 2, 77, activity(99, None, None))));
    }

    #[test]
    fn deliverables_restrict_when_present() {
        let mut filter = window(None, &[1], &[9]);
        filter.deliverables = BTreeSet::from([DeliverableId::new(3)]);

        let mut tagged = entry(1, 1, 1, activity(9, None, None));
        tagged.deliverable_id = Some(DeliverableId::new(3));
        let mut other = entry(2, 1, 1, activity(9, None, None));
        other.deliverable_id = Some(DeliverableId::new(4));
        let untagged = entry(3, 1, 1, activity(9, None, None));

        assert!(filter.matches(&tagged));
        assert!(!filter.matches(&other));
        assert!(!filter.matches(&untagged));
    }
}
