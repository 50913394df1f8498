//! The timesheet request: configuration plus the aggregated result.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::access::Actor;
use crate::aggregate::{Aggregator, TimeEntries};
use crate::error::TimesheetError;
use crate::model::Project;
use crate::period::{self, DateRange, Period, PeriodType};
use crate::ports::Directory;
use crate::quota;
use crate::types::{ActivityId, DeliverableId, EntryId, ProjectId, UserId};

/// How report groups are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[default]
    Project,
    User,
    Issue,
}

impl Sort {
    /// Parses a sort option, falling back to [`Sort::Project`].
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "user" => Self::User,
            "issue" => Self::Issue,
            _ => Self::Project,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::User => "user",
            Self::Issue => "issue",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options accepted when building a request, all optional.
///
/// Enumerated options are plain strings so that unrecognized values fall
/// back to defaults instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimesheetOptions {
    /// Pre-built result to seed the request with.
    #[serde(skip)]
    pub time_entries: Option<TimeEntries>,
    pub potential_time_entry_ids: Option<Vec<EntryId>>,
    /// Projects the actor may choose from.
    pub allowed_projects: Option<Vec<Project>>,
    /// Selected project IDs; must be among `allowed_projects`.
    pub projects: Option<Vec<ProjectId>>,
    pub activities: Option<Vec<ActivityId>>,
    pub users: Option<Vec<UserId>>,
    pub deliverables: Option<Vec<DeliverableId>>,
    pub sort: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub period_type: Option<String>,
    pub period: Option<String>,
}

/// The query parameters that reproduce a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesheetParams {
    pub projects: Vec<ProjectId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub activities: Vec<ActivityId>,
    pub deliverables: Vec<DeliverableId>,
    pub users: Vec<UserId>,
    pub sort: Sort,
}

/// A timesheet: what to report on, and the grouped entries once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetRequest {
    pub projects: Vec<Project>,
    pub allowed_projects: Vec<Project>,
    pub users: Vec<UserId>,
    pub activities: Vec<ActivityId>,
    /// Empty means no deliverable restriction.
    pub deliverables: Vec<DeliverableId>,
    /// When non-empty, replaces the date, project and activity filters.
    pub potential_time_entry_ids: Vec<EntryId>,
    range: Option<DateRange>,
    period_type: PeriodType,
    period: Option<Period>,
    sort: Sort,
    time_entries: TimeEntries,
}

impl TimesheetRequest {
    /// An empty request covering `today`, with a free period and project sort.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            projects: Vec::new(),
            allowed_projects: Vec::new(),
            users: Vec::new(),
            activities: Vec::new(),
            deliverables: Vec::new(),
            potential_time_entry_ids: Vec::new(),
            range: Some(DateRange::day(today)),
            period_type: PeriodType::FreePeriod,
            period: None,
            sort: Sort::Project,
            time_entries: TimeEntries::empty(Sort::Project),
        }
    }

    /// Builds a request from options.
    ///
    /// Users and activities default to everything the directory knows.
    /// Missing dates default to `today`; malformed dates are an error.
    pub fn from_options(
        options: TimesheetOptions,
        directory: &dyn Directory,
        today: NaiveDate,
    ) -> Result<Self, TimesheetError> {
        let mut request = Self::new(today);

        let date_from = parse_date("date_from", options.date_from.as_deref())?.unwrap_or(today);
        let date_to = parse_date("date_to", options.date_to.as_deref())?.unwrap_or(today);
        request.range = Some(DateRange::new(date_from, date_to));

        request.allowed_projects = options.allowed_projects.unwrap_or_default();
        request.projects = match &options.projects {
            Some(selected) => request
                .allowed_projects
                .iter()
                .filter(|project| selected.contains(&project.id))
                .cloned()
                .collect(),
            None => request.allowed_projects.clone(),
        };

        request.users = match options.users {
            Some(users) => users,
            None => directory.all_user_ids()?,
        };
        request.activities = match options.activities {
            Some(activities) => activities,
            None => directory.all_activity_ids()?,
        };
        request.deliverables = options.deliverables.unwrap_or_default();
        request.potential_time_entry_ids = options.potential_time_entry_ids.unwrap_or_default();

        request.sort = options
            .sort
            .as_deref()
            .map(Sort::parse_or_default)
            .unwrap_or_default();
        request.time_entries = options
            .time_entries
            .unwrap_or_else(|| TimeEntries::empty(request.sort));

        request.period_type = options
            .period_type
            .as_deref()
            .map(PeriodType::parse_or_default)
            .unwrap_or_default();
        let period = options.period.as_deref().and_then(Period::parse_lenient);
        request.set_period(period, today);

        tracing::debug!(
            sort = %request.sort,
            period_type = %request.period_type,
            projects = request.projects.len(),
            users = request.users.len(),
            "built timesheet request"
        );
        Ok(request)
    }

    /// The inclusive date window, or `None` for all time.
    pub const fn date_range(&self) -> Option<DateRange> {
        self.range
    }

    pub fn date_from(&self) -> Option<NaiveDate> {
        self.range.map(|range| range.from)
    }

    pub fn date_to(&self) -> Option<NaiveDate> {
        self.range.map(|range| range.to)
    }

    /// Sets explicit bounds. Token-driven periods may overwrite them later.
    pub const fn set_date_range(&mut self, range: Option<DateRange>) {
        self.range = range;
    }

    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    pub const fn set_period_type(&mut self, period_type: PeriodType) {
        self.period_type = period_type;
    }

    /// The last period token applied, if any.
    pub const fn period(&self) -> Option<Period> {
        self.period
    }

    /// Applies a period token relative to `today`.
    ///
    /// No-op for free periods. `None` (an unrecognized token) keeps the
    /// current bounds.
    pub fn set_period(&mut self, period: Option<Period>, today: NaiveDate) -> &mut Self {
        if self.period_type == PeriodType::FreePeriod {
            return self;
        }
        self.period = period;
        self.range = period::resolve(self.period_type, period, self.range, today);
        self
    }

    pub const fn sort(&self) -> Sort {
        self.sort
    }

    /// Changes the grouping, discarding any fetched result.
    pub fn set_sort(&mut self, sort: Sort) {
        if self.sort != sort {
            self.sort = sort;
            self.time_entries = TimeEntries::empty(sort);
        }
    }

    pub const fn time_entries(&self) -> &TimeEntries {
        &self.time_entries
    }

    /// Runs the aggregation and stores the result.
    pub fn fetch_time_entries(
        &mut self,
        aggregator: &Aggregator<'_>,
        actor: &Actor,
    ) -> Result<&TimeEntries, TimesheetError> {
        self.time_entries = TimeEntries::empty(self.sort);
        self.time_entries = aggregator.aggregate(self, actor)?;
        Ok(&self.time_entries)
    }

    /// Expected hours per user over the window.
    pub fn quota(&self) -> Option<f64> {
        quota::quota(self.range)
    }

    /// Expected hours for every user in scope.
    pub fn required(&self) -> Option<f64> {
        quota::required(self.quota(), self.users.len())
    }

    pub fn total(&self) -> f64 {
        self.time_entries.total()
    }

    pub fn billed(&self) -> f64 {
        self.time_entries.billed()
    }

    pub fn unbilled(&self) -> f64 {
        self.time_entries.unbilled()
    }

    pub fn to_params(&self) -> TimesheetParams {
        TimesheetParams {
            projects: self.projects.iter().map(|project| project.id).collect(),
            date_from: self.date_from(),
            date_to: self.date_to(),
            activities: self.activities.clone(),
            deliverables: self.deliverables.clone(),
            users: self.users.clone(),
            sort: self.sort,
        }
    }
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, TimesheetError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|source| TimesheetError::InvalidDate {
            field,
            value: value.to_string(),
            source,
        })
}
