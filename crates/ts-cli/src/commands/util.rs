//! Helpers shared by the report and export commands.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use ts_core::{Actor, Aggregator, Directory, Project, TimesheetOptions, TimesheetRequest, UserId};
use ts_db::Database;

use crate::Config;
use crate::cli::FilterArgs;

/// Picks the acting user: `--actor` first, then `actor_id` from config.
pub fn resolve_actor(flag: Option<UserId>, config: &Config) -> Result<Actor> {
    match flag.or(config.actor_id) {
        Some(id) => Ok(Actor::new(id)),
        None => bail!("no acting user: pass --actor or set actor_id in the config"),
    }
}

/// Translates command-line filters into request options.
///
/// Empty repeatable filters mean "everything"; a `--period` (or the
/// configured default period, when no dates are given) switches the request
/// to token-driven dates.
pub fn options_from_filters(
    filters: &FilterArgs,
    config: &Config,
    allowed_projects: Vec<Project>,
) -> TimesheetOptions {
    let period = filters.period.clone().or_else(|| {
        (filters.from.is_none() && filters.to.is_none())
            .then(|| config.default_period.clone())
            .flatten()
    });

    TimesheetOptions {
        time_entries: None,
        potential_time_entry_ids: non_empty(&filters.entries),
        allowed_projects: Some(allowed_projects),
        projects: non_empty(&filters.projects),
        activities: non_empty(&filters.activities),
        users: non_empty(&filters.users),
        deliverables: non_empty(&filters.deliverables),
        sort: filters.sort.clone().or_else(|| config.default_sort.clone()),
        date_from: filters.from.clone(),
        date_to: filters.to.clone(),
        period_type: period.as_ref().map(|_| "default".to_string()),
        period,
    }
}

fn non_empty<T: Clone>(ids: &[T]) -> Option<Vec<T>> {
    (!ids.is_empty()).then(|| ids.to_vec())
}

/// Builds the request and fetches the entries `actor` may see.
pub fn fetch_request(
    db: &Database,
    config: &Config,
    filters: &FilterArgs,
    actor: Actor,
    today: NaiveDate,
) -> Result<TimesheetRequest> {
    let projects = db.all_projects().context("failed to list projects")?;
    let options = options_from_filters(filters, config, projects);
    let mut request = TimesheetRequest::from_options(options, db, today)?;

    let grants = db.grants().context("failed to load permissions")?;
    let aggregator = Aggregator::new(db, db, &grants);
    request
        .fetch_time_entries(&aggregator, &actor)
        .context("failed to fetch time entries")?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use ts_core::{Period, PeriodType, ProjectId, Sort};

    fn config() -> Config {
        Config {
            database_path: PathBuf::from("unused.db"),
            actor_id: Some(UserId::new(1)),
            default_sort: Some("issue".to_string()),
            default_period: Some("current_month".to_string()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 29).unwrap()
    }

    #[test]
    fn actor_flag_overrides_config() {
        assert_eq!(
            resolve_actor(Some(UserId::new(7)), &config()).unwrap(),
            Actor::new(UserId::new(7))
        );
        assert_eq!(
            resolve_actor(None, &config()).unwrap(),
            Actor::new(UserId::new(1))
        );

        let mut anonymous = config();
        anonymous.actor_id = None;
        assert!(resolve_actor(None, &anonymous).is_err());
    }

    #[test]
    fn config_defaults_apply_without_flags() {
        let db = Database::open_in_memory().unwrap();
        let options = options_from_filters(&FilterArgs::default(), &config(), Vec::new());
        let request = TimesheetRequest::from_options(options, &db, today()).unwrap();

        assert_eq!(request.sort(), Sort::Issue);
        assert_eq!(request.period_type(), PeriodType::Default);
        assert_eq!(request.period(), Some(Period::CurrentMonth));
        assert_eq!(request.date_from(), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(request.date_to(), NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn explicit_dates_suppress_the_default_period() {
        let filters = FilterArgs {
            from: Some("2025-01-06".to_string()),
            to: Some("2025-01-10".to_string()),
            sort: Some("user".to_string()),
            ..FilterArgs::default()
        };
        let options = options_from_filters(&filters, &config(), Vec::new());
        assert_eq!(options.period, None);
        assert_eq!(options.period_type, None);
        assert_eq!(options.sort.as_deref(), Some("user"));
    }

    #[test]
    fn empty_filters_mean_everything() {
        let filters = FilterArgs {
            projects: vec![ProjectId::new(2)],
            ..FilterArgs::default()
        };
        let options = options_from_filters(&filters, &config(), Vec::new());
        assert_eq!(options.projects, Some(vec![ProjectId::new(2)]));
        assert_eq!(options.users, None);
        assert_eq!(options.activities, None);
        assert_eq!(options.potential_time_entry_ids, None);
    }
}
