//! Export command for writing time entries as CSV.

use std::io::Write;

use anyhow::{Context, Result};
use ts_core::{TabularExporter, TimesheetRequest};

/// Writes the fetched entries as CSV and returns the number of data rows.
pub fn run<W: Write>(writer: W, request: &TimesheetRequest) -> Result<usize> {
    let entries = request.time_entries();
    TabularExporter::new()
        .write_csv(entries, writer)
        .context("failed to write CSV")?;
    Ok(entries.log_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use ts_core::{Actor, EntryId, UserId};

    use crate::cli::FilterArgs;
    use crate::commands::test_support::{config, seeded_database};
    use crate::commands::util::fetch_request;

    fn export(filters: &FilterArgs, actor: i64) -> (String, usize) {
        let db = seeded_database();
        let today = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
        let request =
            fetch_request(&db, &config(), filters, Actor::new(UserId::new(actor)), today).unwrap();
        let mut output = Vec::new();
        let rows = run(&mut output, &request).unwrap();
        (String::from_utf8(output).unwrap(), rows)
    }

    #[test]
    fn exports_user_groups_in_name_order() {
        let filters = FilterArgs {
            sort: Some("user".to_string()),
            period: Some("all".to_string()),
            ..FilterArgs::default()
        };
        let (csv, rows) = export(&filters, 1);

        assert_eq!(rows, 5);
        let ids: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        // Grace then Ivan, each by date.
        assert_eq!(ids, vec!["5", "1", "3", "2", "4"]);
        assert!(csv.starts_with("#,Date,Member,Activity,Project,Issue,Comments,Hours\n"));
    }

    #[test]
    fn entry_ids_bypass_the_window() {
        let filters = FilterArgs {
            entries: vec![EntryId::new(4), EntryId::new(2)],
            ..FilterArgs::default()
        };
        let (csv, rows) = export(&filters, 1);

        assert_eq!(rows, 2);
        assert!(csv.contains("\n2,2025-01-27,Ivan,Design,Website,Feature #501,Palette,2.0\n"));
        assert!(csv.contains("\n4,2025-01-30,Ivan,Development,Backend,,\"Code review, cleanup\",1.5\n"));
    }

    #[test]
    fn own_entries_only_for_view_grant() {
        let filters = FilterArgs {
            from: Some("2025-01-27".to_string()),
            to: Some("2025-01-31".to_string()),
            ..FilterArgs::default()
        };
        let (csv, rows) = export(&filters, 9);

        assert_eq!(rows, 1);
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("4,2025-01-30,Ivan,"));
    }
}
