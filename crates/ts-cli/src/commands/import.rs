//! Import command for loading a JSON dataset into the local `SQLite` store.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use ts_db::{Database, Dataset, RecordCounts};

/// Reads a dataset from `reader`, upserts it and reports what was written.
pub fn run<R: Read, W: Write>(reader: R, writer: &mut W, db: &Database) -> Result<RecordCounts> {
    let dataset = Dataset::from_reader(reader).context("invalid dataset")?;
    let counts = db.import(&dataset).context("failed to import dataset")?;

    writeln!(
        writer,
        "Imported {} users, {} projects, {} activities, {} issues, {} capabilities, {} time entries",
        counts.users,
        counts.projects,
        counts.activities,
        counts.issues,
        counts.capabilities,
        counts.time_entries
    )?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_fixture_and_reports_counts() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let dataset = include_str!("../../tests/fixtures/dataset.json");

        let counts = run(dataset.as_bytes(), &mut output, &db).unwrap();

        assert_eq!(counts.time_entries, 5);
        assert_eq!(db.counts().unwrap(), counts);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Imported 4 users, 4 projects, 3 activities, 3 issues, 2 capabilities, 5 time entries\n"
        );
    }

    #[test]
    fn rejects_malformed_json() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();

        let err = run("{\"users\": [".as_bytes(), &mut output, &db).unwrap_err();

        assert_eq!(err.to_string(), "invalid dataset");
        assert!(output.is_empty());
        assert_eq!(db.counts().unwrap(), RecordCounts::default());
    }
}
