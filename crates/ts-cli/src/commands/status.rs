//! Status command for showing what the store holds.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use ts_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let counts = db.counts()?;

    writeln!(writer, "Timesheet status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if counts.time_entries == 0 {
        writeln!(writer, "No time entries recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Records:")?;
    writeln!(writer, "- users: {}", counts.users)?;
    writeln!(writer, "- projects: {}", counts.projects)?;
    writeln!(writer, "- activities: {}", counts.activities)?;
    writeln!(writer, "- issues: {}", counts.issues)?;
    writeln!(writer, "- capabilities: {}", counts.capabilities)?;
    writeln!(writer, "- time entries: {}", counts.time_entries)?;

    Ok(())
}
