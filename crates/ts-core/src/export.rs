//! Flattening of aggregated entries into rows, and CSV output.

use std::io::Write;

use crate::aggregate::TimeEntries;
use crate::error::TimesheetError;
use crate::model::TimeEntry;
use crate::ports::{NoHooks, TimesheetHooks};

/// Column labels of the header row, before hooks run.
pub const HEADER: [&str; 8] = [
    "#", "Date", "Member", "Activity", "Project", "Issue", "Comments", "Hours",
];

/// Turns [`TimeEntries`] into a header row plus one row per entry.
#[derive(Clone, Copy)]
pub struct TabularExporter<'a> {
    hooks: &'a dyn TimesheetHooks,
}

impl Default for TabularExporter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TabularExporter<'a> {
    pub const fn new() -> Self {
        Self { hooks: &NoHooks }
    }

    pub const fn with_hooks(hooks: &'a dyn TimesheetHooks) -> Self {
        Self { hooks }
    }

    pub fn header(&self) -> Vec<String> {
        self.hooks
            .augment_header(HEADER.iter().map(ToString::to_string).collect())
    }

    pub fn row(&self, entry: &TimeEntry) -> Vec<String> {
        let columns = vec![
            entry.id.to_string(),
            entry.spent_on.format("%Y-%m-%d").to_string(),
            entry.user.name.clone(),
            entry.activity.name.clone(),
            entry.project.name.clone(),
            entry
                .issue
                .as_ref()
                .map(|issue| issue.reference())
                .unwrap_or_default(),
            entry.comments.clone(),
            format_hours(entry.hours),
        ];
        self.hooks.augment_row(entry, columns)
    }

    /// The header followed by every entry in export order.
    pub fn rows(&self, entries: &TimeEntries) -> Vec<Vec<String>> {
        std::iter::once(self.header())
            .chain(entries.logs().map(|entry| self.row(entry)))
            .collect()
    }

    /// Writes the rows as CSV. Hooks may change the column count, so rows
    /// are not required to be the same length.
    pub fn write_csv<W: Write>(&self, entries: &TimeEntries, out: W) -> Result<(), TimesheetError> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
        let mut written = 0usize;
        for row in self.rows(entries) {
            writer.write_record(&row)?;
            written += 1;
        }
        writer.flush()?;
        tracing::debug!(rows = written, "wrote csv export");
        Ok(())
    }
}

/// Formats hours with at least one decimal: `8.0`, `7.5`, `0.25`.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.1}")
    } else {
        hours.to_string()
    }
}
