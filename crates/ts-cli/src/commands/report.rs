//! Report command for printing grouped time entries.
//!
//! This module implements `timesheet report` with human-readable and JSON
//! output. Groups appear in key order; the summary carries totals, billed and
//! unbilled hours, and the working-hour quota for the window.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use ts_core::{
    DateRange, PeriodType, TimeEntries, TimeEntry, TimesheetParams, TimesheetRequest, User,
    format_hours,
};

/// Describes the window in the report title.
fn describe_range(range: Option<DateRange>) -> String {
    match range {
        None => "all time".to_string(),
        Some(range) if range.from == range.to => range.from.format("%Y-%m-%d").to_string(),
        Some(range) => format!(
            "{} to {}",
            range.from.format("%Y-%m-%d"),
            range.to.format("%Y-%m-%d")
        ),
    }
}

fn sum_hours(logs: &[TimeEntry]) -> f64 {
    logs.iter().map(|entry| entry.hours).sum()
}

fn write_heading(output: &mut String, label: &str) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "{label}")?;
    writeln!(output, "{}", "─".repeat(label.chars().count()))?;
    Ok(())
}

/// One line per entry. `who` is the user, or the project when grouping by user.
fn write_entry(
    output: &mut String,
    indent: &str,
    entry: &TimeEntry,
    who: &str,
    show_issue: bool,
) -> Result<()> {
    let mut fields = vec![
        format!("#{}", entry.id),
        entry.spent_on.format("%Y-%m-%d").to_string(),
        format!("{}h", format_hours(entry.hours)),
        who.to_string(),
        entry.activity.name.clone(),
    ];
    if show_issue {
        if let Some(issue) = &entry.issue {
            fields.push(issue.reference());
        }
    }
    if !entry.comments.is_empty() {
        fields.push(entry.comments.clone());
    }
    writeln!(output, "{indent}{}", fields.join("  "))?;
    Ok(())
}

fn write_subtotal(output: &mut String, hours: f64, users: Option<&[User]>) -> Result<()> {
    match users {
        Some(users) if !users.is_empty() => {
            let names: Vec<&str> = users.iter().map(|user| user.name.as_str()).collect();
            writeln!(
                output,
                "  Subtotal: {}h ({})",
                format_hours(hours),
                names.join(", ")
            )?;
        }
        _ => writeln!(output, "  Subtotal: {}h", format_hours(hours))?,
    }
    Ok(())
}

/// Formats the human-readable report output.
pub fn format_report(request: &TimesheetRequest) -> Result<String> {
    let mut output = String::new();
    let entries = request.time_entries();

    writeln!(
        output,
        "TIMESHEET: {} (by {})",
        describe_range(request.date_range()),
        request.sort()
    )?;

    if entries.is_empty() {
        writeln!(output)?;
        writeln!(output, "No time entries to show.")?;
        return Ok(output);
    }

    match entries {
        TimeEntries::Project(groups) => {
            for (label, group) in groups {
                write_heading(&mut output, label)?;
                for entry in &group.logs {
                    write_entry(&mut output, "  ", entry, &entry.user.name, true)?;
                }
                write_subtotal(&mut output, sum_hours(&group.logs), Some(&group.users))?;
            }
        }
        TimeEntries::User(groups) => {
            for (name, group) in groups {
                write_heading(&mut output, name)?;
                for entry in &group.logs {
                    write_entry(&mut output, "  ", entry, &entry.project.name, true)?;
                }
                write_subtotal(&mut output, sum_hours(&group.logs), None)?;
            }
        }
        TimeEntries::Issue(groups) => {
            for (label, group) in groups {
                write_heading(&mut output, label)?;
                let mut hours = 0.0;
                for issue in group.issues.values() {
                    writeln!(
                        output,
                        "  {}: {}",
                        issue.issue.reference(),
                        issue.issue.subject
                    )?;
                    for entry in &issue.logs {
                        write_entry(&mut output, "    ", entry, &entry.user.name, false)?;
                    }
                    hours += sum_hours(&issue.logs);
                }
                write_subtotal(&mut output, hours, Some(&group.users))?;
            }
        }
    }

    writeln!(output)?;
    writeln!(output, "SUMMARY")?;
    writeln!(output, "───────")?;
    writeln!(output, "Total:     {}h", format_hours(request.total()))?;
    writeln!(output, "Billed:    {}h", format_hours(request.billed()))?;
    writeln!(output, "Unbilled:  {}h", format_hours(request.unbilled()))?;
    match (request.quota(), request.required()) {
        (Some(quota), Some(required)) => {
            let users = request.users.len();
            let noun = if users == 1 { "user" } else { "users" };
            writeln!(output, "Quota:     {}h per user", format_hours(quota))?;
            writeln!(
                output,
                "Required:  {}h for {users} {noun}",
                format_hours(required)
            )?;
        }
        _ => writeln!(output, "Quota:     n/a (all time)")?,
    }

    Ok(output)
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub params: TimesheetParams,
    pub period_type: PeriodType,
    pub totals: JsonTotals,
    pub time_entries: &'a TimeEntries,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub total: f64,
    pub billed: f64,
    pub unbilled: f64,
    /// Expected hours per user; `null` for all time.
    pub quota: Option<f64>,
    pub required: Option<f64>,
}

/// Formats the report as JSON.
pub fn format_report_json(request: &TimesheetRequest) -> Result<String> {
    let report = JsonReport {
        params: request.to_params(),
        period_type: request.period_type(),
        totals: JsonTotals {
            total: request.total(),
            billed: request.billed(),
            unbilled: request.unbilled(),
            quota: request.quota(),
            required: request.required(),
        },
        time_entries: request.time_entries(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command on an already fetched request.
pub fn run<W: Write>(writer: &mut W, request: &TimesheetRequest, json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", format_report_json(request)?)?;
    } else {
        write!(writer, "{}", format_report(request)?)?;
    }
    Ok(())
}
