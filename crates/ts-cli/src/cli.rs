//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ts_core::{ActivityId, DeliverableId, EntryId, ProjectId, UserId};

/// Timesheet reports over logged time entries.
///
/// Groups the entries you are allowed to see by project, user or issue, and
/// exports them as CSV.
#[derive(Debug, Parser)]
#[command(name = "timesheet", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// User the report is generated for (overrides `actor_id`).
    #[arg(long, global = true)]
    pub actor: Option<UserId>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print grouped time entries with totals and quota.
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write time entries as CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a JSON dataset from stdin.
    Import,

    /// Show record counts.
    Status,
}

/// Options shared by `report` and `export`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Grouping: project, user or issue.
    #[arg(long)]
    pub sort: Option<String>,

    /// Named period, e.g. `current_week`, `last_month` or `all`.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub period: Option<String>,

    /// First day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub from: Option<String>,

    /// Last day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub to: Option<String>,

    /// Restrict to a project. Repeatable.
    #[arg(long = "project", value_name = "ID")]
    pub projects: Vec<ProjectId>,

    /// Restrict to a user. Repeatable.
    #[arg(long = "user", value_name = "ID")]
    pub users: Vec<UserId>,

    /// Restrict to an activity (and its project-specific children). Repeatable.
    #[arg(long = "activity", value_name = "ID")]
    pub activities: Vec<ActivityId>,

    /// Restrict to a deliverable. Repeatable.
    #[arg(long = "deliverable", value_name = "ID")]
    pub deliverables: Vec<DeliverableId>,

    /// Report exactly these entries, ignoring dates, projects and activities.
    #[arg(long = "entry", value_name = "ID")]
    pub entries: Vec<EntryId>,
}
