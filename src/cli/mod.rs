//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Local bug tracker with timelines, dashboard stats and CSV export
#[derive(Parser, Debug)]
#[command(name = "recon", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (auto-discover .recon/recon.db if not set)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Actor name used as default author and reporter
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, env = "RECON_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a recon workspace in the current directory
    Init {
        /// Reinitialize even if a workspace already exists
        #[arg(long)]
        force: bool,
    },

    /// Report a new bug
    Create(CreateArgs),

    /// List active bugs
    List(ListArgs),

    /// Show bug details
    Show {
        /// Bug ID (e.g. 7 or BUG-007)
        id: String,

        /// Also print the timeline, oldest first
        #[arg(long)]
        timeline: bool,
    },

    /// Update a bug
    Update(UpdateArgs),

    /// Archive bugs (hidden from lists and stats, timeline kept)
    Archive {
        /// Bug IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Add a timeline event to a bug
    #[command(alias = "comment")]
    Event(EventArgs),

    /// List a bug's timeline events
    Timeline(TimelineArgs),

    /// Show dashboard statistics
    #[command(alias = "dashboard")]
    Stats(StatsArgs),

    /// Export a bug report as CSV
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// One-line summary
    pub summary: String,

    /// Longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Steps to reproduce
    #[arg(long)]
    pub steps: Option<String>,

    /// Expected result
    #[arg(long)]
    pub expected: Option<String>,

    /// Actual result
    #[arg(long)]
    pub actual: Option<String>,

    /// Severity (Blocker, Critical, Major, Minor)
    #[arg(long, short = 's')]
    pub severity: Option<String>,

    /// Priority (Critical, High, Medium, Low)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Status (Reported, "In Progress", "On Hold", Resolved, Closed)
    #[arg(long)]
    pub status: Option<String>,

    /// Assign to person
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// Reporter (defaults to the actor)
    #[arg(long)]
    pub reporter: Option<String>,

    /// Environment the bug was seen in
    #[arg(long, short = 'e')]
    pub environment: Option<String>,

    /// Resolution (Fixed, "Won't Fix", Duplicate, "Cannot Reproduce", Done)
    #[arg(long)]
    pub resolution: Option<String>,

    /// Requirement number
    #[arg(long)]
    pub requirement: Option<String>,

    /// Test case name
    #[arg(long)]
    pub test_case: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Filter by status (repeatable)
    #[arg(long)]
    pub status: Vec<String>,

    /// Filter by severity (repeatable)
    #[arg(long)]
    pub severity: Vec<String>,

    /// Filter by priority (repeatable)
    #[arg(long)]
    pub priority: Vec<String>,

    /// Filter by assignee (exact match)
    #[arg(long)]
    pub assignee: Option<String>,

    /// Only bugs without an assignee
    #[arg(long, conflicts_with = "assignee")]
    pub unassigned: bool,

    /// Only critical bugs (priority Critical or severity Blocker/Critical)
    #[arg(long)]
    pub critical: bool,

    /// Maximum number of bugs to show (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

/// Fields to change. For optional text fields an empty value clears them.
#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Bug ID
    pub id: String,

    #[arg(long)]
    pub summary: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub steps: Option<String>,

    #[arg(long)]
    pub expected: Option<String>,

    #[arg(long)]
    pub actual: Option<String>,

    #[arg(long, short = 's')]
    pub severity: Option<String>,

    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    #[arg(long)]
    pub reporter: Option<String>,

    #[arg(long, short = 'e')]
    pub environment: Option<String>,

    /// Resolution; an empty value clears it
    #[arg(long)]
    pub resolution: Option<String>,

    #[arg(long)]
    pub requirement: Option<String>,

    #[arg(long)]
    pub test_case: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EventArgs {
    /// Bug ID
    pub id: String,

    /// Event text
    pub comment: String,

    /// Author (defaults to the actor)
    #[arg(long)]
    pub author: Option<String>,

    /// Mark as a nexus event (a turning point in the bug's history)
    #[arg(long)]
    pub nexus: bool,

    /// Attachment URL
    #[arg(long)]
    pub attachment: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TimelineArgs {
    /// Bug ID
    pub id: String,

    /// Oldest first instead of newest first
    #[arg(long)]
    pub chronological: bool,

    /// Only the N most recent events (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StatsArgs {
    /// YAML file mapping bug IDs to due dates, for the due/overdue counters
    #[arg(long)]
    pub due_dates: Option<PathBuf>,

    /// Days ahead that count as "due soon" (overrides config)
    #[arg(long)]
    pub due_soon_days: Option<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Bug ID
    pub id: String,

    /// Output file, or a directory to write the generated file name into
    #[arg(long, short = 'o', conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the report instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    Elvish,
}
