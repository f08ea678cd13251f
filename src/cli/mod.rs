//! Command-line interface for trk
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command area is implemented in its own submodule.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manager::TrackingManager;
use crate::store::ItemStore;
use crate::task::EntityId;

mod epic;
mod subtask;
mod task;
mod view;

/// trk - hierarchical work-item tracking
///
/// Tracks standalone tasks, grouping epics, and epic-owned subtasks with
/// lifecycle statuses, derived epic windows, and schedule-conflict checks.
#[derive(Parser, Debug)]
#[command(name = "trk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the item snapshot file (defaults to .trk/items.jsonl)
    #[arg(long, global = true, env = "TRK_DATA")]
    pub data: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Standalone task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Subtask management (owned by an epic)
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Epic management (status and window derived from subtasks)
    #[command(subcommand)]
    Epic(EpicCommands),

    /// Scheduled tasks and subtasks, earliest start first
    Prioritized,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    New {
        /// Task name
        #[arg(long)]
        name: String,

        /// Task description
        #[arg(long, default_value = "")]
        description: String,

        /// Initial status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<i64>,

        /// Start instant (RFC 3339, e.g. 2024-05-20T09:00:00Z)
        #[arg(long)]
        start: Option<String>,
    },

    /// List all tasks
    List,

    /// Show a task by id
    Show { id: EntityId },

    /// Update a task (unset flags keep their stored values)
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<i64>,

        /// Start instant (RFC 3339)
        #[arg(long)]
        start: Option<String>,

        /// Drop the scheduled time window
        #[arg(long)]
        unschedule: bool,
    },

    /// Remove a task
    Remove { id: EntityId },

    /// Remove every task
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Create a subtask under an epic
    New {
        /// Owning epic id
        #[arg(long)]
        epic: EntityId,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Initial status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<i64>,

        /// Start instant (RFC 3339)
        #[arg(long)]
        start: Option<String>,
    },

    /// List all subtasks
    List,

    /// Show a subtask by id
    Show { id: EntityId },

    /// Update a subtask (unset flags keep their stored values)
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Duration in minutes
        #[arg(long)]
        duration: Option<i64>,

        /// Start instant (RFC 3339)
        #[arg(long)]
        start: Option<String>,

        /// Drop the scheduled time window
        #[arg(long)]
        unschedule: bool,
    },

    /// Remove a subtask
    Remove { id: EntityId },

    /// Remove every subtask (epics reset to NEW)
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum EpicCommands {
    /// Create an epic
    New {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// List all epics
    List,

    /// Show an epic by id
    Show { id: EntityId },

    /// List the subtasks owned by an epic
    Subtasks { id: EntityId },

    /// Update an epic's name and description
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Remove an epic and every subtask it owns
    Remove { id: EntityId },

    /// Remove every epic (and, cascading, every subtask)
    Clear,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Task(cmd) => match cmd {
                TaskCommands::New { name, description, status, duration, start } => {
                    task::run_new(task::NewOptions {
                        name,
                        description,
                        status,
                        duration,
                        start,
                        data: self.data,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                TaskCommands::List => task::run_list(task::ListOptions {
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Show { id } => task::run_show(task::ShowOptions {
                    id,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Update { id, name, description, status, duration, start, unschedule } => {
                    task::run_update(task::UpdateOptions {
                        id,
                        name,
                        description,
                        status,
                        duration,
                        start,
                        unschedule,
                        data: self.data,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                TaskCommands::Remove { id } => task::run_remove(task::RemoveOptions {
                    id,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                TaskCommands::Clear => task::run_clear(task::ClearOptions {
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Subtask(cmd) => match cmd {
                SubtaskCommands::New { epic, name, description, status, duration, start } => {
                    subtask::run_new(subtask::NewOptions {
                        epic,
                        name,
                        description,
                        status,
                        duration,
                        start,
                        data: self.data,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                SubtaskCommands::List => subtask::run_list(subtask::ListOptions {
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                SubtaskCommands::Show { id } => subtask::run_show(subtask::ShowOptions {
                    id,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                SubtaskCommands::Update { id, name, description, status, duration, start, unschedule } => {
                    subtask::run_update(subtask::UpdateOptions {
                        id,
                        name,
                        description,
                        status,
                        duration,
                        start,
                        unschedule,
                        data: self.data,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                SubtaskCommands::Remove { id } => subtask::run_remove(subtask::RemoveOptions {
                    id,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                SubtaskCommands::Clear => subtask::run_clear(subtask::ClearOptions {
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Epic(cmd) => match cmd {
                EpicCommands::New { name, description } => epic::run_new(epic::NewOptions {
                    name,
                    description,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                EpicCommands::List => epic::run_list(epic::ListOptions {
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                EpicCommands::Show { id } => epic::run_show(epic::ShowOptions {
                    id,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                EpicCommands::Subtasks { id } => epic::run_subtasks(epic::SubtasksOptions {
                    id,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                EpicCommands::Update { id, name, description } => {
                    epic::run_update(epic::UpdateOptions {
                        id,
                        name,
                        description,
                        data: self.data,
                        json: self.json,
                        quiet: self.quiet,
                    })
                }
                EpicCommands::Remove { id } => epic::run_remove(epic::RemoveOptions {
                    id,
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
                EpicCommands::Clear => epic::run_clear(epic::ClearOptions {
                    data: self.data,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
            Commands::Prioritized => view::run_prioritized(view::PrioritizedOptions {
                data: self.data,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

/// Open the snapshot store for this invocation and load the manager.
pub(crate) fn load_store(data: Option<PathBuf>) -> Result<(ItemStore, TrackingManager)> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?;
    config.validate()?;
    let store = ItemStore::new(config.data_path(data));
    let manager = store.load()?;
    Ok((store, manager))
}

/// Parse an optional RFC 3339 start instant.
pub(crate) fn parse_start(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw {
        None => Ok(None),
        Some(value) => {
            let parsed = DateTime::parse_from_rfc3339(value.trim()).map_err(|err| {
                Error::InvalidArgument(format!("invalid start '{value}': {err}"))
            })?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
    }
}

/// Parse an optional duration given in whole minutes.
pub(crate) fn parse_duration(minutes: Option<i64>) -> Result<Option<Duration>> {
    match minutes {
        None => Ok(None),
        Some(value) if value < 0 => Err(Error::InvalidArgument(
            "duration must be a non-negative number of minutes".to_string(),
        )),
        Some(value) => Ok(Some(Duration::minutes(value))),
    }
}

/// One human-readable line for an item's schedule, e.g.
/// `2024-05-20T09:00:00+00:00 +15m`.
pub(crate) fn schedule_label(
    start: Option<DateTime<Utc>>,
    duration: Option<Duration>,
) -> Option<String> {
    let start = start?;
    let mut label = start.to_rfc3339();
    if let Some(duration) = duration {
        label.push_str(&format!(" +{}m", duration.num_minutes()));
    }
    Some(label)
}
