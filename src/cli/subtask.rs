//! trk subtask command implementations.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{EntityId, Subtask};

pub struct NewOptions {
    pub epic: EntityId,
    pub name: String,
    pub description: String,
    pub status: Option<String>,
    pub duration: Option<i64>,
    pub start: Option<String>,
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: EntityId,
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct UpdateOptions {
    pub id: EntityId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub duration: Option<i64>,
    pub start: Option<String>,
    pub unschedule: bool,
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RemoveOptions {
    pub id: EntityId,
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ClearOptions {
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct SubtaskListOutput {
    total: usize,
    subtasks: Vec<Subtask>,
}

#[derive(serde::Serialize)]
struct RemovedOutput {
    id: EntityId,
}

#[derive(serde::Serialize)]
struct ClearedOutput {
    removed: usize,
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    let name = options.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("name cannot be empty".to_string()));
    }

    let mut subtask = Subtask::new(name, options.description, options.epic);
    if let Some(status) = options.status.as_deref() {
        subtask.status = status.parse()?;
    }
    subtask.duration = super::parse_duration(options.duration)?;
    subtask.start = super::parse_start(options.start.as_deref())?;

    let created = manager.create_subtask(subtask)?;
    store.save(&manager)?;

    let mut human = HumanOutput::new("Subtask created");
    human.push_summary("ID", created.id.to_string());
    human.push_summary("Epic", created.epic_id.to_string());
    human.push_summary("Status", created.status.to_string());
    if let Some(label) = super::schedule_label(created.start, created.duration) {
        human.push_summary("Scheduled", label);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtask new",
        &created,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let (_store, manager) = super::load_store(options.data)?;
    let subtasks = manager.all_subtasks();

    let output = SubtaskListOutput {
        total: subtasks.len(),
        subtasks: subtasks.clone(),
    };

    let mut human = HumanOutput::new("Subtasks");
    human.push_summary("Total", subtasks.len().to_string());
    for subtask in &subtasks {
        let mut line = format!(
            "[{}] {} {} (epic: {})",
            subtask.status, subtask.id, subtask.name, subtask.epic_id
        );
        if let Some(label) = super::schedule_label(subtask.start, subtask.duration) {
            line.push_str(&format!(" ({label})"));
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtask list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let (_store, mut manager) = super::load_store(options.data)?;
    let subtask = manager.subtask(options.id)?;

    let mut human = HumanOutput::new(format!("Subtask {}", subtask.id));
    human.push_summary("Name", subtask.name.clone());
    if !subtask.description.is_empty() {
        human.push_summary("Description", subtask.description.clone());
    }
    human.push_summary("Epic", subtask.epic_id.to_string());
    human.push_summary("Status", subtask.status.to_string());
    if let Some(label) = super::schedule_label(subtask.start, subtask.duration) {
        human.push_summary("Scheduled", label);
    }
    if let Some(end) = subtask.end() {
        human.push_summary("Ends", end.to_rfc3339());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtask show",
        &subtask,
        Some(&human),
    )
}

pub fn run_update(options: UpdateOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    if options.unschedule && (options.duration.is_some() || options.start.is_some()) {
        return Err(Error::InvalidArgument(
            "--unschedule cannot be combined with --duration or --start".to_string(),
        ));
    }

    let mut subtask = manager.subtask(options.id)?;
    if let Some(name) = options.name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("name cannot be empty".to_string()));
        }
        subtask.name = trimmed.to_string();
    }
    if let Some(description) = options.description {
        subtask.description = description;
    }
    if let Some(status) = options.status.as_deref() {
        subtask.status = status.parse()?;
    }
    if options.unschedule {
        subtask.start = None;
        subtask.duration = None;
    }
    if let Some(duration) = super::parse_duration(options.duration)? {
        subtask.duration = Some(duration);
    }
    if let Some(start) = super::parse_start(options.start.as_deref())? {
        subtask.start = Some(start);
    }

    manager.update_subtask(subtask.clone())?;
    store.save(&manager)?;

    let mut human = HumanOutput::new("Subtask updated");
    human.push_summary("ID", subtask.id.to_string());
    human.push_summary("Status", subtask.status.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtask update",
        &subtask,
        Some(&human),
    )
}

pub fn run_remove(options: RemoveOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    manager.remove_subtask(options.id);
    store.save(&manager)?;

    let output = RemovedOutput { id: options.id };
    let mut human = HumanOutput::new("Subtask removed");
    human.push_summary("ID", options.id.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtask remove",
        &output,
        Some(&human),
    )
}

pub fn run_clear(options: ClearOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    let removed = manager.all_subtasks().len();
    manager.clear_subtasks();
    store.save(&manager)?;

    let output = ClearedOutput { removed };
    let mut human = HumanOutput::new("Subtasks cleared");
    human.push_summary("Removed", removed.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtask clear",
        &output,
        Some(&human),
    )
}
