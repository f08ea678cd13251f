//! trk epic command implementations.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{EntityId, Epic, Subtask};

pub struct NewOptions {
    pub name: String,
    pub description: String,
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

pub struct SubtasksOptions {
    pub id: EntityId,
    pub data: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct UpdateOptions {
    pub id: EntityId,
    pub name: Option<String>,
    pub description: Option<String>,
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
struct EpicListOutput {
    total: usize,
    epics: Vec<Epic>,
}

#[derive(serde::Serialize)]
struct EpicSubtasksOutput {
    epic: EntityId,
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

    let created = manager.create_epic(Epic::new(name, options.description))?;
    store.save(&manager)?;

    let mut human = HumanOutput::new("Epic created");
    human.push_summary("ID", created.id.to_string());
    human.push_summary("Status", created.status.to_string());
    human.push_next_step(format!("trk subtask new --epic {} --name \"...\"", created.id));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "epic new",
        &created,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let (_store, manager) = super::load_store(options.data)?;
    let epics = manager.all_epics();

    let output = EpicListOutput {
        total: epics.len(),
        epics: epics.clone(),
    };

    let mut human = HumanOutput::new("Epics");
    human.push_summary("Total", epics.len().to_string());
    for epic in &epics {
        let mut line = format!(
            "[{}] {} {} ({} subtasks)",
            epic.status,
            epic.id,
            epic.name,
            epic.subtasks.len()
        );
        if let Some(label) = super::schedule_label(epic.start, epic.duration) {
            line.push_str(&format!(" ({label})"));
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "epic list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let (_store, mut manager) = super::load_store(options.data)?;
    let epic = manager.epic(options.id)?;

    let mut human = HumanOutput::new(format!("Epic {}", epic.id));
    human.push_summary("Name", epic.name.clone());
    if !epic.description.is_empty() {
        human.push_summary("Description", epic.description.clone());
    }
    human.push_summary("Status", epic.status.to_string());
    human.push_summary("Subtasks", epic.subtasks.len().to_string());
    if let Some(label) = super::schedule_label(epic.start, epic.duration) {
        human.push_summary("Window", label);
    }
    if let Some(end) = epic.end() {
        human.push_summary("Ends", end.to_rfc3339());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "epic show",
        &epic,
        Some(&human),
    )
}

pub fn run_subtasks(options: SubtasksOptions) -> Result<()> {
    let (_store, manager) = super::load_store(options.data)?;
    let subtasks = manager.subtasks_of_epic(options.id)?;

    let output = EpicSubtasksOutput {
        epic: options.id,
        total: subtasks.len(),
        subtasks: subtasks.clone(),
    };

    let mut human = HumanOutput::new(format!("Subtasks of epic {}", options.id));
    human.push_summary("Total", subtasks.len().to_string());
    for subtask in &subtasks {
        let mut line = format!("[{}] {} {}", subtask.status, subtask.id, subtask.name);
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
        "epic subtasks",
        &output,
        Some(&human),
    )
}

pub fn run_update(options: UpdateOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    if options.name.is_none() && options.description.is_none() {
        return Err(Error::InvalidArgument(
            "epic update requires --name or --description".to_string(),
        ));
    }

    let mut epic = manager.epic(options.id)?;
    if let Some(name) = options.name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("name cannot be empty".to_string()));
        }
        epic.name = trimmed.to_string();
    }
    if let Some(description) = options.description {
        epic.description = description;
    }

    manager.update_epic(epic)?;
    store.save(&manager)?;
    let updated = manager.epic(options.id)?;

    let mut human = HumanOutput::new("Epic updated");
    human.push_summary("ID", updated.id.to_string());
    human.push_summary("Name", updated.name.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "epic update",
        &updated,
        Some(&human),
    )
}

pub fn run_remove(options: RemoveOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    manager.remove_epic(options.id);
    store.save(&manager)?;

    let output = RemovedOutput { id: options.id };
    let mut human = HumanOutput::new("Epic removed");
    human.push_summary("ID", options.id.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "epic remove",
        &output,
        Some(&human),
    )
}

pub fn run_clear(options: ClearOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    let removed = manager.all_epics().len();
    manager.clear_epics();
    store.save(&manager)?;

    let output = ClearedOutput { removed };
    let mut human = HumanOutput::new("Epics cleared");
    human.push_summary("Removed", removed.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "epic clear",
        &output,
        Some(&human),
    )
}
