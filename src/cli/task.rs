//! trk task command implementations.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{EntityId, Task};

pub struct NewOptions {
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
struct TaskListOutput {
    total: usize,
    tasks: Vec<Task>,
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

    let mut task = Task::new(name, options.description);
    if let Some(status) = options.status.as_deref() {
        task.status = status.parse()?;
    }
    task.duration = super::parse_duration(options.duration)?;
    task.start = super::parse_start(options.start.as_deref())?;

    let created = manager.create_task(task)?;
    store.save(&manager)?;

    let mut human = HumanOutput::new("Task created");
    human.push_summary("ID", created.id.to_string());
    human.push_summary("Status", created.status.to_string());
    if let Some(label) = super::schedule_label(created.start, created.duration) {
        human.push_summary("Scheduled", label);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task new",
        &created,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let (_store, manager) = super::load_store(options.data)?;
    let tasks = manager.all_tasks();

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: tasks.clone(),
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        let mut line = format!("[{}] {} {}", task.status, task.id, task.name);
        if let Some(label) = super::schedule_label(task.start, task.duration) {
            line.push_str(&format!(" ({label})"));
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let (_store, mut manager) = super::load_store(options.data)?;
    let task = manager.task(options.id)?;

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("Name", task.name.clone());
    if !task.description.is_empty() {
        human.push_summary("Description", task.description.clone());
    }
    human.push_summary("Status", task.status.to_string());
    if let Some(label) = super::schedule_label(task.start, task.duration) {
        human.push_summary("Scheduled", label);
    }
    if let Some(end) = task.end() {
        human.push_summary("Ends", end.to_rfc3339());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        &task,
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

    let mut task = manager.task(options.id)?;
    if let Some(name) = options.name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("name cannot be empty".to_string()));
        }
        task.name = trimmed.to_string();
    }
    if let Some(description) = options.description {
        task.description = description;
    }
    if let Some(status) = options.status.as_deref() {
        task.status = status.parse()?;
    }
    if options.unschedule {
        task.start = None;
        task.duration = None;
    }
    if let Some(duration) = super::parse_duration(options.duration)? {
        task.duration = Some(duration);
    }
    if let Some(start) = super::parse_start(options.start.as_deref())? {
        task.start = Some(start);
    }

    manager.update_task(task.clone())?;
    store.save(&manager)?;

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Status", task.status.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task update",
        &task,
        Some(&human),
    )
}

pub fn run_remove(options: RemoveOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    manager.remove_task(options.id);
    store.save(&manager)?;

    let output = RemovedOutput { id: options.id };
    let mut human = HumanOutput::new("Task removed");
    human.push_summary("ID", options.id.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task remove",
        &output,
        Some(&human),
    )
}

pub fn run_clear(options: ClearOptions) -> Result<()> {
    let (store, mut manager) = super::load_store(options.data)?;
    let removed = manager.all_tasks().len();
    manager.clear_tasks();
    store.save(&manager)?;

    let output = ClearedOutput { removed };
    let mut human = HumanOutput::new("Tasks cleared");
    human.push_summary("Removed", removed.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task clear",
        &output,
        Some(&human),
    )
}
