//! Work-item records for trk.
//!
//! Three kinds of items share one id space: standalone tasks, grouping
//! epics, and epic-owned subtasks. Epics never carry their own schedule;
//! their status and time window are derived from their subtasks by the
//! manager (see `aggregate`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier shared across tasks, subtasks, and epics. Zero means
/// "not yet assigned"; the manager hands out positive ids.
pub type EntityId = u32;

/// Lifecycle status of a work item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    New,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "new",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Status::New),
            "in_progress" | "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(Error::InvalidArgument(format!(
                "unknown status '{other}' (expected new, in_progress, done)"
            ))),
        }
    }
}

/// Kind tag used in errors, output, and the snapshot format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Task,
    Subtask,
    Epic,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::Task => "task",
            ItemKind::Subtask => "subtask",
            ItemKind::Epic => "epic",
        };
        f.write_str(label)
    }
}

/// Computed end instant: defined only when both start and duration are.
pub(crate) fn end_of(
    start: Option<DateTime<Utc>>,
    duration: Option<Duration>,
) -> Option<DateTime<Utc>> {
    match (start, duration) {
        (Some(start), Some(duration)) => Some(start + duration),
        _ => None,
    }
}

/// Serde helper persisting `Option<Duration>` as whole minutes.
pub(crate) mod duration_minutes {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&duration.num_minutes()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let minutes: Option<i64> = Option::deserialize(deserializer)?;
        Ok(minutes.map(Duration::minutes))
    }
}

/// A standalone task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub status: Status,
    #[serde(default, with = "duration_minutes", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            status: Status::New,
            duration: None,
            start: None,
        }
    }

    /// Scheduled end of the task, when both start and duration are set.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        end_of(self.start, self.duration)
    }
}

/// A task owned by exactly one epic. The epic reference is fixed at
/// creation and cannot be changed by updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub id: EntityId,
    pub epic_id: EntityId,
    pub name: String,
    pub description: String,
    pub status: Status,
    #[serde(default, with = "duration_minutes", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
}

impl Subtask {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        epic_id: EntityId,
    ) -> Self {
        Self {
            id: 0,
            epic_id,
            name: name.into(),
            description: description.into(),
            status: Status::New,
            duration: None,
            start: None,
        }
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        end_of(self.start, self.duration)
    }
}

/// A grouping item. Status, start, duration, and end are derived from the
/// owned subtasks and refreshed by the manager; updates only touch name
/// and description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Epic {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub status: Status,
    #[serde(default, with = "duration_minutes", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Owned subtask ids in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<EntityId>,
}

impl Epic {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            status: Status::New,
            duration: None,
            start: None,
            end: None,
            subtasks: Vec::new(),
        }
    }

    /// Derived end of the epic. Unlike tasks this is a stored field: it is
    /// the end of the subtask starting last, not `start + duration`.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }
}

/// Closed sum over the three item kinds. Used wherever an operation spans
/// kinds: the view history, the schedule index, and the snapshot format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkItem {
    Task(Task),
    Subtask(Subtask),
    Epic(Epic),
}

impl WorkItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            WorkItem::Task(_) => ItemKind::Task,
            WorkItem::Subtask(_) => ItemKind::Subtask,
            WorkItem::Epic(_) => ItemKind::Epic,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            WorkItem::Task(task) => task.id,
            WorkItem::Subtask(subtask) => subtask.id,
            WorkItem::Epic(epic) => epic.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WorkItem::Task(task) => &task.name,
            WorkItem::Subtask(subtask) => &subtask.name,
            WorkItem::Epic(epic) => &epic.name,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            WorkItem::Task(task) => task.status,
            WorkItem::Subtask(subtask) => subtask.status,
            WorkItem::Epic(epic) => epic.status,
        }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        match self {
            WorkItem::Task(task) => task.start,
            WorkItem::Subtask(subtask) => subtask.start,
            WorkItem::Epic(epic) => epic.start,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            WorkItem::Task(task) => task.duration,
            WorkItem::Subtask(subtask) => subtask.duration,
            WorkItem::Epic(epic) => epic.duration,
        }
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        match self {
            WorkItem::Task(task) => task.end(),
            WorkItem::Subtask(subtask) => subtask.end(),
            WorkItem::Epic(epic) => epic.end(),
        }
    }
}

impl From<Task> for WorkItem {
    fn from(task: Task) -> Self {
        WorkItem::Task(task)
    }
}

impl From<Subtask> for WorkItem {
    fn from(subtask: Subtask) -> Self {
        WorkItem::Subtask(subtask)
    }
}

impl From<Epic> for WorkItem {
    fn from(epic: Epic) -> Self {
        WorkItem::Epic(epic)
    }
}
