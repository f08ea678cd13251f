//! Tracking manager for trk.
//!
//! Owns the three entity tables, the shared id sequence, the view history,
//! and the schedule index, and keeps them consistent around every CRUD
//! call: overlap validation runs before any mutation, epics are
//! re-aggregated whenever their subtask set changes, and removals purge
//! the history and the index along with the tables.

use std::collections::HashMap;

use crate::aggregate;
use crate::error::{Error, Result};
use crate::history::History;
use crate::schedule::Schedule;
use crate::task::{EntityId, Epic, ItemKind, Status, Subtask, Task, WorkItem};

/// How an incoming item receives its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdMode {
    /// Always assign the next id from the counter.
    Assign,
    /// Keep a positive supplied id (advancing the counter past it);
    /// assign only when the id is zero. Used when replaying a snapshot.
    Restore,
}

/// Façade over the entity tables, id sequence, history, and schedule.
#[derive(Debug, Clone, Default)]
pub struct TrackingManager {
    id_counter: EntityId,
    tasks: HashMap<EntityId, Task>,
    subtasks: HashMap<EntityId, Subtask>,
    epics: HashMap<EntityId, Epic>,
    history: History,
    schedule: Schedule,
}

impl TrackingManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> EntityId {
        self.id_counter += 1;
        self.id_counter
    }

    fn resolve_id(&mut self, supplied: EntityId, mode: IdMode) -> EntityId {
        match mode {
            IdMode::Assign => self.next_id(),
            IdMode::Restore if supplied == 0 => self.next_id(),
            IdMode::Restore => {
                self.id_counter = self.id_counter.max(supplied);
                supplied
            }
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Add a task, assigning the next id. Fails with `ScheduleConflict`
    /// when the task's time window overlaps an indexed item; nothing
    /// changes on failure.
    pub fn create_task(&mut self, task: Task) -> Result<Task> {
        self.insert_task(task, IdMode::Assign)
    }

    /// Add a task keeping its supplied id (snapshot replay).
    pub fn restore_task(&mut self, task: Task) -> Result<Task> {
        self.insert_task(task, IdMode::Restore)
    }

    fn insert_task(&mut self, mut task: Task, mode: IdMode) -> Result<Task> {
        self.check_schedule(&WorkItem::Task(task.clone()))?;
        task.id = self.resolve_id(task.id, mode);
        if task.start.is_some() {
            self.schedule.upsert(&WorkItem::Task(task.clone()));
        }
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    /// Add a subtask under its epic, assigning the next id. The epic must
    /// exist; the subtask joins the epic's list and the epic is
    /// re-aggregated.
    pub fn create_subtask(&mut self, subtask: Subtask) -> Result<Subtask> {
        self.insert_subtask(subtask, IdMode::Assign)
    }

    /// Add a subtask keeping its supplied id (snapshot replay).
    pub fn restore_subtask(&mut self, subtask: Subtask) -> Result<Subtask> {
        self.insert_subtask(subtask, IdMode::Restore)
    }

    fn insert_subtask(&mut self, mut subtask: Subtask, mode: IdMode) -> Result<Subtask> {
        if !self.epics.contains_key(&subtask.epic_id) {
            return Err(Error::NotFound {
                kind: ItemKind::Epic,
                id: subtask.epic_id,
            });
        }
        self.check_schedule(&WorkItem::Subtask(subtask.clone()))?;
        subtask.id = self.resolve_id(subtask.id, mode);
        if subtask.start.is_some() {
            self.schedule.upsert(&WorkItem::Subtask(subtask.clone()));
        }
        self.subtasks.insert(subtask.id, subtask.clone());
        self.attach_to_epic(subtask.epic_id, subtask.id);
        Ok(subtask)
    }

    /// Add an epic, assigning the next id. Derived fields reset to their
    /// empty-epic values regardless of what the caller supplied.
    pub fn create_epic(&mut self, epic: Epic) -> Result<Epic> {
        self.insert_epic(epic, IdMode::Assign)
    }

    /// Add an epic keeping its supplied id (snapshot replay).
    pub fn restore_epic(&mut self, epic: Epic) -> Result<Epic> {
        self.insert_epic(epic, IdMode::Restore)
    }

    fn insert_epic(&mut self, mut epic: Epic, mode: IdMode) -> Result<Epic> {
        epic.id = self.resolve_id(epic.id, mode);
        epic.status = Status::New;
        epic.start = None;
        epic.duration = None;
        epic.end = None;
        epic.subtasks.clear();
        self.epics.insert(epic.id, epic.clone());
        Ok(epic)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Replace a stored task wholesale, refreshing its schedule entry.
    /// Unknown ids are a no-op.
    pub fn update_task(&mut self, task: Task) -> Result<()> {
        if !self.tasks.contains_key(&task.id) {
            return Ok(());
        }
        self.check_schedule(&WorkItem::Task(task.clone()))?;
        self.schedule.upsert(&WorkItem::Task(task.clone()));
        self.tasks.insert(task.id, task);
        Ok(())
    }

    /// Replace a stored subtask wholesale and re-aggregate its epic.
    /// Unknown ids are a no-op; changing the epic reference is rejected.
    pub fn update_subtask(&mut self, subtask: Subtask) -> Result<()> {
        let Some(stored) = self.subtasks.get(&subtask.id) else {
            return Ok(());
        };
        if stored.epic_id != subtask.epic_id {
            return Err(Error::InvalidArgument(format!(
                "subtask {} belongs to epic {} and cannot be moved",
                subtask.id, stored.epic_id
            )));
        }
        self.check_schedule(&WorkItem::Subtask(subtask.clone()))?;
        self.schedule.upsert(&WorkItem::Subtask(subtask.clone()));
        let epic_id = subtask.epic_id;
        self.subtasks.insert(subtask.id, subtask);
        self.refresh_epic(epic_id);
        Ok(())
    }

    /// Copy name and description onto a stored epic. Derived fields and
    /// the subtask list are never touched. Unknown ids are a no-op.
    pub fn update_epic(&mut self, epic: Epic) -> Result<()> {
        if let Some(stored) = self.epics.get_mut(&epic.id) {
            stored.name = epic.name;
            stored.description = epic.description;
        }
        Ok(())
    }

    // =========================================================================
    // Get / list
    // =========================================================================

    /// Look up a task and record the view in history.
    pub fn task(&mut self, id: EntityId) -> Result<Task> {
        let task = self
            .tasks
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { kind: ItemKind::Task, id })?;
        self.history.record(WorkItem::Task(task.clone()));
        Ok(task)
    }

    /// Look up a subtask and record the view in history.
    pub fn subtask(&mut self, id: EntityId) -> Result<Subtask> {
        let subtask = self
            .subtasks
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { kind: ItemKind::Subtask, id })?;
        self.history.record(WorkItem::Subtask(subtask.clone()));
        Ok(subtask)
    }

    /// Look up an epic and record the view in history.
    pub fn epic(&mut self, id: EntityId) -> Result<Epic> {
        let epic = self
            .epics
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { kind: ItemKind::Epic, id })?;
        self.history.record(WorkItem::Epic(epic.clone()));
        Ok(epic)
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by_key(|task| task.id);
        tasks
    }

    pub fn all_subtasks(&self) -> Vec<Subtask> {
        let mut subtasks: Vec<Subtask> = self.subtasks.values().cloned().collect();
        subtasks.sort_by_key(|subtask| subtask.id);
        subtasks
    }

    pub fn all_epics(&self) -> Vec<Epic> {
        let mut epics: Vec<Epic> = self.epics.values().cloned().collect();
        epics.sort_by_key(|epic| epic.id);
        epics
    }

    /// Subtasks owned by the given epic, in the epic's insertion order.
    pub fn subtasks_of_epic(&self, epic_id: EntityId) -> Result<Vec<Subtask>> {
        let epic = self.epics.get(&epic_id).ok_or(Error::NotFound {
            kind: ItemKind::Epic,
            id: epic_id,
        })?;
        Ok(epic
            .subtasks
            .iter()
            .filter_map(|id| self.subtasks.get(id))
            .cloned()
            .collect())
    }

    /// Scheduled tasks and subtasks, earliest start first.
    pub fn prioritized(&self) -> Vec<WorkItem> {
        self.schedule.prioritized()
    }

    /// Viewed items, oldest view first.
    pub fn history(&self) -> Vec<WorkItem> {
        self.history.snapshot()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // =========================================================================
    // Remove / clear
    // =========================================================================

    /// Remove a task, its schedule entry, and its history entry. No-op if
    /// the id is unknown.
    pub fn remove_task(&mut self, id: EntityId) {
        if self.tasks.remove(&id).is_some() {
            self.schedule.remove(id);
            self.history.forget(id);
        }
    }

    /// Remove a subtask everywhere: table, owning epic's list (with
    /// re-aggregation), schedule, and history. No-op if unknown.
    pub fn remove_subtask(&mut self, id: EntityId) {
        let Some(subtask) = self.subtasks.remove(&id) else {
            return;
        };
        if let Some(epic) = self.epics.get_mut(&subtask.epic_id) {
            epic.subtasks.retain(|owned| *owned != id);
        }
        self.refresh_epic(subtask.epic_id);
        self.schedule.remove(id);
        self.history.forget(id);
    }

    /// Remove an epic and cascade over every subtask it owns. No-op if
    /// unknown.
    pub fn remove_epic(&mut self, id: EntityId) {
        let Some(epic) = self.epics.remove(&id) else {
            return;
        };
        for subtask_id in &epic.subtasks {
            self.subtasks.remove(subtask_id);
            self.schedule.remove(*subtask_id);
            self.history.forget(*subtask_id);
        }
        self.history.forget(id);
    }

    /// Empty the task table, purging history and schedule entries.
    pub fn clear_tasks(&mut self) {
        let ids: Vec<EntityId> = self.tasks.keys().copied().collect();
        for id in ids {
            self.schedule.remove(id);
            self.history.forget(id);
        }
        self.tasks.clear();
    }

    /// Empty the subtask table; every epic resets to an empty list with
    /// NEW status and no time window.
    pub fn clear_subtasks(&mut self) {
        let ids: Vec<EntityId> = self.subtasks.keys().copied().collect();
        for id in ids {
            self.schedule.remove(id);
            self.history.forget(id);
        }
        self.subtasks.clear();
        let epic_ids: Vec<EntityId> = self.epics.keys().copied().collect();
        for epic_id in epic_ids {
            if let Some(epic) = self.epics.get_mut(&epic_id) {
                epic.subtasks.clear();
            }
            self.refresh_epic(epic_id);
        }
    }

    /// Empty the epic table and, cascading, the subtask table.
    pub fn clear_epics(&mut self) {
        let epic_ids: Vec<EntityId> = self.epics.keys().copied().collect();
        for id in epic_ids {
            self.history.forget(id);
        }
        self.epics.clear();

        let subtask_ids: Vec<EntityId> = self.subtasks.keys().copied().collect();
        for id in subtask_ids {
            self.schedule.remove(id);
            self.history.forget(id);
        }
        self.subtasks.clear();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_schedule(&self, candidate: &WorkItem) -> Result<()> {
        if let Some(other) = self.schedule.conflict_with(candidate) {
            return Err(Error::ScheduleConflict {
                id: other.id(),
                name: other.name().to_string(),
            });
        }
        Ok(())
    }

    fn attach_to_epic(&mut self, epic_id: EntityId, subtask_id: EntityId) {
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            if !epic.subtasks.contains(&subtask_id) {
                epic.subtasks.push(subtask_id);
            }
        }
        self.refresh_epic(epic_id);
    }

    fn refresh_epic(&mut self, epic_id: EntityId) {
        if let Some(mut epic) = self.epics.remove(&epic_id) {
            aggregate::refresh(&mut epic, &self.subtasks);
            self.epics.insert(epic_id, epic);
        }
    }
}
