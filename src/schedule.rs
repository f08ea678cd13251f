//! Schedule index for trk.
//!
//! Tracks every task and subtask that currently has a start time, ordered
//! ascending by start. The index backs two things: the prioritized listing
//! and overlap validation for creates and updates. Epics never enter the
//! index; their windows are derived, not scheduled.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::task::{EntityId, WorkItem};

/// Start-time-ordered index of scheduled items.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    by_start: BTreeMap<(DateTime<Utc>, EntityId), WorkItem>,
    starts: HashMap<EntityId, DateTime<Utc>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh the entry for `item`. An item without a start
    /// time (or an epic) only clears any stale entry for its id.
    pub fn upsert(&mut self, item: &WorkItem) {
        self.remove(item.id());
        if matches!(item, WorkItem::Epic(_)) {
            return;
        }
        if let Some(start) = item.start() {
            self.by_start.insert((start, item.id()), item.clone());
            self.starts.insert(item.id(), start);
        }
    }

    /// Drop the entry for `id` if one exists.
    pub fn remove(&mut self, id: EntityId) {
        if let Some(start) = self.starts.remove(&id) {
            self.by_start.remove(&(start, id));
        }
    }

    /// First indexed entry whose interval intersects the candidate's,
    /// ignoring the entry with the candidate's own id. `None` when the
    /// candidate is unscheduled or nothing overlaps.
    pub fn conflict_with(&self, candidate: &WorkItem) -> Option<&WorkItem> {
        candidate.start()?;
        self.by_start
            .values()
            .filter(|entry| entry.id() != candidate.id())
            .find(|entry| intervals_cross(candidate, entry))
    }

    /// All scheduled items, earliest start first.
    pub fn prioritized(&self) -> Vec<WorkItem> {
        self.by_start.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_start.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_start.clear();
        self.starts.clear();
    }
}

/// Half-open interval intersection over `[start, start + duration)`.
///
/// Items missing a start never cross anything. When either end is
/// undefined (no duration) only identical starts count as a crossing.
fn intervals_cross(a: &WorkItem, b: &WorkItem) -> bool {
    let (Some(a_start), Some(b_start)) = (a.start(), b.start()) else {
        return false;
    };
    if a_start == b_start {
        return true;
    }
    let (Some(a_end), Some(b_end)) = (a.end(), b.end()) else {
        return false;
    };
    if a_end == b_end {
        return true;
    }
    if a_start < b_start {
        a_end > b_start
    } else {
        a_start < b_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::task::{Subtask, Task};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, hour, minute, 0).unwrap()
    }

    fn scheduled_task(id: EntityId, start: DateTime<Utc>, minutes: i64) -> WorkItem {
        let mut task = Task::new(format!("Task {id}"), "");
        task.id = id;
        task.start = Some(start);
        task.duration = Some(Duration::minutes(minutes));
        WorkItem::Task(task)
    }

    fn unscheduled_task(id: EntityId) -> WorkItem {
        let mut task = Task::new(format!("Task {id}"), "");
        task.id = id;
        WorkItem::Task(task)
    }

    #[test]
    fn overlap_inside_existing_window() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(10, 0), 30));

        let candidate = scheduled_task(2, at(10, 15), 10);
        let hit = schedule.conflict_with(&candidate).expect("conflict");
        assert_eq!(hit.id(), 1);
    }

    #[test]
    fn touching_windows_do_not_conflict() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(10, 0), 30));

        // starts exactly where the other ends: half-open, no crossing
        let candidate = scheduled_task(2, at(10, 30), 10);
        assert!(schedule.conflict_with(&candidate).is_none());
    }

    #[test]
    fn identical_starts_conflict() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(9, 0), 5));
        let candidate = scheduled_task(2, at(9, 0), 60);
        assert!(schedule.conflict_with(&candidate).is_some());
    }

    #[test]
    fn identical_ends_conflict() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(9, 0), 60));
        let candidate = scheduled_task(2, at(9, 30), 30);
        assert!(schedule.conflict_with(&candidate).is_some());
    }

    #[test]
    fn earlier_candidate_reaching_into_window_conflicts() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(10, 0), 30));
        let candidate = scheduled_task(2, at(9, 45), 20);
        assert!(schedule.conflict_with(&candidate).is_some());
    }

    #[test]
    fn unscheduled_items_never_conflict() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(10, 0), 30));
        assert!(schedule.conflict_with(&unscheduled_task(2)).is_none());
    }

    #[test]
    fn missing_durations_limit_check_to_equal_starts() {
        let mut open_ended = Task::new("Open", "");
        open_ended.id = 1;
        open_ended.start = Some(at(10, 0));
        let mut schedule = Schedule::new();
        schedule.upsert(&WorkItem::Task(open_ended));

        let candidate = scheduled_task(2, at(10, 5), 10);
        assert!(schedule.conflict_with(&candidate).is_none());

        let same_start = scheduled_task(3, at(10, 0), 10);
        assert!(schedule.conflict_with(&same_start).is_some());
    }

    #[test]
    fn own_id_is_excluded_from_the_check() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(10, 0), 30));

        // re-validating the indexed item against itself
        let same = scheduled_task(1, at(10, 0), 30);
        assert!(schedule.conflict_with(&same).is_none());
    }

    #[test]
    fn prioritized_is_ascending_and_skips_unscheduled() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(9, 35), 35));
        schedule.upsert(&scheduled_task(2, at(9, 0), 15));
        schedule.upsert(&scheduled_task(3, at(9, 20), 5));
        schedule.upsert(&unscheduled_task(4));

        let order: Vec<EntityId> = schedule.prioritized().iter().map(|i| i.id()).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn upsert_refreshes_and_clears_stale_entries() {
        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(9, 0), 15));
        schedule.upsert(&scheduled_task(1, at(11, 0), 15));
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.prioritized()[0].start(), Some(at(11, 0)));

        // losing the start time removes the entry entirely
        schedule.upsert(&unscheduled_task(1));
        assert!(schedule.is_empty());
    }

    #[test]
    fn epics_are_never_indexed() {
        use crate::task::Epic;

        let mut epic = Epic::new("Release", "");
        epic.id = 5;
        epic.start = Some(at(8, 0));
        epic.duration = Some(Duration::minutes(120));

        let mut schedule = Schedule::new();
        schedule.upsert(&WorkItem::Epic(epic));
        assert!(schedule.is_empty());
    }

    #[test]
    fn subtasks_and_tasks_share_the_index() {
        let mut subtask = Subtask::new("Sub", "", 9);
        subtask.id = 2;
        subtask.start = Some(at(9, 0));
        subtask.duration = Some(Duration::minutes(15));

        let mut schedule = Schedule::new();
        schedule.upsert(&scheduled_task(1, at(9, 30), 20));
        schedule.upsert(&WorkItem::Subtask(subtask));

        let order: Vec<EntityId> = schedule.prioritized().iter().map(|i| i.id()).collect();
        assert_eq!(order, vec![2, 1]);
    }
}
