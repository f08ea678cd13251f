//! Derived epic fields.
//!
//! An epic's status and time window are a pure function of its current
//! subtasks. The manager calls `refresh` after every structural change to
//! the subtask set; nothing here touches the tables directly.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::task::{EntityId, Epic, Status, Subtask};

/// Recompute the derived fields of `epic` from the subtask table.
pub fn refresh(epic: &mut Epic, subtasks: &HashMap<EntityId, Subtask>) {
    epic.status = derived_status(&epic.subtasks, subtasks);
    let (start, duration, end) = derived_window(&epic.subtasks, subtasks);
    epic.start = start;
    epic.duration = duration;
    epic.end = end;
}

/// Status rule: no subtasks means NEW; a status shared by every subtask is
/// adopted; any mixture is IN_PROGRESS.
pub fn derived_status(owned: &[EntityId], subtasks: &HashMap<EntityId, Subtask>) -> Status {
    let statuses: Vec<Status> = owned
        .iter()
        .filter_map(|id| subtasks.get(id))
        .map(|subtask| subtask.status)
        .collect();
    if statuses.is_empty() {
        return Status::New;
    }
    let first = statuses[0];
    if statuses.iter().all(|status| *status == first) {
        first
    } else {
        Status::InProgress
    }
}

/// Time rule over the subtasks that have a start time: the window starts
/// at the earliest start, its duration is the sum of the defined subtask
/// durations, and it ends when the subtask starting *last* ends.
///
/// Note the end is taken from the latest-starting subtask, not the maximum
/// end across subtasks; when durations are not monotonic with start order
/// the window understates true completion. Kept as-is from the original
/// rule set.
pub fn derived_window(
    owned: &[EntityId],
    subtasks: &HashMap<EntityId, Subtask>,
) -> (Option<DateTime<Utc>>, Option<Duration>, Option<DateTime<Utc>>) {
    let mut scheduled: Vec<&Subtask> = owned
        .iter()
        .filter_map(|id| subtasks.get(id))
        .filter(|subtask| subtask.start.is_some())
        .collect();
    if scheduled.is_empty() {
        return (None, None, None);
    }
    scheduled.sort_by_key(|subtask| subtask.start);

    let start = scheduled.first().and_then(|subtask| subtask.start);
    let end = scheduled.last().and_then(|subtask| subtask.end());
    let duration = scheduled
        .iter()
        .filter_map(|subtask| subtask.duration)
        .reduce(|total, next| total + next);

    (start, duration, end)
}
