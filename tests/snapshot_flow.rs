//! End-to-end library flow: build up a tracker, snapshot it, reload it,
//! and keep working against the reloaded state.

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use trk::store::ItemStore;
use trk::task::{Epic, Status, Subtask, Task};
use trk::TrackingManager;

#[test]
fn full_session_survives_a_snapshot_cycle() {
    let temp = TempDir::new().unwrap();
    let store = ItemStore::new(temp.path().join("items.jsonl"));

    let mut manager = TrackingManager::new();
    let epic = manager.create_epic(Epic::new("Release", "v1")).unwrap();

    let mut s1 = Subtask::new("Cut tag", "", epic.id);
    s1.start = Some(Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap());
    s1.duration = Some(Duration::minutes(15));
    let s1 = manager.create_subtask(s1).unwrap();

    let mut s2 = Subtask::new("Publish notes", "", epic.id);
    s2.start = Some(Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap());
    s2.duration = Some(Duration::minutes(20));
    let s2 = manager.create_subtask(s2).unwrap();

    let mut t1 = Task::new("Standup", "");
    t1.start = Some(Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap());
    t1.duration = Some(Duration::minutes(15));
    let t1 = manager.create_task(t1).unwrap();

    manager.task(t1.id).unwrap();
    manager.subtask(s1.id).unwrap();
    store.save(&manager).unwrap();

    // a fresh process: everything back except history, which is not persisted
    let mut reloaded = store.load().unwrap();
    assert!(reloaded.history().is_empty());
    let order: Vec<u32> = reloaded.prioritized().iter().map(|i| i.id()).collect();
    assert_eq!(order, vec![t1.id, s1.id, s2.id]);

    let epic_back = reloaded.epic(epic.id).unwrap();
    assert_eq!(epic_back.status, Status::New);
    assert_eq!(epic_back.duration, Some(Duration::minutes(35)));
    assert_eq!(
        epic_back.end(),
        Some(Utc.with_ymd_and_hms(2024, 5, 20, 9, 50, 0).unwrap())
    );

    // the schedule survives the reload: a clashing create is still blocked
    let mut clash = Task::new("Clash", "");
    clash.start = Some(Utc.with_ymd_and_hms(2024, 5, 20, 9, 5, 0).unwrap());
    clash.duration = Some(Duration::minutes(5));
    assert!(reloaded.create_task(clash).is_err());

    // cascade removal, then persist and reload once more
    reloaded.remove_epic(epic.id);
    store.save(&reloaded).unwrap();

    let mut after = store.load().unwrap();
    assert!(after.all_epics().is_empty());
    assert!(after.all_subtasks().is_empty());
    assert_eq!(after.all_tasks().len(), 1);
    assert_eq!(after.prioritized().len(), 1);

    // the id sequence still moves forward
    let fresh = after.create_task(Task::new("Retro", "")).unwrap();
    assert!(fresh.id > s2.id);
}
