//! Snapshot persistence for trk.
//!
//! The whole manager state is kept as one line-oriented JSONL file: one
//! `WorkItem` record per line, epics first, then subtasks, then tasks, so
//! a load can replay lines in order without forward references. Every
//! mutating CLI command rewrites the file in full; there is no
//! incremental format. View history and the schedule index are not
//! persisted — the index is rebuilt from restored start times, history
//! starts empty.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::manager::TrackingManager;
use crate::task::WorkItem;

/// Store for the JSONL snapshot file.
#[derive(Debug, Clone)]
pub struct ItemStore {
    path: PathBuf,
}

impl ItemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a manager from the snapshot. A missing file yields an empty
    /// manager; the id counter ends at least at the maximum id replayed.
    pub fn load(&self) -> Result<TrackingManager> {
        let mut manager = TrackingManager::new();
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no snapshot, starting empty");
            return Ok(manager);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut lines = 0usize;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let item: WorkItem = serde_json::from_str(&line)?;
            match item {
                WorkItem::Epic(epic) => {
                    manager.restore_epic(epic)?;
                }
                WorkItem::Subtask(subtask) => {
                    manager.restore_subtask(subtask)?;
                }
                WorkItem::Task(task) => {
                    manager.restore_task(task)?;
                }
            }
            lines += 1;
        }
        tracing::debug!(path = %self.path.display(), items = lines, "snapshot loaded");
        Ok(manager)
    }

    /// Rewrite the snapshot from the manager's current tables. The write
    /// is atomic (temp file + rename) so readers never see a partial
    /// snapshot.
    pub fn save(&self, manager: &TrackingManager) -> Result<()> {
        let mut buffer = Vec::new();
        for epic in manager.all_epics() {
            append_line(&mut buffer, &WorkItem::Epic(epic))?;
        }
        for subtask in manager.all_subtasks() {
            append_line(&mut buffer, &WorkItem::Subtask(subtask))?;
        }
        for task in manager.all_tasks() {
            append_line(&mut buffer, &WorkItem::Task(task))?;
        }

        write_atomic(&self.path, &buffer)?;
        tracing::debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }
}

fn append_line(buffer: &mut Vec<u8>, item: &WorkItem) -> Result<()> {
    let json = serde_json::to_string(item)?;
    buffer.extend_from_slice(json.as_bytes());
    buffer.push(b'\n');
    Ok(())
}

/// Write data atomically using temp file + rename, creating parent
/// directories as needed.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
