//! View history for trk.
//!
//! Keeps the items most recently returned by manager gets, deduplicated by
//! id and ordered from oldest to most recent view. Recording an id that is
//! already present moves it to the tail. Both `record` and `forget` are
//! O(1): entries form a doubly linked sequence whose nodes live in a
//! growable arena addressed by index, with a free list for reuse.

use std::collections::HashMap;

use crate::task::{EntityId, WorkItem};

#[derive(Debug, Clone)]
struct Node {
    item: WorkItem,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Recency-ordered, deduplicated record of viewed items.
#[derive(Debug, Clone, Default)]
pub struct History {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<EntityId, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a view of `item` at the tail, detaching any older entry for
    /// the same id first.
    pub fn record(&mut self, item: WorkItem) {
        let id = item.id();
        if let Some(slot) = self.index.remove(&id) {
            self.unlink(slot);
            self.release(slot);
        }
        let slot = self.acquire(Node {
            item,
            prev: self.tail,
            next: None,
        });
        if let Some(tail) = self.tail {
            if let Some(node) = self.nodes[tail].as_mut() {
                node.next = Some(slot);
            }
        }
        self.tail = Some(slot);
        if self.head.is_none() {
            self.head = Some(slot);
        }
        self.index.insert(id, slot);
    }

    /// Drop the entry for `id` if one exists.
    pub fn forget(&mut self, id: EntityId) {
        if let Some(slot) = self.index.remove(&id) {
            self.unlink(slot);
            self.release(slot);
        }
    }

    /// Ordered copy of the history, oldest view first.
    pub fn snapshot(&self) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            if let Some(node) = self.nodes[slot].as_ref() {
                items.push(node.item.clone());
                cursor = node.next;
            } else {
                break;
            }
        }
        items
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    fn acquire(&mut self, node: Node) -> usize {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = Some(node);
            slot
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn release(&mut self, slot: usize) {
        self.nodes[slot] = None;
        self.free.push(slot);
    }

    /// Detach the node at `slot` from the linked sequence, fixing up the
    /// neighbours and the head/tail pointers. The slot itself stays
    /// allocated until `release`.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.nodes[slot].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        match prev {
            Some(prev_slot) => {
                if let Some(node) = self.nodes[prev_slot].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next_slot) => {
                if let Some(node) = self.nodes[next_slot].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn task(id: EntityId) -> WorkItem {
        let mut task = Task::new(format!("Task {id}"), "");
        task.id = id;
        WorkItem::Task(task)
    }

    fn ids(history: &History) -> Vec<EntityId> {
        history.snapshot().iter().map(|item| item.id()).collect()
    }

    #[test]
    fn records_in_view_order() {
        let mut history = History::new();
        history.record(task(1));
        history.record(task(2));
        history.record(task(3));
        assert_eq!(ids(&history), vec![1, 2, 3]);
    }

    #[test]
    fn repeat_view_moves_to_tail_without_duplicate() {
        let mut history = History::new();
        history.record(task(1));
        history.record(task(2));
        history.record(task(1));
        assert_eq!(ids(&history), vec![2, 1]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn forget_head_middle_and_tail_keeps_order() {
        let mut history = History::new();
        for id in 1..=5 {
            history.record(task(id));
        }

        history.forget(3);
        assert_eq!(ids(&history), vec![1, 2, 4, 5]);

        history.forget(1);
        assert_eq!(ids(&history), vec![2, 4, 5]);

        history.forget(5);
        assert_eq!(ids(&history), vec![2, 4]);
    }

    #[test]
    fn forget_sole_entry_empties_history() {
        let mut history = History::new();
        history.record(task(9));
        history.forget(9);
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn forget_unknown_id_is_a_noop() {
        let mut history = History::new();
        history.record(task(1));
        history.forget(42);
        assert_eq!(ids(&history), vec![1]);
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut history = History::new();
        history.record(task(1));
        history.record(task(2));
        let snapshot = history.snapshot();
        history.forget(1);
        history.record(task(3));
        assert_eq!(snapshot.iter().map(|i| i.id()).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut history = History::new();
        for id in 1..=4 {
            history.record(task(id));
        }
        history.forget(2);
        history.forget(3);
        history.record(task(5));
        history.record(task(6));
        // two holes refilled, no arena growth past the original four slots
        assert_eq!(history.nodes.len(), 4);
        assert_eq!(ids(&history), vec![1, 4, 5, 6]);
    }

    #[test]
    fn record_updates_stored_item() {
        let mut history = History::new();
        let mut first = Task::new("Original", "");
        first.id = 7;
        history.record(WorkItem::Task(first));

        let mut renamed = Task::new("Renamed", "");
        renamed.id = 7;
        history.record(WorkItem::Task(renamed));

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name(), "Renamed");
    }
}
