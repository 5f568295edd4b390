use chrono::Utc;

use crate::models::{Task, TaskPatch};
use crate::storage::{Storage, StorageError};

/// CRUD plus manual reordering over the persisted task list. Every
/// operation read-modify-writes the whole collection; the storage
/// layer's atomic rename is the only transaction. Each call returns the
/// updated list so callers can re-render without a second read.
#[derive(Debug, Clone)]
pub struct TaskStore {
    storage: Storage,
}

impl TaskStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All tasks, completed items sorted after incomplete ones. The sort
    /// is stable: within each group the stored order is preserved.
    pub fn list(&self) -> Vec<Task> {
        let mut tasks = self.storage.tasks_or_default();
        tasks.sort_by_key(|task| task.completed);
        tasks
    }

    /// Prepends a new task. The id derives from the creation time in
    /// milliseconds, bumped while it collides with an existing task so
    /// ids stay unique even within one millisecond.
    pub fn add(
        &self,
        text: &str,
        priority: bool,
        due_date: Option<String>,
    ) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.storage.tasks_or_default();
        let task = Task {
            id: next_id(&tasks),
            text: text.to_string(),
            priority,
            due_date,
            completed: false,
            pomodoros_completed: 0,
        };
        tasks.insert(0, task);
        self.storage.save_tasks(&tasks)?;
        Ok(tasks)
    }

    /// Merges the patch into the matching task; unknown ids are a no-op.
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.storage.tasks_or_default();
        if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
            if let Some(text) = patch.text {
                task.text = text;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = due_date;
            }
            self.storage.save_tasks(&tasks)?;
        }
        Ok(tasks)
    }

    pub fn delete(&self, id: &str) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.storage.tasks_or_default();
        tasks.retain(|task| task.id != id);
        self.storage.save_tasks(&tasks)?;
        Ok(tasks)
    }

    pub fn toggle_completed(&self, id: &str) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.storage.tasks_or_default();
        if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
            task.completed = !task.completed;
            self.storage.save_tasks(&tasks)?;
        }
        Ok(tasks)
    }

    pub fn increment_pomodoros(&self, id: &str) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.storage.tasks_or_default();
        if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
            task.pomodoros_completed += 1;
            self.storage.save_tasks(&tasks)?;
        }
        Ok(tasks)
    }

    /// Remove-and-reinsert move. Out-of-range indices leave the list
    /// untouched.
    pub fn reorder(&self, old_index: usize, new_index: usize) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.storage.tasks_or_default();
        if old_index >= tasks.len() || new_index >= tasks.len() {
            return Ok(tasks);
        }
        let task = tasks.remove(old_index);
        tasks.insert(new_index, task);
        self.storage.save_tasks(&tasks)?;
        Ok(tasks)
    }

    /// `reorder` with indices from the `list()` view (completed-last).
    /// Once a completed task sits above an incomplete one in storage the
    /// two orders diverge, so displayed positions are mapped to stored
    /// positions by id before the move.
    pub fn reorder_listed(
        &self,
        old_index: usize,
        new_index: usize,
    ) -> Result<Vec<Task>, StorageError> {
        let view = self.list();
        if old_index >= view.len() || new_index >= view.len() {
            return Ok(self.storage.tasks_or_default());
        }
        let tasks = self.storage.tasks_or_default();
        let stored_old = tasks.iter().position(|t| t.id == view[old_index].id);
        let stored_new = tasks.iter().position(|t| t.id == view[new_index].id);
        match (stored_old, stored_new) {
            (Some(old), Some(new)) => self.reorder(old, new),
            _ => Ok(tasks),
        }
    }
}

fn next_id(tasks: &[Task]) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    while tasks.iter().any(|task| task.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();
        (dir, TaskStore::new(storage))
    }

    #[test]
    fn add_on_empty_list_creates_fresh_task() {
        let (_dir, store) = store();
        let tasks = store.add("Buy milk", false, None).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Buy milk");
        assert!(!tasks[0].priority);
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].pomodoros_completed, 0);
        assert!(tasks[0].due_date.is_none());
        assert!(!tasks[0].id.is_empty());
    }

    #[test]
    fn add_prepends_and_keeps_ids_unique() {
        let (_dir, store) = store();
        store.add("first", false, None).unwrap();
        store.add("second", true, Some("2026-09-01".to_string())).unwrap();
        let tasks = store.add("third", false, None).unwrap();

        assert_eq!(tasks[0].text, "third");
        assert_eq!(tasks[1].text, "second");
        assert_eq!(tasks[2].text, "first");
        assert!(tasks[1].priority);
        assert_eq!(tasks[1].due_date.as_deref(), Some("2026-09-01"));

        let mut ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn update_merges_fields_and_ignores_unknown_id() {
        let (_dir, store) = store();
        let tasks = store.add("draft", false, None).unwrap();
        let id = tasks[0].id.clone();

        let tasks = store
            .update(
                &id,
                TaskPatch {
                    text: Some("final".to_string()),
                    priority: Some(true),
                    due_date: Some(Some("2026-09-15".to_string())),
                },
            )
            .unwrap();
        assert_eq!(tasks[0].text, "final");
        assert!(tasks[0].priority);
        assert_eq!(tasks[0].due_date.as_deref(), Some("2026-09-15"));

        // Partial patch leaves other fields alone; due_date can be cleared.
        let tasks = store
            .update(
                &id,
                TaskPatch {
                    due_date: Some(None),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(tasks[0].text, "final");
        assert!(tasks[0].due_date.is_none());

        let before = store.list();
        let after = store.update("missing", TaskPatch::default()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn delete_filters_out_the_matching_task() {
        let (_dir, store) = store();
        store.add("keep", false, None).unwrap();
        let tasks = store.add("drop", false, None).unwrap();
        let id = tasks[0].id.clone();

        let tasks = store.delete(&id).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "keep");

        // Deleting a missing id is harmless.
        let tasks = store.delete("missing").unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn toggle_completed_twice_restores_original_value() {
        let (_dir, store) = store();
        let tasks = store.add("flip me", false, None).unwrap();
        let id = tasks[0].id.clone();

        let tasks = store.toggle_completed(&id).unwrap();
        assert!(tasks[0].completed);
        let tasks = store.toggle_completed(&id).unwrap();
        assert!(!tasks[0].completed);
    }

    #[test]
    fn increment_pomodoros_accumulates() {
        let (_dir, store) = store();
        let tasks = store.add("focus", false, None).unwrap();
        let id = tasks[0].id.clone();

        for _ in 0..3 {
            store.increment_pomodoros(&id).unwrap();
        }
        let tasks = store.list();
        assert_eq!(tasks[0].pomodoros_completed, 3);

        // Unknown id is a no-op.
        store.increment_pomodoros("missing").unwrap();
        assert_eq!(store.list()[0].pomodoros_completed, 3);
    }

    #[test]
    fn reorder_round_trip_restores_original_order() {
        let (_dir, store) = store();
        store.add("c", false, None).unwrap();
        store.add("b", false, None).unwrap();
        store.add("a", false, None).unwrap();
        let original: Vec<_> = store.list().iter().map(|t| t.text.clone()).collect();
        assert_eq!(original, ["a", "b", "c"]);

        store.reorder(0, 2).unwrap();
        let moved: Vec<_> = store.list().iter().map(|t| t.text.clone()).collect();
        assert_eq!(moved, ["b", "c", "a"]);

        store.reorder(2, 0).unwrap();
        let restored: Vec<_> = store.list().iter().map(|t| t.text.clone()).collect();
        assert_eq!(restored, original);
    }

    #[test]
    fn reorder_out_of_range_is_a_no_op() {
        let (_dir, store) = store();
        store.add("b", false, None).unwrap();
        store.add("a", false, None).unwrap();

        let before = store.list();
        store.reorder(0, 5).unwrap();
        store.reorder(5, 0).unwrap();
        assert_eq!(store.list(), before);
    }

    #[test]
    fn reorder_listed_moves_the_task_the_user_sees() {
        let (_dir, store) = store();
        store.add("c", false, None).unwrap();
        store.add("b", false, None).unwrap();
        let tasks = store.add("a", false, None).unwrap();

        // Complete "a": stored order stays [a, b, c] while the view
        // shows [b, c, a].
        store.toggle_completed(&tasks[0].id).unwrap();
        let view: Vec<_> = store.list().iter().map(|t| t.text.clone()).collect();
        assert_eq!(view, ["b", "c", "a"]);

        // Moving view position 0 to 1 must move "b" below "c", not
        // whatever happens to sit at stored index 0.
        store.reorder_listed(0, 1).unwrap();
        let view: Vec<_> = store.list().iter().map(|t| t.text.clone()).collect();
        assert_eq!(view, ["c", "b", "a"]);

        store.reorder_listed(1, 0).unwrap();
        let view: Vec<_> = store.list().iter().map(|t| t.text.clone()).collect();
        assert_eq!(view, ["b", "c", "a"]);
    }

    #[test]
    fn reorder_listed_out_of_range_is_a_no_op() {
        let (_dir, store) = store();
        store.add("b", false, None).unwrap();
        store.add("a", false, None).unwrap();

        let before = store.list();
        store.reorder_listed(0, 9).unwrap();
        store.reorder_listed(9, 0).unwrap();
        assert_eq!(store.list(), before);
    }

    #[test]
    fn list_partitions_completed_after_incomplete_stably() {
        let (_dir, store) = store();
        store.add("d", false, None).unwrap();
        store.add("c", false, None).unwrap();
        store.add("b", false, None).unwrap();
        let tasks = store.add("a", false, None).unwrap();

        // Complete "a" and "c"; both move after "b" and "d" while
        // keeping their relative order.
        store.toggle_completed(&tasks[0].id).unwrap();
        store.toggle_completed(&tasks[2].id).unwrap();

        let ordered: Vec<_> = store
            .list()
            .iter()
            .map(|t| (t.text.clone(), t.completed))
            .collect();
        assert_eq!(
            ordered,
            vec![
                ("b".to_string(), false),
                ("d".to_string(), false),
                ("a".to_string(), true),
                ("c".to_string(), true),
            ]
        );
    }

    #[test]
    fn list_does_not_rewrite_stored_order() {
        let (_dir, store) = store();
        store.add("b", false, None).unwrap();
        let tasks = store.add("a", false, None).unwrap();
        store.toggle_completed(&tasks[0].id).unwrap();

        // list() sorts the view; the stored order (a first) is untouched,
        // so un-completing "a" puts it back in front.
        assert_eq!(store.list()[0].text, "b");
        store.toggle_completed(&tasks[0].id).unwrap();
        assert_eq!(store.list()[0].text, "a");
    }
}
