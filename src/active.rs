//! The active-tasks collection.

use crate::book::{MoveKind, TaskBook, Update};
use crate::error::Result;
use crate::sort;
use crate::task::{new_task_id, resolve_task, Task, TaskInput};

/// Operations on the active tasks. Borrowed from a [`TaskBook`].
#[derive(Debug, Clone, Copy)]
pub struct TaskStore<'a> {
    book: &'a TaskBook,
}

impl<'a> TaskStore<'a> {
    pub(crate) fn new(book: &'a TaskBook) -> Self {
        Self { book }
    }

    fn key(&self) -> &'a str {
        &self.book.keys().tasks_key
    }

    /// Current active tasks; unreadable stored data reads as empty.
    pub fn list_active(&self) -> Result<Vec<Task>> {
        self.book.load_tasks(self.key())
    }

    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.list_active()?.into_iter().find(|task| task.id == id))
    }

    /// Look a task up by id or unique id prefix.
    pub fn resolve(&self, input: &str) -> Result<Task> {
        let tasks = self.list_active()?;
        resolve_task(&tasks, input).cloned()
    }

    /// Append a new task and return the stored record.
    pub fn create(&self, input: TaskInput) -> Result<Task> {
        let task = Task::from_input(new_task_id(), input, self.book.config().tasks.priority());
        self.book.exclusive(|| {
            self.book.update_tasks(self.key(), |tasks| {
                tasks.push(task.clone());
                Update::changed(())
            })
        })?;
        tracing::debug!(id = %task.id, "created task");
        Ok(task)
    }

    /// Move a task to the completed collection.
    ///
    /// Returns the moved task, or `None` when no active task has `id`.
    pub fn mark_done(&self, id: &str) -> Result<Option<Task>> {
        self.book.move_task(MoveKind::Complete, id)
    }

    /// Remove a task outright. Returns `None` when no active task has `id`.
    pub fn delete(&self, id: &str) -> Result<Option<Task>> {
        self.book.exclusive(|| {
            self.book.update_tasks(self.key(), |tasks| {
                match tasks.iter().position(|task| task.id == id) {
                    Some(pos) => Update::changed(Some(tasks.remove(pos))),
                    None => Update::unchanged(None),
                }
            })
        })
    }

    /// Persist the collection ordered by deadline and return it.
    pub fn sort_by_deadline(&self) -> Result<Vec<Task>> {
        self.reorder(sort::by_deadline)
    }

    /// Persist the collection ordered by priority and return it.
    pub fn sort_by_priority(&self) -> Result<Vec<Task>> {
        self.reorder(sort::by_priority)
    }

    /// Persist an empty collection. Callers confirm with the user first.
    pub fn clear_all(&self) -> Result<usize> {
        self.book.exclusive(|| {
            self.book.update_tasks(self.key(), |tasks| {
                let removed = tasks.len();
                tasks.clear();
                Update::changed(removed)
            })
        })
    }

    fn reorder(&self, order: fn(Vec<Task>) -> Vec<Task>) -> Result<Vec<Task>> {
        self.book.exclusive(|| {
            self.book.update_tasks(self.key(), |tasks| {
                let sorted = order(std::mem::take(tasks));
                *tasks = sorted.clone();
                Update::changed(sorted)
            })
        })
    }
}
