//! The completed-tasks collection.

use crate::book::{MoveKind, TaskBook, Update};
use crate::error::Result;
use crate::task::{resolve_task, Task};

/// Operations on completed tasks. Borrowed from a [`TaskBook`].
#[derive(Debug, Clone, Copy)]
pub struct DoneStore<'a> {
    book: &'a TaskBook,
}

impl<'a> DoneStore<'a> {
    pub(crate) fn new(book: &'a TaskBook) -> Self {
        Self { book }
    }

    fn key(&self) -> &'a str {
        &self.book.keys().done_key
    }

    pub fn list_completed(&self) -> Result<Vec<Task>> {
        self.book.load_tasks(self.key())
    }

    pub fn resolve(&self, input: &str) -> Result<Task> {
        let tasks = self.list_completed()?;
        resolve_task(&tasks, input).cloned()
    }

    /// Append a record as-is.
    ///
    /// This is the raw primitive; [`crate::active::TaskStore::mark_done`] is
    /// the move that keeps a task out of the active collection.
    pub fn append(&self, task: Task) -> Result<()> {
        self.book.exclusive(|| {
            self.book.update_tasks(self.key(), |tasks| {
                tasks.push(task);
                Update::changed(())
            })
        })
    }

    /// Remove the first completed task with `id`.
    pub fn remove(&self, id: &str) -> Result<Option<Task>> {
        self.book.exclusive(|| {
            self.book.update_tasks(self.key(), |tasks| {
                match tasks.iter().position(|task| task.id == id) {
                    Some(pos) => Update::changed(Some(tasks.remove(pos))),
                    None => Update::unchanged(None),
                }
            })
        })
    }

    /// Move a completed task back to the front of the active collection.
    pub fn restore(&self, id: &str) -> Result<Option<Task>> {
        self.book.move_task(MoveKind::Restore, id)
    }

    pub fn clear(&self) -> Result<usize> {
        self.book.exclusive(|| {
            self.book.update_tasks(self.key(), |tasks| {
                let removed = tasks.len();
                tasks.clear();
                Update::changed(removed)
            })
        })
    }
}
