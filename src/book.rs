//! The task book: one handle over the active, completed and category
//! collections sharing a key-value backend.
//!
//! Every mutation runs under the book's in-process gate and the backend's
//! cross-process lock, so a read-modify-write never interleaves with another
//! one. Moves between the active and completed collections are two-phase:
//!
//! 1. persist the intent (`pending_key`)
//! 2. insert into the destination, unless an identical record is already there
//! 3. remove from the source
//! 4. clear the intent
//!
//! A crash after step 1 leaves the intent behind; [`TaskBook::recover`]
//! replays it, and replaying a finished move changes nothing.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::category::CategoryStore;
use crate::config::{Config, StorageConfig};
use crate::done::DoneStore;
use crate::error::Result;
use crate::active::TaskStore;
use crate::storage::{FileStorage, KeyValueStore};
use crate::task::{decode_tasks, encode_tasks, new_task_id, Task};

/// Which way a task is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Active → completed (appended)
    Complete,
    /// Completed → active (prepended)
    Restore,
}

/// An in-flight move, persisted until both collections are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMove {
    pub kind: MoveKind,
    pub task: Task,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<PendingMove>,
    pub rekeyed: usize,
}

#[derive(Debug)]
struct BookInner {
    kv: Arc<dyn KeyValueStore>,
    config: Config,
    gate: Mutex<()>,
}

/// Shared handle to the three collections. Cloning is cheap and clones share
/// the same mutation gate.
#[derive(Debug, Clone)]
pub struct TaskBook {
    inner: Arc<BookInner>,
}

impl TaskBook {
    /// Wrap a backend without touching it.
    pub fn new(kv: impl KeyValueStore + 'static, config: Config) -> Self {
        Self::from_shared(Arc::new(kv), config)
    }

    pub fn from_shared(kv: Arc<dyn KeyValueStore>, config: Config) -> Self {
        Self {
            inner: Arc::new(BookInner {
                kv,
                config,
                gate: Mutex::new(()),
            }),
        }
    }

    /// Wrap a backend and finish any move a previous run left half done.
    pub fn open(kv: impl KeyValueStore + 'static, config: Config) -> Result<Self> {
        let book = Self::new(kv, config);
        book.recover()?;
        Ok(book)
    }

    /// Open the file-backed book in `data_dir`, reading `taskstash.toml` if present.
    pub fn open_dir(data_dir: &Path) -> Result<Self> {
        let config = Config::load_from_dir(data_dir)?;
        let storage =
            FileStorage::new(data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
        Self::open(storage, config)
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn keys(&self) -> &StorageConfig {
        &self.inner.config.storage
    }

    pub fn tasks(&self) -> TaskStore<'_> {
        TaskStore::new(self)
    }

    pub fn done(&self) -> DoneStore<'_> {
        DoneStore::new(self)
    }

    pub fn categories(&self) -> CategoryStore<'_> {
        CategoryStore::new(self)
    }

    /// Replay a persisted move, if one is pending.
    pub fn recover(&self) -> Result<Option<PendingMove>> {
        self.locked(|| self.recover_locked())
    }

    /// Recover, then give a fresh id to every task whose id is empty or
    /// already used by an earlier task in either collection.
    pub fn repair(&self) -> Result<RepairReport> {
        self.locked(|| {
            let recovered = self.recover_locked()?;

            let mut seen = HashSet::new();
            let mut rekeyed = 0;
            for key in [&self.keys().tasks_key, &self.keys().done_key] {
                let mut tasks = self.load_tasks(key)?;
                let mut changed = false;
                for task in &mut tasks {
                    if task.id.trim().is_empty() || seen.contains(&task.id) {
                        let fresh = new_task_id();
                        tracing::info!(
                            key = %key,
                            old = %task.id,
                            new = %fresh,
                            "re-keyed colliding task id"
                        );
                        task.id = fresh;
                        rekeyed += 1;
                        changed = true;
                    }
                    seen.insert(task.id.clone());
                }
                if changed {
                    self.store_tasks(key, &tasks)?;
                }
            }

            Ok(RepairReport { recovered, rekeyed })
        })
    }

    // =========================================================================
    // Crate-internal plumbing shared by the stores
    // =========================================================================

    /// Run `f` holding the in-process gate and the backend lock, after
    /// finishing any move an earlier failed mutation left pending.
    ///
    /// Recovering first keeps a leftover intent from being overwritten by
    /// the next move, which would strand its task in both collections.
    pub(crate) fn exclusive<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        self.locked(|| {
            self.recover_locked()?;
            f()
        })
    }

    fn locked<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let _gate = self.inner.gate.lock();
        let _lock = self.inner.kv.lock()?;
        f()
    }

    pub(crate) fn kv(&self) -> &dyn KeyValueStore {
        self.inner.kv.as_ref()
    }

    pub(crate) fn load_tasks(&self, key: &str) -> Result<Vec<Task>> {
        let raw = self.kv().get(key)?;
        Ok(decode_tasks(key, raw.as_deref()))
    }

    pub(crate) fn store_tasks(&self, key: &str, tasks: &[Task]) -> Result<()> {
        let json = encode_tasks(tasks)?;
        self.kv().set(key, &json)?;
        tracing::debug!(key, count = tasks.len(), "persisted task collection");
        Ok(())
    }

    /// Read-modify-write one task collection. Caller holds [`Self::exclusive`].
    pub(crate) fn update_tasks<R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Vec<Task>) -> Update<R>,
    ) -> Result<R> {
        let mut tasks = self.load_tasks(key)?;
        let update = f(&mut tasks);
        if update.changed {
            self.store_tasks(key, &tasks)?;
        }
        Ok(update.value)
    }

    /// Move the task with `id` out of the source collection for `kind`.
    ///
    /// Returns `None`, writing nothing, when no such task exists.
    pub(crate) fn move_task(&self, kind: MoveKind, id: &str) -> Result<Option<Task>> {
        self.exclusive(|| {
            let source = self.load_tasks(self.source_key(kind))?;
            let Some(task) = source.into_iter().find(|task| task.id == id) else {
                return Ok(None);
            };

            let intent = PendingMove { kind, task };
            self.write_pending(Some(&intent))?;
            self.apply_move(&intent)?;
            self.write_pending(None)?;
            Ok(Some(intent.task))
        })
    }

    fn source_key(&self, kind: MoveKind) -> &str {
        match kind {
            MoveKind::Complete => &self.keys().tasks_key,
            MoveKind::Restore => &self.keys().done_key,
        }
    }

    fn destination_key(&self, kind: MoveKind) -> &str {
        match kind {
            MoveKind::Complete => &self.keys().done_key,
            MoveKind::Restore => &self.keys().tasks_key,
        }
    }

    fn apply_move(&self, intent: &PendingMove) -> Result<()> {
        let task = &intent.task;

        self.update_tasks(self.destination_key(intent.kind), |dest| {
            if dest.contains(task) {
                return Update::unchanged(());
            }
            match intent.kind {
                MoveKind::Complete => dest.push(task.clone()),
                MoveKind::Restore => dest.insert(0, task.clone()),
            }
            Update::changed(())
        })?;

        self.update_tasks(self.source_key(intent.kind), |source| {
            match source.iter().position(|candidate| candidate == task) {
                Some(pos) => {
                    source.remove(pos);
                    Update::changed(())
                }
                None => Update::unchanged(()),
            }
        })
    }

    fn recover_locked(&self) -> Result<Option<PendingMove>> {
        let Some(intent) = self.read_pending()? else {
            return Ok(None);
        };
        tracing::info!(kind = ?intent.kind, id = %intent.task.id, "replaying interrupted move");
        self.apply_move(&intent)?;
        self.write_pending(None)?;
        Ok(Some(intent))
    }

    fn read_pending(&self) -> Result<Option<PendingMove>> {
        let key = &self.keys().pending_key;
        let Some(raw) = self.kv().get(key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Option<PendingMove>>(&raw) {
            Ok(pending) => Ok(pending),
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    error = %err,
                    "pending move record is unreadable; ignoring it"
                );
                Ok(None)
            }
        }
    }

    fn write_pending(&self, pending: Option<&PendingMove>) -> Result<()> {
        let json = serde_json::to_string(&pending)?;
        self.kv().set(&self.keys().pending_key, &json)
    }
}

/// Result of a collection mutation: the value to return and whether the
/// collection needs to be written back.
pub(crate) struct Update<R> {
    value: R,
    changed: bool,
}

impl<R> Update<R> {
    pub(crate) fn changed(value: R) -> Self {
        Self {
            value,
            changed: true,
        }
    }

    pub(crate) fn unchanged(value: R) -> Self {
        Self {
            value,
            changed: false,
        }
    }
}
