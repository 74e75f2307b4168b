//! The canonical task collection and its durable copy.
//!
//! A [`TaskStore`] goes through `Uninitialized -> Hydrating -> Ready`. Until it
//! is ready, reads see the seed collection and mutations are dropped, so a
//! store that has not loaded yet can never overwrite previously saved tasks.
//! Once ready, every mutation is followed by a best-effort save of the whole
//! collection; the latest write wins.

use tracing::{debug, warn};

use crate::error::{StoreError, TaskError};
use crate::models::{new_task_id, Task, TaskDraft, TaskPatch, TaskStatus};
use crate::storage::{StateBackend, TASKS_KEY};

/// Hydration state of a [`TaskStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Hydrating,
    Ready,
}

pub struct TaskStore<B: StateBackend> {
    backend: B,
    key: String,
    seed: Vec<Task>,
    tasks: Vec<Task>,
    lifecycle: Lifecycle,
}

impl<B: StateBackend> TaskStore<B> {
    /// Creates an unhydrated store that reads and writes `backend` under
    /// [`TASKS_KEY`]. `seed` is served until hydration completes and is the
    /// fallback when nothing usable was persisted.
    pub fn new(backend: B, seed: Vec<Task>) -> Self {
        Self {
            backend,
            key: TASKS_KEY.to_string(),
            seed,
            tasks: Vec::new(),
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Uses a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Convenience for `new` followed by [`TaskStore::hydrate`].
    pub fn open(backend: B, seed: Vec<Task>) -> Self {
        let mut store = Self::new(backend, seed);
        store.hydrate();
        store
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// The current collection, or the seed while hydration is pending.
    pub fn tasks(&self) -> &[Task] {
        if self.is_ready() {
            &self.tasks
        } else {
            &self.seed
        }
    }

    /// Looks up a task by id in the visible collection.
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    /// Reads and decodes the persisted collection.
    ///
    /// Missing or undecodable data yields a copy of the seed; the failure is
    /// logged and otherwise ignored.
    pub fn load(&self) -> Vec<Task> {
        match self.read_persisted() {
            Ok(Some(tasks)) => tasks,
            Ok(None) => {
                debug!(key = %self.key, "no persisted tasks, using seed");
                self.seed.clone()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding unreadable task data");
                self.seed.clone()
            }
        }
    }

    /// A record that cannot be decoded is skipped on its own; only data that
    /// is not a JSON array fails the whole read.
    fn read_persisted(&self) -> Result<Option<Vec<Task>>, StoreError> {
        let Some(raw) = self.backend.read(&self.key)? else {
            return Ok(None);
        };
        let records: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
        let tasks = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(key = %self.key, index, error = %e, "skipping undecodable task");
                    None
                }
            })
            .collect();
        Ok(Some(tasks))
    }

    /// Marks the durable read as started. Reads keep returning the seed.
    pub fn begin_hydration(&mut self) {
        if self.lifecycle == Lifecycle::Uninitialized {
            self.lifecycle = Lifecycle::Hydrating;
            debug!(key = %self.key, "hydrating task store");
        }
    }

    /// Installs the loaded collection and makes the store ready.
    ///
    /// The collection is saved straight away so a first run persists the seed.
    pub fn finish_hydration(&mut self, loaded: Vec<Task>) {
        if self.is_ready() {
            return;
        }
        self.tasks = loaded;
        self.lifecycle = Lifecycle::Ready;
        debug!(count = self.tasks.len(), "task store ready");
        self.persist();
    }

    /// Runs the whole hydration sequence. Does nothing once ready.
    pub fn hydrate(&mut self) {
        if self.is_ready() {
            return;
        }
        self.begin_hydration();
        let loaded = self.load();
        self.finish_hydration(loaded);
    }

    /// Replaces the collection with `f(collection)` and saves the result.
    ///
    /// Returns `false`, leaving everything untouched, if the store is not ready.
    pub fn mutate<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(Vec<Task>) -> Vec<Task>,
    {
        if !self.is_ready() {
            debug!(lifecycle = ?self.lifecycle, "dropping mutation before hydration");
            return false;
        }
        let current = std::mem::take(&mut self.tasks);
        self.tasks = f(current);
        self.persist();
        true
    }

    /// Writes the whole collection. Failures are logged and swallowed.
    pub fn persist(&mut self) {
        if !self.is_ready() {
            return;
        }
        if let Err(e) = self.write_collection() {
            warn!(key = %self.key, error = %e, "failed to persist tasks");
        }
    }

    fn write_collection(&mut self) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.tasks)?;
        self.backend.write(&self.key, &raw)
    }

    fn ensure_ready(&self) -> Result<(), TaskError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(TaskError::NotReady)
        }
    }

    fn ensure_exists(&self, id: &str) -> Result<(), TaskError> {
        self.ensure_ready()?;
        if self.tasks.iter().any(|t| t.id == id) {
            Ok(())
        } else {
            Err(TaskError::NotFound(id.to_string()))
        }
    }

    /// Creates a task from `draft` and returns its id.
    pub fn create(&mut self, draft: TaskDraft) -> Result<String, TaskError> {
        self.ensure_ready()?;
        let task = draft.into_task(new_task_id())?;
        let id = task.id.clone();
        self.mutate(|mut tasks| {
            tasks.push(task);
            tasks
        });
        debug!(%id, "task created");
        Ok(id)
    }

    /// Applies `patch` to the task with `id`.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<(), TaskError> {
        self.ensure_exists(id)?;
        self.mutate(|tasks| {
            tasks
                .into_iter()
                .map(|mut t| {
                    if t.id == id {
                        patch.apply(&mut t);
                    }
                    t
                })
                .collect()
        });
        debug!(%id, "task updated");
        Ok(())
    }

    /// Removes the task with `id` and returns it.
    pub fn delete(&mut self, id: &str) -> Result<Task, TaskError> {
        self.ensure_exists(id)?;
        let mut removed = None;
        self.mutate(|tasks| {
            let (gone, kept): (Vec<Task>, Vec<Task>) = tasks.into_iter().partition(|t| t.id == id);
            removed = gone.into_iter().next();
            kept
        });
        debug!(%id, "task deleted");
        removed.ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Advances the task with `id` to its next status and returns it.
    pub fn cycle_status(&mut self, id: &str) -> Result<TaskStatus, TaskError> {
        self.ensure_exists(id)?;
        let mut next = None;
        self.mutate(|tasks| {
            tasks
                .into_iter()
                .map(|mut t| {
                    if t.id == id {
                        t.status = t.status.next();
                        next = Some(t.status);
                    }
                    t
                })
                .collect()
        });
        debug!(%id, status = ?next, "task status cycled");
        next.ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Forgets the persisted collection and falls back to the seed.
    ///
    /// Nothing is written until the next mutation, so reopening the store
    /// after a reset behaves like a first run.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.backend.remove(&self.key)?;
        self.tasks = self.seed.clone();
        debug!(key = %self.key, "task store reset");
        Ok(())
    }
}
