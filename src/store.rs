// Task list state and its persistence synchronization

use crate::persistence::PersistenceAdapter;
use crate::task::{IdGenerator, Task, TaskId};
use eyre::Result;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Key the serialized list is stored under unless configured otherwise
pub const DEFAULT_KEY: &str = "todos";

type Listener = Box<dyn FnMut(&[Task])>;

/// Ordered task list kept in sync with a persistence backend
///
/// Every mutating operation re-saves the whole list before returning. Save
/// failures are logged and remembered in [`TaskListStore::last_save_error`];
/// they never fail the operation or touch the in-memory list.
pub struct TaskListStore<A: PersistenceAdapter> {
    adapter: A,
    key: String,
    tasks: Vec<Task>,
    ids: IdGenerator,
    listeners: Vec<Listener>,
    last_save_error: Option<String>,
}

impl<A: PersistenceAdapter> TaskListStore<A> {
    /// Load the list stored under [`DEFAULT_KEY`]
    pub fn open(adapter: A) -> Self {
        Self::open_with_key(adapter, DEFAULT_KEY)
    }

    pub fn open_with_key(adapter: A, key: &str) -> Self {
        Self::open_with_ids(adapter, key, IdGenerator::new())
    }

    /// Load using a caller-supplied id generator
    ///
    /// The loaded list is written straight back, so a malformed stored value
    /// is replaced by `[]`. When the adapter could not be read at all the
    /// stored value is left alone until the first mutation.
    pub fn open_with_ids(adapter: A, key: &str, mut ids: IdGenerator) -> Self {
        let (tasks, readable) = match read_stored(&adapter, key) {
            Ok(tasks) => (tasks, true),
            Err(e) => {
                warn!(key, error = %e, "Failed to read stored task list, starting empty without overwriting it");
                (Vec::new(), false)
            }
        };
        ids.observe(&tasks);

        let mut store = Self {
            adapter,
            key: key.to_string(),
            tasks,
            ids,
            listeners: Vec::new(),
            last_save_error: None,
        };
        if readable {
            store.persist();
        }
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks not yet completed
    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Message of the most recent failed save, cleared by the next good one
    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    /// Register a callback that receives the list after every save
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&[Task]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Append a task unless `raw_text` is blank
    ///
    /// The text is stored exactly as typed; only the emptiness check trims.
    pub fn add_task(&mut self, raw_text: &str) -> &[Task] {
        if raw_text.trim().is_empty() {
            debug!("Ignoring blank task");
            return &self.tasks;
        }

        let task = Task::new(self.ids.next_id(&self.tasks), raw_text);
        debug!(id = %task.id, "Adding task");
        self.tasks.push(task);

        self.persist();
        &self.tasks
    }

    pub fn toggle_task(&mut self, id: TaskId) -> &[Task] {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                debug!(%id, completed = task.completed, "Toggled task");
            }
            None => debug!(%id, "Toggle of unknown task"),
        }

        self.persist();
        &self.tasks
    }

    pub fn delete_task(&mut self, id: TaskId) -> &[Task] {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                debug!(%id, "Deleted task");
            }
            None => debug!(%id, "Delete of unknown task"),
        }

        self.persist();
        &self.tasks
    }

    /// Replace a task's text verbatim; empty text is allowed
    pub fn edit_task(&mut self, id: TaskId, new_text: &str) -> &[Task] {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.text = new_text.to_string();
                debug!(%id, "Edited task");
            }
            None => debug!(%id, "Edit of unknown task"),
        }

        self.persist();
        &self.tasks
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.tasks)
            .map_err(eyre::Report::from)
            .and_then(|json| self.adapter.save(&self.key, &json));

        match result {
            Ok(()) => self.last_save_error = None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to save task list");
                self.last_save_error = Some(format!("{:#}", e));
            }
        }

        for listener in &mut self.listeners {
            listener(&self.tasks);
        }
    }
}

/// Read the list stored under `key`
///
/// Absent values, adapter errors, and values that are not a JSON array of
/// tasks all yield an empty list. Duplicate ids keep their first occurrence.
pub fn load<A: PersistenceAdapter + ?Sized>(adapter: &A, key: &str) -> Vec<Task> {
    read_stored(adapter, key).unwrap_or_else(|e| {
        warn!(key, error = %e, "Failed to read stored task list, starting empty");
        Vec::new()
    })
}

/// Like [`load`], but reports adapter read errors instead of hiding them
///
/// Malformed values are still recovered as an empty list.
fn read_stored<A: PersistenceAdapter + ?Sized>(adapter: &A, key: &str) -> Result<Vec<Task>> {
    let raw = match adapter.load(key)? {
        Some(raw) => raw,
        None => {
            debug!(key, "No stored task list");
            return Ok(Vec::new());
        }
    };

    let parsed: Vec<Task> = match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(key, error = %e, "Stored task list is malformed, starting empty");
            return Ok(Vec::new());
        }
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(parsed.len());
    for task in parsed {
        if seen.insert(task.id) {
            tasks.push(task);
        } else {
            warn!(key, id = %task.id, "Dropping task with duplicate id");
        }
    }

    info!(key, count = tasks.len(), "Loaded task list");
    Ok(tasks)
}
