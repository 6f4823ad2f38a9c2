// Transient edit session for a single task

use crate::persistence::PersistenceAdapter;
use crate::store::TaskListStore;
use crate::task::{Task, TaskId};
use tracing::debug;

/// What ended an edit
///
/// Both triggers commit the buffer the same way; there is no cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTrigger {
    /// The edit field lost focus
    FocusLost,
    /// An explicit confirm action such as pressing Enter
    Confirm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing {
        id: TaskId,
        buffer: String,
    },
}

impl EditSession {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Begin editing `task` with its current text, replacing any session in progress
    pub fn start_edit(&mut self, task: &Task) {
        debug!(id = %task.id, "Starting edit");
        *self = Self::Editing {
            id: task.id,
            buffer: task.text.clone(),
        };
    }

    /// Replace the working text; ignored when idle
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        if let Self::Editing { buffer, .. } = self {
            *buffer = text.into();
        }
    }

    /// Write the buffer to the store and return to idle
    ///
    /// The buffer is committed even when empty or unchanged. Returns the id
    /// that was committed, or `None` when there was no edit in progress.
    pub fn commit<A: PersistenceAdapter>(&mut self, store: &mut TaskListStore<A>, trigger: CommitTrigger) -> Option<TaskId> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Editing { id, buffer } => {
                debug!(%id, ?trigger, "Committing edit");
                store.edit_task(id, &buffer);
                Some(id)
            }
        }
    }

    pub fn editing_id(&self) -> Option<TaskId> {
        match self {
            Self::Idle => None,
            Self::Editing { id, .. } => Some(*id),
        }
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.editing_id() == Some(id)
    }

    pub fn buffer(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Editing { buffer, .. } => Some(buffer),
        }
    }
}
