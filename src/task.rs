// Task model and id generation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Identifier of a task, unique within one list
///
/// Serialized as a bare JSON number. Lists written by earlier versions used
/// millisecond timestamps, which remain valid ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Clock reading in milliseconds since the Unix epoch
pub type Clock = fn() -> i64;

/// Current wall-clock time in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generates unique task ids
///
/// Ids follow the clock when it moves forward and fall back to `last + 1`
/// when several tasks are created within the same millisecond (or the clock
/// steps backwards).
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last: i64,
    clock: Clock,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_clock(now_ms)
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self { last: i64::MIN, clock }
    }

    /// Make sure future ids are greater than every id in `tasks`
    pub fn observe(&mut self, tasks: &[Task]) {
        if let Some(max) = tasks.iter().map(|t| t.id.0).max() {
            self.last = self.last.max(max);
        }
    }

    /// Next id not used by any task in `existing`
    ///
    /// Once the counter reaches `i64::MAX` it stops advancing and the highest
    /// id missing from `existing` is handed out instead.
    pub fn next_id(&mut self, existing: &[Task]) -> TaskId {
        let now = (self.clock)();
        let candidate = if now > self.last { Some(now) } else { self.last.checked_add(1) };

        match candidate {
            Some(id) => {
                self.last = id;
                TaskId(id)
            }
            None => {
                let taken: HashSet<i64> = existing.iter().map(|t| t.id.0).collect();
                let id = (i64::MIN..=i64::MAX)
                    .rev()
                    .find(|id| !taken.contains(id))
                    .unwrap_or(i64::MIN);
                TaskId(id)
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
