// TaskList - Persistent task list with pluggable key-value storage

pub mod config;
pub mod edit;
pub mod persistence;
pub mod sqlite;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use edit::{CommitTrigger, EditSession};
pub use persistence::{FileAdapter, MemoryAdapter, PersistenceAdapter};
pub use sqlite::SqliteAdapter;
pub use store::{DEFAULT_KEY, TaskListStore, load};
pub use task::{IdGenerator, Task, TaskId, now_ms};
