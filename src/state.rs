mod sqlite;

pub use sqlite::SqliteGoalStore;
