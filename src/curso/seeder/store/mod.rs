//! Storage abstraction over the hosted table API.
//!
//! The seeder only ever needs filtered reads, batched inserts, filtered
//! updates, and filtered deletes, so that is the whole trait. Keeping the
//! surface this small lets the driver and the seeding operations run
//! against [`MemoryStore`] in tests while production wires in
//! [`SupabaseStore`].

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use serde_json::Value;

use crate::curso::seeder::error::Result;

/// Table holding one row per (grade, topic_slug).
pub const LESSONS_TABLE: &str = "lessons";
/// Table holding the practice items, owned by their lesson.
pub const EXERCISES_TABLE: &str = "exercises";

/// A single equality condition on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    /// Builds a `column = value` filter.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Minimal capability surface of the hosted table API.
pub trait TableStore {
    /// Returns the rows of `table` matching all `filters`, projected to
    /// `columns` (a comma-separated list, or `*`).
    fn select(&self, table: &str, columns: &str, filters: &[Filter]) -> Result<Vec<Value>>;

    /// Inserts `rows` into `table` in one batch, returning the inserted
    /// representations with their server-assigned identifiers.
    fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>>;

    /// Applies `patch` to every row of `table` matching `filters`.
    fn update(&self, table: &str, filters: &[Filter], patch: &Value) -> Result<()>;

    /// Deletes every row of `table` matching `filters`.
    fn delete(&self, table: &str, filters: &[Filter]) -> Result<()>;
}
