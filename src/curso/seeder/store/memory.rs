//! In-memory [`TableStore`] used by the test suite.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::curso::seeder::error::Result;
use crate::curso::seeder::store::{Filter, TableStore};

/// Table store backed by plain vectors, with sequential string ids.
///
/// Mirrors the subset of backend behaviour the seeder relies on: equality
/// filters, representation-returning inserts, patch-style updates, and
/// column projection on select.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the rows currently held by `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TableStore for MemoryStore {
    fn select(&self, table: &str, columns: &str, filters: &[Filter]) -> Result<Vec<Value>> {
        let inner = self.lock();
        let rows = inner
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, filters))
                    .map(|row| project(row, columns))
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    fn insert(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>> {
        let mut inner = self.lock();
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = row.clone();
            if let Value::Object(object) = &mut row {
                if !object.contains_key("id") {
                    inner.next_id += 1;
                    object.insert("id".into(), Value::String(inner.next_id.to_string()));
                }
            }
            inserted.push(row.clone());
            inner.tables.entry(table.to_string()).or_default().push(row);
        }
        Ok(inserted)
    }

    fn update(&self, table: &str, filters: &[Filter], patch: &Value) -> Result<()> {
        let mut inner = self.lock();
        if let (Some(rows), Value::Object(patch)) = (inner.tables.get_mut(table), patch) {
            for row in rows.iter_mut().filter(|row| matches(row, filters)) {
                if let Value::Object(object) = row {
                    for (key, value) in patch {
                        object.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> Result<()> {
        let mut inner = self.lock();
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|row| !matches(row, filters));
        }
        Ok(())
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|filter| row.get(&filter.column) == Some(&filter.value))
}

fn project(row: &Value, columns: &str) -> Value {
    if columns == "*" {
        return row.clone();
    }
    let mut projected = Map::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(value) = row.get(column) {
            projected.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}
