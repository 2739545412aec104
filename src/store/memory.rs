//! In-process record store
//!
//! Mirrors the SQL backends' semantics (missing table is a schema error, ids
//! restart after a drop) so it can stand in for them in tests and local runs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{RecordStore, StoreError, UserRecord, USERS_TABLE};

#[derive(Debug)]
struct Table {
    rows: Vec<UserRecord>,
    next_id: i64,
}

/// `None` means the table has not been created
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Option<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_table() -> StoreError {
    StoreError::Schema(format!("relation \"{USERS_TABLE}\" does not exist"))
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_schema(&self) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        if table.is_none() {
            *table = Some(Table {
                rows: Vec::new(),
                next_id: 1,
            });
        }
        Ok(())
    }

    async fn drop_schema(&self) -> Result<(), StoreError> {
        *self.table.lock().await = None;
        Ok(())
    }

    async fn insert(&self, first_name: &str, last_name: &str) -> Result<i64, StoreError> {
        let mut guard = self.table.lock().await;
        let table = guard.as_mut().ok_or_else(missing_table)?;
        let id = table.next_id;
        table.next_id += 1;
        table.rows.push(UserRecord {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        });
        Ok(id)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let guard = self.table.lock().await;
        let table = guard.as_ref().ok_or_else(missing_table)?;
        Ok(u64::try_from(table.rows.len()).unwrap_or(u64::MAX))
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<UserRecord>, StoreError> {
        let guard = self.table.lock().await;
        let table = guard.as_ref().ok_or_else(missing_table)?;
        Ok(table
            .rows
            .iter()
            .filter(|r| r.last_name == last_name)
            .cloned()
            .collect())
    }

    async fn first(&self) -> Result<Option<UserRecord>, StoreError> {
        let guard = self.table.lock().await;
        let table = guard.as_ref().ok_or_else(missing_table)?;
        Ok(table.rows.first().cloned())
    }
}
