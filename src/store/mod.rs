//! Record store module
//!
//! A single `users` table behind the [`RecordStore`] trait. Handlers receive the
//! store as an injected `Arc<dyn RecordStore>`; no component builds its own
//! connection from a global descriptor.
//!
//! Every backend opens a connection per call and releases it before returning.
//! The trait deliberately has no raw-SQL entry point: values supplied by callers
//! only ever reach the engine as bound parameters.

mod error;
pub mod memory;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{DatabaseConfig, StoreBackend};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Name of the table every backend manages
pub const USERS_TABLE: &str = "users";

/// One row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Assigned by the store on insert, strictly increasing
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Typed operations over the `users` table
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ensure the table exists. No-op when it already does.
    async fn create_schema(&self) -> Result<(), StoreError>;

    /// Remove the table and every record in it. No-op when absent.
    async fn drop_schema(&self) -> Result<(), StoreError>;

    /// Append a record and return its freshly assigned id
    async fn insert(&self, first_name: &str, last_name: &str) -> Result<i64, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// All records whose last name matches exactly, in id order.
    /// An empty result is not an error.
    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<UserRecord>, StoreError>;

    /// The record with the lowest id, if any
    async fn first(&self) -> Result<Option<UserRecord>, StoreError>;
}

/// Build the backend selected by configuration
pub fn build_store(config: &DatabaseConfig) -> Arc<dyn RecordStore> {
    match config.backend {
        StoreBackend::Postgres => Arc::new(PostgresStore::new(&config.url)),
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(&config.sqlite_path)),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
