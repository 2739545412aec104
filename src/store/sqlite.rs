//! SQLite record store
//!
//! Opens the database file on every call and closes it before returning.
//! `rusqlite` is blocking, so each call runs on Tokio's blocking pool.

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::PathBuf;
use std::time::Duration;

use super::{RecordStore, StoreError, UserRecord};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT,
    last_name TEXT
)";
const DROP_TABLE: &str = "DROP TABLE IF EXISTS users";
const INSERT_USER: &str = "INSERT INTO users (first_name, last_name) VALUES (?1, ?2)";
const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";
const SELECT_BY_LAST_NAME: &str =
    "SELECT id, first_name, last_name FROM users WHERE last_name = ?1 ORDER BY id";
const SELECT_FIRST: &str = "SELECT id, first_name, last_name FROM users ORDER BY id LIMIT 1";

/// Concurrent writers wait this long for the file lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Acquire a connection, run `op` on the blocking pool, release the connection
    async fn with_connection<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path).map_err(|e| {
                StoreError::Unavailable(format!("cannot open {}: {e}", path.display()))
            })?;
            conn.busy_timeout(BUSY_TIMEOUT).map_err(map_error)?;
            let result = op(&conn);
            if let Err((_, e)) = conn.close() {
                crate::logger::log_warning(&format!("Failed to close sqlite connection: {e}"));
            }
            result
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("sqlite task failed: {e}")))?
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        first_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        last_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

/// Translate a rusqlite failure into the store taxonomy
fn map_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::ConstraintViolation | ErrorCode::TooBig => {
                StoreError::ConstraintViolation(err.to_string())
            }
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::SystemIoFailure
            | ErrorCode::PermissionDenied => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Schema(err.to_string()),
        },
        _ => StoreError::Unavailable(err.to_string()),
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn create_schema(&self) -> Result<(), StoreError> {
        self.with_connection(|conn| {
            conn.execute(CREATE_TABLE, []).map_err(|e| match map_error(e) {
                StoreError::ConstraintViolation(msg) => StoreError::Schema(msg),
                other => other,
            })?;
            Ok(())
        })
        .await
    }

    async fn drop_schema(&self) -> Result<(), StoreError> {
        self.with_connection(|conn| {
            conn.execute(DROP_TABLE, []).map_err(map_error)?;
            Ok(())
        })
        .await
    }

    async fn insert(&self, first_name: &str, last_name: &str) -> Result<i64, StoreError> {
        let first_name = first_name.to_string();
        let last_name = last_name.to_string();
        self.with_connection(move |conn| {
            conn.execute(INSERT_USER, params![first_name, last_name])
                .map_err(map_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.with_connection(|conn| {
            let count: i64 = conn
                .query_row(COUNT_USERS, [], |row| row.get(0))
                .map_err(map_error)?;
            u64::try_from(count)
                .map_err(|_| StoreError::Schema(format!("negative row count '{count}'")))
        })
        .await
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<UserRecord>, StoreError> {
        let last_name = last_name.to_string();
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(SELECT_BY_LAST_NAME).map_err(map_error)?;
            let rows = stmt
                .query_map(params![last_name], map_row)
                .map_err(map_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(map_error)
        })
        .await
    }

    async fn first(&self) -> Result<Option<UserRecord>, StoreError> {
        self.with_connection(|conn| {
            conn.query_row(SELECT_FIRST, [], map_row)
                .optional()
                .map_err(map_error)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::conformance;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("users.db"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_count_matches_inserts() {
        let (_dir, store) = temp_store();
        conformance::count_matches_inserts(&store).await;
    }

    #[tokio::test]
    async fn test_ids_are_fresh_and_increasing() {
        let (_dir, store) = temp_store();
        conformance::ids_are_fresh_and_increasing(&store).await;
    }

    #[tokio::test]
    async fn test_find_by_last_name() {
        let (_dir, store) = temp_store();
        conformance::find_by_last_name_filters(&store).await;
        conformance::find_by_last_name_is_injection_safe(&store).await;
    }

    #[tokio::test]
    async fn test_first() {
        let (_dir, store) = temp_store();
        conformance::first_follows_insertion_order(&store).await;
    }

    #[tokio::test]
    async fn test_schema_idempotence() {
        let (_dir, store) = temp_store();
        conformance::schema_operations_are_idempotent(&store).await;
        conformance::drop_resets_numbering(&store).await;
    }

    #[tokio::test]
    async fn test_records_survive_across_calls() {
        let (dir, store) = temp_store();
        store.create_schema().await.unwrap();
        store.insert("John", "Doe").await.unwrap();

        // A second handle on the same file sees the committed row
        let other = SqliteStore::new(dir.path().join("users.db"));
        assert_eq!(other.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("no-such-dir").join("users.db"));
        let err = store.create_schema().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "got {err:?}");
    }

    fn engine_error(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn test_map_error_classifies_engine_codes() {
        let err = map_error(engine_error(rusqlite::ffi::SQLITE_CONSTRAINT));
        assert!(matches!(err, StoreError::ConstraintViolation(_)), "got {err:?}");
        let err = map_error(engine_error(rusqlite::ffi::SQLITE_TOOBIG));
        assert!(matches!(err, StoreError::ConstraintViolation(_)), "got {err:?}");
        let err = map_error(engine_error(rusqlite::ffi::SQLITE_BUSY));
        assert!(matches!(err, StoreError::Unavailable(_)), "got {err:?}");
        let err = map_error(engine_error(rusqlite::ffi::SQLITE_LOCKED));
        assert!(matches!(err, StoreError::Unavailable(_)), "got {err:?}");
        let err = map_error(engine_error(rusqlite::ffi::SQLITE_ERROR));
        assert!(matches!(err, StoreError::Schema(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_rejected_insert_is_constraint_violation() {
        let (dir, store) = temp_store();
        // A pre-existing table with a stricter rule; create_schema leaves it alone
        let conn = Connection::open(dir.path().join("users.db")).unwrap();
        conn.execute(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT CHECK (length(first_name) < 8),
                last_name TEXT
            )",
            [],
        )
        .unwrap();
        drop(conn);

        store.create_schema().await.unwrap();
        store.insert("John", "Doe").await.unwrap();
        let err = store.insert("Bartholomew", "Doe").await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)), "got {err:?}");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_without_table_is_schema_error() {
        let (_dir, store) = temp_store();
        let err = store.first().await.unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)), "got {err:?}");
    }
}
