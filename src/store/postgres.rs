//! PostgreSQL record store
//!
//! Each operation connects with the configured descriptor, runs its statement
//! with bound parameters, and drops the client, which closes the connection.

use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};

use super::{RecordStore, StoreError, UserRecord};
use crate::logger;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    first_name TEXT,
    last_name TEXT
)";
const DROP_TABLE: &str = "DROP TABLE IF EXISTS users";
const INSERT_USER: &str = "INSERT INTO users (first_name, last_name) VALUES ($1, $2) RETURNING id";
const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";
const SELECT_BY_LAST_NAME: &str =
    "SELECT id, first_name, last_name FROM users WHERE last_name = $1 ORDER BY id";
const SELECT_FIRST: &str = "SELECT id, first_name, last_name FROM users ORDER BY id LIMIT 1";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    conn_str: String,
}

impl PostgresStore {
    pub fn new(conn_str: &str) -> Self {
        Self {
            conn_str: conn_str.to_string(),
        }
    }

    /// Open a fresh connection. The returned client owns it; dropping the
    /// client ends the background connection task.
    async fn connect(&self) -> Result<Client, StoreError> {
        let (client, connection) = tokio_postgres::connect(&self.conn_str, NoTls)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                logger::log_error(&format!("Postgres connection error: {e}"));
            }
        });

        Ok(client)
    }
}

fn map_row(row: &Row) -> Result<UserRecord, StoreError> {
    let id: i32 = row.try_get(0).map_err(map_error)?;
    let first_name: Option<String> = row.try_get(1).map_err(map_error)?;
    let last_name: Option<String> = row.try_get(2).map_err(map_error)?;
    Ok(UserRecord {
        id: i64::from(id),
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
    })
}

/// Translate a driver failure into the store taxonomy using its SQLSTATE class
fn map_error(err: tokio_postgres::Error) -> StoreError {
    match err.code() {
        Some(state) => classify(state, err.to_string()),
        // No SQLSTATE: I/O failure, closed connection, or a decode problem
        None => StoreError::Unavailable(err.to_string()),
    }
}

fn classify(state: &SqlState, message: String) -> StoreError {
    if *state == SqlState::UNDEFINED_TABLE {
        return StoreError::Schema(message);
    }

    match state.code().get(..2) {
        // data exception (bad encoding, NUL byte, value too long) or integrity constraint
        Some("22" | "23") => StoreError::ConstraintViolation(message),
        // connection exception, insufficient resources, operator intervention
        Some("08" | "53" | "57") => StoreError::Unavailable(message),
        _ => StoreError::Schema(message),
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn create_schema(&self) -> Result<(), StoreError> {
        let client = self.connect().await?;
        client
            .batch_execute(CREATE_TABLE)
            .await
            .map_err(|e| match map_error(e) {
                StoreError::ConstraintViolation(msg) => StoreError::Schema(msg),
                other => other,
            })
    }

    async fn drop_schema(&self) -> Result<(), StoreError> {
        let client = self.connect().await?;
        client.batch_execute(DROP_TABLE).await.map_err(map_error)
    }

    async fn insert(&self, first_name: &str, last_name: &str) -> Result<i64, StoreError> {
        let client = self.connect().await?;
        let row = client
            .query_one(INSERT_USER, &[&first_name, &last_name])
            .await
            .map_err(map_error)?;
        let id: i32 = row.try_get(0).map_err(map_error)?;
        Ok(i64::from(id))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let client = self.connect().await?;
        let row = client
            .query_one(COUNT_USERS, &[])
            .await
            .map_err(map_error)?;
        let count: i64 = row.try_get(0).map_err(map_error)?;
        u64::try_from(count)
            .map_err(|_| StoreError::Schema(format!("negative row count '{count}'")))
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<UserRecord>, StoreError> {
        let client = self.connect().await?;
        let rows = client
            .query(SELECT_BY_LAST_NAME, &[&last_name])
            .await
            .map_err(map_error)?;
        rows.iter().map(map_row).collect()
    }

    async fn first(&self) -> Result<Option<UserRecord>, StoreError> {
        let client = self.connect().await?;
        let row = client
            .query_opt(SELECT_FIRST, &[])
            .await
            .map_err(map_error)?;
        row.as_ref().map(map_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::conformance;

    const TEST_URL_VAR: &str = "USERS_TEST_PG_URL";

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Port 1 on loopback refuses connections
        let store = PostgresStore::new("host=127.0.0.1 port=1 user=postgres dbname=s2");
        let err = store.count().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "got {err:?}");

        let err = store.create_schema().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "got {err:?}");
    }

    fn classified(code: &str) -> StoreError {
        classify(&SqlState::from_code(code), format!("sqlstate {code}"))
    }

    #[test]
    fn test_rejected_values_are_constraint_violations() {
        // 22021: NUL byte in a TEXT value
        assert!(matches!(classified("22021"), StoreError::ConstraintViolation(_)));
        // 22001: value too long
        assert!(matches!(classified("22001"), StoreError::ConstraintViolation(_)));
        // 23505: unique violation, 23502: not null violation
        assert!(matches!(classified("23505"), StoreError::ConstraintViolation(_)));
        assert!(matches!(classified("23502"), StoreError::ConstraintViolation(_)));
    }

    #[test]
    fn test_connection_classes_are_unavailable() {
        assert!(matches!(classified("08006"), StoreError::Unavailable(_)));
        assert!(matches!(classified("53300"), StoreError::Unavailable(_)));
        assert!(matches!(classified("57P01"), StoreError::Unavailable(_)));
    }

    #[test]
    fn test_schema_classes_are_schema_errors() {
        assert!(matches!(classified("42P01"), StoreError::Schema(_)));
        // 42804: datatype mismatch against a pre-existing table
        assert!(matches!(classified("42804"), StoreError::Schema(_)));
    }

    #[tokio::test]
    #[ignore = "needs a live PostgreSQL server in USERS_TEST_PG_URL"]
    async fn test_live_server_conformance() {
        let url = std::env::var(TEST_URL_VAR)
            .unwrap_or_else(|_| crate::config::DEFAULT_DATABASE_URL.to_string());
        let store = PostgresStore::new(&url);
        store.drop_schema().await.unwrap();

        // One test body: every check drops and recreates the same table
        conformance::count_matches_inserts(&store).await;
        conformance::ids_are_fresh_and_increasing(&store).await;
        conformance::find_by_last_name_filters(&store).await;
        conformance::find_by_last_name_is_injection_safe(&store).await;
        conformance::first_follows_insertion_order(&store).await;
        conformance::schema_operations_are_idempotent(&store).await;
        conformance::drop_resets_numbering(&store).await;

        // The server rejects NUL bytes in TEXT values
        store.create_schema().await.unwrap();
        let err = store.insert("a\0b", "Doe").await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)), "got {err:?}");
    }
}
