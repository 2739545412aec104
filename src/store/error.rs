use thiserror::Error;

/// Failures surfaced by a [`RecordStore`](super::RecordStore)
///
/// Absence of data is never an error: lookups return `None` or an empty `Vec`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection could not be established or was lost mid-operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Schema operation rejected, or the table does not exist
    #[error("schema error: {0}")]
    Schema(String),

    /// Insert rejected by the table's integrity rules
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

impl StoreError {
    /// Short, stable label used in log lines
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Schema(_) => "schema",
            Self::ConstraintViolation(_) => "constraint_violation",
        }
    }
}
