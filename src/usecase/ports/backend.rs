use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::query::RowsQuery;
use crate::domain::entities::table::{RowsPage, Schema, TableCategories, TableName};

/// HTTP status the backend uses to reject an oversized page.
pub const STATUS_UNPROCESSABLE: u16 = 422;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// HTTP status when the backend actually answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Remote table API consumed by the browser.
#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<TableName>, BackendError>;

    async fn list_table_categories(&self) -> Result<TableCategories, BackendError>;

    async fn get_schema(&self, table: &TableName) -> Result<Schema, BackendError>;

    async fn get_rows(&self, table: &TableName, query: &RowsQuery)
        -> Result<RowsPage, BackendError>;
}
