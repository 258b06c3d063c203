use serde::Deserialize;

use crate::domain::entities::table::{ColumnDescriptor, Row, RowsPage, TableCategories, TableName};

/// Older backends return a bare array, newer ones wrap it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TablesResponse {
    Bare(Vec<TableName>),
    Wrapped { tables: Vec<TableName> },
}

impl TablesResponse {
    pub fn into_tables(self) -> Vec<TableName> {
        match self {
            TablesResponse::Bare(tables) | TablesResponse::Wrapped { tables } => tables,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: TableCategories,
}

#[derive(Debug, Deserialize)]
pub struct SchemaResponse {
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct RowsResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl From<RowsResponse> for RowsPage {
    fn from(response: RowsResponse) -> Self {
        RowsPage {
            rows: response.rows,
            total: response.total,
        }
    }
}
