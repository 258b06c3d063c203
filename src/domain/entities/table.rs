use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column names treated as a row's natural key when deriving a [`RowKey`].
const ROW_KEY_COLUMNS: [&str; 4] = ["id", "ID", "uuid", "pk"];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(pub String);

impl TableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TableName {
    fn from(value: &str) -> Self {
        TableName(value.to_string())
    }
}

impl From<String> for TableName {
    fn from(value: String) -> Self {
        TableName(value)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnDescriptor>,
}

impl Schema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }
}

pub type Row = serde_json::Map<String, Value>;

/// Backend grouping of table names, as returned by the categories listing.
pub type TableCategories = BTreeMap<String, Vec<TableName>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowsPage {
    pub rows: Vec<Row>,
    pub total: Option<u64>,
}

/// Stable identity for a displayed row.
///
/// Derived from the row's content rather than its position in memory, so a
/// refetch returning the same logical row yields the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey {
    digest: u64,
    occurrence: usize,
}

impl RowKey {
    /// Keys every row on a page. Rows with identical content are told apart
    /// by their occurrence count within the page.
    pub fn for_page(rows: &[Row]) -> Vec<RowKey> {
        let mut seen: BTreeMap<u64, usize> = BTreeMap::new();
        rows.iter()
            .map(|row| {
                let digest = row_digest(row);
                let counter = seen.entry(digest).or_insert(0);
                let key = RowKey {
                    digest,
                    occurrence: *counter,
                };
                *counter += 1;
                key
            })
            .collect()
    }
}

fn row_digest(row: &Row) -> u64 {
    let mut hasher = DefaultHasher::new();
    let natural_key = ROW_KEY_COLUMNS
        .iter()
        .find_map(|name| row.get(*name).filter(|value| !value.is_null()));
    match natural_key {
        Some(value) => {
            "key".hash(&mut hasher);
            value.to_string().hash(&mut hasher);
        }
        None => {
            "row".hash(&mut hasher);
            let ordered: BTreeMap<&String, &Value> = row.iter().collect();
            serde_json::to_string(&ordered)
                .unwrap_or_default()
                .hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Renders a cell value for display and CSV output.
pub fn format_cell_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
