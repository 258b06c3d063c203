use crate::domain::entities::table::{Row, RowKey, RowsPage, Schema};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub schema: Schema,
    pub rows: Vec<Row>,
    pub row_keys: Vec<RowKey>,
    pub total: Option<u64>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DisplayState {
    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replaces schema, rows and total in one step.
    pub fn replace(&mut self, schema: Schema, page: RowsPage) {
        self.row_keys = RowKey::for_page(&page.rows);
        self.schema = schema;
        self.rows = page.rows;
        self.total = page.total;
        self.loading = false;
        self.error = None;
    }

    /// Keeps whatever was on screen and flags the error.
    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn row_by_key(&self, key: RowKey) -> Option<&Row> {
        self.row_keys
            .iter()
            .position(|candidate| *candidate == key)
            .and_then(|idx| self.rows.get(idx))
    }
}
