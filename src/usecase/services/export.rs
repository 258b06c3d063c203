use anyhow::{Context, Result};

use crate::domain::entities::table::{format_cell_value, Row, Schema, TableName};

pub fn export_file_name(table: &TableName) -> String {
    format!("{table}.csv")
}

/// Serialises the rows on screen, columns in schema order. Nothing is refetched.
pub fn rows_to_csv(schema: &Schema, rows: &[Row]) -> Result<String> {
    let columns = schema.column_names();
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(&columns)
        .context("failed to write csv header")?;
    for row in rows {
        let record = columns
            .iter()
            .map(|column| row.get(column).map(format_cell_value).unwrap_or_default());
        writer
            .write_record(record)
            .context("failed to write csv record")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv writer: {err}"))?;
    String::from_utf8(bytes).context("csv output is not valid utf-8")
}
