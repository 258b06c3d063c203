use serde_json::Value;

use crate::domain::entities::owner::OwnerMap;
use crate::domain::entities::table::format_cell_value;

/// Cell text for the grid. Owner columns show `name (id)` once the id resolves.
pub fn display_cell(owner_columns: &[String], owners: &OwnerMap, column: &str, value: &Value) -> String {
    let raw = format_cell_value(value);
    if owners.is_empty() || !owner_columns.iter().any(|owner| owner == column) {
        return raw;
    }
    match owners.resolve(value) {
        Some(name) if !name.is_empty() => format!("{name} ({raw})"),
        _ => raw,
    }
}

pub fn sort_indicator(active: bool, descending: bool) -> &'static str {
    match (active, descending) {
        (false, _) => "",
        (true, false) => " ▲",
        (true, true) => " ▼",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn owners() -> OwnerMap {
        let rows = vec![
            json!({"id": 7, "username": "alice"}),
            json!({"id": 8, "username": ""}),
        ]
        .into_iter()
        .map(|row| row.as_object().cloned().expect("row should be an object"))
        .collect::<Vec<_>>();
        OwnerMap::from_rows(&rows)
    }

    #[test]
    fn owner_column_shows_name() {
        let columns = vec!["owner_id".to_string()];

        assert_eq!(display_cell(&columns, &owners(), "owner_id", &json!(7)), "alice (7)");
    }

    #[test]
    fn unresolved_or_nameless_ids_stay_raw() {
        let columns = vec!["owner_id".to_string()];

        assert_eq!(display_cell(&columns, &owners(), "owner_id", &json!(99)), "99");
        assert_eq!(display_cell(&columns, &owners(), "owner_id", &json!(8)), "8");
    }

    #[test]
    fn other_columns_are_untouched() {
        let columns = vec!["owner_id".to_string()];

        assert_eq!(display_cell(&columns, &owners(), "size", &json!(7)), "7");
    }
}
