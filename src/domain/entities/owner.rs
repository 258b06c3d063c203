use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::entities::table::Row;

/// Key aliases seen across backend versions, in priority order.
pub const ID_ALIASES: [&str; 4] = ["id", "ID", "user_id", "userId"];
pub const NAME_ALIASES: [&str; 5] = ["username", "user_name", "name", "display_name", "displayName"];

pub const SAMPLE_KEY_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerMap {
    names: BTreeMap<String, String>,
}

impl OwnerMap {
    /// Indexes every row that carries a resolvable id.
    pub fn from_rows(rows: &[Row]) -> Self {
        let names = rows
            .iter()
            .filter_map(|row| {
                let id = first_present(row, &ID_ALIASES).and_then(owner_key)?;
                let name = first_present(row, &NAME_ALIASES)
                    .map(display_text)
                    .unwrap_or_default();
                Some((id, name))
            })
            .collect();
        OwnerMap { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Looks up a foreign-key cell value.
    pub fn resolve(&self, value: &Value) -> Option<&str> {
        owner_key(value).and_then(|key| self.get(&key))
    }

    pub fn sample_keys(&self) -> Vec<String> {
        self.names.keys().take(SAMPLE_KEY_LIMIT).cloned().collect()
    }
}

fn first_present<'a>(row: &'a Row, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| row.get(*alias).filter(|value| !value.is_null()))
}

/// Ids are compared as text so `7` and `"7"` meet.
fn owner_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_key(number)),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// `7.0` and `7` name the same owner.
fn number_key(number: &serde_json::Number) -> String {
    if number.is_f64() {
        if let Some(float) = number.as_f64() {
            if float.fract() == 0.0 && float.abs() < 9.0e15 {
                return format!("{}", float as i64);
            }
        }
    }
    number.to_string()
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl ProbeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeStatus::Idle => "idle",
            ProbeStatus::Loading => "loading",
            ProbeStatus::Loaded => "loaded",
            ProbeStatus::Failed => "failed",
        }
    }
}

/// Diagnostic view of the last owner probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeState {
    pub status: ProbeStatus,
    pub page_size_tried: Option<u32>,
    pub count: Option<usize>,
    pub sample_keys: Vec<String>,
    pub error: Option<String>,
    pub http_status: Option<u16>,
}

impl ProbeState {
    pub fn is_loading(&self) -> bool {
        self.status == ProbeStatus::Loading
    }

    pub fn loading() -> Self {
        ProbeState {
            status: ProbeStatus::Loading,
            ..ProbeState::default()
        }
    }

    pub fn retrying(page_size: u32) -> Self {
        ProbeState {
            status: ProbeStatus::Loading,
            page_size_tried: Some(page_size),
            ..ProbeState::default()
        }
    }

    pub fn loaded(page_size: u32, row_count: usize, owners: &OwnerMap) -> Self {
        ProbeState {
            status: ProbeStatus::Loaded,
            page_size_tried: Some(page_size),
            count: Some(row_count),
            sample_keys: owners.sample_keys(),
            error: None,
            http_status: None,
        }
    }

    pub fn failed(page_size: Option<u32>, error: String, http_status: Option<u16>) -> Self {
        ProbeState {
            status: ProbeStatus::Failed,
            page_size_tried: page_size,
            error: Some(error),
            http_status,
            ..ProbeState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rows(value: Value) -> Vec<Row> {
        value
            .as_array()
            .expect("rows should be an array")
            .iter()
            .map(|row| row.as_object().cloned().expect("row should be an object"))
            .collect()
    }

    #[test]
    fn heterogeneous_fields_resolve() {
        let owners = OwnerMap::from_rows(&rows(json!([
            {"ID": 7, "display_name": "Alice"},
            {"user_id": 9, "name": "Bob"}
        ])));

        assert_eq!(owners.len(), 2);
        assert_eq!(owners.get("7"), Some("Alice"));
        assert_eq!(owners.get("9"), Some("Bob"));
    }

    #[test]
    fn alias_priority_is_respected() {
        let owners = OwnerMap::from_rows(&rows(json!([
            {"id": 1, "user_id": 99, "username": "root", "name": "Administrator"}
        ])));

        assert_eq!(owners.get("1"), Some("root"));
        assert_eq!(owners.get("99"), None);
    }

    #[test]
    fn integral_float_ids_match_integer_cells() {
        let owners = OwnerMap::from_rows(&rows(json!([
            {"id": 7.0, "name": "Alice"},
            {"id": 2.5, "name": "Half"}
        ])));

        assert_eq!(owners.resolve(&json!(7)), Some("Alice"));
        assert_eq!(owners.resolve(&json!(7.0)), Some("Alice"));
        assert_eq!(owners.resolve(&json!("7")), Some("Alice"));
        assert_eq!(owners.resolve(&json!(2.5)), Some("Half"));
    }

    #[test]
    fn rows_without_id_are_skipped() {
        let owners = OwnerMap::from_rows(&rows(json!([
            {"name": "ghost"},
            {"id": null, "user_id": "u-3"}
        ])));

        assert_eq!(owners.len(), 1);
        assert_eq!(owners.get("u-3"), Some(""));
    }

    #[test]
    fn resolve_matches_numeric_and_string_ids() {
        let owners = OwnerMap::from_rows(&rows(json!([{"id": "42", "username": "deploy"}])));

        assert_eq!(owners.resolve(&json!(42)), Some("deploy"));
        assert_eq!(owners.resolve(&json!("42")), Some("deploy"));
        assert_eq!(owners.resolve(&Value::Null), None);
    }

    #[test]
    fn sample_keys_are_capped() {
        let many: Vec<Value> = (0..50).map(|id| json!({"id": id})).collect();
        let owners = OwnerMap::from_rows(&rows(Value::Array(many)));

        let state = ProbeState::loaded(500, 50, &owners);

        assert_eq!(state.sample_keys.len(), SAMPLE_KEY_LIMIT);
        assert_eq!(state.count, Some(50));
    }
}
