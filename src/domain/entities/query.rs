use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::table::TableName;
use crate::domain::pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
}

/// A single column predicate. Serialized as `["op", value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(FilterOp, Value)", into = "(FilterOp, Value)")]
pub struct FilterSpec {
    pub op: FilterOp,
    pub value: Value,
}

impl From<(FilterOp, Value)> for FilterSpec {
    fn from((op, value): (FilterOp, Value)) -> Self {
        FilterSpec { op, value }
    }
}

impl From<FilterSpec> for (FilterOp, Value) {
    fn from(spec: FilterSpec) -> Self {
        (spec.op, spec.value)
    }
}

impl FilterSpec {
    /// Parses filter-box input such as `>=30`, `!=draft` or `alice`.
    /// Bare text becomes a substring match; blank input yields `None`.
    pub fn parse(input: &str) -> Option<FilterSpec> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let prefixes = [
            (">=", FilterOp::Gte),
            ("<=", FilterOp::Lte),
            ("!=", FilterOp::Ne),
            (">", FilterOp::Gt),
            ("<", FilterOp::Lt),
            ("=", FilterOp::Eq),
        ];
        for (prefix, op) in prefixes {
            if let Some(rest) = input.strip_prefix(prefix) {
                let rest = rest.trim();
                if rest.is_empty() {
                    return None;
                }
                return Some(FilterSpec {
                    op,
                    value: literal_value(rest),
                });
            }
        }

        Some(FilterSpec {
            op: FilterOp::Like,
            value: Value::String(input.to_string()),
        })
    }
}

fn literal_value(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = text.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(text.to_string()),
    }
}

/// Parameters for one rows request. Optional parts are `None` when they
/// must be omitted from the wire request entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsQuery {
    pub page: u32,
    pub page_size: u32,
    /// Asks the backend for an export-shaped response. The desktop CSV
    /// export writes the rows on screen and never sets it.
    pub export: bool,
    pub search: Option<String>,
    pub sort: Option<SortSpec>,
    pub filters: Option<BTreeMap<String, FilterSpec>>,
}

impl RowsQuery {
    pub fn page_of(page: u32, page_size: u32) -> Self {
        RowsQuery {
            page,
            page_size,
            export: false,
            search: None,
            sort: None,
            filters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub table: Option<TableName>,
    pub page: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub filters: BTreeMap<String, FilterSpec>,
    pub search_term: String,
    pub debounced_search_term: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryAction {
    SelectTable(Option<TableName>),
    Refresh,
    SetPage(u32),
    NextPage { total: Option<u64> },
    PrevPage,
    SetPageSize(u32),
    SortBy(String),
    ClearSort,
    SetFilter(String, FilterSpec),
    ClearFilter(String),
    ClearFilters,
    EditSearch(String),
    CommitSearch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing the backend sees has changed.
    Unchanged,
    Refetch,
    /// The selected table changed; everything derived from the old table is void.
    TableChanged,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        QueryState {
            table: None,
            page: 1,
            page_size: page_size.max(1),
            sort_by: None,
            sort_order: SortOrder::Asc,
            filters: BTreeMap::new(),
            search_term: String::new(),
            debounced_search_term: String::new(),
        }
    }

    pub fn apply(&mut self, action: QueryAction) -> Transition {
        match action {
            QueryAction::SelectTable(table) => {
                if table == self.table {
                    return Transition::Unchanged;
                }
                *self = QueryState {
                    table,
                    ..QueryState::new(self.page_size)
                };
                Transition::TableChanged
            }
            QueryAction::Refresh => Transition::Refetch,
            QueryAction::SetPage(page) => self.set_page(page.max(1)),
            QueryAction::NextPage { total } => {
                if !pagination::has_next_page(self.page, self.page_size, total) {
                    return Transition::Unchanged;
                }
                self.set_page(self.page.saturating_add(1))
            }
            QueryAction::PrevPage => {
                if !pagination::has_prev_page(self.page) {
                    return Transition::Unchanged;
                }
                self.set_page(self.page - 1)
            }
            QueryAction::SetPageSize(page_size) => {
                if page_size == 0 || page_size == self.page_size {
                    return Transition::Unchanged;
                }
                self.page_size = page_size;
                self.page = 1;
                Transition::Refetch
            }
            QueryAction::SortBy(column) => {
                if self.sort_by.as_deref() == Some(column.as_str()) {
                    self.sort_order = self.sort_order.flipped();
                } else {
                    self.sort_by = Some(column);
                    self.sort_order = SortOrder::Asc;
                }
                self.page = 1;
                Transition::Refetch
            }
            QueryAction::ClearSort => {
                if self.sort_by.is_none() {
                    return Transition::Unchanged;
                }
                self.sort_by = None;
                self.sort_order = SortOrder::Asc;
                self.page = 1;
                Transition::Refetch
            }
            QueryAction::SetFilter(column, spec) => {
                if self.filters.get(&column) == Some(&spec) {
                    return Transition::Unchanged;
                }
                self.filters.insert(column, spec);
                self.page = 1;
                Transition::Refetch
            }
            QueryAction::ClearFilter(column) => {
                if self.filters.remove(&column).is_none() {
                    return Transition::Unchanged;
                }
                self.page = 1;
                Transition::Refetch
            }
            QueryAction::ClearFilters => {
                if self.filters.is_empty() {
                    return Transition::Unchanged;
                }
                self.filters.clear();
                self.page = 1;
                Transition::Refetch
            }
            QueryAction::EditSearch(term) => {
                self.search_term = term;
                Transition::Unchanged
            }
            QueryAction::CommitSearch(term) => {
                if term == self.debounced_search_term && self.page == 1 {
                    return Transition::Unchanged;
                }
                self.debounced_search_term = term;
                self.page = 1;
                Transition::Refetch
            }
        }
    }

    fn set_page(&mut self, page: u32) -> Transition {
        if page == self.page {
            return Transition::Unchanged;
        }
        self.page = page;
        Transition::Refetch
    }

    /// Derives the rows request, omitting every optional part that is inactive.
    pub fn rows_query(&self) -> RowsQuery {
        let search = Some(&self.debounced_search_term)
            .filter(|term| !term.is_empty())
            .cloned();
        let sort = self.sort_by.as_ref().map(|column| SortSpec {
            column: column.clone(),
            order: self.sort_order,
        });
        let filters = Some(&self.filters)
            .filter(|filters| !filters.is_empty())
            .cloned();

        RowsQuery {
            page: self.page,
            page_size: self.page_size,
            export: false,
            search,
            sort,
            filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn gte(value: i64) -> FilterSpec {
        FilterSpec {
            op: FilterOp::Gte,
            value: json!(value),
        }
    }

    #[test]
    fn rows_query_omits_inactive_parameters() {
        let mut state = QueryState::new(25);
        state.apply(QueryAction::SelectTable(Some("disks".into())));

        let query = state.rows_query();

        assert_eq!(query, RowsQuery::page_of(1, 25));
    }

    #[test]
    fn rows_query_carries_sort_as_pair() {
        let mut state = QueryState::new(25);
        state.apply(QueryAction::SelectTable(Some("disks".into())));
        state.apply(QueryAction::SortBy("size".to_string()));
        state.apply(QueryAction::SortBy("size".to_string()));

        let sort = state.rows_query().sort.expect("sort should be present");

        assert_eq!(sort.column, "size");
        assert_eq!(sort.order, SortOrder::Desc);
    }

    #[test]
    fn committed_search_is_sent_verbatim() {
        let mut state = QueryState::new(25);
        state.apply(QueryAction::CommitSearch(" ab ".to_string()));
        assert_eq!(state.rows_query().search.as_deref(), Some(" ab "));

        state.apply(QueryAction::CommitSearch(" ".to_string()));
        assert_eq!(state.rows_query().search.as_deref(), Some(" "));

        state.apply(QueryAction::CommitSearch(String::new()));
        assert_eq!(state.rows_query().search, None);
    }

    #[test]
    fn table_switch_resets_query_context() {
        let mut state = QueryState::new(50);
        state.apply(QueryAction::SelectTable(Some("users".into())));
        state.apply(QueryAction::SortBy("name".to_string()));
        state.apply(QueryAction::SetFilter("age".to_string(), gte(30)));
        state.apply(QueryAction::EditSearch("x".to_string()));
        state.apply(QueryAction::CommitSearch("x".to_string()));
        state.apply(QueryAction::SetPage(3));

        let transition = state.apply(QueryAction::SelectTable(Some("shares".into())));

        assert_eq!(transition, Transition::TableChanged);
        assert_eq!(state.page, 1);
        assert_eq!(state.page_size, 50);
        assert_eq!(state.sort_by, None);
        assert!(state.filters.is_empty());
        assert_eq!(state.search_term, "");
        assert_eq!(state.debounced_search_term, "");
    }

    #[test]
    fn reselecting_same_table_is_a_no_op() {
        let mut state = QueryState::new(25);
        state.apply(QueryAction::SelectTable(Some("users".into())));
        state.apply(QueryAction::SetPage(2));

        let transition = state.apply(QueryAction::SelectTable(Some("users".into())));

        assert_eq!(transition, Transition::Unchanged);
        assert_eq!(state.page, 2);
    }

    #[test]
    fn edit_search_does_not_trigger_fetch() {
        let mut state = QueryState::new(25);
        state.apply(QueryAction::SetPage(4));

        assert_eq!(
            state.apply(QueryAction::EditSearch("ab".to_string())),
            Transition::Unchanged
        );
        assert_eq!(state.page, 4);

        assert_eq!(
            state.apply(QueryAction::CommitSearch("ab".to_string())),
            Transition::Refetch
        );
        assert_eq!(state.page, 1);
    }

    #[test]
    fn prev_page_clamps_at_one() {
        let mut state = QueryState::new(25);

        assert_eq!(state.apply(QueryAction::PrevPage), Transition::Unchanged);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn next_page_stops_at_known_last_page() {
        let mut state = QueryState::new(25);
        state.apply(QueryAction::SetPage(3));

        assert_eq!(
            state.apply(QueryAction::NextPage { total: Some(60) }),
            Transition::Unchanged
        );
        assert_eq!(
            state.apply(QueryAction::NextPage { total: None }),
            Transition::Refetch
        );
        assert_eq!(state.page, 4);
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut state = QueryState::new(25);
        state.apply(QueryAction::SetPage(5));

        state.apply(QueryAction::SetFilter("age".to_string(), gte(18)));
        assert_eq!(state.page, 1);

        assert_eq!(
            state.apply(QueryAction::SetFilter("age".to_string(), gte(18))),
            Transition::Unchanged
        );
        assert_eq!(
            state.apply(QueryAction::ClearFilter("missing".to_string())),
            Transition::Unchanged
        );
    }

    #[test]
    fn filter_spec_parses_operators() {
        assert_eq!(FilterSpec::parse(">=30"), Some(gte(30)));
        assert_eq!(
            FilterSpec::parse("!= draft"),
            Some(FilterSpec {
                op: FilterOp::Ne,
                value: json!("draft"),
            })
        );
        assert_eq!(
            FilterSpec::parse("alice"),
            Some(FilterSpec {
                op: FilterOp::Like,
                value: json!("alice"),
            })
        );
        assert_eq!(FilterSpec::parse("  "), None);
        assert_eq!(FilterSpec::parse(">="), None);
    }

    #[test]
    fn filter_spec_serializes_as_pair() {
        let encoded = serde_json::to_value(gte(30)).expect("filter should serialize");

        assert_eq!(encoded, json!(["gte", 30]));
    }
}
