use std::sync::Arc;

use crate::domain::entities::display::DisplayState;
use crate::domain::entities::query::{QueryAction, QueryState, RowsQuery, Transition};
use crate::domain::entities::table::{Row, RowKey, RowsPage, Schema, TableName};
use crate::domain::messages::{self, Locale, Message};
use crate::usecase::ports::backend::{BackendError, TableBackend};

/// One schema + rows fetch, stamped with the view generation that issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCycle {
    pub generation: u64,
    pub table: TableName,
    pub query: RowsQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub generation: u64,
    pub result: Result<(Schema, RowsPage), BackendError>,
}

/// Query state, display state and row selection for one open table view.
///
/// Every fetch-relevant change bumps `generation`; outcomes carrying an older
/// generation are dropped in [`TableView::apply`].
#[derive(Debug)]
pub struct TableView {
    query: QueryState,
    display: DisplayState,
    generation: u64,
    selected_row: Option<RowKey>,
    locale: Locale,
}

impl TableView {
    pub fn new(page_size: u32, locale: Locale) -> Self {
        Self {
            query: QueryState::new(page_size),
            display: DisplayState::default(),
            generation: 0,
            selected_row: None,
            locale,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn selected_row(&self) -> Option<RowKey> {
        self.selected_row
    }

    pub fn selected_row_data(&self) -> Option<&Row> {
        self.selected_row
            .and_then(|key| self.display.row_by_key(key))
    }

    /// Applies a user intent. Returns the fetch to run when the backend needs asking.
    pub fn dispatch(&mut self, action: QueryAction) -> Option<FetchCycle> {
        match self.query.apply(action) {
            Transition::Unchanged => None,
            Transition::TableChanged => {
                self.selected_row = None;
                self.display = DisplayState::default();
                self.begin_cycle()
            }
            Transition::Refetch => self.begin_cycle(),
        }
    }

    fn begin_cycle(&mut self) -> Option<FetchCycle> {
        self.generation += 1;
        let Some(table) = self.query.table.clone() else {
            self.display.loading = false;
            return None;
        };

        self.display.begin_loading();
        let query = self.query.rows_query();
        tracing::debug!(
            generation = self.generation,
            table = %table,
            page = query.page,
            page_size = query.page_size,
            "starting fetch cycle"
        );
        Some(FetchCycle {
            generation: self.generation,
            table,
            query,
        })
    }

    /// Folds a finished cycle into the display. Returns `false` for stale outcomes.
    pub fn apply(&mut self, outcome: CycleOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }

        match outcome.result {
            Ok((schema, page)) => {
                self.display.replace(schema, page);
                if let Some(key) = self.selected_row {
                    if !self.display.row_keys.contains(&key) {
                        self.selected_row = None;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "table fetch failed");
                self.display
                    .fail(messages::text(self.locale, Message::LoadViewFailed).to_string());
            }
        }
        true
    }

    /// Clicking the selected row again closes the detail panel.
    pub fn toggle_row(&mut self, key: RowKey) {
        if self.selected_row == Some(key) {
            self.selected_row = None;
        } else if self.display.row_keys.contains(&key) {
            self.selected_row = Some(key);
        }
    }

    /// Invalidates any in-flight cycle, e.g. when the view goes away.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.display.loading = false;
    }
}

pub struct TableQueryComposer {
    backend: Arc<dyn TableBackend>,
}

impl TableQueryComposer {
    pub fn new(backend: Arc<dyn TableBackend>) -> Self {
        Self { backend }
    }

    /// Runs the schema and rows requests concurrently and joins them.
    pub async fn execute(&self, cycle: FetchCycle) -> CycleOutcome {
        let (schema, rows) = tokio::join!(
            self.backend.get_schema(&cycle.table),
            self.backend.get_rows(&cycle.table, &cycle.query),
        );
        let result = match (schema, rows) {
            (Ok(schema), Ok(rows)) => Ok((schema, rows)),
            (Err(err), _) | (_, Err(err)) => Err(err),
        };
        CycleOutcome {
            generation: cycle.generation,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn success(generation: u64, ids: &[i64]) -> CycleOutcome {
        let rows = ids
            .iter()
            .map(|id| {
                json!({"id": id})
                    .as_object()
                    .cloned()
                    .expect("row should be an object")
            })
            .collect();
        CycleOutcome {
            generation,
            result: Ok((
                Schema::default(),
                RowsPage {
                    rows,
                    total: Some(ids.len() as u64),
                },
            )),
        }
    }

    #[test]
    fn no_table_means_no_cycle() {
        let mut view = TableView::new(25, Locale::En);

        assert_eq!(view.dispatch(QueryAction::Refresh), None);
        assert!(!view.display().loading);
    }

    #[test]
    fn dispatch_marks_loading_and_clears_error() {
        let mut view = TableView::new(25, Locale::En);
        let cycle = view
            .dispatch(QueryAction::SelectTable(Some("users".into())))
            .expect("table selection should fetch");
        view.apply(CycleOutcome {
            generation: cycle.generation,
            result: Err(BackendError::Transport("offline".to_string())),
        });
        assert!(view.display().error.is_some());

        view.dispatch(QueryAction::Refresh);

        assert!(view.display().loading);
        assert_eq!(view.display().error, None);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let mut view = TableView::new(25, Locale::En);
        let first = view
            .dispatch(QueryAction::SelectTable(Some("users".into())))
            .expect("first cycle");
        let second = view
            .dispatch(QueryAction::SetPage(2))
            .expect("second cycle");

        assert!(view.apply(success(second.generation, &[26, 27])));
        assert!(!view.apply(success(first.generation, &[1, 2])));

        let ids: Vec<_> = view.display().rows.iter().map(|row| row["id"].clone()).collect();
        assert_eq!(ids, vec![json!(26), json!(27)]);
        assert!(!view.display().loading);
    }

    #[test]
    fn failure_uses_localized_message_and_keeps_rows() {
        let mut view = TableView::new(25, Locale::ZhTw);
        let cycle = view
            .dispatch(QueryAction::SelectTable(Some("users".into())))
            .expect("cycle");
        view.apply(success(cycle.generation, &[1]));

        let retry = view.dispatch(QueryAction::Refresh).expect("refresh cycle");
        view.apply(CycleOutcome {
            generation: retry.generation,
            result: Err(BackendError::Status {
                status: 500,
                message: "boom".to_string(),
            }),
        });

        assert_eq!(view.display().rows.len(), 1);
        assert_eq!(view.display().error.as_deref(), Some("載入資料失敗"));
    }

    #[test]
    fn table_change_clears_selection_before_fetch() {
        let mut view = TableView::new(25, Locale::En);
        let cycle = view
            .dispatch(QueryAction::SelectTable(Some("users".into())))
            .expect("cycle");
        view.apply(success(cycle.generation, &[1, 2]));
        let key = view.display().row_keys[0];
        view.toggle_row(key);
        assert!(view.selected_row_data().is_some());

        let next = view.dispatch(QueryAction::SelectTable(Some("shares".into())));

        assert!(next.is_some());
        assert_eq!(view.selected_row(), None);
        assert!(view.display().rows.is_empty());
    }

    #[test]
    fn toggle_row_deselects_on_second_click_after_refetch() {
        let mut view = TableView::new(25, Locale::En);
        let cycle = view
            .dispatch(QueryAction::SelectTable(Some("users".into())))
            .expect("cycle");
        view.apply(success(cycle.generation, &[1, 2]));
        let key = view.display().row_keys[1];
        view.toggle_row(key);

        let refresh = view.dispatch(QueryAction::Refresh).expect("refresh");
        view.apply(success(refresh.generation, &[1, 2]));
        assert_eq!(view.selected_row(), Some(key));

        view.toggle_row(view.display().row_keys[1]);
        assert_eq!(view.selected_row(), None);
    }

    #[test]
    fn refetch_without_selected_row_clears_selection() {
        let mut view = TableView::new(25, Locale::En);
        let cycle = view
            .dispatch(QueryAction::SelectTable(Some("users".into())))
            .expect("cycle");
        view.apply(success(cycle.generation, &[1, 2]));
        let key = view.display().row_keys[0];
        view.toggle_row(key);
        assert_eq!(view.selected_row(), Some(key));

        let next_page = view.dispatch(QueryAction::SetPage(2)).expect("page cycle");
        view.apply(success(next_page.generation, &[26, 27]));

        assert_eq!(view.selected_row(), None);
        assert_eq!(view.selected_row_data(), None);
    }

    #[test]
    fn teardown_discards_in_flight_cycle() {
        let mut view = TableView::new(25, Locale::En);
        let cycle = view
            .dispatch(QueryAction::SelectTable(Some("users".into())))
            .expect("cycle");

        view.teardown();

        assert!(!view.apply(success(cycle.generation, &[1])));
        assert!(view.display().rows.is_empty());
    }
}
