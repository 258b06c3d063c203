use std::sync::Arc;

use dioxus::core::Task;
use dioxus::prelude::*;

use crate::config::AppConfig;
use crate::domain::entities::query::{FilterSpec, QueryAction, SortOrder};
use crate::domain::entities::table::{format_cell_value, TableName};
use crate::domain::messages::{self, Locale, Message};
use crate::domain::pagination::{has_next_page, has_prev_page, page_count, visible_range};
use crate::infra::http::client::HttpBackend;
use crate::platform::desktop::save::save_csv;
use crate::ui::cells::{display_cell, sort_indicator};
use crate::ui::state::app_state::AppState;
use crate::usecase::ports::backend::TableBackend;
use crate::usecase::services::catalog::{CatalogService, TableCatalog};
use crate::usecase::services::composer::{TableQueryComposer, TableView};
use crate::usecase::services::debounce::SearchDebouncer;
use crate::usecase::services::export::{export_file_name, rows_to_csv};
use crate::usecase::services::prober::OwnerProber;

const NONE_OPTION_VALUE: &str = "__none__";

/// Signals and services needed to turn a user intent into a fetch cycle.
#[derive(Clone)]
struct ViewHandle {
    view: Signal<TableView>,
    debouncer: Signal<SearchDebouncer>,
    search_task: Signal<Option<Task>>,
    filter_inputs: Signal<std::collections::BTreeMap<String, String>>,
    last_refreshed: Signal<Option<String>>,
    composer: Arc<TableQueryComposer>,
}

impl ViewHandle {
    fn dispatch(&self, action: QueryAction) {
        let mut view = self.view;
        let mut last_refreshed = self.last_refreshed;
        let Some(cycle) = view.write().dispatch(action) else {
            return;
        };
        let composer = self.composer.clone();
        spawn(async move {
            let outcome = composer.execute(cycle).await;
            let succeeded = outcome.result.is_ok();
            if view.write().apply(outcome) && succeeded {
                last_refreshed.set(Some(chrono::Local::now().format("%H:%M:%S").to_string()));
            }
        });
    }

    fn cancel_pending_search(&self) {
        let mut debouncer = self.debouncer;
        let mut search_task = self.search_task;
        debouncer.write().cancel();
        if let Some(task) = search_task.write().take() {
            task.cancel();
        };
    }

    /// Records the live value and restarts the commit timer.
    fn edit_search(&self, term: String) {
        let mut debouncer = self.debouncer;
        let mut search_task = self.search_task;
        self.dispatch(QueryAction::EditSearch(term.clone()));
        self.cancel_pending_search();

        let ticket = debouncer.write().schedule(term);
        let delay = debouncer.read().delay();
        let handle = self.clone();
        let task = spawn(async move {
            tokio::time::sleep(delay).await;
            let mut debouncer = handle.debouncer;
            let committed = debouncer.write().fire(ticket);
            if let Some(term) = committed {
                handle.dispatch(QueryAction::CommitSearch(term));
            }
        });
        search_task.set(Some(task));
    }

    fn select_table(&self, table: Option<TableName>) {
        let mut filter_inputs = self.filter_inputs;
        self.cancel_pending_search();
        filter_inputs.write().clear();
        self.dispatch(QueryAction::SelectTable(table));
    }

    fn apply_filter(&self, column: String, input: String) {
        let mut filter_inputs = self.filter_inputs;
        let action = match FilterSpec::parse(&input) {
            Some(spec) => QueryAction::SetFilter(column.clone(), spec),
            None => QueryAction::ClearFilter(column.clone()),
        };
        filter_inputs.write().insert(column, input);
        self.dispatch(action);
    }

    /// Runs from `use_drop`, when the signals may already be gone.
    fn teardown(&self) {
        let mut view = self.view;
        let mut debouncer = self.debouncer;
        let mut search_task = self.search_task;
        if let Ok(mut debouncer) = debouncer.try_write() {
            debouncer.cancel();
        }
        if let Some(task) = search_task.try_write().ok().and_then(|mut task| task.take()) {
            task.cancel();
        }
        if let Ok(mut view) = view.try_write() {
            view.teardown();
        };
    }
}

fn load_catalog(
    service: Arc<CatalogService>,
    mut catalog: Signal<TableCatalog>,
    mut catalog_loading: Signal<bool>,
    mut catalog_error: Signal<Option<String>>,
) {
    catalog_loading.set(true);
    catalog_error.set(None);
    spawn(async move {
        match service.load().await {
            Ok(loaded) => catalog.set(loaded),
            Err(message) => catalog_error.set(Some(message)),
        }
        catalog_loading.set(false);
    });
}

#[component]
pub fn App() -> Element {
    let config = use_context::<Arc<AppConfig>>();
    let locale: Locale = config.locale;
    let AppState {
        catalog,
        catalog_loading,
        catalog_error,
        view,
        mut owners,
        debouncer,
        search_task,
        filter_inputs,
        last_refreshed,
        mut status,
    } = AppState::new(&config);

    let backend = use_hook(|| {
        HttpBackend::new(&config.api_base_url, config.request_timeout())
            .map(|backend| Arc::new(backend) as Arc<dyn TableBackend>)
    });
    let backend: Arc<dyn TableBackend> = match backend {
        Ok(backend) => backend,
        Err(err) => {
            let label = messages::text(locale, Message::BackendUnavailable);
            return rsx! {
                div {
                    p { "{label}: {err}" }
                }
            };
        }
    };

    let composer = use_hook(|| Arc::new(TableQueryComposer::new(backend.clone())));
    let catalog_service = use_hook(|| Arc::new(CatalogService::new(backend.clone(), locale)));
    let prober = use_hook(|| {
        Arc::new(OwnerProber::with_candidates(
            backend.clone(),
            TableName::from(config.probe.collaborator_table.as_str()),
            config.probe.page_sizes.clone(),
        ))
    });

    let handle = ViewHandle {
        view,
        debouncer,
        search_task,
        filter_inputs,
        last_refreshed,
        composer,
    };

    let catalog_service_for_init = catalog_service.clone();
    use_hook(move || {
        load_catalog(
            catalog_service_for_init,
            catalog,
            catalog_loading,
            catalog_error,
        )
    });

    let handle_for_drop = handle.clone();
    use_drop(move || handle_for_drop.teardown());

    let view_snapshot = view.read();
    let query = view_snapshot.query().clone();
    let display = view_snapshot.display().clone();
    let selected_key = view_snapshot.selected_row();
    let selected_row = view_snapshot.selected_row_data().cloned();
    drop(view_snapshot);

    let owner_snapshot = owners.read().clone();
    let catalog_snapshot = catalog.read().clone();
    let groups = catalog_snapshot.grouped();
    let columns = display.schema.column_names();
    let (range_start, range_end) = visible_range(query.page, query.page_size, display.total);
    let total_label = display
        .total
        .map(|total| total.to_string())
        .unwrap_or_else(|| "?".to_string());
    let pages_label = page_count(display.total, query.page_size)
        .map(|count| count.to_string())
        .unwrap_or_else(|| "?".to_string());
    let can_prev = has_prev_page(query.page);
    let can_next = has_next_page(query.page, query.page_size, display.total);
    let owner_columns = config.owner_columns.clone();
    let page_size_options = config.page_size_options.clone();
    let probe_state = owner_snapshot.state().clone();
    let probe_busy = probe_state.is_loading();
    let probe_label = probe_state.status.as_str();
    let sample_ids = probe_state.sample_keys.join(", ");
    let label_none = messages::text(locale, Message::NoTableSelected);
    let label_export = messages::text(locale, Message::ExportCsv);
    let label_owners = messages::text(locale, Message::ResolveOwners);
    let label_loading = messages::text(locale, Message::Loading);
    let label_prev = messages::text(locale, Message::Previous);
    let label_next = messages::text(locale, Message::Next);
    let label_clear_filters = messages::text(locale, Message::ClearFilters);
    let selected_table_value = query
        .table
        .as_ref()
        .map(|table| table.to_string())
        .unwrap_or_else(|| NONE_OPTION_VALUE.to_string());

    let handle_for_select = handle.clone();
    let handle_for_search = handle.clone();
    let handle_for_page_size = handle.clone();
    let handle_for_prev = handle.clone();
    let handle_for_next = handle.clone();
    let handle_for_refresh = handle.clone();
    let handle_for_clear_filters = handle.clone();
    let catalog_service_for_retry = catalog_service.clone();
    let prober_for_click = prober.clone();
    let table_for_export = query.table.clone();
    let schema_for_export = display.schema.clone();
    let rows_for_export = display.rows.clone();

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 12px; display: flex; flex-direction: column; gap: 10px;",

            div { style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap;",
                select {
                    disabled: catalog_loading(),
                    onchange: move |event| {
                        let value = event.value();
                        let table = if value == NONE_OPTION_VALUE {
                            None
                        } else {
                            Some(TableName::from(value))
                        };
                        handle_for_select.select_table(table);
                    },
                    option {
                        value: NONE_OPTION_VALUE,
                        selected: selected_table_value == NONE_OPTION_VALUE,
                        "{label_none}"
                    }
                    for (category, tables) in groups.iter() {
                        optgroup {
                            label: "{category}",
                            for table in tables.iter() {
                                option {
                                    value: "{table}",
                                    selected: selected_table_value == table.as_str(),
                                    "{table}"
                                }
                            }
                        }
                    }
                }

                input {
                    r#type: "search",
                    placeholder: messages::text(locale, Message::SearchPlaceholder),
                    value: "{query.search_term}",
                    disabled: query.table.is_none(),
                    oninput: move |event| handle_for_search.edit_search(event.value()),
                }

                select {
                    onchange: move |event| {
                        if let Ok(size) = event.value().parse::<u32>() {
                            handle_for_page_size.dispatch(QueryAction::SetPageSize(size));
                        }
                    },
                    for size in page_size_options.iter() {
                        option {
                            value: "{size}",
                            selected: *size == query.page_size,
                            "{size}"
                        }
                    }
                }

                button {
                    disabled: query.table.is_none() || display.loading,
                    onclick: move |_| handle_for_refresh.dispatch(QueryAction::Refresh),
                    "↻"
                }

                if !query.filters.is_empty() {
                    button {
                        onclick: move |_| {
                            let mut filter_inputs = handle_for_clear_filters.filter_inputs;
                            filter_inputs.write().clear();
                            handle_for_clear_filters.dispatch(QueryAction::ClearFilters);
                        },
                        "{label_clear_filters}"
                    }
                }

                button {
                    disabled: query.table.is_none() || display.rows.is_empty(),
                    onclick: move |_| {
                        let Some(table) = table_for_export.as_ref() else {
                            return;
                        };
                        let result = rows_to_csv(&schema_for_export, &rows_for_export)
                            .and_then(|csv| save_csv(&export_file_name(table), &csv));
                        match result {
                            Ok(Some(path)) => {
                                tracing::info!(path = %path.display(), "exported csv");
                                status.set(path.display().to_string());
                            }
                            Ok(None) => {}
                            Err(err) => {
                                tracing::warn!(error = %err, "csv export failed");
                                status.set(err.to_string());
                            }
                        }
                    },
                    "{label_export}"
                }

                button {
                    disabled: probe_busy,
                    onclick: move |_| {
                        if owners.write().try_begin().is_err() {
                            return;
                        }
                        let tables = catalog.read().tables.clone();
                        let prober = prober_for_click.clone();
                        spawn(async move {
                            let outcome = prober
                                .probe(&tables, |progress| owners.write().observe(progress))
                                .await;
                            owners.write().finish(outcome);
                        });
                    },
                    "{label_owners}"
                }
            }

            if let Some(message) = catalog_error() {
                div { style: "color: #b00020; display: flex; gap: 8px; align-items: center;",
                    span { "{message}" }
                    button {
                        onclick: move |_| {
                            load_catalog(
                                catalog_service_for_retry.clone(),
                                catalog,
                                catalog_loading,
                                catalog_error,
                            )
                        },
                        "↻"
                    }
                }
            }

            if let Some(message) = display.error.as_ref() {
                div { style: "color: #b00020;", "{message}" }
            }

            div { style: "font-size: 12px; color: #555; display: flex; gap: 12px;",
                span {
                    "owners: {probe_label}"
                    if let Some(size) = probe_state.page_size_tried {
                        " · page_size {size}"
                    }
                    if let Some(count) = probe_state.count {
                        " · {count} rows"
                    }
                    if let Some(error) = probe_state.error.as_ref() {
                        " · {error}"
                    }
                }
                if !probe_state.sample_keys.is_empty() {
                    span { "ids: {sample_ids}" }
                }
                if display.loading {
                    span { "{label_loading}" }
                }
                if let Some(time) = last_refreshed() {
                    span { "⟳ {time}" }
                }
                if !status().is_empty() {
                    span { "{status}" }
                }
            }

            if query.table.is_some() {
                div { style: "display: flex; gap: 12px; align-items: flex-start;",
                    div { style: "overflow: auto; flex: 1;",
                        table { style: "border-collapse: collapse; width: 100%;",
                            thead {
                                tr {
                                    for column in columns.iter() {
                                        {
                                            let handle = handle.clone();
                                            let column_for_sort = column.clone();
                                            let active = query.sort_by.as_deref() == Some(column.as_str());
                                            let arrow = sort_indicator(active, query.sort_order == SortOrder::Desc);
                                            rsx! {
                                                th {
                                                    style: "cursor: pointer; border-bottom: 1px solid #ccc; text-align: left; padding: 4px 8px;",
                                                    onclick: move |_| handle.dispatch(QueryAction::SortBy(column_for_sort.clone())),
                                                    "{column}{arrow}"
                                                }
                                            }
                                        }
                                    }
                                }
                                tr {
                                    for column in columns.iter() {
                                        {
                                            let handle = handle.clone();
                                            let column_for_filter = column.clone();
                                            let current = filter_inputs.read().get(column).cloned().unwrap_or_default();
                                            rsx! {
                                                th { style: "padding: 2px 4px;",
                                                    input {
                                                        style: "width: 100%;",
                                                        value: "{current}",
                                                        onchange: move |event| {
                                                            handle.apply_filter(column_for_filter.clone(), event.value())
                                                        },
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                            tbody {
                                for (key, row) in display.row_keys.iter().copied().zip(display.rows.iter()) {
                                    {
                                        let mut view = view;
                                        let background = if selected_key == Some(key) { "#eef4ff" } else { "transparent" };
                                        let cells = columns
                                            .iter()
                                            .map(|column| {
                                                let value = row.get(column).cloned().unwrap_or_default();
                                                display_cell(&owner_columns, owner_snapshot.owners(), column, &value)
                                            })
                                            .collect::<Vec<_>>();
                                        rsx! {
                                            tr {
                                                style: "cursor: pointer; background: {background};",
                                                onclick: move |_| view.write().toggle_row(key),
                                                for cell in cells.into_iter() {
                                                    td { style: "border-bottom: 1px solid #eee; padding: 4px 8px;", "{cell}" }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    if let Some(row) = selected_row.as_ref() {
                        div { style: "width: 320px; border-left: 1px solid #ddd; padding-left: 12px;",
                            for (name, value) in row.iter() {
                                div { style: "display: flex; gap: 8px;",
                                    strong { "{name}" }
                                    span { {format_cell_value(value)} }
                                }
                            }
                        }
                    }
                }

                div { style: "display: flex; gap: 8px; align-items: center;",
                    button {
                        disabled: !can_prev || display.loading,
                        onclick: move |_| handle_for_prev.dispatch(QueryAction::PrevPage),
                        "{label_prev}"
                    }
                    button {
                        disabled: !can_next || display.loading,
                        onclick: move |_| {
                            let total = handle_for_next.view.read().display().total;
                            handle_for_next.dispatch(QueryAction::NextPage { total });
                        },
                        "{label_next}"
                    }
                    span { "{range_start}–{range_end} / {total_label} · {query.page} / {pages_label}" }
                }
            }
        }
    }
}
