use std::collections::BTreeMap;

use dioxus::core::Task;
use dioxus::prelude::{use_signal, Signal};

use crate::config::AppConfig;
use crate::usecase::services::catalog::TableCatalog;
use crate::usecase::services::composer::TableView;
use crate::usecase::services::debounce::SearchDebouncer;
use crate::usecase::services::prober::OwnerDirectory;

pub struct AppState {
    pub catalog: Signal<TableCatalog>,
    pub catalog_loading: Signal<bool>,
    pub catalog_error: Signal<Option<String>>,
    pub view: Signal<TableView>,
    pub owners: Signal<OwnerDirectory>,
    pub debouncer: Signal<SearchDebouncer>,
    pub search_task: Signal<Option<Task>>,
    pub filter_inputs: Signal<BTreeMap<String, String>>,
    pub last_refreshed: Signal<Option<String>>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let page_size = config.default_page_size;
        let locale = config.locale;
        let debounce = config.search_debounce();
        Self {
            catalog: use_signal(TableCatalog::default),
            catalog_loading: use_signal(|| false),
            catalog_error: use_signal(|| None::<String>),
            view: use_signal(move || TableView::new(page_size, locale)),
            owners: use_signal(OwnerDirectory::default),
            debouncer: use_signal(move || SearchDebouncer::new(debounce)),
            search_task: use_signal(|| None::<Task>),
            filter_inputs: use_signal(BTreeMap::<String, String>::new),
            last_refreshed: use_signal(|| None::<String>),
            status: use_signal(String::new),
        }
    }
}
