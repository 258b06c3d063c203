use std::sync::Arc;

mod app;
mod config;
mod domain;
mod infra;
mod logging;
mod platform;
mod ui;
mod usecase;


use crate::app::App;
use crate::config::AppConfig;
use crate::platform::desktop::dirs::default_webview_data_dir;

fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    if let Err(err) = logging::init_logging(&config.log_filter) {
        eprintln!("{err:#}");
    }
    if let Some(err) = config_error {
        tracing::error!(error = %err, "falling back to default configuration");
    }
    tracing::info!(api = %config.api_base_url, locale = ?config.locale, "starting table browser");

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Table Browser"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(Arc::new(config))
        .launch(App);
}
