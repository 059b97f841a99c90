#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use error::{AppError, ErrorKind};
pub use services::api_client::{ClassifierApi, ClientError, HttpClassifierApi};
pub use services::controller::{ViewController, ViewEvent};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter; calling this twice is harmless.
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eco_capture_lib=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;
    use tauri::{Emitter, Manager};
    use tokio::sync::broadcast::error::RecvError;

    init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            let config = ClientConfig::from_env()?;
            tracing::info!(base_url = %config.base_url, timeout = ?config.timeout, "Classifier endpoint");

            let api = HttpClassifierApi::new(config)?;
            let controller = ViewController::new(Arc::new(api));
            let mut events = controller.subscribe();
            app.manage(controller);

            // Forward view changes to the webview.
            let app_handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                loop {
                    let sent = match events.recv().await {
                        Ok(ViewEvent::Changed(snapshot)) => app_handle.emit("view-changed", snapshot),
                        Ok(ViewEvent::Notice(notice)) => app_handle.emit("notice", notice),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "View event forwarder lagged");
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    };
                    if let Err(e) = sent {
                        tracing::error!(error = %e, "Failed to emit view event");
                    }
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::view::get_view,
            commands::view::open_upload_options,
            commands::view::close_upload_options,
            commands::view::open_alternatives,
            commands::view::close_alternatives,
            commands::view::set_custom_input,
            commands::view::select_alternate,
            commands::view::submit_custom_label,
            commands::view::reset,
            commands::capture::submit_image,
            commands::capture::pick_image_file,
            commands::links::thumbnail_failed,
            commands::links::open_link,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
