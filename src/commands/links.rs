use crate::error::AppError;
use crate::services::controller::ViewController;
use crate::services::thumbnail_chain::ThumbnailSource;
use tauri::{AppHandle, State};
use tauri_plugin_opener::OpenerExt;

/// An `<img>` in tutorial card `index` failed to load `url`.
#[tauri::command]
pub fn thumbnail_failed(
    controller: State<'_, ViewController>,
    index: usize,
    url: String,
) -> Result<ThumbnailSource, AppError> {
    controller.thumbnail_failed(index, &url)
}

/// Open a tutorial or map link in the system browser. Only links that are
/// part of the result on screen are accepted.
#[tauri::command]
pub fn open_link(app: AppHandle, controller: State<'_, ViewController>, url: String) -> Result<(), AppError> {
    let known = controller
        .snapshot()
        .result
        .map(|view| {
            view.tutorials.iter().any(|t| t.url == url) || view.locations.iter().any(|l| l.url == url)
        })
        .unwrap_or(false);

    if !known {
        return Err(AppError::input(format!("Refusing to open unknown link {}", url)));
    }

    tracing::info!(url = %url, "Opening link");
    app.opener()
        .open_url(url, None::<&str>)
        .map_err(|e| AppError::new(crate::error::ErrorKind::Io, format!("Failed to open link: {}", e)))
}
