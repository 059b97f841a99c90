use crate::error::AppError;
use crate::models::view_types::ViewSnapshot;
use crate::services::capture_service::CaptureSource;
use crate::services::controller::ViewController;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

const IMAGE_FILTER: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// Bytes from the webview's camera or file input.
#[tauri::command]
pub async fn submit_image(
    controller: State<'_, ViewController>,
    file_name: Option<String>,
    bytes: Vec<u8>,
    source: CaptureSource,
) -> Result<ViewSnapshot, AppError> {
    controller.submit_bytes(file_name, bytes, source).await
}

/// Native file picker. Cancelling leaves the view as it was.
#[tauri::command]
pub async fn pick_image_file(
    app: AppHandle,
    controller: State<'_, ViewController>,
) -> Result<ViewSnapshot, AppError> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .add_filter("Images", IMAGE_FILTER)
        .pick_file(move |picked| {
            let _ = tx.send(picked);
        });

    let picked = rx
        .await
        .map_err(|_| AppError::from("File dialog closed unexpectedly"))?;

    match picked {
        None => controller.select_image(None).await,
        Some(file) => {
            let path = file
                .as_path()
                .ok_or_else(|| AppError::input("Picked file is not on the local filesystem"))?
                .to_path_buf();
            controller.submit_path(&path, CaptureSource::File).await
        }
    }
}
