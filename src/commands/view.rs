use crate::error::AppError;
use crate::models::view_types::ViewSnapshot;
use crate::services::controller::ViewController;
use tauri::State;

#[tauri::command]
pub fn get_view(controller: State<'_, ViewController>) -> ViewSnapshot {
    controller.snapshot()
}

#[tauri::command]
pub fn open_upload_options(controller: State<'_, ViewController>) -> Result<ViewSnapshot, AppError> {
    controller.open_upload_options()
}

#[tauri::command]
pub fn close_upload_options(controller: State<'_, ViewController>) -> Result<ViewSnapshot, AppError> {
    controller.close_upload_options()
}

#[tauri::command]
pub fn open_alternatives(controller: State<'_, ViewController>) -> Result<ViewSnapshot, AppError> {
    controller.open_alternatives()
}

#[tauri::command]
pub fn close_alternatives(controller: State<'_, ViewController>) -> Result<ViewSnapshot, AppError> {
    controller.close_alternatives()
}

#[tauri::command]
pub fn set_custom_input(controller: State<'_, ViewController>, text: String) -> Result<ViewSnapshot, AppError> {
    controller.set_custom_input(text)
}

#[tauri::command]
pub async fn select_alternate(
    controller: State<'_, ViewController>,
    label: String,
) -> Result<ViewSnapshot, AppError> {
    controller.select_alternate(&label).await
}

#[tauri::command]
pub async fn submit_custom_label(controller: State<'_, ViewController>) -> Result<ViewSnapshot, AppError> {
    controller.submit_custom_label().await
}

#[tauri::command]
pub fn reset(controller: State<'_, ViewController>) -> Result<ViewSnapshot, AppError> {
    controller.reset()
}
