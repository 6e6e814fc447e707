use tauri::{AppHandle, State};

use crate::core::{app_log, main_window, WindowController};
use crate::models::WindowState;

/// Quit request from the embedded page. Exits regardless of platform or
/// how many windows are open.
#[tauri::command]
pub async fn quit_app(app_handle: AppHandle) -> Result<(), String> {
    app_log::info("app", "quit_requested", None);
    main_window::capture_all(&app_handle);
    app_handle.exit(0);
    Ok(())
}

#[tauri::command]
pub async fn get_window_state(
    controller: State<'_, WindowController>,
) -> Result<WindowState, String> {
    Ok(controller.load_state())
}
