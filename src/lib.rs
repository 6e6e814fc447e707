mod commands;
mod core;
mod models;

use crate::core::{main_window, LaunchEnv, StateStore, WindowController};
use tauri::{Manager, RunEvent};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let app = tauri::Builder::default()
        .setup(|app| {
            let app_handle = app.handle().clone();

            let log_dir = app_handle.path().app_log_dir()?;
            if let Err(e) = core::app_log::init(log_dir) {
                eprintln!("Failed to initialize app log: {}", e);
            }
            core::app_log::install_panic_hook();
            core::app_log::info("app", "startup", None);

            let env = core::launch_env::detect();
            core::app_log::info(
                "launch_env",
                "detected",
                Some(serde_json::json!({
                    "dev_server_url": env.dev_server_url.as_ref().map(|u| u.to_string()),
                    "is_dev": env.is_dev,
                    "quit_on_all_closed": env.shutdown.quit_on_all_closed,
                })),
            );

            let store_path = app_handle
                .path()
                .app_data_dir()?
                .join(core::state_store::STORE_FILE_NAME);
            let controller = WindowController::new(StateStore::open(store_path).shared());

            app.manage(env);
            app.manage(controller);

            main_window::open(&app_handle)?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::app::quit_app,
            commands::app::get_window_state,
            commands::logs::append_log,
            commands::logs::read_logs,
            commands::logs::clear_logs,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| match event {
        RunEvent::ExitRequested { code, api, .. } => {
            let prevent = app_handle
                .try_state::<LaunchEnv>()
                .is_some_and(|env| env.shutdown.should_prevent_exit(code));
            if prevent {
                core::app_log::info("app", "exit_prevented_without_windows", None);
                api.prevent_exit();
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => main_window::reactivate(app_handle),
        _ => {}
    });
}
