use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tauri::{AppHandle, Manager, WebviewWindow, WebviewWindowBuilder, WindowEvent};

use super::app_log;
use super::launch_env::LaunchEnv;
use super::window_state::{
    ManagedWindow, ModeTracker, WindowBounds, WindowController, WindowEventKind, WindowHost,
};
use crate::models::{WindowMode, WindowState};

pub const MAIN_WINDOW_LABEL: &str = "main";
const WINDOW_TITLE: &str = "君の番だ。";

impl ManagedWindow for WebviewWindow {
    fn bounds(&self) -> Result<WindowBounds> {
        // minimized windows report off-screen or empty geometry
        if self.is_minimized()? {
            return Err(anyhow!("window is minimized"));
        }

        let scale_factor = self.scale_factor()?;
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(anyhow!("invalid scale factor {}", scale_factor));
        }

        let position = self.outer_position()?.to_logical::<i32>(scale_factor);
        let size = self.inner_size()?.to_logical::<u32>(scale_factor);
        Ok(WindowBounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn is_maximized(&self) -> Result<bool> {
        Ok(WebviewWindow::is_maximized(self)?)
    }

    fn is_full_screen(&self) -> Result<bool> {
        Ok(self.is_fullscreen()?)
    }

    fn maximize(&self) -> Result<()> {
        Ok(WebviewWindow::maximize(self)?)
    }

    fn set_full_screen(&self, full_screen: bool) -> Result<()> {
        Ok(self.set_fullscreen(full_screen)?)
    }
}

/// Creates the main webview window and wires its events to the controller.
pub struct TauriHost<'a> {
    app: &'a AppHandle,
    env: &'a LaunchEnv,
    controller: &'a WindowController,
}

impl<'a> TauriHost<'a> {
    pub fn new(app: &'a AppHandle, env: &'a LaunchEnv, controller: &'a WindowController) -> Self {
        Self {
            app,
            env,
            controller,
        }
    }
}

impl WindowHost for TauriHost<'_> {
    type Window = WebviewWindow;

    fn window_count(&self) -> usize {
        self.app.webview_windows().len()
    }

    fn create_window(&self, state: &WindowState) -> Result<WebviewWindow> {
        let builder =
            WebviewWindowBuilder::new(self.app, MAIN_WINDOW_LABEL, self.env.content_url())
                .title(WINDOW_TITLE)
                .inner_size(state.width as f64, state.height as f64);

        let builder = match state.position() {
            Some((x, y)) => builder.position(x as f64, y as f64),
            None => builder.center(),
        };

        let window = builder.build().context("Failed to build main window")?;
        subscribe(&window, self.controller.clone());
        Ok(window)
    }
}

/// The handler lives as long as the window; Tauri drops it on destroy.
fn subscribe(window: &WebviewWindow, controller: WindowController) {
    let app = window.app_handle().clone();
    let label = window.label().to_string();
    let tracker = Arc::new(ModeTracker::new(WindowMode::Normal));

    window.on_window_event(move |event| {
        let Some(window) = app.get_webview_window(&label) else {
            return;
        };
        let kind = match event {
            WindowEvent::Resized(_) => match window.mode() {
                Ok(mode) => tracker.observe_resize(mode),
                Err(_) => WindowEventKind::Resize,
            },
            WindowEvent::Moved(_) => WindowEventKind::Move,
            WindowEvent::CloseRequested { .. } => WindowEventKind::Close,
            _ => return,
        };
        controller.on_window_event(&window, kind);
    });
}

/// Opens the main window from the managed launch env and controller.
pub fn open(app: &AppHandle) -> Result<WebviewWindow> {
    let env = app
        .try_state::<LaunchEnv>()
        .ok_or_else(|| anyhow!("launch env not initialized"))?;
    let controller = app
        .try_state::<WindowController>()
        .ok_or_else(|| anyhow!("window controller not initialized"))?;

    let host = TauriHost::new(app, env.inner(), controller.inner());
    controller.initialize(&host)
}

/// Dock activation: recreate the main window only when none is open.
pub fn reactivate(app: &AppHandle) {
    let (Some(env), Some(controller)) = (
        app.try_state::<LaunchEnv>(),
        app.try_state::<WindowController>(),
    ) else {
        return;
    };

    let host = TauriHost::new(app, env.inner(), controller.inner());
    if let Err(e) = controller.on_activate(&host) {
        app_log::error(
            "window_state",
            "reactivate_failed",
            Some(serde_json::json!({ "error": format!("{:#}", e) })),
        );
    }
}

/// Final capture for every open window before an explicit exit.
pub fn capture_all(app: &AppHandle) {
    let Some(controller) = app.try_state::<WindowController>() else {
        return;
    };
    for window in app.webview_windows().values() {
        controller.on_window_event(window, WindowEventKind::Close);
    }
}
