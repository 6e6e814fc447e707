use anyhow::{anyhow, Result};
use parking_lot::Mutex;

use super::app_log;
use super::state_store::SharedStateStore;
use crate::models::{WindowMode, WindowState};

/// Outer position and inner size of a window, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Window-manager notifications that can change the persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventKind {
    Resize,
    Move,
    Close,
    Maximize,
    Unmaximize,
    EnterFullScreen,
    LeaveFullScreen,
}

impl WindowEventKind {
    /// Maximized and fullscreen windows emit synthetic resizes and moves;
    /// those must not overwrite the restore geometry.
    pub fn requires_normal_mode(self) -> bool {
        matches!(self, WindowEventKind::Resize | WindowEventKind::Move)
    }
}

pub trait ManagedWindow {
    fn bounds(&self) -> Result<WindowBounds>;
    fn is_maximized(&self) -> Result<bool>;
    fn is_full_screen(&self) -> Result<bool>;
    fn maximize(&self) -> Result<()>;
    fn set_full_screen(&self, full_screen: bool) -> Result<()>;

    fn mode(&self) -> Result<WindowMode> {
        Ok(WindowMode::from_flags(
            self.is_maximized()?,
            self.is_full_screen()?,
        ))
    }
}

pub trait WindowHost {
    type Window: ManagedWindow;

    fn window_count(&self) -> usize;
    /// Builds and shows a window sized (and positioned, when known) from `state`.
    fn create_window(&self, state: &WindowState) -> Result<Self::Window>;
}

/// Keeps the persisted `windowState` record in step with the main window.
#[derive(Clone)]
pub struct WindowController {
    store: SharedStateStore,
}

impl WindowController {
    pub fn new(store: SharedStateStore) -> Self {
        Self { store }
    }

    pub fn load_state(&self) -> WindowState {
        let state = self
            .store
            .lock()
            .get(WindowState::KEY, WindowState::default());
        if state.is_usable() {
            state
        } else {
            app_log::warn(
                "window_state",
                "unusable_record",
                Some(serde_json::json!({ "width": state.width, "height": state.height })),
            );
            WindowState::default()
        }
    }

    pub fn initialize<H: WindowHost>(&self, host: &H) -> Result<H::Window> {
        let state = self.load_state();
        let window = host.create_window(&state)?;
        self.restore_mode(&window, &state);
        app_log::info("window_state", "window_created", None);
        Ok(window)
    }

    pub fn restore_mode<W: ManagedWindow>(&self, window: &W, state: &WindowState) {
        let res = match state.mode() {
            WindowMode::Maximized => window.maximize(),
            WindowMode::FullScreen => window.set_full_screen(true),
            WindowMode::Normal => Ok(()),
        };
        if let Err(e) = res {
            app_log::warn(
                "window_state",
                "restore_mode_failed",
                Some(serde_json::json!({ "error": e.to_string() })),
            );
        }
    }

    fn snapshot<W: ManagedWindow>(window: &W) -> Result<WindowState> {
        let bounds = window.bounds()?;
        if bounds.width == 0 || bounds.height == 0 {
            return Err(anyhow!("window reported an empty size"));
        }
        Ok(WindowState {
            width: bounds.width,
            height: bounds.height,
            x: Some(bounds.x),
            y: Some(bounds.y),
            is_maximized: window.is_maximized()?,
            is_full_screen: window.is_full_screen()?,
        })
    }

    /// Writes the live window state over the stored record. Failures are
    /// logged; the next qualifying event writes again.
    pub fn capture_state<W: ManagedWindow>(&self, window: &W) {
        let state = match Self::snapshot(window) {
            Ok(state) => state,
            Err(e) => {
                app_log::warn(
                    "window_state",
                    "snapshot_failed",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
                return;
            }
        };

        let mut store = self.store.lock();
        if let Err(e) = store.set(WindowState::KEY, &state) {
            app_log::error(
                "window_state",
                "write_failed",
                Some(serde_json::json!({
                    "path": store.path().display().to_string(),
                    "error": e.to_string(),
                })),
            );
        }
    }

    pub fn on_window_event<W: ManagedWindow>(&self, window: &W, kind: WindowEventKind) {
        if kind.requires_normal_mode() {
            // unknown mode counts as not normal
            if !matches!(window.mode(), Ok(WindowMode::Normal)) {
                return;
            }
        }
        self.capture_state(window);
    }

    /// Recreates the window when the app is activated with none open.
    pub fn on_activate<H: WindowHost>(&self, host: &H) -> Result<Option<H::Window>> {
        if host.window_count() > 0 {
            return Ok(None);
        }
        app_log::info("window_state", "reactivated_without_windows", None);
        self.initialize(host).map(Some)
    }
}

/// Turns resize notifications into mode transitions.
///
/// The runtime only reports that a window resized; maximize and fullscreen
/// changes are recognised by comparing the mode before and after.
#[derive(Debug, Default)]
pub struct ModeTracker {
    last: Mutex<WindowMode>,
}

impl ModeTracker {
    pub fn new(initial: WindowMode) -> Self {
        Self {
            last: Mutex::new(initial),
        }
    }

    pub fn observe_resize(&self, current: WindowMode) -> WindowEventKind {
        let mut last = self.last.lock();
        let previous = std::mem::replace(&mut *last, current);
        classify_resize(previous, current)
    }
}

pub fn classify_resize(previous: WindowMode, current: WindowMode) -> WindowEventKind {
    use WindowMode::*;

    match (previous, current) {
        (_, FullScreen) if previous != FullScreen => WindowEventKind::EnterFullScreen,
        (FullScreen, _) if current != FullScreen => WindowEventKind::LeaveFullScreen,
        (Normal, Maximized) => WindowEventKind::Maximize,
        (Maximized, Normal) => WindowEventKind::Unmaximize,
        _ => WindowEventKind::Resize,
    }
}
