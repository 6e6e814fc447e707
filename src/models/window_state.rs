use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Display mode of the main window. Geometry is only meaningful in `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    #[default]
    Normal,
    Maximized,
    FullScreen,
}

impl WindowMode {
    /// Mode as observed on a live window. Some platforms report a fullscreen
    /// window as maximized too, so fullscreen wins here.
    pub fn from_flags(is_maximized: bool, is_full_screen: bool) -> Self {
        if is_full_screen {
            WindowMode::FullScreen
        } else if is_maximized {
            WindowMode::Maximized
        } else {
            WindowMode::Normal
        }
    }
}

/// The persisted `windowState` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowState {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub is_maximized: bool,
    pub is_full_screen: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            x: None,
            y: None,
            is_maximized: false,
            is_full_screen: false,
        }
    }
}

impl WindowState {
    pub const KEY: &'static str = "windowState";

    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Mode to restore into. Maximized takes precedence when a record carries
    /// both flags.
    pub fn mode(&self) -> WindowMode {
        if self.is_maximized {
            WindowMode::Maximized
        } else if self.is_full_screen {
            WindowMode::FullScreen
        } else {
            WindowMode::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let state = WindowState {
            width: 1024,
            height: 768,
            x: Some(10),
            y: Some(20),
            is_maximized: false,
            is_full_screen: true,
        };
        let value = serde_json::to_value(&state).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "width": 1024,
                "height": 768,
                "x": 10,
                "y": 20,
                "isMaximized": false,
                "isFullScreen": true
            })
        );
    }

    #[test]
    fn position_is_optional() {
        let state: WindowState = serde_json::from_str(
            r#"{"width":800,"height":600,"isMaximized":false,"isFullScreen":false}"#,
        )
        .expect("deserialize");
        assert_eq!(state, WindowState::default());
        assert_eq!(state.position(), None);

        let json = serde_json::to_string(&state).expect("serialize");
        assert!(!json.contains("\"x\""));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let res = serde_json::from_str::<WindowState>(r#"{"width":800,"height":600}"#);
        assert!(res.is_err());
    }

    #[test]
    fn half_known_position_is_ignored() {
        let state = WindowState {
            x: Some(5),
            ..WindowState::default()
        };
        assert_eq!(state.position(), None);
    }

    #[test]
    fn maximized_wins_over_full_screen_on_restore() {
        let state = WindowState {
            is_maximized: true,
            is_full_screen: true,
            ..WindowState::default()
        };
        assert_eq!(state.mode(), WindowMode::Maximized);
        assert_eq!(WindowMode::from_flags(true, true), WindowMode::FullScreen);
    }

    #[test]
    fn zero_sized_record_is_unusable() {
        let state = WindowState {
            width: 0,
            ..WindowState::default()
        };
        assert!(!state.is_usable());
        assert!(WindowState::default().is_usable());
    }
}
