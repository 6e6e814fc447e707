use tauri::{Url, WebviewUrl};

use super::app_log;

pub const DEV_SERVER_ENV: &str = "VITE_DEV_SERVER_URL";
const PACKAGED_ENTRY: &str = "index.html";

/// What happens once the last window is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownPolicy {
    pub quit_on_all_closed: bool,
}

impl ShutdownPolicy {
    /// macOS apps stay alive in the menu bar without windows; everything else quits.
    pub fn for_os(os: &str) -> Self {
        Self {
            quit_on_all_closed: os != "macos",
        }
    }

    pub fn current() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// `exit_code` is `None` when the runtime exits because the last window
    /// closed; explicit exits carry a code and are never held back.
    pub fn should_prevent_exit(&self, exit_code: Option<i32>) -> bool {
        exit_code.is_none() && !self.quit_on_all_closed
    }
}

/// Startup configuration, resolved once in `setup`.
#[derive(Debug, Clone)]
pub struct LaunchEnv {
    pub dev_server_url: Option<Url>,
    pub is_dev: bool,
    pub shutdown: ShutdownPolicy,
}

fn parse_dev_server_url(raw: Option<String>) -> Option<Url> {
    let raw = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            app_log::warn(
                "launch_env",
                "invalid_dev_server_url",
                Some(serde_json::json!({ "value": raw, "error": e.to_string() })),
            );
            None
        }
    }
}

pub fn detect() -> LaunchEnv {
    LaunchEnv {
        dev_server_url: parse_dev_server_url(std::env::var(DEV_SERVER_ENV).ok()),
        is_dev: tauri::is_dev(),
        shutdown: ShutdownPolicy::current(),
    }
}

impl LaunchEnv {
    pub fn content_url(&self) -> WebviewUrl {
        match &self.dev_server_url {
            Some(url) => WebviewUrl::External(url.clone()),
            None => WebviewUrl::App(PACKAGED_ENTRY.into()),
        }
    }
}
