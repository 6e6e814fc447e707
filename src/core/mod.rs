pub mod app_log;
pub mod launch_env;
pub mod main_window;
pub mod state_store;
pub mod window_state;

pub use launch_env::LaunchEnv;
pub use state_store::StateStore;
pub use window_state::WindowController;
