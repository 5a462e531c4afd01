//! Application configuration management.
//!
//! - `app`: the persisted user preferences and their defaults
//! - `store`: load/save of those preferences through `tauri-plugin-store`

pub mod app;
pub mod store;

pub use app::{Preferences, WindowGeometry};

/// The single web application this shell hosts.
pub const TARGET_URL: &str = "https://web.whatsapp.com/";

/// Host every granted permission and in-app navigation must match.
pub const TARGET_HOST: &str = "web.whatsapp.com";

/// Lightweight URL requested before the first navigation.
pub const PROBE_URL: &str = "https://web.whatsapp.com/favicon.ico";

/// Label of the main webview window.
pub const MAIN_WINDOW: &str = "main";

/// Subdirectory of the platform downloads folder used for saved files.
pub const DOWNLOAD_SUBDIR: &str = "WhatsApp";
