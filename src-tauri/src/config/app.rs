//! User preferences.
//!
//! A flat set of keys persisted between runs:
//! - `main_window_geometry`: last window position/size
//! - `zoom_factor`: web view zoom
//! - `start_minimized`: start hidden in the tray
//! - `close_to_tray`: hide instead of quitting on window close

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const KEY_GEOMETRY: &str = "main_window_geometry";
pub const KEY_ZOOM: &str = "zoom_factor";
pub const KEY_START_MINIMIZED: &str = "start_minimized";
pub const KEY_CLOSE_TO_TRAY: &str = "close_to_tray";

/// Window placement in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub maximized: bool,
}

/// Application-wide user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Geometry saved at the last clean exit.
    pub main_window_geometry: Option<WindowGeometry>,
    /// Web view zoom factor (1.0 = 100%).
    pub zoom_factor: f64,
    /// Keep the main window hidden at startup.
    pub start_minimized: bool,
    /// Minimize to system tray instead of quitting when clicking X.
    pub close_to_tray: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            main_window_geometry: None,
            zoom_factor: 1.0,
            start_minimized: false,
            close_to_tray: true,
        }
    }
}

impl Preferences {
    /// Build preferences from a key lookup. Missing or malformed values
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Value>,
    {
        let defaults = Self::default();

        let main_window_geometry = lookup(KEY_GEOMETRY)
            .and_then(|v| serde_json::from_value::<WindowGeometry>(v).ok())
            .filter(|g| g.width > 0 && g.height > 0);

        let zoom_factor = lookup(KEY_ZOOM)
            .and_then(|v| v.as_f64())
            .filter(|z| z.is_finite() && *z > 0.0)
            .unwrap_or(defaults.zoom_factor);

        let start_minimized = lookup(KEY_START_MINIMIZED)
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.start_minimized);

        let close_to_tray = lookup(KEY_CLOSE_TO_TRAY)
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.close_to_tray);

        Self {
            main_window_geometry,
            zoom_factor,
            start_minimized,
            close_to_tray,
        }
    }

    /// Key/value pairs in their persisted form.
    pub fn entries(&self) -> Vec<(&'static str, Value)> {
        vec![
            (
                KEY_GEOMETRY,
                self.main_window_geometry
                    .and_then(|g| serde_json::to_value(g).ok())
                    .unwrap_or(Value::Null),
            ),
            (KEY_ZOOM, Value::from(self.zoom_factor)),
            (KEY_START_MINIMIZED, Value::from(self.start_minimized)),
            (KEY_CLOSE_TO_TRAY, Value::from(self.close_to_tray)),
        ]
    }
}
