//! Window event handlers.

use tauri::{Manager, Window, WindowEvent};

use super::dispatch;
use crate::config::MAIN_WINDOW;
use crate::shell::ShellEvent;

/// Handle window events for the application.
///
/// This is called from the Tauri builder's `on_window_event` hook. Closing
/// the main window is always intercepted; the controller decides between
/// hiding to the tray and a full exit.
pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    if let WindowEvent::CloseRequested { api, .. } = event {
        if window.label() == MAIN_WINDOW {
            api.prevent_close();
            dispatch(window.app_handle(), ShellEvent::CloseRequested);
        }
    }
}
