//! System tray setup and unread badge updates.

use tauri::{
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    App, AppHandle, Manager,
};

use super::{dispatch, menu, to_tauri_image, IconState};
use crate::error::{OptionExt, ShellResult};
use crate::rendering::{unread_count, TrayStatus};
use crate::shell::ShellEvent;

pub const TRAY_ID: &str = "main";

const APP_NAME: &str = "WhatsApp";

/// Tooltip for the current page title.
pub fn tooltip_for(title: &str) -> String {
    match (TrayStatus::for_title(title), unread_count(title)) {
        (TrayStatus::Active, Some(1)) => format!("{} - 1 unread chat", APP_NAME),
        (TrayStatus::Active, Some(n)) => format!("{} - {} unread chats", APP_NAME, n),
        (TrayStatus::Active, None) => format!("{} - new activity", APP_NAME),
        (TrayStatus::Passive, _) => APP_NAME.to_string(),
    }
}

/// Create the tray icon with its menu.
///
/// This is called from the app setup hook.
pub fn init(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let handle = app.handle();
    let tray_menu = menu::build_tray_menu(handle)?;
    let icon = to_tauri_image(app.state::<IconState>().base.clone());

    TrayIconBuilder::with_id(TRAY_ID)
        .icon(icon)
        .tooltip(APP_NAME)
        .menu(&tray_menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                dispatch(tray.app_handle(), ShellEvent::TrayActivated);
            }
        })
        .build(app)?;

    Ok(())
}

/// Replace the tray icon with one rendered for `title`.
pub fn update_icon(app: &AppHandle, title: &str) -> ShellResult<()> {
    let icons = app.state::<IconState>();
    let rendered = icons.renderer.render(title, &icons.base);

    let tray = app.tray_by_id(TRAY_ID).context("Tray icon not found")?;
    tray.set_icon(Some(to_tauri_image(rendered)))?;
    tray.set_tooltip(Some(tooltip_for(title)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_for_titles() {
        assert_eq!(tooltip_for("WhatsApp"), "WhatsApp");
        assert_eq!(tooltip_for("(1) WhatsApp"), "WhatsApp - 1 unread chat");
        assert_eq!(tooltip_for("(5) WhatsApp"), "WhatsApp - 5 unread chats");
        assert_eq!(tooltip_for("WhatsApp (!)"), "WhatsApp - new activity");
    }
}
