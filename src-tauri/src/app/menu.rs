//! Window and tray menus.
//!
//! Both menus share item ids, so one handler serves them. The two check
//! items exist once per menu and are kept in sync from the preferences.

use tauri::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem, Submenu},
    AppHandle, Manager, Wry,
};

use super::{dispatch, SharedShell};
use crate::config::Preferences;
use crate::error::ShellResult;
use crate::shell::ShellEvent;

pub const QUIT: &str = "quit";
pub const SHOW: &str = "show";
pub const RELOAD: &str = "reload";
pub const ZOOM_IN: &str = "zoom_in";
pub const ZOOM_OUT: &str = "zoom_out";
pub const ZOOM_RESET: &str = "zoom_reset";
pub const START_MINIMIZED: &str = "start_minimized";
pub const CLOSE_TO_TRAY: &str = "close_to_tray";

/// Check items that mirror preferences, one per menu.
#[derive(Default)]
pub struct MenuState {
    start_minimized: parking_lot::Mutex<Vec<CheckMenuItem<Wry>>>,
    close_to_tray: parking_lot::Mutex<Vec<CheckMenuItem<Wry>>>,
}

impl MenuState {
    fn register(&self, start_minimized: CheckMenuItem<Wry>, close_to_tray: CheckMenuItem<Wry>) {
        self.start_minimized.lock().push(start_minimized);
        self.close_to_tray.lock().push(close_to_tray);
    }
}

fn preference_items(
    app: &AppHandle,
    prefs: &Preferences,
) -> ShellResult<(CheckMenuItem<Wry>, CheckMenuItem<Wry>)> {
    let start_minimized = CheckMenuItem::with_id(
        app,
        START_MINIMIZED,
        "Start minimized",
        true,
        prefs.start_minimized,
        None::<&str>,
    )?;
    let close_to_tray = CheckMenuItem::with_id(
        app,
        CLOSE_TO_TRAY,
        "Close to tray",
        true,
        prefs.close_to_tray,
        None::<&str>,
    )?;
    Ok((start_minimized, close_to_tray))
}

fn current_preferences(app: &AppHandle) -> Preferences {
    app.try_state::<SharedShell>()
        .map(|shell| shell.lock().preferences().clone())
        .unwrap_or_default()
}

/// Build the main window menu bar with the keyboard shortcuts.
///
/// Returns the menu and a fresh [`MenuState`] holding its check items.
pub fn build_window_menu(app: &AppHandle) -> ShellResult<(Menu<Wry>, MenuState)> {
    let prefs = current_preferences(app);
    let state = MenuState::default();

    let quit = MenuItem::with_id(app, QUIT, "Quit", true, Some("CmdOrCtrl+Q"))?;
    let reload = MenuItem::with_id(app, RELOAD, "Reload", true, Some("F5"))?;
    let zoom_in = MenuItem::with_id(app, ZOOM_IN, "Zoom in", true, Some("CmdOrCtrl+="))?;
    let zoom_out = MenuItem::with_id(app, ZOOM_OUT, "Zoom out", true, Some("CmdOrCtrl+-"))?;
    let zoom_reset =
        MenuItem::with_id(app, ZOOM_RESET, "Original size", true, Some("CmdOrCtrl+0"))?;
    let (start_minimized, close_to_tray) = preference_items(app, &prefs)?;

    let file = Submenu::with_items(app, "File", true, &[&quit])?;
    let view = Submenu::with_items(
        app,
        "View",
        true,
        &[
            &reload,
            &PredefinedMenuItem::separator(app)?,
            &zoom_in,
            &zoom_out,
            &zoom_reset,
        ],
    )?;
    let settings = Submenu::with_items(app, "Settings", true, &[&start_minimized, &close_to_tray])?;

    let menu = Menu::with_items(app, &[&file, &view, &settings])?;
    state.register(start_minimized, close_to_tray);
    Ok((menu, state))
}

/// Build the tray context menu and register its check items.
pub fn build_tray_menu(app: &AppHandle) -> ShellResult<Menu<Wry>> {
    let prefs = current_preferences(app);

    let show = MenuItem::with_id(app, SHOW, "Show WhatsApp", true, None::<&str>)?;
    let quit = MenuItem::with_id(app, QUIT, "Quit", true, None::<&str>)?;
    let (start_minimized, close_to_tray) = preference_items(app, &prefs)?;
    let separator = PredefinedMenuItem::separator(app)?;

    let menu = Menu::with_items(
        app,
        &[&show, &separator, &start_minimized, &close_to_tray, &separator, &quit],
    )?;

    if let Some(state) = app.try_state::<MenuState>() {
        state.register(start_minimized, close_to_tray);
    }
    Ok(menu)
}

/// Map a menu id to a controller event. Check items toggle the stored value
/// rather than trusting the item's own state.
pub fn event_for(id: &str, prefs: &Preferences) -> Option<ShellEvent> {
    let event = match id {
        QUIT => ShellEvent::QuitRequested,
        SHOW => ShellEvent::ShowRequested,
        RELOAD => ShellEvent::Reload,
        ZOOM_IN => ShellEvent::ZoomIn,
        ZOOM_OUT => ShellEvent::ZoomOut,
        ZOOM_RESET => ShellEvent::ZoomReset,
        START_MINIMIZED => ShellEvent::SetStartMinimized(!prefs.start_minimized),
        CLOSE_TO_TRAY => ShellEvent::SetCloseToTray(!prefs.close_to_tray),
        _ => return None,
    };
    Some(event)
}

/// Global menu handler, registered on the Tauri builder.
pub fn handle_menu_event(app: &AppHandle, event: MenuEvent) {
    let prefs = current_preferences(app);
    match event_for(event.id.as_ref(), &prefs) {
        Some(shell_event) => {
            dispatch(app, shell_event);
        },
        None => log::debug!("[MENU] Unhandled menu id {:?}", event.id),
    }
}

/// Set every check item from the current preferences.
pub fn sync(app: &AppHandle) -> ShellResult<()> {
    let prefs = current_preferences(app);
    let Some(state) = app.try_state::<MenuState>() else {
        return Ok(());
    };

    for item in state.start_minimized.lock().iter() {
        item.set_checked(prefs.start_minimized)?;
    }
    for item in state.close_to_tray.lock().iter() {
        item.set_checked(prefs.close_to_tray)?;
    }
    Ok(())
}
