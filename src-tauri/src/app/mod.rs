//! Application lifecycle and platform integration.
//!
//! - `window`: main webview window, navigation and download handling
//! - `menu`: window/tray menus and their events
//! - `tray`: system tray icon and unread badge
//! - `events`: window event handlers
//!
//! Every toolkit callback turns into a [`ShellEvent`] passed to [`dispatch`];
//! the resulting effects are executed here.

pub mod events;
pub mod menu;
#[cfg(desktop)]
pub mod tray;
pub mod window;

use image::RgbaImage;
use parking_lot::Mutex;
use tauri::{image::Image, App, AppHandle, Manager, Url, WebviewWindow};
use tauri_plugin_notification::NotificationExt;

use crate::config::{self, MAIN_WINDOW, PROBE_URL, TARGET_URL};
use crate::connectivity::{HttpProbe, Navigator, Prober};
use crate::error::{OptionExt, ResultExt, ShellError, ShellResult};
use crate::rendering::BadgeRenderer;
use crate::shell::{Shell, ShellEffect, ShellEvent};

/// Controller shared by every handler.
pub type SharedShell = Mutex<Shell>;

/// Application icon, decoded once, and the badge renderer.
pub struct IconState {
    pub base: RgbaImage,
    pub renderer: BadgeRenderer,
}

impl IconState {
    pub fn load() -> ShellResult<Self> {
        let base = image::load_from_memory(include_bytes!("../../icons/icon.png"))?.to_rgba8();
        Ok(Self {
            base,
            renderer: BadgeRenderer::new(),
        })
    }
}

/// Convert a rendered icon for Tauri.
pub fn to_tauri_image(icon: RgbaImage) -> Image<'static> {
    let (width, height) = icon.dimensions();
    Image::new_owned(icon.into_raw(), width, height)
}

/// Build state, tray, window and start the connectivity probe.
///
/// This is called from the app setup hook.
pub fn init(app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
    let handle = app.handle().clone();

    let prefs = config::store::load(&handle);
    log::info!("[SHELL] Starting with {:?}", prefs);

    let shell = Shell::new(prefs.clone());
    let initial = shell.initial_effects();
    app.manage::<SharedShell>(Mutex::new(shell));
    app.manage(IconState::load()?);

    let (window_menu, menu_state) = menu::build_window_menu(&handle)?;
    app.manage(menu_state);

    #[cfg(desktop)]
    tray::init(app)?;

    window::build_main_window(&handle, &prefs, window_menu)?;
    apply_effects(&handle, initial);

    start_probe(handle)?;
    Ok(())
}

fn start_probe(app: AppHandle) -> ShellResult<()> {
    let probe = HttpProbe::new(PROBE_URL)?;
    let target = Url::parse(TARGET_URL).context("Invalid target URL")?;
    let navigator = WebviewNavigator { app };

    tauri::async_runtime::spawn(async move {
        Prober::new(probe, navigator, target).run().await;
    });
    Ok(())
}

/// Navigates the main window and re-applies the saved zoom.
struct WebviewNavigator {
    app: AppHandle,
}

impl Navigator for WebviewNavigator {
    fn navigate(&self, url: &Url) -> ShellResult<()> {
        let window = main_window(&self.app)?;
        window.navigate(url.clone())?;
        if let Some(shell) = self.app.try_state::<SharedShell>() {
            let zoom = shell.lock().zoom();
            window.set_zoom(zoom)?;
        }
        Ok(())
    }
}

pub fn main_window(app: &AppHandle) -> ShellResult<WebviewWindow> {
    app.get_webview_window(MAIN_WINDOW).context("Main window not found")
}

/// Feed one event to the controller and execute the effects.
///
/// The lock is released before effects run, so effects may dispatch again.
/// Returns the effects for callers that need a result (permission requests).
pub fn dispatch(app: &AppHandle, event: ShellEvent) -> Vec<ShellEffect> {
    let Some(shell) = app.try_state::<SharedShell>() else {
        log::warn!("[SHELL] {:?} before setup finished, ignoring", event);
        return Vec::new();
    };

    let effects = shell.lock().handle(event);
    apply_effects(app, effects.clone());
    effects
}

pub fn apply_effects(app: &AppHandle, effects: Vec<ShellEffect>) {
    run_effects(effects, |effect| apply_effect(app, effect));
}

/// Run effects in order. A failing effect is logged and does not stop the
/// ones after it, so `Exit` still runs when persisting fails.
fn run_effects<F>(effects: Vec<ShellEffect>, mut apply: F)
where
    F: FnMut(ShellEffect) -> ShellResult<()>,
{
    for effect in effects {
        log::debug!("[SHELL] Applying {:?}", effect);
        if let Err(e) = apply(effect) {
            log::warn!("[SHELL] Effect failed: {}", e);
        }
    }
}

fn apply_effect(app: &AppHandle, effect: ShellEffect) -> ShellResult<()> {
    match effect {
        ShellEffect::ShowWindow => {
            let window = main_window(app)?;
            window.show()?;
            window.unminimize()?;
            window.set_focus()?;
        },
        ShellEffect::HideWindow => main_window(app)?.hide()?,
        ShellEffect::SetZoom(zoom) => main_window(app)?.set_zoom(zoom)?,
        ShellEffect::Reload => main_window(app)?.reload()?,
        #[cfg(desktop)]
        ShellEffect::UpdateTray { title } => tray::update_icon(app, &title)?,
        #[cfg(not(desktop))]
        ShellEffect::UpdateTray { .. } => {},
        ShellEffect::PersistPreferences => persist_preferences(app)?,
        ShellEffect::SyncMenu => menu::sync(app)?,
        ShellEffect::Notify { title, body } => app
            .notification()
            .builder()
            .title(&title)
            .body(&body)
            .show()
            .map_err(|e| ShellError::Notification(e.to_string()))?,
        // Read by the command that dispatched the request
        ShellEffect::Permission(_) => {},
        ShellEffect::Exit => {
            log::info!("[SHELL] Exiting");
            app.exit(0);
        },
    }
    Ok(())
}

/// Capture the window geometry into the preferences and write them out.
fn persist_preferences(app: &AppHandle) -> ShellResult<()> {
    let geometry = app
        .get_webview_window(MAIN_WINDOW)
        .and_then(|w| window::capture_geometry(&w));

    let prefs = {
        let shell = app.state::<SharedShell>();
        let mut shell = shell.lock();
        if geometry.is_some() {
            shell.preferences_mut().main_window_geometry = geometry;
        }
        shell.preferences().clone()
    };

    config::store::save(app, &prefs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;

    fn record(effects: Vec<ShellEffect>, fail_persist: bool) -> Vec<ShellEffect> {
        let mut applied = Vec::new();
        run_effects(effects, |effect| {
            let failed = fail_persist && effect == ShellEffect::PersistPreferences;
            applied.push(effect);
            if failed {
                Err(ShellError::Store("settings.json is read-only".to_string()))
            } else {
                Ok(())
            }
        });
        applied
    }

    fn terminating_shell() -> Shell {
        Shell::new(Preferences {
            close_to_tray: false,
            ..Preferences::default()
        })
    }

    #[test]
    fn test_close_persists_before_exit() {
        let mut shell = terminating_shell();
        let applied = record(shell.handle(ShellEvent::CloseRequested), false);
        assert_eq!(
            applied,
            vec![ShellEffect::PersistPreferences, ShellEffect::Exit]
        );
    }

    #[test]
    fn test_exit_runs_when_persist_fails() {
        let mut shell = terminating_shell();
        let applied = record(shell.handle(ShellEvent::QuitRequested), true);
        assert_eq!(applied.last(), Some(&ShellEffect::Exit));
        assert!(applied.contains(&ShellEffect::PersistPreferences));
    }

    #[test]
    fn test_reload_is_a_single_effect() {
        let mut shell = Shell::new(Preferences::default());
        let applied = record(shell.handle(ShellEvent::Reload), false);
        assert_eq!(applied, vec![ShellEffect::Reload]);
    }
}
