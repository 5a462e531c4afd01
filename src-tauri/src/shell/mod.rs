//! Shell controller.
//!
//! All window, tray and web-view reactions go through [`Shell::handle`]: an
//! event comes in, the state changes, and a list of [`ShellEffect`]s comes
//! out for the Tauri glue in `app` to execute. Nothing in here touches the
//! toolkit, so every transition is testable on its own.

use std::path::PathBuf;

use tauri::Url;

use crate::config::Preferences;
use crate::downloads;
use crate::permissions::{self, Feature, PermissionDecision};

pub const ZOOM_STEP: f64 = 0.1;
pub const ZOOM_DEFAULT: f64 = 1.0;
/// Chromium's zoom range; WebKit accepts a superset.
pub const ZOOM_MIN: f64 = 0.25;
pub const ZOOM_MAX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Inputs to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// Tray "Show" entry or a second launch.
    ShowRequested,
    /// Left click on the tray icon.
    TrayActivated,
    /// The user asked the window to close.
    CloseRequested,
    /// Explicit quit from a menu or shortcut.
    QuitRequested,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Reload,
    SetStartMinimized(bool),
    SetCloseToTray(bool),
    TitleChanged(String),
    PermissionRequested {
        origin: Url,
        feature: Option<Feature>,
    },
    WebNotification {
        origin: Url,
        title: String,
        body: String,
    },
    DownloadFinished {
        path: Option<PathBuf>,
        success: bool,
    },
}

/// Outputs executed by the glue, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEffect {
    ShowWindow,
    HideWindow,
    SetZoom(f64),
    Reload,
    /// Re-render the tray icon for this page title.
    UpdateTray { title: String },
    /// Capture window geometry and write all preferences.
    PersistPreferences,
    /// Bring check menu items in line with the preferences.
    SyncMenu,
    Notify { title: String, body: String },
    Permission(PermissionDecision),
    Exit,
}

#[derive(Debug)]
pub struct Shell {
    visibility: Visibility,
    prefs: Preferences,
    title: String,
    terminated: bool,
}

impl Shell {
    pub fn new(mut prefs: Preferences) -> Self {
        prefs.zoom_factor = clamp_zoom(prefs.zoom_factor);
        let visibility = if prefs.start_minimized {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };

        Self {
            visibility,
            prefs,
            title: String::new(),
            terminated: false,
        }
    }

    /// Effects that bring a freshly built window in line with the state.
    pub fn initial_effects(&self) -> Vec<ShellEffect> {
        let mut effects = vec![ShellEffect::SetZoom(self.prefs.zoom_factor), ShellEffect::SyncMenu];
        if self.visibility == Visibility::Visible {
            effects.push(ShellEffect::ShowWindow);
        }
        effects
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.prefs
    }

    pub fn zoom(&self) -> f64 {
        self.prefs.zoom_factor
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Apply one event. Once terminated, every event is ignored.
    pub fn handle(&mut self, event: ShellEvent) -> Vec<ShellEffect> {
        if self.terminated {
            log::debug!("[SHELL] Ignoring {:?} after exit", event);
            return Vec::new();
        }

        match event {
            ShellEvent::ShowRequested => self.show(),
            ShellEvent::TrayActivated => match self.visibility {
                Visibility::Visible => self.hide(),
                Visibility::Hidden => self.show(),
            },
            ShellEvent::CloseRequested => {
                if self.prefs.close_to_tray {
                    self.hide()
                } else {
                    self.terminate()
                }
            },
            ShellEvent::QuitRequested => self.terminate(),
            ShellEvent::ZoomIn => self.set_zoom(self.prefs.zoom_factor + ZOOM_STEP),
            ShellEvent::ZoomOut => self.set_zoom(self.prefs.zoom_factor - ZOOM_STEP),
            ShellEvent::ZoomReset => self.set_zoom(ZOOM_DEFAULT),
            ShellEvent::Reload => vec![ShellEffect::Reload],
            ShellEvent::SetStartMinimized(enabled) => {
                self.prefs.start_minimized = enabled;
                vec![ShellEffect::PersistPreferences, ShellEffect::SyncMenu]
            },
            ShellEvent::SetCloseToTray(enabled) => {
                self.prefs.close_to_tray = enabled;
                vec![ShellEffect::PersistPreferences, ShellEffect::SyncMenu]
            },
            ShellEvent::TitleChanged(title) => {
                self.title = title.clone();
                vec![ShellEffect::UpdateTray { title }]
            },
            ShellEvent::PermissionRequested { origin, feature } => {
                let decision = permissions::decide(&origin, feature);
                log::info!("[SHELL] Permission {:?} for {} -> {:?}", feature, origin, decision);
                vec![ShellEffect::Permission(decision)]
            },
            ShellEvent::WebNotification { origin, title, body } => {
                if permissions::decide(&origin, Some(Feature::Notifications)).is_granted() {
                    vec![ShellEffect::Notify { title, body }]
                } else {
                    log::debug!("[SHELL] Dropping notification from {}", origin);
                    Vec::new()
                }
            },
            ShellEvent::DownloadFinished { path, success } => {
                let (title, body) = downloads::completion_message(path.as_deref(), success);
                vec![ShellEffect::Notify { title, body }]
            },
        }
    }

    fn show(&mut self) -> Vec<ShellEffect> {
        self.visibility = Visibility::Visible;
        vec![ShellEffect::ShowWindow]
    }

    fn hide(&mut self) -> Vec<ShellEffect> {
        self.visibility = Visibility::Hidden;
        vec![ShellEffect::HideWindow]
    }

    fn terminate(&mut self) -> Vec<ShellEffect> {
        self.terminated = true;
        vec![ShellEffect::PersistPreferences, ShellEffect::Exit]
    }

    fn set_zoom(&mut self, zoom: f64) -> Vec<ShellEffect> {
        self.prefs.zoom_factor = clamp_zoom(zoom);
        vec![ShellEffect::SetZoom(self.prefs.zoom_factor)]
    }
}

/// Clamp to the engine range and drop float drift from repeated steps.
fn clamp_zoom(zoom: f64) -> f64 {
    if !zoom.is_finite() {
        return ZOOM_DEFAULT;
    }
    (zoom.clamp(ZOOM_MIN, ZOOM_MAX) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(Preferences::default())
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_initial_visibility_follows_start_minimized() {
        assert_eq!(shell().visibility(), Visibility::Visible);
        assert!(shell().initial_effects().contains(&ShellEffect::ShowWindow));

        let hidden = Shell::new(Preferences {
            start_minimized: true,
            ..Preferences::default()
        });
        assert_eq!(hidden.visibility(), Visibility::Hidden);
        assert!(!hidden.initial_effects().contains(&ShellEffect::ShowWindow));
    }

    #[test]
    fn test_close_to_tray_hides() {
        let mut shell = shell();
        shell.handle(ShellEvent::SetCloseToTray(true));

        let effects = shell.handle(ShellEvent::CloseRequested);
        assert_eq!(effects, vec![ShellEffect::HideWindow]);
        assert_eq!(shell.visibility(), Visibility::Hidden);
        assert!(!shell.is_terminated());
    }

    #[test]
    fn test_close_without_tray_persists_then_exits() {
        let mut shell = shell();
        let toggled = shell.handle(ShellEvent::SetCloseToTray(false));
        assert!(toggled.contains(&ShellEffect::PersistPreferences));

        let effects = shell.handle(ShellEvent::CloseRequested);
        assert_eq!(effects, vec![ShellEffect::PersistPreferences, ShellEffect::Exit]);
        assert!(shell.is_terminated());
    }

    #[test]
    fn test_quit_always_exits() {
        let mut shell = shell();
        assert!(shell.preferences().close_to_tray);
        let effects = shell.handle(ShellEvent::QuitRequested);
        assert_eq!(effects.last(), Some(&ShellEffect::Exit));
    }

    #[test]
    fn test_events_after_exit_are_ignored() {
        let mut shell = shell();
        shell.handle(ShellEvent::QuitRequested);
        assert!(shell.handle(ShellEvent::ShowRequested).is_empty());
        assert!(shell.handle(ShellEvent::QuitRequested).is_empty());
    }

    #[test]
    fn test_tray_click_toggles() {
        let mut shell = shell();
        assert_eq!(shell.handle(ShellEvent::TrayActivated), vec![ShellEffect::HideWindow]);
        assert_eq!(shell.handle(ShellEvent::TrayActivated), vec![ShellEffect::ShowWindow]);
        assert_eq!(shell.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_show_request_always_raises() {
        let mut shell = shell();
        assert_eq!(shell.handle(ShellEvent::ShowRequested), vec![ShellEffect::ShowWindow]);
        assert_eq!(shell.handle(ShellEvent::ShowRequested), vec![ShellEffect::ShowWindow]);
    }

    #[test]
    fn test_zoom_steps_and_reset() {
        let mut shell = shell();
        shell.handle(ShellEvent::ZoomIn);
        shell.handle(ShellEvent::ZoomIn);
        assert_eq!(shell.zoom(), 1.2);

        for _ in 0..5 {
            shell.handle(ShellEvent::ZoomOut);
        }
        assert_eq!(shell.zoom(), 0.7);

        assert_eq!(shell.handle(ShellEvent::ZoomReset), vec![ShellEffect::SetZoom(1.0)]);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut shell = shell();
        for _ in 0..100 {
            shell.handle(ShellEvent::ZoomOut);
        }
        assert_eq!(shell.zoom(), ZOOM_MIN);

        let restored = Shell::new(Preferences {
            zoom_factor: 42.0,
            ..Preferences::default()
        });
        assert_eq!(restored.zoom(), ZOOM_MAX);
    }

    #[test]
    fn test_title_change_updates_tray() {
        let mut shell = shell();
        let effects = shell.handle(ShellEvent::TitleChanged("(2) WhatsApp".to_string()));
        assert_eq!(
            effects,
            vec![ShellEffect::UpdateTray {
                title: "(2) WhatsApp".to_string()
            }]
        );
        assert_eq!(shell.title(), "(2) WhatsApp");
    }

    #[test]
    fn test_permission_requests() {
        let mut shell = shell();
        let granted = shell.handle(ShellEvent::PermissionRequested {
            origin: url("https://web.whatsapp.com"),
            feature: Some(Feature::Notifications),
        });
        assert_eq!(granted, vec![ShellEffect::Permission(PermissionDecision::Granted)]);

        let denied = shell.handle(ShellEvent::PermissionRequested {
            origin: url("https://evil.example.com"),
            feature: Some(Feature::Notifications),
        });
        assert_eq!(denied, vec![ShellEffect::Permission(PermissionDecision::Denied)]);
    }

    #[test]
    fn test_web_notification_requires_trusted_origin() {
        let mut shell = shell();
        let shown = shell.handle(ShellEvent::WebNotification {
            origin: url("https://web.whatsapp.com/"),
            title: "Alice".to_string(),
            body: "hi".to_string(),
        });
        assert_eq!(
            shown,
            vec![ShellEffect::Notify {
                title: "Alice".to_string(),
                body: "hi".to_string()
            }]
        );

        let dropped = shell.handle(ShellEvent::WebNotification {
            origin: url("http://web.whatsapp.com/"),
            title: "Mallory".to_string(),
            body: "hi".to_string(),
        });
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_download_finished_notifies() {
        let mut shell = shell();
        let effects = shell.handle(ShellEvent::DownloadFinished {
            path: Some(PathBuf::from("/home/u/Downloads/WhatsApp/a.pdf")),
            success: true,
        });
        match effects.as_slice() {
            [ShellEffect::Notify { title, body }] => {
                assert_eq!(title, "Download completed");
                assert!(body.contains("a.pdf"));
            },
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_start_minimized_toggle_persists() {
        let mut shell = shell();
        let effects = shell.handle(ShellEvent::SetStartMinimized(true));
        assert_eq!(effects, vec![ShellEffect::PersistPreferences, ShellEffect::SyncMenu]);
        assert!(shell.preferences().start_minimized);
        // Does not change the current window state
        assert_eq!(shell.visibility(), Visibility::Visible);
    }
}
