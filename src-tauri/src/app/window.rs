//! Main webview window.
//!
//! The window opens on the bundled placeholder page; the connectivity probe
//! navigates it to WhatsApp Web. Title changes feed the tray badge, downloads
//! are redirected into the WhatsApp downloads folder, and links leaving the
//! site open in the system browser.

use tauri::{
    menu::Menu,
    webview::DownloadEvent,
    AppHandle, Manager, PhysicalPosition, PhysicalSize, Url, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, Wry,
};
use tauri_plugin_opener::OpenerExt;

use super::{dispatch, to_tauri_image, IconState};
use crate::config::{Preferences, WindowGeometry, MAIN_WINDOW, TARGET_HOST};
use crate::downloads;
use crate::error::ShellResult;
use crate::shell::ShellEvent;

const WINDOW_TITLE: &str = "WhatsApp";
const DEFAULT_WIDTH: f64 = 1000.0;
const DEFAULT_HEIGHT: f64 = 720.0;
const MIN_SIZE: f64 = 400.0;

/// WhatsApp Web refuses browsers it does not recognize.
#[cfg(target_os = "windows")]
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
#[cfg(target_os = "macos")]
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Routes page notifications, permission requests and popups to the shell.
const WEB_SHIM: &str = include_str!("../../scripts/web_shim.js");

/// Hosts WhatsApp Web loads media and login pages from.
const RELATED_DOMAINS: &[&str] = &["whatsapp.com", "whatsapp.net"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPolicy {
    /// Load inside the shell.
    Allow,
    /// Cancel and hand to the system browser.
    OpenExternally,
    /// Cancel silently.
    Block,
}

/// Decide what to do with a navigation inside the main view.
pub fn navigation_policy(url: &Url) -> NavigationPolicy {
    match url.scheme() {
        "tauri" | "asset" | "about" | "data" | "blob" => NavigationPolicy::Allow,
        "http" | "https" => {
            let host = url.host_str().unwrap_or_default();
            let is_local = host == "localhost" || host == "tauri.localhost";
            let is_related = host == TARGET_HOST
                || RELATED_DOMAINS
                    .iter()
                    .any(|d| host == *d || host.ends_with(&format!(".{}", d)));

            if is_local || (is_related && url.scheme() == "https") {
                NavigationPolicy::Allow
            } else {
                NavigationPolicy::OpenExternally
            }
        },
        "mailto" | "tel" => NavigationPolicy::OpenExternally,
        _ => NavigationPolicy::Block,
    }
}

/// Open `url` in the default browser.
pub fn open_externally(app: &AppHandle, url: &Url) {
    log::info!("[WINDOW] Opening {} externally", url);
    if let Err(e) = app.opener().open_url(url.as_str(), None::<&str>) {
        log::warn!("[WINDOW] Failed to open {}: {}", url, e);
    }
}

/// Build the (hidden) main window. Visibility and zoom are applied by the
/// controller's initial effects.
pub fn build_main_window(
    app: &AppHandle,
    prefs: &Preferences,
    menu: Menu<Wry>,
) -> ShellResult<WebviewWindow> {
    let on_title = app.clone();
    let on_navigation = app.clone();
    let on_download = app.clone();

    let window = WebviewWindowBuilder::new(app, MAIN_WINDOW, WebviewUrl::App("index.html".into()))
        .title(WINDOW_TITLE)
        .inner_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
        .min_inner_size(MIN_SIZE, MIN_SIZE)
        .visible(false)
        .menu(menu)
        .user_agent(USER_AGENT)
        .initialization_script(WEB_SHIM)
        .on_document_title_changed(move |_window, title| {
            dispatch(&on_title, ShellEvent::TitleChanged(title));
        })
        .on_navigation(move |url| match navigation_policy(url) {
            NavigationPolicy::Allow => true,
            NavigationPolicy::OpenExternally => {
                open_externally(&on_navigation, url);
                false
            },
            NavigationPolicy::Block => {
                log::debug!("[WINDOW] Blocked navigation to {}", url);
                false
            },
        })
        .on_download(move |_webview, event| handle_download(&on_download, event))
        .build()?;

    let icon = to_tauri_image(app.state::<IconState>().base.clone());
    if let Err(e) = window.set_icon(icon) {
        log::warn!("[WINDOW] Failed to set window icon: {}", e);
    }

    if let Some(geometry) = prefs.main_window_geometry {
        restore_geometry(&window, geometry);
    }

    Ok(window)
}

fn handle_download(app: &AppHandle, event: DownloadEvent<'_>) -> bool {
    match event {
        DownloadEvent::Requested { url, destination } => {
            let root = match app.path().download_dir() {
                Ok(root) => root,
                Err(e) => {
                    log::warn!("[DOWNLOAD] No downloads directory ({}), using engine default", e);
                    return true;
                },
            };

            match downloads::destination(&root, &url, Some(destination.as_path())) {
                Ok(path) => {
                    log::info!("[DOWNLOAD] {} -> {}", url, path.display());
                    *destination = path;
                },
                Err(e) => log::warn!("[DOWNLOAD] {}, using engine default", e),
            }
            true
        },
        DownloadEvent::Finished { url, path, success } => {
            log::info!("[DOWNLOAD] {} finished (success: {})", url, success);
            dispatch(app, ShellEvent::DownloadFinished { path, success });
            true
        },
        _ => true,
    }
}

fn restore_geometry(window: &WebviewWindow, geometry: WindowGeometry) {
    let restored = window
        .set_size(PhysicalSize::new(geometry.width, geometry.height))
        .and_then(|_| window.set_position(PhysicalPosition::new(geometry.x, geometry.y)))
        .and_then(|_| {
            if geometry.maximized {
                window.maximize()
            } else {
                Ok(())
            }
        });

    if let Err(e) = restored {
        log::warn!("[WINDOW] Failed to restore geometry: {}", e);
    }
}

/// Current geometry, or `None` while minimized (positions are meaningless then).
pub fn capture_geometry(window: &WebviewWindow) -> Option<WindowGeometry> {
    if window.is_minimized().unwrap_or(false) {
        return None;
    }

    let position = window.outer_position().ok()?;
    let size = window.inner_size().ok()?;
    Some(WindowGeometry {
        x: position.x,
        y: position.y,
        width: size.width,
        height: size.height,
        maximized: window.is_maximized().unwrap_or(false),
    })
}
