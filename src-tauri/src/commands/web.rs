//! Commands invoked by the script injected into the hosted page.
//!
//! The origin always comes from the calling webview's URL, never from the
//! page's arguments.

use tauri::{AppHandle, Url, Webview};

use crate::app::{dispatch, window};
use crate::error::{ResultExt, ShellError, ShellResult};
use crate::permissions::{is_trusted_origin, Feature};
use crate::shell::{ShellEffect, ShellEvent};

/// Ask for a browser feature. Resolves to whether it was granted.
#[tauri::command]
pub fn request_permission(app: AppHandle, webview: Webview, feature: String) -> ShellResult<bool> {
    let origin = webview.url()?;
    Ok(is_granted(&app, origin, Feature::parse(&feature)))
}

/// Ask for camera, microphone or screen capture before the page calls
/// `getUserMedia`/`getDisplayMedia`.
#[tauri::command]
pub fn request_media_permission(
    app: AppHandle,
    webview: Webview,
    audio: bool,
    video: bool,
    display: Option<bool>,
) -> ShellResult<bool> {
    let origin = webview.url()?;
    let feature = Feature::for_media(audio, video, display.unwrap_or(false));
    Ok(is_granted(&app, origin, feature))
}

fn is_granted(app: &AppHandle, origin: Url, feature: Option<Feature>) -> bool {
    dispatch(app, ShellEvent::PermissionRequested { origin, feature })
        .iter()
        .any(|e| matches!(e, ShellEffect::Permission(d) if d.is_granted()))
}

/// Show a page notification natively.
#[tauri::command]
pub fn show_web_notification(
    app: AppHandle,
    webview: Webview,
    title: String,
    body: Option<String>,
) -> ShellResult<()> {
    let origin = webview.url()?;
    dispatch(
        &app,
        ShellEvent::WebNotification {
            origin,
            title,
            body: body.unwrap_or_default(),
        },
    );
    Ok(())
}

/// Open a link from the page in the system browser.
#[tauri::command]
pub fn open_external(app: AppHandle, webview: Webview, url: String) -> ShellResult<()> {
    let origin = webview.url()?;
    if !is_trusted_origin(&origin) {
        return Err(ShellError::Other(format!("{} may not open links", origin)));
    }

    let url = Url::parse(&url).with_context(|| format!("Invalid link {:?}", url))?;
    match url.scheme() {
        "http" | "https" | "mailto" => {
            window::open_externally(&app, &url);
            Ok(())
        },
        scheme => Err(ShellError::Other(format!("Refusing to open {} link", scheme))),
    }
}
