//! Feature-permission policy for the hosted page.
//!
//! Requests are granted only to the target site served over HTTPS. Anything
//! else, including unknown feature names, is denied without a prompt.

use tauri::Url;

use crate::config::TARGET_HOST;

/// Browser features a page may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Notifications,
    Geolocation,
    MediaAudioCapture,
    MediaVideoCapture,
    MediaAudioVideoCapture,
    DesktopVideoCapture,
    DesktopAudioVideoCapture,
}

impl Feature {
    /// Parse the name sent by the page. Accepts kebab or snake case,
    /// case-insensitive, plus the Permissions API names.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        let feature = match normalized.as_str() {
            "notifications" | "notification" => Feature::Notifications,
            "geolocation" => Feature::Geolocation,
            "media-audio-capture" | "microphone" => Feature::MediaAudioCapture,
            "media-video-capture" | "camera" => Feature::MediaVideoCapture,
            "media-audio-video-capture" => Feature::MediaAudioVideoCapture,
            "desktop-video-capture" => Feature::DesktopVideoCapture,
            "desktop-audio-video-capture" => Feature::DesktopAudioVideoCapture,
            _ => return None,
        };
        Some(feature)
    }

    /// Map a capture request to its feature. `display` selects screen
    /// capture, where audio only ever comes alongside video.
    pub fn for_media(audio: bool, video: bool, display: bool) -> Option<Self> {
        let feature = match (display, audio, video) {
            (_, false, false) => return None,
            (false, true, false) => Feature::MediaAudioCapture,
            (false, false, true) => Feature::MediaVideoCapture,
            (false, true, true) => Feature::MediaAudioVideoCapture,
            (true, false, true) => Feature::DesktopVideoCapture,
            (true, true, _) => Feature::DesktopAudioVideoCapture,
        };
        Some(feature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied,
}

impl PermissionDecision {
    pub fn is_granted(self) -> bool {
        self == PermissionDecision::Granted
    }
}

/// Secure scheme and exact host match.
pub fn is_trusted_origin(origin: &Url) -> bool {
    origin.scheme() == "https" && origin.host_str() == Some(TARGET_HOST)
}

/// Decide a permission request from `origin`.
pub fn decide(origin: &Url, feature: Option<Feature>) -> PermissionDecision {
    match feature {
        Some(_) if is_trusted_origin(origin) => PermissionDecision::Granted,
        _ => PermissionDecision::Denied,
    }
}
