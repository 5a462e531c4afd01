//! Central error types for the WhatsApp shell.
//!
//! All errors implement `Serialize` for Tauri IPC compatibility.

use serde::Serialize;
use thiserror::Error;

/// Main error type for shell operations.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Preference store could not be opened or written
    #[error("Settings store error: {0}")]
    Store(String),

    /// Window, webview or tray operation failed
    #[error("Window error: {0}")]
    Window(#[from] tauri::Error),

    /// Reachability probe failed
    #[error("Probe failed: {0}")]
    Probe(String),

    /// Image decoding or compositing failed
    #[error("Image error: {0}")]
    Image(String),

    /// Native notification could not be shown
    #[error("Notification error: {0}")]
    Notification(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Serialize as the error message so commands can hand errors to the page.
impl Serialize for ShellError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<image::ImageError> for ShellError {
    fn from(err: image::ImageError) -> Self {
        ShellError::Image(err.to_string())
    }
}

impl From<reqwest::Error> for ShellError {
    fn from(err: reqwest::Error) -> Self {
        ShellError::Probe(err.to_string())
    }
}

impl From<tauri_plugin_store::Error> for ShellError {
    fn from(err: tauri_plugin_store::Error) -> Self {
        ShellError::Store(err.to_string())
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error, converting it to `ShellError::Other`.
    fn context(self, msg: &str) -> ShellResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> ShellResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> ShellResult<T> {
        self.map_err(|e| ShellError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> ShellResult<T> {
        self.map_err(|e| ShellError::Other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to `ShellError::Other` with the given message.
    fn context(self, msg: &str) -> ShellResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> ShellResult<T> {
        self.ok_or_else(|| ShellError::Other(msg.to_string()))
    }
}

/// Type alias for Results using ShellError.
pub type ShellResult<T> = Result<T, ShellError>;
