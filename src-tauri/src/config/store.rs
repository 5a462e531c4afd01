//! Preference persistence backed by `tauri-plugin-store`.

use std::path::Path;

use tauri::{AppHandle, Runtime};
use tauri_plugin_store::StoreExt;

use super::app::Preferences;
use crate::error::ShellResult;

/// Store file inside the app data directory.
pub const STORE_FILE: &str = "settings.json";

/// Load preferences, falling back to defaults when the store is unusable.
pub fn load<R: Runtime>(app: &AppHandle<R>) -> Preferences {
    load_from(app, STORE_FILE)
}

/// Write every preference key and flush the store to disk.
pub fn save<R: Runtime>(app: &AppHandle<R>, prefs: &Preferences) -> ShellResult<()> {
    save_to(app, STORE_FILE, prefs)
}

/// Load from a store file. Relative paths resolve against the app data dir.
pub fn load_from<R: Runtime>(app: &AppHandle<R>, path: impl AsRef<Path>) -> Preferences {
    let path = path.as_ref();
    match app.store(path) {
        Ok(store) => Preferences::from_lookup(|key| store.get(key)),
        Err(e) => {
            log::warn!("[CONFIG] Failed to open {}: {}, using defaults", path.display(), e);
            Preferences::default()
        },
    }
}

pub fn save_to<R: Runtime>(
    app: &AppHandle<R>,
    path: impl AsRef<Path>,
    prefs: &Preferences,
) -> ShellResult<()> {
    let store = app.store(path.as_ref())?;
    for (key, value) in prefs.entries() {
        store.set(key, value);
    }
    store.save()?;
    log::debug!("[CONFIG] Saved preferences: {:?}", prefs);
    Ok(())
}
