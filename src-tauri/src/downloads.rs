//! Download placement and completion messages.
//!
//! Files are saved in a `WhatsApp` folder under the platform downloads
//! directory. Existing files are never overwritten: a ` (n)` suffix is added
//! to the stem instead.

use std::fs;
use std::path::{Path, PathBuf};

use tauri::Url;

use crate::config::DOWNLOAD_SUBDIR;
use crate::error::ShellResult;

/// Used when neither the engine nor the URL provide a name.
const FALLBACK_NAME: &str = "download";

/// Upper bound on ` (n)` suffixes tried before giving up on uniqueness.
const MAX_SUFFIX: u32 = 9999;

/// Create (if needed) and return the download directory under `downloads_root`.
pub fn ensure_download_dir(downloads_root: &Path) -> ShellResult<PathBuf> {
    let dir = downloads_root.join(DOWNLOAD_SUBDIR);
    if !dir.exists() {
        log::info!("[DOWNLOAD] Creating {}", dir.display());
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Pick a file name: the engine's suggestion, else the last URL segment.
pub fn file_name_for(url: &Url, suggested: Option<&Path>) -> String {
    let suggested = suggested
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());

    let from_url = || {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|segment| {
                urlencoding::decode(segment)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| segment.to_string())
            })
    };

    suggested
        .filter(|n| !n.trim().is_empty())
        .or_else(from_url)
        .map(|n| sanitize(&n))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Strip path separators and characters most filesystems reject.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.trim().trim_matches('.').to_string()
}

/// First path in `dir` for `name` that does not exist yet.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

    for n in 1..=MAX_SUFFIX {
        let file = match &ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(file);
        if !candidate.exists() {
            return candidate;
        }
    }

    // Overwriting is the engine's behavior if every suffix is taken
    candidate
}

/// Final destination for a download in `downloads_root`.
pub fn destination(downloads_root: &Path, url: &Url, suggested: Option<&Path>) -> ShellResult<PathBuf> {
    let dir = ensure_download_dir(downloads_root)?;
    Ok(unique_path(&dir, &file_name_for(url, suggested)))
}

/// Notification title and body for a finished download.
pub fn completion_message(path: Option<&Path>, success: bool) -> (String, String) {
    let name = path
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    if success {
        (
            "Download completed".to_string(),
            format!("File {} has been successfully downloaded", name),
        )
    } else {
        (
            "Download failed".to_string(),
            format!("File {} could not be downloaded", name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_download_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = ensure_download_dir(root.path()).unwrap();
        assert_eq!(dir, root.path().join("WhatsApp"));
        assert!(dir.is_dir());

        // Second call finds the existing directory
        assert_eq!(ensure_download_dir(root.path()).unwrap(), dir);
    }

    #[test]
    fn test_download_dir_failure_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();
        let err = ensure_download_dir(&blocker).unwrap_err();
        assert!(matches!(err, ShellError::Io(_)));
    }

    #[test]
    fn test_suggested_name_wins() {
        let name = file_name_for(
            &url("https://web.whatsapp.com/blob/abc"),
            Some(Path::new("/tmp/engine/photo.jpeg")),
        );
        assert_eq!(name, "photo.jpeg");
    }

    #[test]
    fn test_name_from_url_is_decoded() {
        let name = file_name_for(&url("https://mmg.whatsapp.net/d/f/My%20Report.pdf"), None);
        assert_eq!(name, "My Report.pdf");
    }

    #[test]
    fn test_fallback_name() {
        assert_eq!(file_name_for(&url("https://web.whatsapp.com/"), None), "download");
        assert_eq!(
            file_name_for(&url("https://web.whatsapp.com/%2F..%2F"), None),
            "_.._"
        );
    }

    #[test]
    fn test_unique_path_adds_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_path(dir.path(), "voice.ogg");
        assert_eq!(first, dir.path().join("voice.ogg"));

        fs::write(&first, b"1").unwrap();
        let second = unique_path(dir.path(), "voice.ogg");
        assert_eq!(second, dir.path().join("voice (1).ogg"));

        fs::write(&second, b"2").unwrap();
        assert_eq!(
            unique_path(dir.path(), "voice.ogg"),
            dir.path().join("voice (2).ogg")
        );
    }

    #[test]
    fn test_unique_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "notes"), dir.path().join("notes (1)"));
    }

    #[test]
    fn test_destination_lands_in_subdir() {
        let root = tempfile::tempdir().unwrap();
        let dest = destination(root.path(), &url("https://example.com/a/b.png"), None).unwrap();
        assert_eq!(dest, root.path().join("WhatsApp").join("b.png"));
    }

    #[test]
    fn test_completion_message() {
        let (title, body) = completion_message(Some(Path::new("/d/WhatsApp/b.png")), true);
        assert_eq!(title, "Download completed");
        assert!(body.contains("b.png"));

        let (title, _) = completion_message(None, false);
        assert_eq!(title, "Download failed");
    }
}
