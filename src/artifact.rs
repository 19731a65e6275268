//! Generated page I/O: the artifact file, export, clipboard, preview.
//!
//! Each function does one thing. The run decides which of them to call.

use crate::error::{ChainError, Result};
use std::path::{Component, Path, PathBuf};

/// File name used when exporting without an explicit path.
pub const EXPORT_FILE_NAME: &str = "index.html";

/// Write `html` to `path`, truncating whatever was there.
pub fn write_artifact(path: &Path, html: &str) -> Result<()> {
    std::fs::write(path, html)?;
    log::info!(
        "[ARTIFACT] Wrote {} ({} bytes)",
        path.display(),
        html.len()
    );
    Ok(())
}

/// Reject empty paths, parent-directory hops, and embedded NULs.
pub fn is_path_safe(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    !raw.is_empty()
        && !raw.contains('\0')
        && !path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Default export location: the Desktop, else home, else the working dir.
pub fn default_export_path() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(EXPORT_FILE_NAME)
}

/// Save a copy of the page (the "download" action).
pub fn export_html(html: &str, dest: Option<&Path>) -> Result<PathBuf> {
    let path = match dest {
        Some(p) => p.to_path_buf(),
        None => default_export_path(),
    };
    if !is_path_safe(&path) {
        return Err(ChainError::UnsafePath(path.display().to_string()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, html)?;
    log::info!("[EXPORT] Wrote file: {}", path.display());
    Ok(path)
}

/// Copy the page to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ChainError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ChainError::Clipboard(e.to_string()))?;
    log::info!("[ARTIFACT] Copied {} chars to clipboard", text.len());
    Ok(())
}

/// Platform opener and the arguments that precede the target.
fn opener() -> Option<(PathBuf, Vec<&'static str>)> {
    if cfg!(target_os = "windows") {
        which::which("cmd").ok().map(|p| (p, vec!["/C", "start", ""]))
    } else if cfg!(target_os = "macos") {
        which::which("open").ok().map(|p| (p, vec![]))
    } else {
        which::which("xdg-open")
            .or_else(|_| which::which("sensible-browser"))
            .ok()
            .map(|p| (p, vec![]))
    }
}

/// Open the page in the default browser (the live preview).
pub fn open_preview(path: &Path) -> Result<()> {
    let target = std::fs::canonicalize(path)?;
    let (program, args) =
        opener().ok_or_else(|| ChainError::Preview("no browser opener found".to_string()))?;

    std::process::Command::new(&program)
        .args(&args)
        .arg(&target)
        .spawn()
        .map_err(|e| ChainError::Preview(format!("{}: {}", program.display(), e)))?;

    log::info!("[ARTIFACT] Opened preview of {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");

        write_artifact(&path, "<html>first, and rather long</html>").unwrap();
        write_artifact(&path, "<p>2</p>").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>2</p>");
    }

    #[test]
    fn write_preserves_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        write_artifact(&path, "<h1>Café 👨‍💻</h1>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<h1>Café 👨‍💻</h1>");
    }

    #[test]
    fn path_safety() {
        assert!(is_path_safe(Path::new("index.html")));
        assert!(is_path_safe(Path::new("/tmp/site/index.html")));
        assert!(!is_path_safe(Path::new("../index.html")));
        assert!(!is_path_safe(Path::new("out/../../etc/index.html")));
        assert!(!is_path_safe(Path::new("")));
    }

    #[test]
    fn export_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/site/page.html");
        let written = export_html("<p>x</p>", Some(&dest)).unwrap();
        assert_eq!(written, dest);
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "<p>x</p>");
    }

    #[test]
    fn export_rejects_traversal() {
        let err = export_html("<p>x</p>", Some(Path::new("../escape.html"))).unwrap_err();
        assert!(matches!(err, ChainError::UnsafePath(_)));
    }

    #[test]
    fn default_export_is_named_index_html() {
        assert!(default_export_path().ends_with(EXPORT_FILE_NAME));
    }
}
