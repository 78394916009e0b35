//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::Path;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
}

/// Remove a file if it exists. Returns whether a file was removed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Move `src` to `dst`, replacing whatever is at `dst`.
///
/// The destination is deleted explicitly first since `rename` refuses to
/// overwrite on some platforms.
pub fn replace_file(src: &Path, dst: &Path) -> io::Result<()> {
    if remove_file_if_exists(dst)? {
        tracing::debug!("removed stale {}", dst.display());
    }
    fs::rename(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.txt");

        write_string(&path, "content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_remove_file_if_exists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file");

        assert!(!remove_file_if_exists(&path).unwrap());
        fs::write(&path, "x").unwrap();
        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_replace_file_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("new");
        let dst = tmp.path().join("old");
        fs::write(&src, "fresh").unwrap();
        fs::write(&dst, "stale").unwrap();

        replace_file(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "fresh");
    }

    #[test]
    fn test_replace_file_missing_source() {
        let tmp = TempDir::new().unwrap();
        let err = replace_file(&tmp.path().join("missing"), &tmp.path().join("dst")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
