//! Workspace - scratch directory for restored archives.
//!
//! A Workspace is created (or reused) once per restore, populated with the
//! decoded archives, handed to the installer, and removed only after a
//! successful install that asked for cleanup.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::archive::{validate_name, ArchiveFile, WHEEL_EXTENSION};
use crate::core::errors::{ClipError, ClipResult};
use crate::util::fs::glob_files;

/// Prefix for workspaces created under the system temp directory.
pub const TEMP_PREFIX: &str = "clipin-";

/// A directory holding staged archives.
#[derive(Debug)]
pub struct Workspace {
    /// Workspace directory
    path: PathBuf,

    /// Whether the directory lives under the system temp location
    temporary: bool,
}

impl Workspace {
    /// Create or reuse a workspace.
    ///
    /// With a hint, the directory is created if missing and reused if it
    /// already exists. Without one, a fresh directory is made under the
    /// system temp location and kept until [`Workspace::destroy`].
    pub fn create(path_hint: Option<&Path>) -> ClipResult<Workspace> {
        let Some(path) = path_hint else {
            let dir = tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .tempdir()
                .map_err(|e| ClipError::WorkspaceUnavailable {
                    path: std::env::temp_dir(),
                    reason: e.to_string(),
                })?;
            let path = dir.keep();
            tracing::debug!("created temporary workspace {}", path.display());
            return Ok(Workspace {
                path,
                temporary: true,
            });
        };

        let unavailable = |reason: String| ClipError::WorkspaceUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if path.exists() && !path.is_dir() {
            return Err(unavailable("path exists and is not a directory".to_string()));
        }

        fs::create_dir_all(path).map_err(|e| unavailable(e.to_string()))?;

        // Probe writability; the probe file is removed on drop.
        tempfile::Builder::new()
            .prefix(".clipin-probe")
            .tempfile_in(path)
            .map_err(|e| unavailable(format!("directory is not writable: {}", e)))?;

        tracing::debug!("using workspace {}", path.display());
        Ok(Workspace {
            path: path.to_path_buf(),
            temporary: false,
        })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the workspace was created under the system temp location.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Write one archive into the workspace.
    ///
    /// Contents go to a temporary file in the same directory which is then
    /// renamed into place, so a failed write never leaves a file under the
    /// archive's real name.
    pub fn write_file(&self, file: &ArchiveFile) -> ClipResult<PathBuf> {
        let dest = self.path.join(file.name());

        validate_name(file.name()).map_err(|e| ClipError::WriteFailed {
            path: dest.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
        })?;

        let write_failed = |source: io::Error| ClipError::WriteFailed {
            path: dest.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".clipin-")
            .suffix(".part")
            .tempfile_in(&self.path)
            .map_err(write_failed)?;

        tmp.write_all(file.bytes()).map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(&dest).map_err(|e| write_failed(e.error))?;

        tracing::debug!("wrote {} ({} bytes)", dest.display(), file.len());
        Ok(dest)
    }

    /// Remove wheels left over from a previous restore.
    ///
    /// Returns the number of files removed.
    pub fn clear_archives(&self) -> ClipResult<usize> {
        let stale = self.archives()?;
        for path in &stale {
            fs::remove_file(path).map_err(|source| ClipError::WriteFailed {
                path: path.clone(),
                source,
            })?;
            tracing::debug!("removed stale archive {}", path.display());
        }
        Ok(stale.len())
    }

    /// Wheel files currently in the workspace, sorted by path.
    pub fn archives(&self) -> ClipResult<Vec<PathBuf>> {
        glob_files(&self.path, &[format!("*.{}", WHEEL_EXTENSION)]).map_err(|e| {
            ClipError::WorkspaceUnavailable {
                path: self.path.clone(),
                reason: format!("{:#}", e),
            }
        })
    }

    /// Recursively remove the workspace directory.
    pub fn destroy(self) -> io::Result<()> {
        fs::remove_dir_all(&self.path)?;
        tracing::debug!("removed workspace {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_twice_on_same_path() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("out");

        let first = Workspace::create(Some(&dir)).unwrap();
        let second = Workspace::create(Some(&dir)).unwrap();

        assert_eq!(first.path(), second.path());
        assert!(dir.is_dir());
        assert!(!first.is_temporary());
        // The writability probe must not leave anything behind
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_create_on_regular_file_fails() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let err = Workspace::create(Some(&file)).unwrap_err();
        assert!(matches!(err, ClipError::WorkspaceUnavailable { .. }));
    }

    #[test]
    fn test_create_without_hint_uses_temp_dir() {
        let ws = Workspace::create(None).unwrap();
        let path = ws.path().to_path_buf();

        assert!(path.is_dir());
        assert!(ws.is_temporary());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(TEMP_PREFIX));

        ws.destroy().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_write_file_is_atomic_and_exact() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::create(Some(tmp.path())).unwrap();
        let content: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

        let dest = ws
            .write_file(&ArchiveFile::new("demo-1.0-py3-none-any.whl", content.clone()))
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), content);
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["demo-1.0-py3-none-any.whl"]);
    }

    #[test]
    fn test_write_file_rejects_escaping_name() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::create(Some(&tmp.path().join("ws"))).unwrap();

        let err = ws
            .write_file(&ArchiveFile::new("../escape.whl", b"x".to_vec()))
            .unwrap_err();

        assert!(matches!(err, ClipError::WriteFailed { .. }));
        assert!(!tmp.path().join("escape.whl").exists());
    }

    #[test]
    fn test_clear_archives_keeps_other_files() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::create(Some(tmp.path())).unwrap();
        fs::write(tmp.path().join("old-0.1-py3-none-any.whl"), "old").unwrap();
        fs::write(tmp.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(ws.clear_archives().unwrap(), 1);
        assert!(ws.archives().unwrap().is_empty());
        assert!(tmp.path().join("notes.txt").exists());
    }
}
