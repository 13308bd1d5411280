//! File-backed clipboard.

use std::path::{Path, PathBuf};

use super::Clipboard;
use crate::core::errors::{ClipError, ClipResult};
use crate::util::fs::write_atomic;

/// A plain text file used in place of the system clipboard.
///
/// Useful where no clipboard exists (SSH sessions, containers) and the
/// file itself is moved by other means, and for testing.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
    limit: Option<usize>,
}

impl FileClipboard {
    /// Use `path` as the clipboard.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileClipboard {
            path: path.into(),
            limit: None,
        }
    }

    /// Cap the text this clipboard accepts.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clipboard for FileClipboard {
    fn name(&self) -> &str {
        "file"
    }

    fn read(&self) -> ClipResult<String> {
        // A missing file is an empty clipboard
        if !self.path.exists() {
            return Ok(String::new());
        }
        let bytes = std::fs::read(&self.path).map_err(|e| ClipError::Clipboard {
            action: "read",
            message: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&self, text: &str) -> ClipResult<()> {
        write_atomic(&self.path, text).map_err(|e| ClipError::Clipboard {
            action: "write",
            message: format!("{:#}", e),
        })
    }

    fn max_text_len(&self) -> Option<usize> {
        self.limit
    }
}
