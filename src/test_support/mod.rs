//! Test utilities and mocks for clipin unit tests.
//!
//! This module provides in-memory implementations of the collaborator
//! traits, so the copy and restore stages can be tested without pip or a
//! real clipboard.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipin::test_support::{demo_closure, MemoryClipboard, MockFetcher};
//!
//! #[test]
//! fn test_example() {
//!     let fetcher = MockFetcher::new().with_closure("demo==1.0", demo_closure());
//!     let clipboard = MemoryClipboard::new();
//!
//!     // Pass both to `ops::copy`...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::clipboard::Clipboard;
use crate::core::archive::ArchiveSet;
use crate::core::errors::{ClipError, ClipResult};
use crate::core::RequirementSpec;
use crate::installer::{InstallError, InstallRequest, OfflineInstaller};
use crate::sources::{FetchError, PackageFetcher};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Fetcher that serves archive sets from memory.
///
/// Requests for a requirement with no registered set fail like pip does
/// when a package cannot be found.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    /// requirement -> (set without deps, set with deps)
    packages: HashMap<String, (ArchiveSet, ArchiveSet)>,
    calls: Arc<Mutex<Vec<(String, bool)>>>,
}

impl MockFetcher {
    /// Create a fetcher that knows no packages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package whose closure is the whole `set`; the first
    /// archive is the top-level one.
    pub fn with_closure(mut self, requirement: &str, set: ArchiveSet) -> Self {
        let top = set.iter().take(1).cloned();
        let alone = ArchiveSet::from_files(top).unwrap_or_default();
        self.packages.insert(requirement.to_string(), (alone, set));
        self
    }

    /// Every `(requirement, include_deps)` pair fetched so far.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl PackageFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, spec: &RequirementSpec, include_deps: bool) -> Result<ArchiveSet, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((spec.to_string(), include_deps));
        }

        match self.packages.get(spec.as_str()) {
            Some((alone, closure)) => Ok(if include_deps { closure } else { alone }.clone()),
            None => Err(FetchError::Failed {
                status: Some(1),
                output: format!(
                    "ERROR: No matching distribution found for {}",
                    spec.as_str()
                ),
            }),
        }
    }
}

/// One recorded installer invocation.
#[derive(Debug, Clone)]
pub struct InstallCall {
    /// The request as received.
    pub request: InstallRequest,

    /// Archive file names present in the directory at call time.
    pub present: Vec<String>,
}

/// Installer that records its calls instead of installing.
#[derive(Debug, Clone, Default)]
pub struct MockInstaller {
    fail_with: Option<String>,
    calls: Arc<Mutex<Vec<InstallCall>>>,
}

impl MockInstaller {
    /// Create an installer that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an installer that always fails with `output`.
    pub fn failing(output: impl Into<String>) -> Self {
        MockInstaller {
            fail_with: Some(output.into()),
            ..Self::default()
        }
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<InstallCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl OfflineInstaller for MockInstaller {
    fn name(&self) -> &str {
        "mock"
    }

    fn install_offline(&self, request: &InstallRequest) -> Result<(), InstallError> {
        let mut present: Vec<String> = fs::read_dir(&request.directory)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        present.sort();

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(InstallCall {
                request: request.clone(),
                present,
            });
        }

        match &self.fail_with {
            Some(output) => Err(InstallError::Failed {
                status: Some(1),
                output: output.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Clipboard held in memory, optionally with a size limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Arc<Mutex<String>>,
    limit: Option<usize>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        MemoryClipboard {
            text: Arc::new(Mutex::new(text.into())),
            limit: None,
        }
    }

    /// Refuse writes longer than `limit` characters.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Current clipboard text.
    pub fn text(&self) -> String {
        self.text.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl Clipboard for MemoryClipboard {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self) -> ClipResult<String> {
        Ok(self.text())
    }

    fn write(&self, text: &str) -> ClipResult<()> {
        if let Some(limit) = self.limit {
            if text.len() > limit {
                return Err(ClipError::Clipboard {
                    action: "write",
                    message: format!("{} bytes exceeds the {} byte limit", text.len(), limit),
                });
            }
        }
        let mut current = self.text.lock().map_err(|_| ClipError::Clipboard {
            action: "write",
            message: "clipboard lock poisoned".to_string(),
        })?;
        *current = text.to_string();
        Ok(())
    }

    fn max_text_len(&self) -> Option<usize> {
        self.limit
    }
}

/// Scratch directory removed when dropped, for tests that need a `--dir`.
pub fn scratch_dir() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::TempDir::new().expect("failed to create temp dir");
    let path = tmp.path().join("restore");
    (tmp, path)
}
