//! Fetcher trait - common interface for package sources.

use thiserror::Error;

use crate::core::archive::{ArchiveError, ArchiveSet};
use crate::core::RequirementSpec;

/// Error from a package fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no Python interpreter found (set `python.executable` or CLIPIN_PYTHON)")]
    PythonNotFound,

    #[error("could not run the downloader: {0}")]
    Spawn(String),

    #[error("downloader exited with code {status:?}\n{output}")]
    Failed { status: Option<i32>, output: String },

    #[error("no .whl files were downloaded (pip may have fallen back to a source distribution)")]
    NoWheels,

    #[error("failed to read downloaded archive: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Something that turns a requirement into archive files.
///
/// Dependency resolution belongs to the fetcher: callers only say whether
/// they want the transitive closure.
pub trait PackageFetcher {
    /// Get the fetcher name for display.
    fn name(&self) -> &str;

    /// Fetch archives for `spec`, including its dependency closure when
    /// `include_deps` is set.
    fn fetch(&self, spec: &RequirementSpec, include_deps: bool) -> Result<ArchiveSet, FetchError>;
}
