//! Offline installation of restored archives.
//!
//! An installer consumes a directory of local archives and must never reach
//! out to a package index.

pub mod pip;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::RequirementSpec;

pub use pip::PipInstaller;

/// Error from an offline installer.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("no Python interpreter found (set `python.executable` or CLIPIN_PYTHON)")]
    PythonNotFound,

    #[error("could not run the installer: {0}")]
    Spawn(String),

    #[error("installer exited with code {status:?}\n{output}")]
    Failed { status: Option<i32>, output: String },

    #[error("nothing to install: the payload contained no archives")]
    NothingToInstall,
}

/// What to install and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Directory holding the restored archives.
    pub directory: PathBuf,

    /// Archive paths inside `directory`, sorted.
    pub archives: Vec<PathBuf>,

    /// Top-level requirement recorded in the payload, if any.
    pub requirement: Option<RequirementSpec>,

    /// Let the installer resolve dependencies among the local archives.
    /// When false, only the top-level archive is installed.
    pub allow_local_deps: bool,

    /// Reinstall even if the same version is already present.
    pub force_reinstall: bool,
}

/// Installs archives from a local directory without network access.
pub trait OfflineInstaller {
    /// Get the installer name for display.
    fn name(&self) -> &str;

    /// Install according to `request`.
    fn install_offline(&self, request: &InstallRequest) -> Result<(), InstallError>;
}
