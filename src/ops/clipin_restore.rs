//! Implementation of `clipin install` and `clipin paste`.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::clipboard::Clipboard;
use crate::codec::Codec;
use crate::core::errors::{ClipError, ClipResult};
use crate::core::workspace::Workspace;
use crate::installer::{InstallError, InstallRequest, OfflineInstaller};
use crate::ops::clipin_copy::ArchiveSummary;

/// Options for restoring a payload from the clipboard.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Directory to restore into; a temporary directory when unset
    pub dest_dir: Option<PathBuf>,

    /// Run the offline installer after writing the archives
    pub install: bool,

    /// Let the installer resolve dependencies among the restored archives
    pub deps: bool,

    /// Remove the directory after a successful install
    pub clean_on_success: bool,

    /// Reinstall even if already installed
    pub force_reinstall: bool,
}

impl RestoreOptions {
    /// Options for `paste`: write only, never clean up.
    pub fn paste(dest_dir: Option<PathBuf>) -> Self {
        RestoreOptions {
            dest_dir,
            install: false,
            deps: false,
            clean_on_success: false,
            force_reinstall: false,
        }
    }
}

/// Result of a restore.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub directory: PathBuf,
    pub requirement: Option<String>,
    pub archives: Vec<ArchiveSummary>,
    pub total_bytes: u64,
    pub stale_removed: usize,
    pub installed: bool,
    pub cleaned: bool,
}

/// Restore the archives on the clipboard and optionally install them.
///
/// The payload is fully decoded and verified before anything touches the
/// filesystem. After a failed install the directory is kept for inspection.
pub fn restore(
    codec: &Codec,
    clipboard: &dyn Clipboard,
    installer: &dyn OfflineInstaller,
    opts: &RestoreOptions,
) -> ClipResult<RestoreReport> {
    let text = clipboard.read()?;
    let bundle = codec.decode_bundle(&text)?;
    tracing::info!(
        "decoded {} archive(s) from the {} clipboard",
        bundle.archives.len(),
        clipboard.name()
    );

    let workspace = Workspace::create(opts.dest_dir.as_deref())?;
    let stale_removed = workspace.clear_archives()?;
    if stale_removed > 0 {
        tracing::info!("removed {} stale archive(s)", stale_removed);
    }

    let mut written = Vec::with_capacity(bundle.archives.len());
    for file in &bundle.archives {
        match workspace.write_file(file) {
            Ok(path) => written.push(path),
            Err(e) => {
                discard(&written);
                return Err(e);
            }
        }
    }

    let mut report = RestoreReport {
        directory: workspace.path().to_path_buf(),
        requirement: bundle.requirement.as_ref().map(|r| r.to_string()),
        archives: bundle.archives.iter().map(ArchiveSummary::from).collect(),
        total_bytes: bundle.archives.total_bytes(),
        stale_removed,
        installed: false,
        cleaned: false,
    };

    if !opts.install {
        return Ok(report);
    }

    let install_failed = |diagnostic: String| ClipError::InstallFailed {
        directory: workspace.path().to_path_buf(),
        diagnostic,
    };

    if written.is_empty() {
        return Err(install_failed(InstallError::NothingToInstall.to_string()));
    }

    written.sort();
    let request = InstallRequest {
        directory: workspace.path().to_path_buf(),
        archives: written,
        requirement: bundle.requirement.clone(),
        allow_local_deps: opts.deps,
        force_reinstall: opts.force_reinstall,
    };

    tracing::info!(
        "installing from {} with {}",
        request.directory.display(),
        installer.name()
    );
    installer
        .install_offline(&request)
        .map_err(|e| install_failed(e.to_string()))?;
    report.installed = true;

    if opts.clean_on_success {
        let path = workspace.path().to_path_buf();
        match workspace.destroy() {
            Ok(()) => report.cleaned = true,
            Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
        }
    }

    Ok(report)
}

/// Best-effort removal of archives written before a failure.
fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("failed to remove {}: {}", path.display(), e);
        }
    }
}
