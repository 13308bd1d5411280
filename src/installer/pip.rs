//! `pip install --no-index` installer.

use std::path::{Path, PathBuf};

use crate::installer::{InstallError, InstallRequest, OfflineInstaller};
use crate::util::process::{failure_output, find_python, pip_command, ProcessBuilder};

/// Installs restored wheels with `python -m pip install --no-index`.
#[derive(Debug, Clone, Default)]
pub struct PipInstaller {
    /// Interpreter to use; located on PATH when unset
    python: Option<PathBuf>,

    /// Extra arguments appended to the install command
    extra_args: Vec<String>,
}

impl PipInstaller {
    /// Create an installer.
    pub fn new(python: Option<PathBuf>, extra_args: Vec<String>) -> Self {
        PipInstaller { python, extra_args }
    }

    /// Build the install command for a request.
    ///
    /// - local deps allowed and a requirement known: install the
    ///   requirement and let pip resolve among the local wheels
    /// - local deps not allowed: install the only wheel directly, or the
    ///   requirement with `--no-deps` when there are several
    /// - no requirement known: install every wheel by path
    pub fn install_command(&self, python: &Path, request: &InstallRequest) -> ProcessBuilder {
        let mut cmd = pip_command(python)
            .args(["install", "--no-index", "--find-links"])
            .arg(&request.directory);
        if request.force_reinstall {
            cmd = cmd.arg("--force-reinstall");
        }

        cmd = match (&request.requirement, request.allow_local_deps) {
            (Some(req), true) => cmd.arg(req.as_str()),
            (_, false) if request.archives.len() == 1 => {
                cmd.arg("--no-deps").arg(&request.archives[0])
            }
            (Some(req), false) => cmd.arg("--no-deps").arg(req.as_str()),
            (None, allow_deps) => {
                if !allow_deps {
                    cmd = cmd.arg("--no-deps");
                }
                cmd.args(&request.archives)
            }
        };

        cmd.args(&self.extra_args)
    }
}

impl OfflineInstaller for PipInstaller {
    fn name(&self) -> &str {
        "pip"
    }

    fn install_offline(&self, request: &InstallRequest) -> Result<(), InstallError> {
        if request.archives.is_empty() {
            return Err(InstallError::NothingToInstall);
        }

        let python = self
            .python
            .clone()
            .or_else(find_python)
            .ok_or(InstallError::PythonNotFound)?;

        let cmd = self
            .install_command(&python, request)
            .env("PIP_NO_INDEX", "1");
        let output = cmd
            .exec()
            .map_err(|e| InstallError::Spawn(format!("{:#}", e)))?;

        if !output.status.success() {
            return Err(InstallError::Failed {
                status: output.status.code(),
                output: failure_output(&output),
            });
        }

        tracing::debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
        Ok(())
    }
}
