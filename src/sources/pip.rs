//! `pip download` fetcher.

use std::path::{Path, PathBuf};

use crate::core::archive::{ArchiveFile, ArchiveSet, WHEEL_EXTENSION};
use crate::core::RequirementSpec;
use crate::sources::source::{FetchError, PackageFetcher};
use crate::util::fs::glob_files;
use crate::util::process::{failure_output, find_python, pip_command, ProcessBuilder};

/// Fetches wheels by running `python -m pip download`.
#[derive(Debug, Clone, Default)]
pub struct PipFetcher {
    /// Interpreter to use; located on PATH when unset
    python: Option<PathBuf>,

    /// Extra arguments appended to the download command
    extra_args: Vec<String>,
}

impl PipFetcher {
    /// Create a fetcher.
    pub fn new(python: Option<PathBuf>, extra_args: Vec<String>) -> Self {
        PipFetcher { python, extra_args }
    }

    /// Build the download command.
    ///
    /// Only binary distributions are accepted: a source archive would need a
    /// build step on the offline side.
    pub fn download_command(
        &self,
        python: &Path,
        spec: &RequirementSpec,
        include_deps: bool,
        dest: &Path,
    ) -> ProcessBuilder {
        let mut cmd = pip_command(python)
            .args(["download", spec.as_str(), "--only-binary=:all:", "--dest"])
            .arg(dest);
        if !include_deps {
            cmd = cmd.arg("--no-deps");
        }
        cmd.args(&self.extra_args)
    }
}

impl PackageFetcher for PipFetcher {
    fn name(&self) -> &str {
        "pip"
    }

    fn fetch(&self, spec: &RequirementSpec, include_deps: bool) -> Result<ArchiveSet, FetchError> {
        let python = self
            .python
            .clone()
            .or_else(find_python)
            .ok_or(FetchError::PythonNotFound)?;

        let dest = tempfile::Builder::new()
            .prefix("clipin-download-")
            .tempdir()?;

        let cmd = self.download_command(&python, spec, include_deps, dest.path());
        let output = cmd
            .exec()
            .map_err(|e| FetchError::Spawn(format!("{:#}", e)))?;

        if !output.status.success() {
            return Err(FetchError::Failed {
                status: output.status.code(),
                output: failure_output(&output),
            });
        }

        let wheels = glob_files(dest.path(), &[format!("*.{}", WHEEL_EXTENSION)])
            .map_err(|e| FetchError::Spawn(format!("{:#}", e)))?;
        if wheels.is_empty() {
            return Err(FetchError::NoWheels);
        }

        let mut set = ArchiveSet::new();
        for path in &wheels {
            let file = ArchiveFile::read(path)?;
            tracing::debug!("downloaded {} ({} bytes)", file.name(), file.len());
            set.push(file)?;
        }

        tracing::info!("fetched {} wheel(s) for `{}`", set.len(), spec);
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_command_without_deps() {
        let fetcher = PipFetcher::default();
        let spec = RequirementSpec::new("requests==2.32.3").unwrap();
        let cmd =
            fetcher.download_command(Path::new("python3"), &spec, false, Path::new("/tmp/dl"));

        assert_eq!(
            cmd.display_command(),
            "python3 -m pip download requests==2.32.3 --only-binary=:all: --dest /tmp/dl --no-deps"
        );
    }

    #[test]
    fn test_download_command_with_deps_and_extra_args() {
        let fetcher = PipFetcher::new(
            None,
            vec!["--platform".to_string(), "win_amd64".to_string()],
        );
        let spec = RequirementSpec::new("demo").unwrap();
        let cmd = fetcher.download_command(Path::new("py"), &spec, true, Path::new("d"));

        let args = cmd.get_args();
        assert!(!args.contains(&"--no-deps".to_string()));
        assert_eq!(&args[args.len() - 2..], ["--platform", "win_amd64"]);
    }
}
