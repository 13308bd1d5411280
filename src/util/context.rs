//! Global context for clipin operations.
//!
//! Provides centralized access to configuration, paths, and the concrete
//! collaborators (fetcher, installer, clipboard) the configuration selects.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::clipboard::{Clipboard, FileClipboard, SystemClipboard};
use crate::codec::Codec;
use crate::core::errors::ClipResult;
use crate::installer::PipInstaller;
use crate::sources::PipFetcher;
use crate::util::config::{config_path, global_config_dir, ClipboardBackendKind, Config};
use crate::util::fs::resolve_path;

/// Clipboard file used by the `file` backend when none is configured.
pub const DEFAULT_CLIPBOARD_FILE: &str = "clipboard.txt";

/// Global context for clipin operations.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Effective configuration, environment overrides applied
    config: Config,
}

impl GlobalContext {
    /// Create a GlobalContext from the user's configuration file and
    /// environment.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let mut config = match config_path() {
            Some(path) => Config::load_or_default(&path),
            None => Config::default(),
        };
        config.apply_env();

        Ok(GlobalContext { cwd, config })
    }

    /// Create a GlobalContext with an explicit configuration.
    pub fn with_config(cwd: PathBuf, config: Config) -> Self {
        GlobalContext { cwd, config }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a user-supplied directory against the working directory.
    pub fn resolve_dir(&self, dir: &Path) -> PathBuf {
        resolve_path(&self.cwd, dir)
    }

    /// Build the payload codec.
    pub fn codec(&self) -> Codec {
        Codec::from_config(&self.config.payload)
    }

    /// Build the pip fetcher.
    pub fn fetcher(&self) -> PipFetcher {
        PipFetcher::new(
            self.config.python.executable.clone(),
            self.config.python.download_args.clone(),
        )
    }

    /// Build the pip installer.
    pub fn installer(&self) -> PipInstaller {
        PipInstaller::new(
            self.config.python.executable.clone(),
            self.config.python.install_args.clone(),
        )
    }

    /// Get the clipboard file used by the `file` backend.
    pub fn clipboard_file(&self) -> PathBuf {
        match &self.config.clipboard.file {
            Some(file) => resolve_path(&self.cwd, file),
            None => global_config_dir()
                .unwrap_or_else(|| self.cwd.clone())
                .join(DEFAULT_CLIPBOARD_FILE),
        }
    }

    /// Open the configured clipboard backend.
    pub fn clipboard(&self) -> ClipResult<Box<dyn Clipboard>> {
        let limit = self.config.clipboard.max_text_len;
        match self.config.clipboard.backend {
            ClipboardBackendKind::File => {
                let path = self.clipboard_file();
                tracing::debug!("using file clipboard {}", path.display());
                Ok(Box::new(FileClipboard::new(path).with_limit(limit)))
            }
            ClipboardBackendKind::Auto => {
                let clipboard = SystemClipboard::detect()?.with_limit(limit);
                tracing::debug!("using {} clipboard", clipboard.name());
                Ok(Box::new(clipboard))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TextEncoding;

    #[test]
    fn test_file_backend_resolves_relative_path() {
        let mut config = Config::default();
        config.clipboard.backend = ClipboardBackendKind::File;
        config.clipboard.file = Some(PathBuf::from("clip.txt"));
        let ctx = GlobalContext::with_config(PathBuf::from("/work"), config);

        assert_eq!(ctx.clipboard_file(), PathBuf::from("/work/clip.txt"));
        let clipboard = ctx.clipboard().unwrap();
        assert_eq!(clipboard.name(), "file");
        assert_eq!(clipboard.max_text_len(), None);
    }

    #[test]
    fn test_clipboard_limit_reaches_backend() {
        let mut config = Config::default();
        config.clipboard.backend = ClipboardBackendKind::File;
        config.clipboard.max_text_len = Some(1_000);
        let ctx = GlobalContext::with_config(PathBuf::from("/work"), config);

        let clipboard = ctx.clipboard().unwrap();
        assert_eq!(clipboard.max_text_len(), Some(1_000));
    }

    #[test]
    fn test_codec_follows_payload_config() {
        let mut config = Config::default();
        config.payload.encoding = TextEncoding::Hex;
        config.payload.max_files = 7;
        let ctx = GlobalContext::with_config(PathBuf::from("/work"), config);

        let codec = ctx.codec();
        assert_eq!(codec.transport().encoding, TextEncoding::Hex);
        assert_eq!(codec.limits().max_files, 7);
    }

    #[test]
    fn test_resolve_dir() {
        let ctx = GlobalContext::with_config(PathBuf::from("/work"), Config::default());
        assert_eq!(ctx.resolve_dir(Path::new("out")), PathBuf::from("/work/out"));
        assert_eq!(ctx.resolve_dir(Path::new("/abs")), PathBuf::from("/abs"));
    }
}
