//! Configuration file support for clipin.
//!
//! Configuration is read from `~/.clipin/config.toml`, or from the file named
//! by `CLIPIN_CONFIG`. A missing file means defaults; a broken file is
//! reported as a warning and also falls back to defaults.
//!
//! ```toml
//! [payload]
//! encoding = "base64"
//! compression = "gzip"
//! clipboard_limit = 268435456
//!
//! [python]
//! executable = "/usr/bin/python3"
//!
//! [install]
//! force_reinstall = true
//!
//! [clipboard]
//! backend = "file"
//! file = "/tmp/clipboard.txt"
//! max_text_len = 1048576
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::codec::{CodecLimits, Compression, TextEncoding};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "CLIPIN_CONFIG";

/// Environment variable overriding `python.executable`.
pub const PYTHON_ENV: &str = "CLIPIN_PYTHON";

/// Environment variable selecting the file clipboard backend.
pub const CLIPBOARD_FILE_ENV: &str = "CLIPIN_CLIPBOARD_FILE";

/// clipin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Payload encoding and safety limits
    pub payload: PayloadConfig,

    /// Python interpreter used for pip
    pub python: PythonConfig,

    /// Install defaults
    pub install: InstallConfig,

    /// Clipboard backend selection
    pub clipboard: ClipboardConfig,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Apply `CLIPIN_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(python) = std::env::var_os(PYTHON_ENV).filter(|v| !v.is_empty()) {
            self.python.executable = Some(PathBuf::from(python));
        }
        if let Some(file) = std::env::var_os(CLIPBOARD_FILE_ENV).filter(|v| !v.is_empty()) {
            self.clipboard.backend = ClipboardBackendKind::File;
            self.clipboard.file = Some(PathBuf::from(file));
        }
    }
}

/// Get the global clipin config directory (~/.clipin).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".clipin"))
}

/// Get the config path: `CLIPIN_CONFIG` if set, else ~/.clipin/config.toml.
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| global_config_dir().map(|dir| dir.join("config.toml")))
}

/// Payload-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Text alphabet for new payloads
    pub encoding: TextEncoding,

    /// Compression for new payloads
    pub compression: Compression,

    /// Gzip level (0-9)
    pub compression_level: u32,

    /// Longest payload written to the clipboard, in bytes
    pub clipboard_limit: usize,

    /// Maximum archives accepted from a payload
    pub max_files: u32,

    /// Maximum decoded payload size, in bytes
    pub max_decoded_bytes: u64,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        let limits = CodecLimits::default();
        PayloadConfig {
            encoding: TextEncoding::default(),
            compression: Compression::default(),
            compression_level: 6,
            clipboard_limit: limits.clipboard_limit,
            max_files: limits.max_files,
            max_decoded_bytes: limits.max_decoded_bytes,
        }
    }
}

/// Python/pip configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Interpreter to run pip with (defaults to python3/python on PATH)
    pub executable: Option<PathBuf>,

    /// Extra arguments appended to `pip download`
    pub download_args: Vec<String>,

    /// Extra arguments appended to `pip install`
    pub install_args: Vec<String>,
}

/// Install defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Pass `--force-reinstall` to pip
    pub force_reinstall: bool,

    /// Remove the workspace after a successful install
    pub clean: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            force_reinstall: true,
            clean: true,
        }
    }
}

/// Which clipboard implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardBackendKind {
    /// Detect the platform clipboard tool.
    #[default]
    Auto,
    /// Use a plain text file as the clipboard.
    File,
}

/// Clipboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Backend selection
    pub backend: ClipboardBackendKind,

    /// File used by the `file` backend
    pub file: Option<PathBuf>,

    /// Longest text the clipboard holds, in bytes, when the platform caps it
    pub max_text_len: Option<usize>,
}
