//! Error taxonomy for copy and restore operations.
//!
//! Every variant is terminal for the current invocation. Each carries the
//! requirement, path, or collaborator diagnostic needed to explain itself.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Result alias for clipin operations.
pub type ClipResult<T> = std::result::Result<T, ClipError>;

/// Error from a copy, paste, or install operation.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("failed to fetch `{requirement}`")]
    FetchFailed {
        requirement: String,
        diagnostic: String,
    },

    #[error("payload of {size} bytes exceeds the clipboard limit of {limit} bytes")]
    PayloadTooLargeForClipboard { size: usize, limit: usize },

    #[error("clipboard does not hold a valid clipin payload: {reason}")]
    CorruptPayload { reason: String },

    #[error("payload {what}{} exceeds the safety limit of {limit}", of_size(.declared))]
    PayloadTooLarge {
        what: &'static str,
        /// The offending size, when known without reading past the limit.
        declared: Option<u64>,
        limit: u64,
    },

    #[error("workspace `{}` is unavailable: {reason}", path.display())]
    WorkspaceUnavailable { path: PathBuf, reason: String },

    #[error("failed to write `{}`", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("offline install from `{}` failed", directory.display())]
    InstallFailed {
        directory: PathBuf,
        diagnostic: String,
    },

    #[error("clipboard {action} failed: {message}")]
    Clipboard {
        action: &'static str,
        message: String,
    },
}

impl ClipError {
    /// Shorthand for a [`ClipError::CorruptPayload`].
    pub fn corrupt(reason: impl Into<String>) -> Self {
        ClipError::CorruptPayload {
            reason: reason.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClipError::FetchFailed { .. } => 2,
            ClipError::PayloadTooLargeForClipboard { .. } => 3,
            ClipError::CorruptPayload { .. } => 4,
            ClipError::PayloadTooLarge { .. } => 5,
            ClipError::WorkspaceUnavailable { .. } => 6,
            ClipError::WriteFailed { .. } => 7,
            ClipError::InstallFailed { .. } => 8,
            ClipError::Clipboard { .. } => 9,
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ClipError::FetchFailed { diagnostic, .. } => diag
                .with_details(diagnostic)
                .with_suggestion(suggestions::FETCH_FAILED),

            ClipError::PayloadTooLargeForClipboard { .. } => diag
                .with_suggestion(suggestions::RETRY_WITHOUT_DEPS)
                .with_suggestion(suggestions::SPLIT_REQUEST),

            ClipError::CorruptPayload { .. } => diag
                .with_context("the clipboard must hold text produced by `clipin copy`")
                .with_suggestion(suggestions::RECOPY),

            ClipError::PayloadTooLarge { .. } => diag
                .with_suggestion(suggestions::RAISE_LIMIT)
                .with_suggestion(suggestions::RECOPY),

            ClipError::WorkspaceUnavailable { path, .. } => diag
                .with_location(path)
                .with_suggestion(suggestions::OTHER_DIR),

            ClipError::WriteFailed { path, source } => diag
                .with_location(path)
                .with_context(source.to_string()),

            ClipError::InstallFailed {
                directory,
                diagnostic,
            } => diag
                .with_location(directory)
                .with_details(diagnostic)
                .with_context("the restored wheels were left in place for inspection"),

            ClipError::Clipboard { .. } => diag.with_suggestion(suggestions::CLIPBOARD_TOOL),
        }
    }
}

fn of_size(declared: &Option<u64>) -> String {
    declared.map(|n| format!(" of {}", n)).unwrap_or_default()
}
