//! User-friendly diagnostic messages.
//!
//! Every error shown to the user carries its root cause, any output from the
//! tool that failed (pip, the clipboard helper), and what to try next.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion for fetch failures.
    pub const FETCH_FAILED: &str =
        "Check the requirement spelling, the network, and that a wheel exists for this platform";

    /// Suggestion when the payload is too large for the clipboard.
    pub const RETRY_WITHOUT_DEPS: &str = "Retry with `--no-deps` and copy dependencies separately";

    /// Suggestion for splitting a large request.
    pub const SPLIT_REQUEST: &str =
        "Split the request, or raise `payload.clipboard_limit` if your clipboard allows it";

    /// Suggestion when the clipboard does not hold a payload.
    pub const RECOPY: &str =
        "Run `clipin copy <requirement>` on the online machine and paste again";

    /// Suggestion when a payload exceeds the decode ceilings.
    pub const RAISE_LIMIT: &str =
        "Raise `payload.max_files` or `payload.max_decoded_bytes` if you trust the payload";

    /// Suggestion when the workspace cannot be used.
    pub const OTHER_DIR: &str = "Pass a different directory with `--dir`";

    /// Suggestion when no clipboard tool works.
    pub const CLIPBOARD_TOOL: &str =
        "Install xclip, xsel, or wl-clipboard, or set CLIPIN_CLIPBOARD_FILE to use a file instead";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Verbatim output from an external tool
    pub details: Option<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            details: None,
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attach verbatim tool output. Blank output is ignored.
    pub fn with_details(mut self, details: impl AsRef<str>) -> Self {
        let details = details.as_ref().trim_end();
        if !details.trim().is_empty() {
            self.details = Some(details.to_string());
        }
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if let Some(ref details) = self.details {
            output.push('\n');
            for line in details.lines() {
                output.push_str(&format!("  | {}\n", line));
            }
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("failed to fetch `demo==9.9`")
            .with_context("requested with dependencies")
            .with_details("ERROR: Could not find a version that satisfies the requirement\n")
            .with_suggestion(suggestions::FETCH_FAILED)
            .with_suggestion(suggestions::RETRY_WITHOUT_DEPS);

        let output = diag.format(false);
        assert!(output.contains("error: failed to fetch"));
        assert!(output.contains("  = requested with dependencies"));
        assert!(output.contains("  | ERROR: Could not find"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("2. Retry with `--no-deps`"));
    }

    #[test]
    fn test_blank_details_are_dropped() {
        let diag = Diagnostic::warning("cleanup failed").with_details("  \n");
        assert!(diag.details.is_none());
        assert!(diag.format(false).starts_with("warning: cleanup failed"));
    }
}
