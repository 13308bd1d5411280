//! Platform clipboard via command-line tools.

use super::Clipboard;
use crate::core::errors::{ClipError, ClipResult};
use crate::util::process::{failure_output, find_executable, ProcessBuilder};

/// A clipboard helper program and how to talk to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTool {
    /// Windows `clip` (UTF-16LE on stdin) and PowerShell `Get-Clipboard`.
    Windows,
    /// macOS `pbcopy` / `pbpaste`.
    MacOs,
    /// Wayland `wl-copy` / `wl-paste`.
    Wayland,
    /// X11 `xclip`.
    Xclip,
    /// X11 `xsel`.
    Xsel,
}

impl ClipboardTool {
    /// Pick the tool for the current platform.
    ///
    /// On Linux and other Unix systems, Wayland tools are preferred when a
    /// Wayland session is running, then xclip, then xsel.
    pub fn detect() -> Option<ClipboardTool> {
        if cfg!(windows) {
            return Some(ClipboardTool::Windows);
        }
        if cfg!(target_os = "macos") {
            return Some(ClipboardTool::MacOs);
        }

        let wayland = std::env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty());
        if wayland
            && find_executable("wl-copy").is_some()
            && find_executable("wl-paste").is_some()
        {
            return Some(ClipboardTool::Wayland);
        }
        if find_executable("xclip").is_some() {
            return Some(ClipboardTool::Xclip);
        }
        if find_executable("xsel").is_some() {
            return Some(ClipboardTool::Xsel);
        }
        None
    }

    fn name(self) -> &'static str {
        match self {
            ClipboardTool::Windows => "windows",
            ClipboardTool::MacOs => "pbcopy",
            ClipboardTool::Wayland => "wl-clipboard",
            ClipboardTool::Xclip => "xclip",
            ClipboardTool::Xsel => "xsel",
        }
    }

    /// Command that prints the clipboard to stdout.
    pub fn read_command(self) -> ProcessBuilder {
        match self {
            ClipboardTool::Windows => ProcessBuilder::new("powershell").args([
                "-NoProfile",
                "-Command",
                "Get-Clipboard -Raw",
            ]),
            ClipboardTool::MacOs => ProcessBuilder::new("pbpaste"),
            ClipboardTool::Wayland => ProcessBuilder::new("wl-paste").arg("--no-newline"),
            ClipboardTool::Xclip => {
                ProcessBuilder::new("xclip").args(["-selection", "clipboard", "-o"])
            }
            ClipboardTool::Xsel => ProcessBuilder::new("xsel").args(["--clipboard", "--output"]),
        }
    }

    /// Command that replaces the clipboard with `text` fed on stdin.
    pub fn write_command(self, text: &str) -> ProcessBuilder {
        match self {
            ClipboardTool::Windows => {
                let utf16: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
                ProcessBuilder::new("clip").stdin(utf16)
            }
            ClipboardTool::MacOs => ProcessBuilder::new("pbcopy").stdin(text),
            ClipboardTool::Wayland => ProcessBuilder::new("wl-copy")
                .args(["--type", "text/plain"])
                .stdin(text),
            ClipboardTool::Xclip => ProcessBuilder::new("xclip")
                .args(["-selection", "clipboard"])
                .stdin(text),
            ClipboardTool::Xsel => ProcessBuilder::new("xsel")
                .args(["--clipboard", "--input"])
                .stdin(text),
        }
    }
}

/// The system clipboard, driven through a [`ClipboardTool`].
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    tool: ClipboardTool,
    limit: Option<usize>,
}

impl SystemClipboard {
    /// Use a specific tool.
    pub fn new(tool: ClipboardTool) -> Self {
        SystemClipboard { tool, limit: None }
    }

    /// Cap the text written through the tool.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Detect the platform clipboard.
    pub fn detect() -> ClipResult<Self> {
        ClipboardTool::detect()
            .map(SystemClipboard::new)
            .ok_or_else(|| ClipError::Clipboard {
                action: "setup",
                message: "no clipboard tool found".to_string(),
            })
    }
}

impl Clipboard for SystemClipboard {
    fn name(&self) -> &str {
        self.tool.name()
    }

    fn read(&self) -> ClipResult<String> {
        let cmd = self.tool.read_command();
        let output = cmd.exec().map_err(|e| ClipError::Clipboard {
            action: "read",
            message: format!("{:#}", e),
        })?;

        if !output.status.success() {
            // wl-paste exits non-zero on an empty clipboard
            let message = failure_output(&output);
            if self.tool == ClipboardTool::Wayland && message.contains("No selection") {
                return Ok(String::new());
            }
            return Err(ClipError::Clipboard {
                action: "read",
                message: format!("`{}` failed: {}", cmd.display_command(), message),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn write(&self, text: &str) -> ClipResult<()> {
        let cmd = self.tool.write_command(text);
        let status = cmd.status().map_err(|e| ClipError::Clipboard {
            action: "write",
            message: format!("{:#}", e),
        })?;

        if !status.success() {
            return Err(ClipError::Clipboard {
                action: "write",
                message: format!(
                    "`{}` exited with code {:?}",
                    cmd.display_command(),
                    status.code()
                ),
            });
        }

        tracing::debug!("wrote {} bytes to the {} clipboard", text.len(), self.name());
        Ok(())
    }

    fn max_text_len(&self) -> Option<usize> {
        self.limit
    }
}
