//! Clipboard access.
//!
//! The clipboard is an external singleton: one text blob, read whole and
//! overwritten whole. [`SystemClipboard`] drives the platform's clipboard
//! tools as subprocesses; [`FileClipboard`] stands in for it with a plain
//! text file on headless hosts.

mod file;
mod system;

pub use file::FileClipboard;
pub use system::{ClipboardTool, SystemClipboard};

use crate::core::errors::ClipResult;

/// Read/write access to a single text clipboard.
pub trait Clipboard {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Read the current clipboard text.
    fn read(&self) -> ClipResult<String>;

    /// Replace the clipboard text.
    fn write(&self, text: &str) -> ClipResult<()>;

    /// Longest text this backend accepts, if it has a known limit.
    fn max_text_len(&self) -> Option<usize> {
        None
    }
}
