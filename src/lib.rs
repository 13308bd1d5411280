//! clipin - move Python wheels to an offline machine through the clipboard
//!
//! This crate provides the core library functionality for clipin: fetching
//! wheels on an online machine, packing them into a clipboard-safe text
//! payload, and restoring and installing them offline.

pub mod clipboard;
pub mod codec;
pub mod core;
pub mod installer;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for clipin unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory fetchers, installers, and
/// clipboards.
#[cfg(test)]
pub mod test_support;

pub use codec::{Codec, Payload};
pub use core::{ArchiveFile, ArchiveSet, Bundle, ClipError, ClipResult, RequirementSpec, Workspace};
pub use util::context::GlobalContext;
