//! High-level operations.
//!
//! This module contains the implementation of clipin commands.

pub mod clipin_copy;
pub mod clipin_restore;

pub use clipin_copy::{copy, ArchiveSummary, CopyOptions, CopyReport};
pub use clipin_restore::{restore, RestoreOptions, RestoreReport};
