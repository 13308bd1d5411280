//! Core data structures for clipin.
//!
//! This module contains the foundational types used throughout clipin:
//! - Archive files, sets, and bundles with their origin
//! - Requirement specifiers
//! - The restore workspace
//! - The error taxonomy shared by every operation

pub mod archive;
pub mod errors;
pub mod requirement;
pub mod workspace;

pub use archive::{ArchiveError, ArchiveFile, ArchiveSet, Bundle};
pub use errors::{ClipError, ClipResult};
pub use requirement::RequirementSpec;
pub use workspace::Workspace;
