//! Archive files and ordered archive sets.
//!
//! An [`ArchiveFile`] is one wheel: its exact file name (which carries the
//! package name, version, and platform tags pip relies on) and its bytes.
//! An [`ArchiveSet`] is the ordered collection moved through one payload.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::core::RequirementSpec;

/// Extension used by wheel archives.
pub const WHEEL_EXTENSION: &str = "whl";

/// Longest archive name or requirement, in bytes, a payload may carry.
pub const MAX_NAME_LEN: usize = 4096;

/// Error constructing an archive set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    #[error("archive name is empty")]
    EmptyName,

    #[error("archive name is {len} bytes long, the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("archive name `{name}` is not a plain file name")]
    UnsafeName { name: String },

    #[error("duplicate archive `{name}`")]
    Duplicate { name: String },
}

/// One package archive.
#[derive(Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    name: String,
    bytes: Vec<u8>,
}

impl ArchiveFile {
    /// Create an archive file from a name and its contents.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        ArchiveFile {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an archive from disk, naming it after the file.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;
        Ok(ArchiveFile { name, bytes })
    }

    /// The archive's file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The archive's contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the contents in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the archive has no contents.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ArchiveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check that `name` can be used as a file name inside a workspace.
///
/// Rejects anything that could escape the directory it is written into.
pub fn validate_name(name: &str) -> Result<(), ArchiveError> {
    if name.is_empty() {
        return Err(ArchiveError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ArchiveError::NameTooLong {
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    let unsafe_name = name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(ArchiveError::UnsafeName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// An ordered set of uniquely named archives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSet {
    files: Vec<ArchiveFile>,
}

impl ArchiveSet {
    /// Create an empty set.
    pub fn new() -> Self {
        ArchiveSet { files: Vec::new() }
    }

    /// Build a set from files, keeping their order.
    pub fn from_files(files: impl IntoIterator<Item = ArchiveFile>) -> Result<Self, ArchiveError> {
        let mut set = ArchiveSet::new();
        for file in files {
            set.push(file)?;
        }
        Ok(set)
    }

    /// Append a file. Fails on an invalid or duplicate name.
    pub fn push(&mut self, file: ArchiveFile) -> Result<(), ArchiveError> {
        validate_name(file.name())?;
        if self.contains(file.name()) {
            return Err(ArchiveError::Duplicate {
                name: file.name().to_string(),
            });
        }
        self.files.push(file);
        Ok(())
    }

    /// Whether an archive with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name() == name)
    }

    /// Look up an archive by name.
    pub fn get(&self, name: &str) -> Option<&ArchiveFile> {
        self.files.iter().find(|f| f.name() == name)
    }

    /// Iterate archives in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ArchiveFile> {
        self.files.iter()
    }

    /// Archive names in order.
    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(ArchiveFile::name).collect()
    }

    /// Number of archives.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set has no archives.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all archive sizes.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.len() as u64).sum()
    }
}

impl<'a> IntoIterator for &'a ArchiveSet {
    type Item = &'a ArchiveFile;
    type IntoIter = std::slice::Iter<'a, ArchiveFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// An archive set together with where it came from.
///
/// The origin travels inside the payload so that the restoring side knows
/// which requirement to hand to the installer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    /// Requirement the archives were fetched for, if known.
    pub requirement: Option<RequirementSpec>,

    /// Whether the dependency closure was requested when fetching.
    pub include_deps: bool,

    /// The archives themselves.
    pub archives: ArchiveSet,
}

impl Bundle {
    /// Bundle a bare archive set with no origin information.
    pub fn from_archives(archives: ArchiveSet) -> Self {
        Bundle {
            requirement: None,
            include_deps: false,
            archives,
        }
    }
}
