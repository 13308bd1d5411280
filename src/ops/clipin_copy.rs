//! Implementation of `clipin copy`.

use serde::Serialize;

use crate::clipboard::Clipboard;
use crate::codec::transport::{Compression, TextEncoding};
use crate::codec::Codec;
use crate::core::archive::{ArchiveFile, Bundle};
use crate::core::errors::{ClipError, ClipResult};
use crate::core::RequirementSpec;
use crate::sources::PackageFetcher;
use crate::util::hash::short_fingerprint;

/// Options for copying a package to the clipboard.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Requirement to fetch
    pub requirement: RequirementSpec,

    /// Fetch the dependency closure too
    pub include_deps: bool,
}

/// One archive placed on the clipboard.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub name: String,
    pub size: u64,
    pub sha256: String,
}

impl From<&ArchiveFile> for ArchiveSummary {
    fn from(file: &ArchiveFile) -> Self {
        ArchiveSummary {
            name: file.name().to_string(),
            size: file.len() as u64,
            sha256: short_fingerprint(file.bytes()),
        }
    }
}

/// Result of a copy.
#[derive(Debug, Clone, Serialize)]
pub struct CopyReport {
    pub requirement: String,
    pub include_deps: bool,
    pub archives: Vec<ArchiveSummary>,
    pub total_bytes: u64,
    pub payload_len: usize,
    pub encoding: TextEncoding,
    pub compression: Compression,
}

/// Fetch archives for a requirement and place them on the clipboard.
///
/// The clipboard is only written once the payload is known to fit; on any
/// error its previous contents are untouched.
pub fn copy(
    fetcher: &dyn PackageFetcher,
    codec: &Codec,
    clipboard: &dyn Clipboard,
    opts: &CopyOptions,
) -> ClipResult<CopyReport> {
    tracing::info!(
        "fetching `{}` with {} ({})",
        opts.requirement,
        fetcher.name(),
        if opts.include_deps { "with dependencies" } else { "without dependencies" }
    );

    let archives = fetcher
        .fetch(&opts.requirement, opts.include_deps)
        .map_err(|e| ClipError::FetchFailed {
            requirement: opts.requirement.to_string(),
            diagnostic: e.to_string(),
        })?;

    let summaries: Vec<ArchiveSummary> = archives.iter().map(ArchiveSummary::from).collect();
    let total_bytes = archives.total_bytes();

    let bundle = Bundle {
        requirement: Some(opts.requirement.clone()),
        include_deps: opts.include_deps,
        archives,
    };

    let codec = codec.clone().clamp_clipboard_limit(clipboard.max_text_len());
    let payload = codec.encode_bundle(&bundle)?;

    clipboard.write(payload.as_str())?;
    tracing::info!(
        "wrote {} archive(s) to the {} clipboard ({} characters)",
        bundle.archives.len(),
        clipboard.name(),
        payload.len()
    );

    let transport = codec.transport();
    Ok(CopyReport {
        requirement: opts.requirement.to_string(),
        include_deps: opts.include_deps,
        archives: summaries,
        total_bytes,
        payload_len: payload.len(),
        encoding: transport.encoding,
        compression: transport.compression,
    })
}
