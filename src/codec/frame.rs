//! Binary layout of a bundle.
//!
//! All integers are big-endian:
//!
//! ```text
//! flags        u8    bit 0: include_deps, bit 1: requirement present
//! requirement  u32 length + UTF-8 bytes (only when bit 1 is set)
//! file_count   u32
//! file_count x
//!   name       u32 length + UTF-8 bytes
//!   content    u64 length + raw bytes
//! ```

use crate::core::archive::{validate_name, ArchiveFile, ArchiveSet, Bundle, MAX_NAME_LEN};
use crate::core::errors::{ClipError, ClipResult};
use crate::core::RequirementSpec;

const FLAG_INCLUDE_DEPS: u8 = 0b01;
const FLAG_REQUIREMENT: u8 = 0b10;

/// Smallest possible encoded file entry: two empty length prefixes.
const MIN_ENTRY_LEN: usize = 4 + 8;

/// Ceilings applied while reading a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    /// Maximum number of archives.
    pub max_files: u32,

    /// Maximum size of any single archive.
    pub max_file_bytes: u64,
}

/// Serialize a bundle.
pub fn write_bundle(bundle: &Bundle) -> Vec<u8> {
    let capacity = bundle.archives.total_bytes() as usize
        + bundle
            .archives
            .iter()
            .map(|f| f.name().len() + MIN_ENTRY_LEN)
            .sum::<usize>()
        + 64;
    let mut out = Vec::with_capacity(capacity);

    let mut flags = 0;
    if bundle.include_deps {
        flags |= FLAG_INCLUDE_DEPS;
    }
    if bundle.requirement.is_some() {
        flags |= FLAG_REQUIREMENT;
    }
    out.push(flags);

    if let Some(ref requirement) = bundle.requirement {
        put_str(&mut out, requirement.as_str());
    }

    out.extend_from_slice(&(bundle.archives.len() as u32).to_be_bytes());
    for file in &bundle.archives {
        put_str(&mut out, file.name());
        out.extend_from_slice(&(file.len() as u64).to_be_bytes());
        out.extend_from_slice(file.bytes());
    }

    out
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// Parse a bundle, validating every length against the buffer and limits.
pub fn read_bundle(buf: &[u8], limits: FrameLimits) -> ClipResult<Bundle> {
    let mut reader = FrameReader { buf, pos: 0 };

    let flags = reader.u8("flags")?;
    if flags & !(FLAG_INCLUDE_DEPS | FLAG_REQUIREMENT) != 0 {
        return Err(ClipError::corrupt(format!("unknown flags {:#04x}", flags)));
    }

    let requirement = if flags & FLAG_REQUIREMENT != 0 {
        let spec = reader.string("requirement")?;
        Some(
            RequirementSpec::new(spec)
                .ok_or_else(|| ClipError::corrupt("invalid requirement"))?,
        )
    } else {
        None
    };

    let count = reader.u32("file count")?;
    if count > limits.max_files {
        return Err(ClipError::PayloadTooLarge {
            what: "file count",
            declared: Some(count.into()),
            limit: limits.max_files.into(),
        });
    }

    // Never trust the declared count for allocation beyond what the
    // remaining bytes could possibly hold.
    let mut files = Vec::with_capacity((count as usize).min(reader.remaining() / MIN_ENTRY_LEN));
    for index in 0..count {
        let name = reader.string("archive name")?;
        validate_name(&name).map_err(|e| ClipError::corrupt(e.to_string()))?;

        let len = reader.u64("archive length")?;
        if len > limits.max_file_bytes {
            return Err(ClipError::PayloadTooLarge {
                what: "archive size",
                declared: Some(len),
                limit: limits.max_file_bytes,
            });
        }
        let bytes = reader.take(len, "archive contents").map_err(|e| match e {
            ClipError::CorruptPayload { reason } => {
                ClipError::corrupt(format!("{} (archive {} `{}`)", reason, index, name))
            }
            other => other,
        })?;
        files.push(ArchiveFile::new(name, bytes.to_vec()));
    }

    if reader.remaining() != 0 {
        return Err(ClipError::corrupt(format!(
            "{} unexpected trailing bytes",
            reader.remaining()
        )));
    }

    let archives = ArchiveSet::from_files(files).map_err(|e| ClipError::corrupt(e.to_string()))?;

    Ok(Bundle {
        requirement,
        include_deps: flags & FLAG_INCLUDE_DEPS != 0,
        archives,
    })
}

/// Cursor over a frame buffer.
struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: u64, what: &str) -> ClipResult<&'a [u8]> {
        if len > self.remaining() as u64 {
            return Err(ClipError::corrupt(format!(
                "truncated {}: need {} bytes, {} left",
                what,
                len,
                self.remaining()
            )));
        }
        let buf = self.buf;
        let start = self.pos;
        self.pos += len as usize;
        Ok(&buf[start..self.pos])
    }

    fn u8(&mut self, what: &str) -> ClipResult<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u32(&mut self, what: &str) -> ClipResult<u32> {
        let bytes = self.take(4, what)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn u64(&mut self, what: &str) -> ClipResult<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8, what)?);
        Ok(u64::from_be_bytes(raw))
    }

    fn string(&mut self, what: &str) -> ClipResult<String> {
        let len = self.u32(what)?;
        if len as usize > MAX_NAME_LEN {
            return Err(ClipError::corrupt(format!(
                "{} length {} exceeds {}",
                what, len, MAX_NAME_LEN
            )));
        }
        let bytes = self.take(len.into(), what)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ClipError::corrupt(format!("{} is not valid UTF-8", what)))
    }
}
