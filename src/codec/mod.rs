//! Payload codec: archive sets to clipboard-safe text and back.
//!
//! A payload looks like
//!
//! ```text
//! clipin:1:b64:gz:H4sIAAAAAAAA...
//! ```
//!
//! The header names the text encoding and compression of the body. The body
//! is the text encoding of a SHA-256 digest followed by the packed bundle,
//! where the packed bundle is the serialized frame (see [`frame`]) after
//! compression. The digest covers exactly the bytes the text decodes to, so
//! any edit to the body is caught before anything is inflated.
//!
//! Decoding checks the header, the alphabet, the digest, the decompressed
//! size, and every length field before any archive is handed out.

pub mod frame;
pub mod transport;

use std::fmt;

use sha2::{Digest, Sha256};

use crate::core::archive::{ArchiveSet, Bundle};
use crate::core::errors::{ClipError, ClipResult};
use crate::util::config::PayloadConfig;

pub use frame::FrameLimits;
pub use transport::{Compression, TextEncoding, Transport};

use transport::InflateError;

/// Leading tag identifying a clipin payload.
pub const MAGIC: &str = "clipin";

/// Current payload format version.
pub const FORMAT_VERSION: u32 = 1;

const DIGEST_LEN: usize = 32;

/// Header plus slack allowed on top of the encoded body when bounding input.
const HEADER_SLACK: usize = 64;

/// Clipboard-safe serialized archive set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(String);

impl Payload {
    /// The payload text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes (all payload characters are ASCII).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty. A valid payload never is.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the payload, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload(text.to_string())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size ceilings enforced by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecLimits {
    /// Longest payload text that may be written to the clipboard.
    pub clipboard_limit: usize,

    /// Maximum archive count accepted when decoding.
    pub max_files: u32,

    /// Maximum decoded (decompressed) size accepted when decoding.
    pub max_decoded_bytes: u64,
}

impl Default for CodecLimits {
    fn default() -> Self {
        CodecLimits {
            clipboard_limit: 256 * 1024 * 1024,
            max_files: 4096,
            max_decoded_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Encoder/decoder for payloads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    transport: Transport,
    limits: CodecLimits,
}

impl Codec {
    /// Create a codec with a transport strategy and limits.
    pub fn new(transport: Transport, limits: CodecLimits) -> Self {
        Codec { transport, limits }
    }

    /// Create a codec from the `[payload]` configuration section.
    pub fn from_config(config: &PayloadConfig) -> Self {
        let transport = Transport {
            encoding: config.encoding,
            compression: config.compression,
            level: config.compression_level,
        };
        let limits = CodecLimits {
            clipboard_limit: config.clipboard_limit,
            max_files: config.max_files,
            max_decoded_bytes: config.max_decoded_bytes,
        };
        Codec::new(transport, limits)
    }

    /// Replace the transport strategy.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Lower the clipboard limit to `max`, if given.
    pub fn clamp_clipboard_limit(mut self, max: Option<usize>) -> Self {
        if let Some(max) = max {
            self.limits.clipboard_limit = self.limits.clipboard_limit.min(max);
        }
        self
    }

    /// The transport used when encoding.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// The limits in force.
    pub fn limits(&self) -> CodecLimits {
        self.limits
    }

    /// Encode an archive set with no origin information.
    pub fn encode(&self, archives: &ArchiveSet) -> ClipResult<Payload> {
        self.encode_bundle(&Bundle::from_archives(archives.clone()))
    }

    /// Decode a payload into its archive set.
    pub fn decode(&self, payload: &str) -> ClipResult<ArchiveSet> {
        self.decode_bundle(payload).map(|bundle| bundle.archives)
    }

    /// Encode a bundle.
    ///
    /// Fails with [`ClipError::PayloadTooLargeForClipboard`] when the text
    /// would exceed the clipboard limit.
    pub fn encode_bundle(&self, bundle: &Bundle) -> ClipResult<Payload> {
        let content = frame::write_bundle(bundle);
        let packed = self
            .transport
            .compress(&content)
            .map_err(|e| ClipError::corrupt(format!("compression failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(DIGEST_LEN + packed.len());
        sealed.extend_from_slice(&Sha256::digest(&packed));
        sealed.extend_from_slice(&packed);

        let header = header(self.transport);
        let size = header.len() + self.transport.encoding.encoded_len(sealed.len());
        if size > self.limits.clipboard_limit {
            return Err(ClipError::PayloadTooLargeForClipboard {
                size,
                limit: self.limits.clipboard_limit,
            });
        }

        let mut text = header;
        text.push_str(&self.transport.encoding.encode(&sealed));

        tracing::debug!(
            "encoded {} archives: {} raw bytes, {} packed, {} text",
            bundle.archives.len(),
            content.len(),
            packed.len(),
            text.len()
        );

        Ok(Payload(text))
    }

    /// Decode a payload, including its origin information.
    pub fn decode_bundle(&self, payload: &str) -> ClipResult<Bundle> {
        let text = payload.trim();
        let (transport, body) = parse_header(text)?;

        let max_content = self.limits.max_decoded_bytes;

        // Bound the input before decoding anything. Gzip can expand
        // incompressible input slightly, hence the 1% slack.
        let max_sealed = max_content
            .saturating_add(max_content / 100)
            .saturating_add(1024)
            .saturating_add(DIGEST_LEN as u64);
        let max_body = transport
            .encoding
            .encoded_len(usize::try_from(max_sealed).unwrap_or(usize::MAX))
            .saturating_add(HEADER_SLACK);
        if body.len() > max_body {
            return Err(ClipError::PayloadTooLarge {
                what: "text length",
                declared: Some(body.len() as u64),
                limit: max_body as u64,
            });
        }

        let sealed = transport.encoding.decode(body).map_err(|e| {
            ClipError::corrupt(format!("invalid {} body: {}", transport.encoding, e))
        })?;

        if sealed.len() < DIGEST_LEN {
            return Err(ClipError::corrupt("body shorter than its digest"));
        }
        let (digest, packed) = sealed.split_at(DIGEST_LEN);
        if Sha256::digest(packed).as_slice() != digest {
            return Err(ClipError::corrupt("digest mismatch"));
        }

        let content = transport
            .decompress(packed, max_content)
            .map_err(|e| match e {
                InflateError::TooLarge { read } => ClipError::PayloadTooLarge {
                    what: "decoded size",
                    declared: read,
                    limit: max_content,
                },
                InflateError::Invalid(reason) => {
                    ClipError::corrupt(format!("decompression failed: {}", reason))
                }
            })?;

        let bundle = frame::read_bundle(
            &content,
            FrameLimits {
                max_files: self.limits.max_files,
                max_file_bytes: self.limits.max_decoded_bytes,
            },
        )?;

        tracing::debug!(
            "decoded {} archives ({} bytes)",
            bundle.archives.len(),
            bundle.archives.total_bytes()
        );

        Ok(bundle)
    }
}

fn header(transport: Transport) -> String {
    format!(
        "{}:{}:{}:{}:",
        MAGIC,
        FORMAT_VERSION,
        transport.encoding.tag(),
        transport.compression.tag()
    )
}

/// Split a payload into its transport and body.
fn parse_header(text: &str) -> ClipResult<(Transport, &str)> {
    let mut parts = text.splitn(5, ':');
    let (Some(magic), Some(version), Some(encoding), Some(compression), Some(body)) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(ClipError::corrupt("missing payload header"));
    };

    if magic != MAGIC {
        return Err(ClipError::corrupt("missing payload header"));
    }
    if version != FORMAT_VERSION.to_string() {
        return Err(ClipError::corrupt(format!(
            "unsupported payload version `{}`",
            version
        )));
    }
    let encoding = TextEncoding::from_tag(encoding)
        .ok_or_else(|| ClipError::corrupt(format!("unknown encoding `{}`", encoding)))?;
    let compression = Compression::from_tag(compression)
        .ok_or_else(|| ClipError::corrupt(format!("unknown compression `{}`", compression)))?;

    Ok((Transport::new(encoding, compression), body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive::{ArchiveFile, MAX_NAME_LEN};
    use crate::core::RequirementSpec;

    fn archive_set() -> ArchiveSet {
        let binary: Vec<u8> = (0..=255u8).cycle().take(4099).collect();
        ArchiveSet::from_files([
            ArchiveFile::new("demo-1.0-py3-none-any.whl", binary),
            ArchiveFile::new("zero-0.0-py3-none-any.whl", Vec::new()),
            ArchiveFile::new("paquet_été-2.0-py3-none-any.whl", b"\0\r\n\x1b".to_vec()),
        ])
        .unwrap()
    }

    /// Build a payload around an arbitrary, correctly digested content frame.
    fn seal(content: &[u8]) -> String {
        let mut sealed = Sha256::digest(content).to_vec();
        sealed.extend_from_slice(content);
        format!("clipin:1:b64:none:{}", TextEncoding::Base64.encode(&sealed))
    }

    #[test]
    fn test_round_trip_all_transports() {
        let set = archive_set();
        for encoding in TextEncoding::ALL {
            for compression in [Compression::None, Compression::Gzip] {
                let codec = Codec::default().with_transport(Transport::new(encoding, compression));
                let payload = codec.encode(&set).unwrap();
                assert_eq!(codec.decode(payload.as_str()).unwrap(), set);
            }
        }
    }

    #[test]
    fn test_round_trip_empty_set() {
        let codec = Codec::default();
        let payload = codec.encode(&ArchiveSet::new()).unwrap();
        assert!(codec.decode(payload.as_str()).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_bundle_origin() {
        let codec = Codec::default();
        let bundle = Bundle {
            requirement: RequirementSpec::new("demo==1.0"),
            include_deps: true,
            archives: archive_set(),
        };

        let payload = codec.encode_bundle(&bundle).unwrap();
        assert_eq!(codec.decode_bundle(payload.as_str()).unwrap(), bundle);
    }

    #[test]
    fn test_round_trip_longest_names() {
        let name = format!("{}.whl", "n".repeat(MAX_NAME_LEN - 4));
        let bundle = Bundle {
            requirement: RequirementSpec::new("r".repeat(MAX_NAME_LEN)),
            include_deps: false,
            archives: ArchiveSet::from_files([ArchiveFile::new(name.clone(), b"x".to_vec())])
                .unwrap(),
        };
        assert_eq!(name.len(), MAX_NAME_LEN);

        let codec = Codec::default();
        let payload = codec.encode_bundle(&bundle).unwrap();
        assert_eq!(codec.decode_bundle(payload.as_str()).unwrap(), bundle);
    }

    #[test]
    fn test_payload_is_clipboard_safe() {
        let payload = Codec::default().encode(&archive_set()).unwrap();
        assert!(payload.as_str().starts_with("clipin:1:b64:gz:"));
        assert!(payload.as_str().chars().all(|c| c.is_ascii_graphic()));
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        let codec = Codec::default();
        let payload = codec.encode(&archive_set()).unwrap();
        let pasted = format!("\n  {}\r\n", payload);
        assert_eq!(codec.decode(&pasted).unwrap(), archive_set());
    }

    #[test]
    fn test_unrelated_text_is_corrupt() {
        let codec = Codec::default();
        for text in ["", "hello world", "clipin:", "clipin:2:b64:gz:AAAA", "clipin:1:b32:gz:AAAA"] {
            assert!(
                matches!(codec.decode(text), Err(ClipError::CorruptPayload { .. })),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_any_changed_character_detected() {
        let binary: Vec<u8> = (0..=255u8).cycle().take(300).collect();
        let set = ArchiveSet::from_files([
            ArchiveFile::new("demo-1.0-py3-none-any.whl", binary),
            ArchiveFile::new("paquet_été-2.0-py3-none-any.whl", b"\0\r\n".to_vec()),
        ])
        .unwrap();

        for encoding in TextEncoding::ALL {
            for compression in [Compression::None, Compression::Gzip] {
                let transport = Transport::new(encoding, compression);
                let codec = Codec::default().with_transport(transport);
                let payload = codec.encode(&set).unwrap().into_string();
                let header_len = header(transport).len();

                for pos in header_len..payload.len() {
                    let mut bytes = payload.clone().into_bytes();
                    bytes[pos] = match (encoding, bytes[pos]) {
                        (TextEncoding::Hex, b'0') => b'f',
                        (TextEncoding::Hex, _) => b'0',
                        (_, b'A') => b'B',
                        _ => b'A',
                    };
                    let mutated = String::from_utf8(bytes).unwrap();
                    assert!(
                        matches!(codec.decode(&mutated), Err(ClipError::CorruptPayload { .. })),
                        "{} at {}",
                        transport.encoding,
                        pos
                    );
                }
            }
        }
    }

    #[test]
    fn test_uppercase_hex_is_corrupt() {
        let transport = Transport::new(TextEncoding::Hex, Compression::Gzip);
        let codec = Codec::default().with_transport(transport);
        let payload = codec.encode(&archive_set()).unwrap().into_string();
        let header_len = "clipin:1:hex:gz:".len();
        let shouted = format!("{}{}", &payload[..header_len], payload[header_len..].to_uppercase());

        assert!(matches!(
            codec.decode(&shouted),
            Err(ClipError::CorruptPayload { .. })
        ));
    }

    #[test]
    fn test_truncation_and_foreign_characters_detected() {
        let codec = Codec::default();
        let payload = codec.encode(&archive_set()).unwrap().into_string();

        let truncated = &payload[..payload.len() - 10];
        assert!(matches!(
            codec.decode(truncated),
            Err(ClipError::CorruptPayload { .. })
        ));

        let mut inserted = payload.clone();
        inserted.insert(payload.len() / 2, '~');
        assert!(matches!(
            codec.decode(&inserted),
            Err(ClipError::CorruptPayload { .. })
        ));

        let mut spaced = payload.clone();
        spaced.insert(payload.len() / 2, ' ');
        assert!(matches!(
            codec.decode(&spaced),
            Err(ClipError::CorruptPayload { .. })
        ));
    }

    #[test]
    fn test_clipboard_limit_enforced() {
        let codec = Codec::default().clamp_clipboard_limit(Some(100));
        let err = codec.encode(&archive_set()).unwrap_err();
        match err {
            ClipError::PayloadTooLargeForClipboard { size, limit } => {
                assert_eq!(limit, 100);
                assert!(size > 100);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_clamp_never_raises_limit() {
        let codec = Codec::new(
            Transport::default(),
            CodecLimits {
                clipboard_limit: 10,
                ..CodecLimits::default()
            },
        )
        .clamp_clipboard_limit(Some(1_000_000));
        assert_eq!(codec.limits().clipboard_limit, 10);
    }

    #[test]
    fn test_declared_file_count_over_ceiling() {
        let codec = Codec::new(
            Transport::default(),
            CodecLimits {
                max_files: 2,
                ..CodecLimits::default()
            },
        );
        let mut content = vec![0u8];
        content.extend_from_slice(&3u32.to_be_bytes());

        let err = codec.decode(&seal(&content)).unwrap_err();
        assert!(matches!(
            err,
            ClipError::PayloadTooLarge {
                what: "file count",
                declared: Some(3),
                limit: 2
            }
        ));
    }

    #[test]
    fn test_declared_size_over_ceiling_without_allocation() {
        let codec = Codec::new(
            Transport::default(),
            CodecLimits {
                max_decoded_bytes: 1024,
                ..CodecLimits::default()
            },
        );
        let mut content = vec![0u8];
        content.extend_from_slice(&1u32.to_be_bytes());
        content.extend_from_slice(&5u32.to_be_bytes());
        content.extend_from_slice(b"a.whl");
        content.extend_from_slice(&(u64::MAX / 2).to_be_bytes());

        let err = codec.decode(&seal(&content)).unwrap_err();
        assert!(matches!(err, ClipError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_decompressed_size_over_ceiling() {
        let big = ArchiveSet::from_files([ArchiveFile::new("big.whl", vec![0u8; 64 * 1024])])
            .unwrap();
        let payload = Codec::default().encode(&big).unwrap();

        let strict = Codec::new(
            Transport::default(),
            CodecLimits {
                max_decoded_bytes: 1024,
                ..CodecLimits::default()
            },
        );
        let err = strict.decode(payload.as_str()).unwrap_err();
        assert!(matches!(
            err,
            ClipError::PayloadTooLarge {
                what: "decoded size",
                declared: None,
                limit: 1024
            }
        ));
        assert_eq!(
            err.to_string(),
            "payload decoded size exceeds the safety limit of 1024"
        );
    }

    #[test]
    fn test_uncompressed_size_over_ceiling_reports_actual_size() {
        let set = ArchiveSet::from_files([ArchiveFile::new("big.whl", vec![7u8; 1500])]).unwrap();
        let transport = Transport::new(TextEncoding::Base64, Compression::None);
        let payload = Codec::default().with_transport(transport).encode(&set).unwrap();
        let content_len = frame::write_bundle(&Bundle::from_archives(set)).len() as u64;

        let strict = Codec::new(
            transport,
            CodecLimits {
                max_decoded_bytes: 1024,
                ..CodecLimits::default()
            },
        );
        let err = strict.decode(payload.as_str()).unwrap_err();
        match err {
            ClipError::PayloadTooLarge {
                what: "decoded size",
                declared: Some(declared),
                limit: 1024,
            } => assert_eq!(declared, content_len),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_oversized_text_rejected_before_decoding() {
        let codec = Codec::new(
            Transport::default(),
            CodecLimits {
                max_decoded_bytes: 16,
                ..CodecLimits::default()
            },
        );
        let text = format!("clipin:1:b64:none:{}", "A".repeat(10_000));
        assert!(matches!(
            codec.decode(&text),
            Err(ClipError::PayloadTooLarge {
                what: "text length",
                ..
            })
        ));
    }
}
