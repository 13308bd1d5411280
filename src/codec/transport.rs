//! Binary-to-text transport: text alphabet plus optional compression.
//!
//! The transport is chosen by the encoding side and recorded in the payload
//! header, so the decoding side never needs matching configuration.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use base64::engine::general_purpose;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

/// Text alphabet used for the payload body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Standard base64 with padding.
    #[default]
    Base64,
    /// URL-safe base64 with padding.
    Base64Url,
    /// Lowercase hexadecimal. Twice the size, but survives anything.
    Hex,
}

impl TextEncoding {
    /// All supported encodings.
    pub const ALL: [TextEncoding; 3] = [
        TextEncoding::Base64,
        TextEncoding::Base64Url,
        TextEncoding::Hex,
    ];

    /// Tag written in the payload header.
    pub fn tag(self) -> &'static str {
        match self {
            TextEncoding::Base64 => "b64",
            TextEncoding::Base64Url => "b64url",
            TextEncoding::Hex => "hex",
        }
    }

    /// Parse a header tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.tag() == tag)
    }

    /// Encode bytes as text.
    pub fn encode(self, data: &[u8]) -> String {
        match self {
            TextEncoding::Base64 => general_purpose::STANDARD.encode(data),
            TextEncoding::Base64Url => general_purpose::URL_SAFE.encode(data),
            TextEncoding::Hex => hex::encode(data),
        }
    }

    /// Decode text back into bytes.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, String> {
        match self {
            TextEncoding::Base64 => general_purpose::STANDARD
                .decode(text)
                .map_err(|e| e.to_string()),
            TextEncoding::Base64Url => general_purpose::URL_SAFE
                .decode(text)
                .map_err(|e| e.to_string()),
            TextEncoding::Hex => {
                if let Some(c) = text
                    .chars()
                    .find(|c| !matches!(*c, '0'..='9' | 'a'..='f'))
                {
                    return Err(format!("invalid character {:?}", c));
                }
                hex::decode(text).map_err(|e| e.to_string())
            }
        }
    }

    /// Length of the text produced for `len` input bytes.
    pub fn encoded_len(self, len: usize) -> usize {
        match self {
            TextEncoding::Base64 | TextEncoding::Base64Url => len.div_ceil(3).saturating_mul(4),
            TextEncoding::Hex => len.saturating_mul(2),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "b64" | "base64" => Ok(TextEncoding::Base64),
            "b64url" | "base64url" => Ok(TextEncoding::Base64Url),
            "hex" => Ok(TextEncoding::Hex),
            _ => Err(format!(
                "invalid encoding '{}'; expected 'base64', 'base64url', or 'hex'",
                s
            )),
        }
    }
}

/// Compression applied before text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Store bytes as-is.
    None,
    /// Gzip via flate2.
    #[default]
    Gzip,
}

impl Compression {
    /// Tag written in the payload header.
    pub fn tag(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gz",
        }
    }

    /// Parse a header tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "none" => Some(Compression::None),
            "gz" => Some(Compression::Gzip),
            _ => None,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(Compression::None),
            "gz" | "gzip" => Ok(Compression::Gzip),
            _ => Err(format!(
                "invalid compression '{}'; expected 'gzip' or 'none'",
                s
            )),
        }
    }
}

/// Failure inflating a compressed body.
#[derive(Debug)]
pub(crate) enum InflateError {
    /// Decompressed output exceeded the allowed size. `read` is the full
    /// size when it is known without inflating past the limit.
    TooLarge { read: Option<u64> },
    /// Stream was not valid for the recorded compression.
    Invalid(String),
}

/// The binary-to-text strategy for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transport {
    /// Text alphabet
    pub encoding: TextEncoding,

    /// Compression applied before encoding
    pub compression: Compression,

    /// Gzip level (0-9), ignored without compression
    pub level: u32,
}

impl Default for Transport {
    fn default() -> Self {
        Transport {
            encoding: TextEncoding::default(),
            compression: Compression::default(),
            level: 6,
        }
    }
}

impl Transport {
    /// Create a transport with the default compression level.
    pub fn new(encoding: TextEncoding, compression: Compression) -> Self {
        Transport {
            encoding,
            compression,
            ..Transport::default()
        }
    }

    /// Compress `data` according to this transport.
    pub(crate) fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        match self.compression {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let level = flate2::Compression::new(self.level.min(9));
                let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), level);
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }

    /// Inflate `data`, reading at most `limit` bytes of output.
    pub(crate) fn decompress(&self, data: &[u8], limit: u64) -> Result<Vec<u8>, InflateError> {
        match self.compression {
            Compression::None => {
                if data.len() as u64 > limit {
                    return Err(InflateError::TooLarge {
                        read: Some(data.len() as u64),
                    });
                }
                Ok(data.to_vec())
            }
            Compression::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(data)
                    .take(limit.saturating_add(1))
                    .read_to_end(&mut out)
                    .map_err(|e| InflateError::Invalid(e.to_string()))?;
                if out.len() as u64 > limit {
                    return Err(InflateError::TooLarge { read: None });
                }
                Ok(out)
            }
        }
    }
}
