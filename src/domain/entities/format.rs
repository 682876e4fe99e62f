//! Image format identity and signature data
//!
//! A [`FormatSpec`] is the immutable description of one carvable format:
//! the byte strings that open it, the optional byte string that closes it,
//! and the largest object the carver is willing to believe in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MB: u64 = 1024 * 1024;

/// Default cap on a single carved object
pub const DEFAULT_MAX_OBJECT_SIZE: u64 = 20 * MB;

const JPEG_STARTS: &[&[u8]] = &[
    &[0xFF, 0xD8, 0xFF, 0xE0], // JFIF
    &[0xFF, 0xD8, 0xFF, 0xE1], // Exif
    &[0xFF, 0xD8, 0xFF, 0xDB], // raw quantization table
    &[0xFF, 0xD8, 0xFF, 0xEE], // Adobe APP14
];
const JPEG_MINIMAL_STARTS: &[&[u8]] = &[&[0xFF, 0xD8, 0xFF, 0xE0], &[0xFF, 0xD8, 0xFF, 0xE1]];
const JPEG_EOI: &[u8] = &[0xFF, 0xD9];

const PNG_STARTS: &[&[u8]] = &[&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]];
const PNG_IEND: &[u8] = &[0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];

const GIF_STARTS: &[&[u8]] = &[b"GIF87a", b"GIF89a"];
const GIF_TRAILER: &[u8] = &[0x3B];

const BMP_STARTS: &[&[u8]] = &[b"BM"];

const WEBP_STARTS: &[&[u8]] = &[b"RIFF"];

/// Formats the carver knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatId {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
}

impl FormatId {
    /// Every format, in catalog order
    pub const ALL: [FormatId; 5] = [
        FormatId::Jpeg,
        FormatId::Png,
        FormatId::Gif,
        FormatId::Bmp,
        FormatId::WebP,
    ];

    /// Returns the file extension used for recovered artifacts
    pub fn extension(&self) -> &'static str {
        match self {
            FormatId::Jpeg => "jpg",
            FormatId::Png => "png",
            FormatId::Gif => "gif",
            FormatId::Bmp => "bmp",
            FormatId::WebP => "webp",
        }
    }

    /// Returns a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            FormatId::Jpeg => "JPEG Image",
            FormatId::Png => "PNG Image",
            FormatId::Gif => "GIF Image",
            FormatId::Bmp => "BMP Image",
            FormatId::WebP => "WebP Image",
        }
    }

    /// Returns the built-in signature data for this format
    pub fn builtin_spec(&self) -> FormatSpec {
        let (start_signatures, end_signature) = match self {
            FormatId::Jpeg => (JPEG_STARTS, Some(JPEG_EOI)),
            FormatId::Png => (PNG_STARTS, Some(PNG_IEND)),
            FormatId::Gif => (GIF_STARTS, Some(GIF_TRAILER)),
            FormatId::Bmp => (BMP_STARTS, None),
            FormatId::WebP => (WEBP_STARTS, None),
        };
        FormatSpec {
            id: *self,
            start_signatures,
            end_signature,
            max_object_size: DEFAULT_MAX_OBJECT_SIZE,
        }
    }

    /// JPEG/PNG-only signature data, JFIF and Exif openers only
    pub(crate) fn minimal_spec(&self) -> Option<FormatSpec> {
        match self {
            FormatId::Jpeg => Some(FormatSpec {
                start_signatures: JPEG_MINIMAL_STARTS,
                ..self.builtin_spec()
            }),
            FormatId::Png => Some(self.builtin_spec()),
            _ => None,
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown image format '{0}' (expected one of: jpg, png, gif, bmp, webp)")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatId {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(FormatId::Jpeg),
            "png" => Ok(FormatId::Png),
            "gif" => Ok(FormatId::Gif),
            "bmp" => Ok(FormatId::Bmp),
            "webp" => Ok(FormatId::WebP),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Errors raised while assembling format data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("maximum object size for {0} must be greater than zero")]
    ZeroMaxObjectSize(FormatId),

    #[error("{0} is not part of this catalog")]
    NotInCatalog(FormatId),

    #[error("failed to build signature matcher: {0}")]
    Matcher(String),
}

/// Signature data for one format
///
/// Signatures are static tables; only the size cap can differ between
/// catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    id: FormatId,
    start_signatures: &'static [&'static [u8]],
    end_signature: Option<&'static [u8]>,
    max_object_size: u64,
}

impl FormatSpec {
    pub fn id(&self) -> FormatId {
        self.id
    }

    /// Byte strings that may open an object, in declaration order
    pub fn start_signatures(&self) -> &'static [&'static [u8]] {
        self.start_signatures
    }

    /// Byte string closing an object, if the format has one
    pub fn end_signature(&self) -> Option<&'static [u8]> {
        self.end_signature
    }

    pub fn max_object_size(&self) -> u64 {
        self.max_object_size
    }

    /// Returns a copy with a different size cap
    pub fn with_max_object_size(self, max_object_size: u64) -> Result<Self, CatalogError> {
        if max_object_size == 0 {
            return Err(CatalogError::ZeroMaxObjectSize(self.id));
        }
        Ok(Self {
            max_object_size,
            ..self
        })
    }

    /// Size cap clamped to the address space of this platform
    pub(crate) fn max_object_len(&self) -> usize {
        usize::try_from(self.max_object_size).unwrap_or(usize::MAX)
    }
}
