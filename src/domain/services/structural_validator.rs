//! Structural validator service
//!
//! Container-level plausibility checks applied to a candidate before it is
//! trusted. Only head/tail bytes and a few well-known tags are inspected;
//! image data itself is never decoded.

use crate::domain::entities::FormatId;
use memchr::{memchr_iter, memmem};
use serde::Serialize;

/// Candidates shorter than this are degenerate matches
pub const DEFAULT_MIN_OBJECT_SIZE: usize = 64;

const JPEG_SOI: &[u8] = &[0xFF, 0xD8];
const JPEG_EOI: &[u8] = &[0xFF, 0xD9];
/// SOF0, SOF2, DHT, SOS, DQT, DRI
const JPEG_STRUCTURE_MARKERS: [u8; 6] = [0xC0, 0xC2, 0xC4, 0xDA, 0xDB, 0xDD];

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_TRAILER: &[u8] = b"IEND\xAE\x42\x60\x82";

const GIF_HEADERS: [&[u8]; 2] = [b"GIF87a", b"GIF89a"];
const GIF_TRAILER: u8 = 0x3B;

const BMP_SIGNATURE: &[u8] = b"BM";

const RIFF_TAG: &[u8] = b"RIFF";
const WEBP_TAG: &[u8] = b"WEBP";

/// Outcome of a structural check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    /// Shorter than the size floor
    TooSmall,
    /// Leading signature missing
    BadHeader,
    /// Trailing signature missing
    BadTrailer,
    /// Required interior marker or tag missing
    MissingStructure,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Verdict::Valid => "valid",
            Verdict::TooSmall => "below size floor",
            Verdict::BadHeader => "header signature mismatch",
            Verdict::BadTrailer => "trailer signature mismatch",
            Verdict::MissingStructure => "required marker missing",
        }
    }
}

/// Format-specific acceptance predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralValidator {
    min_object_size: usize,
}

impl StructuralValidator {
    pub fn new(min_object_size: usize) -> Self {
        Self { min_object_size }
    }

    pub fn min_object_size(&self) -> usize {
        self.min_object_size
    }

    /// Returns true when `bytes` is a plausible object of `format`
    pub fn is_valid(&self, bytes: &[u8], format: FormatId) -> bool {
        self.check(bytes, format).is_valid()
    }

    /// Checks `bytes` and names the first rule it breaks
    pub fn check(&self, bytes: &[u8], format: FormatId) -> Verdict {
        if bytes.len() < self.min_object_size {
            return Verdict::TooSmall;
        }

        match format {
            FormatId::Jpeg => check_jpeg(bytes),
            FormatId::Png => check_png(bytes),
            FormatId::Gif => check_gif(bytes),
            FormatId::Bmp => check_bmp(bytes),
            FormatId::WebP => check_webp(bytes),
        }
    }
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_OBJECT_SIZE)
    }
}

fn check_jpeg(bytes: &[u8]) -> Verdict {
    if !bytes.starts_with(JPEG_SOI) {
        return Verdict::BadHeader;
    }
    if !bytes.ends_with(JPEG_EOI) {
        return Verdict::BadTrailer;
    }
    if !has_jpeg_structure_marker(bytes) {
        return Verdict::MissingStructure;
    }
    Verdict::Valid
}

fn has_jpeg_structure_marker(bytes: &[u8]) -> bool {
    memchr_iter(0xFF, bytes).any(|pos| {
        bytes
            .get(pos + 1)
            .is_some_and(|code| JPEG_STRUCTURE_MARKERS.contains(code))
    })
}

fn check_png(bytes: &[u8]) -> Verdict {
    if !bytes.starts_with(PNG_SIGNATURE) {
        return Verdict::BadHeader;
    }
    if !bytes.ends_with(PNG_TRAILER) {
        return Verdict::BadTrailer;
    }
    let has_ihdr = memmem::find(bytes, b"IHDR").is_some();
    let has_idat = memmem::find(bytes, b"IDAT").is_some();
    if !(has_ihdr && has_idat) {
        return Verdict::MissingStructure;
    }
    Verdict::Valid
}

fn check_gif(bytes: &[u8]) -> Verdict {
    if !GIF_HEADERS.iter().any(|header| bytes.starts_with(header)) {
        return Verdict::BadHeader;
    }
    if bytes.last() != Some(&GIF_TRAILER) {
        return Verdict::BadTrailer;
    }
    Verdict::Valid
}

// BMP has no trailer; the signature is all there is to check
fn check_bmp(bytes: &[u8]) -> Verdict {
    if !bytes.starts_with(BMP_SIGNATURE) {
        return Verdict::BadHeader;
    }
    Verdict::Valid
}

fn check_webp(bytes: &[u8]) -> Verdict {
    if !bytes.starts_with(RIFF_TAG) {
        return Verdict::BadHeader;
    }
    if memmem::find(&bytes[RIFF_TAG.len()..], WEBP_TAG).is_none() {
        return Verdict::MissingStructure;
    }
    Verdict::Valid
}
