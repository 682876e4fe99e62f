//! Carve report DTO

use crate::domain::entities::{FormatId, RecoveredObject};
use crate::domain::repositories::SavedArtifact;
use humansize::{BINARY, format_size};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Per-format counters for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatTally {
    pub format: FormatId,
    /// Distinct start signature hits
    pub starts: usize,
    /// Starts with no end signature inside their window
    pub unbounded: usize,
    pub candidates: usize,
    pub validated: usize,
    pub rejected_too_small: usize,
    pub rejected_structure: usize,
    pub saved: usize,
    pub write_failures: usize,
    pub bytes_saved: u64,
}

impl FormatTally {
    pub fn new(format: FormatId) -> Self {
        Self {
            format,
            starts: 0,
            unbounded: 0,
            candidates: 0,
            validated: 0,
            rejected_too_small: 0,
            rejected_structure: 0,
            saved: 0,
            write_failures: 0,
            bytes_saved: 0,
        }
    }
}

/// One entry of the artifact manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub sequence_index: u64,
    pub format: FormatId,
    pub start_offset: usize,
    pub end_offset: usize,
    pub size: u64,
    /// Absent in a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ArtifactRecord {
    pub fn planned(object: &RecoveredObject) -> Self {
        let range = object.byte_range();
        Self {
            sequence_index: object.sequence_index(),
            format: object.format(),
            start_offset: range.start,
            end_offset: range.end,
            size: object.size() as u64,
            path: None,
            sha256: None,
        }
    }

    pub fn saved(object: &RecoveredObject, artifact: SavedArtifact) -> Self {
        Self {
            size: artifact.bytes_written,
            path: Some(artifact.path),
            sha256: Some(artifact.sha256),
            ..Self::planned(object)
        }
    }
}

/// Result of a carve or scan run
#[derive(Debug, Clone, Serialize)]
pub struct CarveReport {
    pub source: PathBuf,
    /// Absent in a dry run
    pub output_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub bytes_scanned: u64,
    pub formats: Vec<FormatTally>,
    pub artifacts: Vec<ArtifactRecord>,
    /// Non-fatal errors, in the order they happened
    pub errors: Vec<String>,
    #[serde(rename = "duration_secs", serialize_with = "as_secs")]
    pub duration: Duration,
}

fn as_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl CarveReport {
    pub fn new(source: PathBuf, output_dir: Option<PathBuf>) -> Self {
        Self {
            dry_run: output_dir.is_none(),
            source,
            output_dir,
            bytes_scanned: 0,
            formats: Vec::new(),
            artifacts: Vec::new(),
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn tally(&self, format: FormatId) -> Option<&FormatTally> {
        self.formats.iter().find(|tally| tally.format == format)
    }

    pub fn total_found(&self) -> usize {
        self.formats.iter().map(|t| t.candidates).sum()
    }

    pub fn total_validated(&self) -> usize {
        self.formats.iter().map(|t| t.validated).sum()
    }

    pub fn total_saved(&self) -> usize {
        self.formats.iter().map(|t| t.saved).sum()
    }

    pub fn bytes_saved(&self) -> u64 {
        self.formats.iter().map(|t| t.bytes_saved).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut out = String::new();

        if self.dry_run {
            let _ = writeln!(
                out,
                "Scan complete: {} objects would be recovered",
                self.total_validated()
            );
        } else {
            let _ = writeln!(
                out,
                "Recovery complete: {} files recovered ({})",
                self.total_saved(),
                format_size(self.bytes_saved(), BINARY)
            );
        }

        let _ = writeln!(
            out,
            "Scanned {} in {:.2}s",
            format_size(self.bytes_scanned, BINARY),
            self.duration.as_secs_f64()
        );

        for tally in &self.formats {
            let _ = writeln!(
                out,
                "  - {:<4} found {:>5}  validated {:>5}  saved {:>5}",
                tally.format.extension(),
                tally.candidates,
                tally.validated,
                tally.saved
            );
        }

        let _ = writeln!(
            out,
            "  total found {}  validated {}  saved {}",
            self.total_found(),
            self.total_validated(),
            self.total_saved()
        );

        if !self.errors.is_empty() {
            let _ = writeln!(out, "\n{} errors occurred", self.errors.len());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Candidate;

    #[test]
    fn totals_add_up_across_formats() {
        let mut report = CarveReport::new(PathBuf::from("disk.img"), Some(PathBuf::from("out")));
        let mut jpeg = FormatTally::new(FormatId::Jpeg);
        jpeg.candidates = 3;
        jpeg.validated = 2;
        jpeg.saved = 2;
        jpeg.bytes_saved = 2048;
        let mut png = FormatTally::new(FormatId::Png);
        png.candidates = 1;
        png.validated = 1;
        png.write_failures = 1;
        report.formats = vec![jpeg, png];

        assert_eq!(report.total_found(), 4);
        assert_eq!(report.total_validated(), 3);
        assert_eq!(report.total_saved(), 2);
        assert!(report.summary().contains("2 files recovered"));
        assert!(!report.dry_run);
    }

    #[test]
    fn dry_run_records_have_no_path() {
        let object = RecoveredObject::new(&Candidate::new(FormatId::Gif, 10, 90), 0);
        let record = ArtifactRecord::planned(&object);
        assert_eq!(record.size, 80);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("path").is_none());
        assert_eq!(json["format"], "gif");
    }

    #[test]
    fn serializes_duration_as_seconds() {
        let mut report = CarveReport::new(PathBuf::from("disk.img"), None);
        report.duration = Duration::from_millis(1500);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["duration_secs"], 1.5);
        assert_eq!(json["dry_run"], true);
    }
}
