//! Run configuration
//!
//! Every field has a default, so an empty JSON object is a valid config
//! file. Command-line flags are applied on top with the `with_*` builders.

use crate::domain::entities::{CatalogError, FormatId};
use crate::domain::repositories::WriteOptions;
use crate::domain::services::{DEFAULT_MIN_OBJECT_SIZE, FormatCatalog, StructuralValidator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// How start signatures are searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// One Aho-Corasick pass over the volume for all formats
    #[default]
    SinglePass,
    /// One pass per signature variant
    PerFormat,
}

/// How the volume is brought into memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    #[default]
    Mmap,
    Buffered,
}

/// Which signature table to start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    #[default]
    Standard,
    /// JPEG (JFIF/Exif openers) and PNG only
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarveConfig {
    pub output_dir: PathBuf,
    /// Formats to carve; empty means all in the catalog
    pub formats: Vec<FormatId>,
    pub catalog: CatalogKind,
    pub min_object_size: usize,
    /// Per-format replacements for the default size cap
    pub max_object_sizes: BTreeMap<FormatId, u64>,
    pub parallel: bool,
    pub scan_strategy: ScanStrategy,
    pub read_mode: ReadMode,
    pub overwrite: bool,
    pub organize_by_type: bool,
    pub filename_prefix: String,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            formats: Vec::new(),
            catalog: CatalogKind::Standard,
            min_object_size: DEFAULT_MIN_OBJECT_SIZE,
            max_object_sizes: BTreeMap::new(),
            parallel: false,
            scan_strategy: ScanStrategy::SinglePass,
            read_mode: ReadMode::Mmap,
            overwrite: true,
            organize_by_type: false,
            filename_prefix: "recovered".to_string(),
        }
    }
}

impl CarveConfig {
    /// Loads and validates a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: shown, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_formats(mut self, formats: Vec<FormatId>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogKind) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_min_object_size(mut self, size: usize) -> Self {
        self.min_object_size = size;
        self
    }

    pub fn with_max_object_size(mut self, format: FormatId, size: u64) -> Self {
        self.max_object_sizes.insert(format, size);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_scan_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.scan_strategy = strategy;
        self
    }

    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.read_mode = mode;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_organize_by_type(mut self, organize: bool) -> Self {
        self.organize_by_type = organize;
        self
    }

    pub fn with_filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((format, _)) = self.max_object_sizes.iter().find(|(_, size)| **size == 0) {
            return Err(ConfigError::Invalid(format!(
                "max_object_sizes.{} must be greater than zero",
                format.extension()
            )));
        }
        if self.filename_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "filename_prefix must not be empty".to_string(),
            ));
        }
        if self.filename_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "filename_prefix '{}' must not contain path separators",
                self.filename_prefix
            )));
        }
        self.catalog().map(|_| ())
    }

    /// Builds the catalog this config describes
    pub fn catalog(&self) -> Result<FormatCatalog, ConfigError> {
        let base = match self.catalog {
            CatalogKind::Standard => FormatCatalog::standard(),
            CatalogKind::Minimal => FormatCatalog::minimal(),
        };
        let mut catalog = base.restricted_to(&self.formats);
        if catalog.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "no format of {:?} is in the {:?} catalog",
                self.formats, self.catalog
            )));
        }
        for (&format, &size) in &self.max_object_sizes {
            if catalog.specs_for(format).is_some() {
                catalog = catalog.with_max_object_size(format, size)?;
            }
        }
        Ok(catalog)
    }

    pub fn validator(&self) -> StructuralValidator {
        StructuralValidator::new(self.min_object_size)
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            overwrite: self.overwrite,
            organize_by_type: self.organize_by_type,
            filename_prefix: self.filename_prefix.clone(),
        }
    }
}
