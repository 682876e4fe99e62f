//! CLI commands using clap

use crate::config::{CarveConfig, ConfigError, ReadMode, ScanStrategy};
use crate::domain::entities::FormatId;
use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// carvex - image carving tool
///
/// Recovers JPEG, PNG, GIF, BMP and WEBP files from raw volume images by
/// their signatures, without relying on filesystem metadata.
#[derive(Parser, Debug)]
#[command(name = "carvex")]
#[command(version)]
#[command(about = "Carve embedded image files out of raw volume images", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Carve a volume and write every validated object
    Recover {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory for recovered files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail a save instead of replacing an existing file
        #[arg(long)]
        no_overwrite: bool,

        /// Write into one subdirectory per extension
        #[arg(long)]
        organize: bool,
    },

    /// Report what would be recovered without writing anything
    Scan {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the built-in format signatures
    Formats,
}

/// Arguments shared by `recover` and `scan`
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Path to the volume image (e.g. disk.img)
    pub volume: PathBuf,

    /// Formats to carve (jpg, png, gif, bmp, webp); default all
    #[arg(short = 't', long, value_delimiter = ',')]
    pub types: Vec<FormatId>,

    /// JSON config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the JSON run report here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Locate and validate formats on the rayon pool
    #[arg(long)]
    pub parallel: bool,

    /// Minimum object size in bytes
    #[arg(long)]
    pub min_size: Option<usize>,

    /// How the volume is read
    #[arg(long, value_enum)]
    pub read_mode: Option<ReadMode>,

    /// How start signatures are searched for
    #[arg(long, value_enum)]
    pub strategy: Option<ScanStrategy>,
}

impl SourceArgs {
    /// Loads the config file, if any, and applies the flags on top
    pub fn load_config(&self) -> Result<CarveConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => CarveConfig::from_file(path)?,
            None => CarveConfig::default(),
        };

        if !self.types.is_empty() {
            config = config.with_formats(self.types.clone());
        }
        if self.parallel {
            config = config.with_parallel(true);
        }
        if let Some(size) = self.min_size {
            config = config.with_min_object_size(size);
        }
        if let Some(mode) = self.read_mode {
            config = config.with_read_mode(mode);
        }
        if let Some(strategy) = self.strategy {
            config = config.with_scan_strategy(strategy);
        }

        config.validate()?;
        Ok(config)
    }
}
