use anyhow::{Context, Result};
use clap::Parser;
use humansize::{BINARY, format_size};
use std::fs;
use std::path::Path;

use carvex::config::ReadMode;
use carvex::logging::{init_logging, level_for};
use carvex::presentation::cli::{Cli, Commands, ProgressReporter, SourceArgs};
use carvex::{
    CarveConfig, CarveOrchestrator, CarveReport, FormatCatalog, InMemoryVolume,
    LocalArtifactWriter, MmapVolume,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, level_for(cli.verbose, cli.debug));

    match cli.command {
        Commands::Recover {
            source,
            output,
            no_overwrite,
            organize,
        } => {
            let mut config = source.load_config().context("invalid configuration")?;
            if let Some(output) = output {
                config = config.with_output_dir(output);
            }
            if no_overwrite {
                config = config.with_overwrite(false);
            }
            if organize {
                config = config.with_organize_by_type(true);
            }
            run_recover(&source, &config)
        }
        Commands::Scan { source } => {
            let config = source.load_config().context("invalid configuration")?;
            run_scan(&source, &config)
        }
        Commands::Formats => {
            print_formats();
            Ok(())
        }
    }
}

fn run_recover(source: &SourceArgs, config: &CarveConfig) -> Result<()> {
    let progress = ProgressReporter::for_formats(config.catalog()?.len() as u64, "Carving");
    let mut orchestrator =
        CarveOrchestrator::from_config(config)?.with_progress(progress.callback());

    let output_dir = config.output_dir.clone();
    let options = config.write_options();
    let open_writer = || LocalArtifactWriter::new(&output_dir, options);

    let result = match config.read_mode {
        ReadMode::Mmap => orchestrator.run::<MmapVolume, _, _>(&source.volume, open_writer),
        ReadMode::Buffered => orchestrator.run::<InMemoryVolume, _, _>(&source.volume, open_writer),
    };
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            progress.abandon();
            return Err(e).with_context(|| format!("cannot carve {}", source.volume.display()));
        }
    };

    progress.finish("Done");
    finish(&report, source.report.as_deref())
}

fn run_scan(source: &SourceArgs, config: &CarveConfig) -> Result<()> {
    let progress = ProgressReporter::for_formats(config.catalog()?.len() as u64, "Scanning");
    let mut orchestrator =
        CarveOrchestrator::from_config(config)?.with_progress(progress.callback());

    let result = match config.read_mode {
        ReadMode::Mmap => orchestrator.scan::<MmapVolume>(&source.volume),
        ReadMode::Buffered => orchestrator.scan::<InMemoryVolume>(&source.volume),
    };
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            progress.abandon();
            return Err(e).with_context(|| format!("cannot scan {}", source.volume.display()));
        }
    };

    progress.finish("Done");
    finish(&report, source.report.as_deref())
}

fn finish(report: &CarveReport, report_path: Option<&Path>) -> Result<()> {
    print!("{}", report.summary());
    for error in &report.errors {
        eprintln!("  ! {}", error);
    }

    if let Some(path) = report_path {
        let json = report.to_json().context("failed to serialize report")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_formats() {
    println!(
        "{:<6} {:<12} {:<44} {:<18} {}",
        "EXT", "NAME", "START SIGNATURES", "END SIGNATURE", "MAX SIZE"
    );
    for spec in FormatCatalog::standard().specs() {
        let starts = spec
            .start_signatures()
            .iter()
            .map(hex::encode_upper)
            .collect::<Vec<_>>()
            .join(", ");
        let end = spec
            .end_signature()
            .map(hex::encode_upper)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<12} {:<44} {:<18} {}",
            spec.id().extension(),
            spec.id().name(),
            starts,
            end,
            format_size(spec.max_object_size(), BINARY)
        );
    }
}
