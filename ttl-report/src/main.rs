mod files;
mod loader;
mod parameters;
mod processing;
mod report;
mod save_to_file;

use anyhow::Context;
use clap::Parser;
use files::build_file_list;
use parameters::{DetectionParameters, InputParameters, OutputParameters, RegularizationParameters};
use processing::{ProcessingSettings, Regularization, process_file};
use rayon::prelude::*;
use report::write_report;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};
use tracing::{info, warn};
use ttl_common::{
    CommonOpts,
    metrics::{component_info_metric, install_exporter},
    tracer::{TracerEngine, TracerOptions},
};
use ttl_timing::EdgeDetector;

/// Detects the edges of two-level (TTL) voltage traces and reports how
/// regular each resulting pulse train is.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(flatten)]
    input: InputParameters,

    #[clap(flatten)]
    detection: DetectionParameters,

    #[clap(flatten)]
    regularization: RegularizationParameters,

    #[clap(flatten)]
    output: OutputParameters,

    #[clap(flatten)]
    common: CommonOpts,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let _tracer = TracerEngine::new(TracerOptions {
        default_level: args.common.log_level,
        use_stderr: args.output.output.is_none(),
    })?;

    if let Some(address) = args.common.observability_address {
        install_exporter(address).context("Prometheus exporter should be installed")?;
        component_info_metric("ttl-report");
    }

    let detector = EdgeDetector::new(args.detection.level_settings())?;

    let files = build_file_list(&args.input.input, &args.input.pattern, args.input.recurse)?;
    if files.is_empty() {
        warn!("No trace files found in {}", args.input.input.display());
    }
    info!("Processing {} trace files", files.len());

    if let Some(save_dir) = &args.output.save_dir {
        fs::create_dir_all(save_dir)
            .with_context(|| format!("Cannot create {}", save_dir.display()))?;
    }

    let input_root = if args.input.input.is_dir() {
        args.input.input.clone()
    } else {
        args.input
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    };

    let settings = ProcessingSettings {
        detector,
        polarity: args.detection.polarity,
        channels: args.input.channels,
        time_column: args.input.time_column,
        delimiter: args.input.delimiter,
        regularization: args.regularization.target_period.map(|target_period| {
            Regularization {
                target_period,
                tolerance: args.regularization.tolerance,
            }
        }),
        save_dir: args.output.save_dir,
        input_root,
    };

    let rows = files
        .par_iter()
        .map(|path| process_file(path, &settings))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    let failed = rows.iter().filter(|row| row.error.is_some()).count();
    info!("{} signals reported, {failed} with errors", rows.len());

    match &args.output.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
            write_report(BufWriter::new(file), &rows)?;
        }
        None => write_report(std::io::stdout().lock(), &rows)?,
    }
    Ok(())
}
