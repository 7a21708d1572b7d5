//! CLI entry point for the simbad-report tool.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use simbad_report::{Catalog, RateGate, ReportPipeline, SimbadClient, input_lines};
use tracing::{debug, error, info};

mod app_config;
mod cli;
mod config_runtime;
mod exit_handler;

use config_runtime::{RunSettings, parse_cli_with_sources, resolve_settings};
use exit_handler::{ProcessExit, determine_exit_outcome};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (args, sources) = parse_cli_with_sources();

    let loaded = match app_config::load_default_file_config() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ProcessExit::Failure.into();
        }
    };
    let settings = resolve_settings(args, &sources, loaded.config.as_ref());

    init_tracing(&settings);
    debug!(?settings, config_path = ?loaded.path, from_file = loaded.config.is_some(), "settings resolved");

    match run(settings).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            error!("{err:#}");
            ProcessExit::Failure.into()
        }
    }
}

/// Priority: `RUST_LOG` env var > quiet > verbose > default (info).
fn init_tracing(settings: &RunSettings) {
    let default_level = if settings.quiet {
        "error"
    } else {
        match settings.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(settings: RunSettings) -> Result<ProcessExit> {
    info!(input = %settings.input.display(), "simbad-report starting");

    let input_text = tokio::fs::read_to_string(&settings.input)
        .await
        .with_context(|| format!("Failed to read input file '{}'", settings.input.display()))?;
    let lines: Vec<&str> = input_lines(&input_text).collect();
    if lines.is_empty() {
        info!("No coordinates found in input");
        return Ok(ProcessExit::Success);
    }

    tokio::fs::create_dir_all(&settings.pipeline.output_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory '{}'",
                settings.pipeline.output_dir.display()
            )
        })?;

    let client = SimbadClient::with_base_url(settings.simbad_url.as_str(), settings.http)
        .context("Failed to build SIMBAD client")?;
    let catalog: Arc<dyn Catalog> = Arc::new(client);

    let gate = if settings.rate_limit.is_zero() {
        debug!("rate limiting disabled");
        Arc::new(RateGate::disabled())
    } else {
        debug!(rate_limit_ms = settings.rate_limit.as_millis(), "rate limiting enabled");
        Arc::new(RateGate::new(settings.rate_limit))
    };

    let pipeline = ReportPipeline::new(catalog, gate, settings.pipeline);
    info!(
        objects = lines.len(),
        output_dir = %pipeline.output_dir().display(),
        "processing coordinates"
    );

    let summary = pipeline.run_batch(lines).await;
    for failure in &summary.failures {
        error!(index = failure.index, line = %failure.line, "{}", failure.error);
    }

    info!(
        completed = summary.completed(),
        failed = summary.failed(),
        total = summary.total(),
        "Report generation complete"
    );

    Ok(determine_exit_outcome(
        summary.completed(),
        summary.failed(),
    ))
}
