//! Merges command-line arguments with file config defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use simbad_report::catalog::DEFAULT_SIMBAD_BASE_URL;
use simbad_report::{HttpSettings, PipelineOptions};

use crate::app_config::FileConfig;
use crate::cli::Args;

/// Which arguments were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) rate_limit: bool,
    pub(crate) no_cache: bool,
    pub(crate) radius: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

/// Fully resolved settings of one run.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunSettings {
    pub(crate) input: PathBuf,
    pub(crate) rate_limit: Duration,
    pub(crate) simbad_url: String,
    pub(crate) http: HttpSettings,
    pub(crate) pipeline: PipelineOptions,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (args, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        rate_limit: is_commandline_value(matches, "rate_limit"),
        no_cache: is_commandline_value(matches, "no_cache"),
        radius: is_commandline_value(matches, "radius"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Resolves run settings: command line first, then file config, then
/// built-in defaults.
pub(crate) fn resolve_settings(
    args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> RunSettings {
    let file_config = file_config.cloned().unwrap_or_default();

    let rate_limit_ms = match file_config.rate_limit {
        Some(ms) if !cli_sources.rate_limit => ms,
        _ => args.rate_limit,
    };

    let cache_citations = if cli_sources.no_cache {
        !args.no_cache
    } else {
        file_config.cache_citations.unwrap_or(true)
    };

    let radius_arcmin = match file_config.search_radius_arcmin {
        Some(radius) if !cli_sources.radius => radius,
        _ => args.radius,
    };

    let (verbose, quiet) = match file_config.verbosity {
        Some(verbosity) if !cli_sources.verbose && !cli_sources.quiet => verbosity.as_flags(),
        _ => (args.verbose, args.quiet),
    };

    let defaults = HttpSettings::default();
    let http = HttpSettings {
        connect_timeout_secs: file_config
            .connect_timeout_secs
            .unwrap_or(defaults.connect_timeout_secs),
        read_timeout_secs: file_config
            .read_timeout_secs
            .unwrap_or(defaults.read_timeout_secs),
    };

    let pipeline_defaults = PipelineOptions::default();
    let output_dir = args
        .output_dir
        .or(file_config.output_dir)
        .unwrap_or(pipeline_defaults.output_dir);

    RunSettings {
        input: args.input,
        rate_limit: Duration::from_millis(rate_limit_ms),
        simbad_url: args
            .simbad_url
            .or(file_config.simbad_url)
            .unwrap_or_else(|| DEFAULT_SIMBAD_BASE_URL.to_string()),
        http,
        pipeline: PipelineOptions {
            output_dir,
            radius_arcmin,
            cache_citations,
        },
        verbose,
        quiet,
    }
}
