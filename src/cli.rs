//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Builds plain-text SIMBAD reports for a list of sky positions.
///
/// Each non-empty, non-comment line of FILE holds one position as
/// `hh mm ss.sss +dd mm ss.ss`. The closest SIMBAD object is reported into
/// `J<ra><sign><dec>.txt` inside the output directory.
#[derive(Parser, Debug)]
#[command(name = "simbad-report")]
#[command(author, version, about)]
pub struct Args {
    /// File with one coordinate per line
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Directory receiving the report files (default: current directory)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Minimum delay between catalog requests in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub rate_limit: u64,

    /// Look up every citation again instead of reusing earlier results
    #[arg(long)]
    pub no_cache: bool,

    /// Base URL of the SIMBAD service
    #[arg(long, value_name = "URL")]
    pub simbad_url: Option<String>,

    /// Region query radius in arcminutes
    #[arg(long, value_name = "ARCMIN", default_value_t = 1.0, value_parser = parse_radius)]
    pub radius: f64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Accepts a finite radius in `(0, 60]` arcminutes.
pub(crate) fn parse_radius(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 || value > 60.0 {
        return Err(format!("radius must be in (0, 60] arcminutes, got {raw}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["simbad-report", "objects.txt"]).unwrap();
        assert_eq!(args.input, PathBuf::from("objects.txt"));
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.rate_limit, 250);
        assert!(!args.no_cache);
        assert!(args.output_dir.is_none());
        assert!(args.simbad_url.is_none());
        assert!((args.radius - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cli_missing_file_is_rejected() {
        let err = Args::try_parse_from(["simbad-report"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["simbad-report", "in.txt", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["simbad-report", "in.txt", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["simbad-report", "in.txt", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["simbad-report", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["simbad-report", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_output_dir_short_and_long() {
        let args = Args::try_parse_from(["simbad-report", "in.txt", "-o", "out"]).unwrap();
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));

        let args =
            Args::try_parse_from(["simbad-report", "in.txt", "--output-dir", "reports"]).unwrap();
        assert_eq!(args.output_dir, Some(PathBuf::from("reports")));
    }

    #[test]
    fn test_cli_rate_limit_zero_disables() {
        let args = Args::try_parse_from(["simbad-report", "in.txt", "-l", "0"]).unwrap();
        assert_eq!(args.rate_limit, 0);
    }

    #[test]
    fn test_cli_rate_limit_over_max_rejected() {
        let err = Args::try_parse_from(["simbad-report", "in.txt", "-l", "60001"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_no_cache_and_simbad_url() {
        let args = Args::try_parse_from([
            "simbad-report",
            "in.txt",
            "--no-cache",
            "--simbad-url",
            "http://127.0.0.1:9000/simbad",
        ])
        .unwrap();
        assert!(args.no_cache);
        assert_eq!(
            args.simbad_url.as_deref(),
            Some("http://127.0.0.1:9000/simbad")
        );
    }

    #[test]
    fn test_cli_radius_validation() {
        let args = Args::try_parse_from(["simbad-report", "in.txt", "--radius", "2.5"]).unwrap();
        assert!((args.radius - 2.5).abs() < f64::EPSILON);

        for bad in ["0", "61", "inf", "wide"] {
            let err =
                Args::try_parse_from(["simbad-report", "in.txt", "--radius", bad]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{bad}");
        }
    }
}
