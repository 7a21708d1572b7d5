//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const CONFIG_DIR_NAME: &str = "simbad-report";
const CONFIG_FILE_NAME: &str = "config.toml";

/// `key = value` file configuration for simbad-report defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    /// Default directory for report files.
    pub output_dir: Option<PathBuf>,
    /// Default minimum spacing between catalog calls in milliseconds.
    pub rate_limit: Option<u64>,
    /// Reuse resolved citations within a run.
    pub cache_citations: Option<bool>,
    /// Base URL of the SIMBAD service.
    pub simbad_url: Option<String>,
    /// Region query radius in arcminutes.
    pub search_radius_arcmin: Option<f64>,
    /// Catalog client connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Catalog client read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(rate_limit) = self.rate_limit
            && rate_limit > 60_000
        {
            bail!("Invalid config value for `rate_limit`: {rate_limit}. Expected range: 0..=60000");
        }

        if let Some(radius) = self.search_radius_arcmin
            && (!radius.is_finite() || radius <= 0.0 || radius > 60.0)
        {
            bail!(
                "Invalid config value for `search_radius_arcmin`: {radius}. Expected range: (0, 60]"
            );
        }

        if let Some(simbad_url) = &self.simbad_url {
            url::Url::parse(simbad_url).with_context(|| {
                format!("Invalid config value for `simbad_url`: '{simbad_url}'")
            })?;
        }

        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;

        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Maps the label onto the CLI's `(verbose count, quiet)` pair.
    #[must_use]
    pub fn as_flags(self) -> (u8, bool) {
        match self {
            Self::Default => (0, false),
            Self::Verbose => (1, false),
            Self::Debug => (2, false),
            Self::Quiet => (0, true),
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/simbad-report/config.toml`
/// 2. `$HOME/.config/simbad-report/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "rate_limit" => {
                cfg.rate_limit = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "cache_citations" => {
                cfg.cache_citations = Some(parse_boolean(value).with_context(invalid)?);
            }
            "simbad_url" => {
                cfg.simbad_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "search_radius_arcmin" => {
                cfg.search_radius_arcmin = Some(parse_float(value).with_context(invalid)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_float(raw_value: &str) -> Result<f64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected numeric value");
    }
    Ok(token.parse::<f64>()?)
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
rate_limit = 500
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.rate_limit, Some(500));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.output_dir.is_none());
        assert!(cfg.cache_citations.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
output_dir = "/data/reports"
rate_limit = 1000
cache_citations = false
simbad_url = "http://simbad.cds.unistra.fr/simbad"
search_radius_arcmin = 0.5
connect_timeout_secs = 5
read_timeout_secs = 90
verbosity = "quiet"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/data/reports")));
        assert_eq!(cfg.rate_limit, Some(1000));
        assert_eq!(cfg.cache_citations, Some(false));
        assert_eq!(
            cfg.simbad_url.as_deref(),
            Some("http://simbad.cds.unistra.fr/simbad")
        );
        assert_eq!(cfg.search_radius_arcmin, Some(0.5));
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(90));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_rejects_invalid_rate_limit() {
        let err = parse_config_str("rate_limit = 60001").expect_err("invalid rate_limit expected");
        assert!(
            err.to_string().contains("rate_limit"),
            "expected rate_limit validation error"
        );
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err =
            parse_config_str("rate_limit = 4 trailing").expect_err("expected trailing token error");
        assert!(err.to_string().contains("rate_limit"));
    }

    #[test]
    fn test_parse_config_rejects_negative_rate_limit() {
        let err = parse_config_str("rate_limit = -5").expect_err("negative value expected");
        assert!(err.to_string().contains("rate_limit"));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
rate_limit = 300 # be gentle
output_dir = "out#1" # hash inside string survives
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.rate_limit, Some(300));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("out#1")));
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_radius() {
        for raw in [
            "search_radius_arcmin = 0",
            "search_radius_arcmin = 61",
            "search_radius_arcmin = -1.5",
        ] {
            let err = parse_config_str(raw).expect_err("radius out of range expected");
            assert!(err.to_string().contains("search_radius_arcmin"), "{raw}");
        }
    }

    #[test]
    fn test_parse_config_rejects_invalid_simbad_url() {
        let err = parse_config_str(r#"simbad_url = "not a url""#).expect_err("bad url expected");
        assert!(err.to_string().contains("simbad_url"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("output_dir = reports").expect_err("unquoted string");
        assert!(err.to_string().contains("output_dir"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("cache_citations = yes").expect_err("invalid boolean expected");
        assert!(err.to_string().contains("cache_citations"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err =
            parse_config_str("connect_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("connect_timeout_secs"));

        let err =
            parse_config_str("read_timeout_secs = 3601").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("rate_limit 250").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_verbosity() {
        let err = parse_config_str(r#"verbosity = "loud""#).expect_err("unknown verbosity");
        assert!(err.to_string().contains("verbosity"));
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(VerbositySetting::Default.as_flags(), (0, false));
        assert_eq!(VerbositySetting::Verbose.as_flags(), (1, false));
        assert_eq!(VerbositySetting::Debug.as_flags(), (2, false));
        assert_eq!(VerbositySetting::Quiet.as_flags(), (0, true));
    }

    #[test]
    fn test_load_file_config_reports_path_on_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "bogus = 1\n").expect("write config");

        let err = load_file_config(&path).expect_err("unknown key expected");
        let rendered = format!("{err:#}");
        assert!(rendered.contains("Failed to parse config file"));
        assert!(rendered.contains("bogus"));
    }
}
