//! Bibliographic code resolution into short `SurnameYY` citations.
//!
//! `1999AJ....118..983R` resolves to `Reipurth99`: the first author's surname,
//! each `-` segment capitalized, followed by the last two digits of the
//! publication year.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::catalog::{Catalog, CatalogError};
use crate::rate_gate::RateGate;

/// 0-based line of the reference block holding the `(YYYY)` publication year.
pub const YEAR_LINE: usize = 3;

/// 0-based line of the reference block holding the author list.
pub const AUTHORS_LINE: usize = 4;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\(([0-9]{4})\)"));

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Errors raised while resolving a bibcode to a citation.
#[derive(Debug, Error)]
pub enum CitationError {
    /// The bibliographic lookup itself failed
    #[error("reference lookup for {bibcode} failed: {source}")]
    Lookup {
        /// Bibcode being resolved
        bibcode: String,
        /// Catalog failure
        #[source]
        source: CatalogError,
    },

    /// The reference block has too few lines
    #[error("reference block has {found} lines, expected at least {expected}")]
    MissingLine {
        /// Lines present
        found: usize,
        /// Lines required
        expected: usize,
    },

    /// No `(YYYY)` year on the year line
    #[error("no parenthesized year in '{line}'")]
    MissingYear {
        /// The line that was searched
        line: String,
    },

    /// Author line has no first token
    #[error("empty author list in reference block")]
    MissingAuthor,

    /// Structural parse error for a specific bibcode
    #[error("cannot parse reference for {bibcode}: {source}")]
    Malformed {
        /// Bibcode being resolved
        bibcode: String,
        /// What was wrong with the block
        #[source]
        source: Box<CitationError>,
    },
}

/// Parses a reference block into a `SurnameYY` citation.
///
/// The block is the catalog's tabular rendering of one reference: line 3
/// contains the year in parentheses (e.g. `Astron. J., 118, 983-989 (1999)`)
/// and line 4 the authors (e.g. `REIPURTH B., RODRIGUEZ L.F. and CHINI R.`).
///
/// # Errors
///
/// Returns [`CitationError`] when a line, the year or the first author is missing.
///
/// # Examples
///
/// ```
/// use simbad_report::parse_citation;
///
/// let block = "References\n----\n2011ApJ...733...50M\nAstrophys. J., 733, 50 (2011)\nMORALES-CALDERON M., STAUFFER J.R. and HILLENBRAND L.A.";
/// assert_eq!(parse_citation(block).unwrap(), "Morales-Calderon11");
/// ```
pub fn parse_citation(block: &str) -> Result<String, CitationError> {
    let lines: Vec<&str> = block.trim().lines().collect();
    if lines.len() <= AUTHORS_LINE {
        return Err(CitationError::MissingLine {
            found: lines.len(),
            expected: AUTHORS_LINE + 1,
        });
    }

    let year_line = lines[YEAR_LINE];
    let year = YEAR_RE
        .captures(year_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| CitationError::MissingYear {
            line: year_line.to_string(),
        })?;

    let surname = lines[AUTHORS_LINE]
        .split_whitespace()
        .next()
        .ok_or(CitationError::MissingAuthor)?;

    Ok(format!("{}{}", title_case_surname(surname), &year[2..]))
}

/// `MORALES-CALDERON` becomes `Morales-Calderon`.
fn title_case_surname(surname: &str) -> String {
    surname
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Resolves bibcodes to citations through the rate-gated catalog.
///
/// Without a cache every call performs its own throttled lookup, so a bibcode
/// cited three times costs three catalog round trips. With the cache enabled
/// repeated bibcodes are served from memory for the rest of the run; results
/// are identical either way.
pub struct ReferenceResolver {
    catalog: Arc<dyn Catalog>,
    gate: Arc<RateGate>,
    cache: Option<DashMap<String, String>>,
}

impl ReferenceResolver {
    /// Creates a resolver that looks up every occurrence independently.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, gate: Arc<RateGate>) -> Self {
        Self {
            catalog,
            gate,
            cache: None,
        }
    }

    /// Creates a resolver that memoizes citations for the rest of the run.
    #[must_use]
    pub fn with_cache(catalog: Arc<dyn Catalog>, gate: Arc<RateGate>) -> Self {
        Self {
            catalog,
            gate,
            cache: Some(DashMap::new()),
        }
    }

    /// Returns whether citations are memoized.
    #[must_use]
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Resolves `bibcode` to a `SurnameYY` citation.
    ///
    /// # Errors
    ///
    /// Returns [`CitationError::Lookup`] when the catalog call fails and
    /// [`CitationError::Malformed`] when the returned block cannot be parsed.
    #[instrument(skip(self))]
    pub async fn resolve(&self, bibcode: &str) -> Result<String, CitationError> {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(bibcode)
        {
            debug!(citation = hit.as_str(), "citation cache hit");
            return Ok(hit.clone());
        }

        self.gate.acquire().await;
        let block = self
            .catalog
            .reference_block(bibcode)
            .await
            .map_err(|source| CitationError::Lookup {
                bibcode: bibcode.to_string(),
                source,
            })?;

        let citation = parse_citation(&block).map_err(|source| CitationError::Malformed {
            bibcode: bibcode.to_string(),
            source: Box::new(source),
        })?;
        debug!(citation = %citation, "resolved citation");

        if let Some(cache) = &self.cache {
            cache.insert(bibcode.to_string(), citation.clone());
        }
        Ok(citation)
    }
}

impl std::fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("gate", &self.gate)
            .field("caching", &self.is_caching())
            .finish_non_exhaustive()
    }
}
