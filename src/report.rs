//! Plain-text report synthesis.
//!
//! A report combines the region query metadata, the taxonomy rows and the
//! resolved citations of every bibcode involved:
//!
//! ```text
//! Identifier: [RRC99] VLA 7
//!
//! Coordinates (ICRS): 05 35 24.5503 -05 06 59.003 Reipurth99 [1999AJ....118..983R]
//!
//! Distance to center (arcsec): 0.01
//!
//! Type: Radio
//!
//! All types: Rad ([RRC99])
//!
//! Spectral type: ~
//!
//! References:
//! 1999AJ....118..983R http://simbad.u-strasbg.fr/simbad/sim-ref?bibcode=1999AJ....118..983R
//! ```

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::catalog::{Catalog, RegionMatch};
use crate::coordinates::{CoordinateError, SkyCoord};
use crate::reference::{CitationError, ReferenceResolver, compile_static_regex};
use crate::taxonomy::TaxonomyEntries;

/// A bibcode wrapped in curly braces inside an annotation.
static BRACED_BIBCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"\{([^{}]+)\}"));

/// Errors raised while rendering or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A citation could not be resolved
    #[error(transparent)]
    Citation(#[from] CitationError),

    /// The report could not be written to its sink
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-object data reported by the region query.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMetadata {
    /// Main identifier.
    pub identifier: String,
    /// Identifier list; falls back to `identifier` in the report when empty.
    pub aliases: String,
    /// Right ascension as reported by the catalog.
    pub ra: String,
    /// Declination as reported by the catalog.
    pub dec: String,
    /// Distance to the query center in arcseconds, rounded to 2 decimals.
    pub distance_arcsec: f64,
    /// Spectral type.
    pub spectral_type: String,
    /// Wavelength class of the coordinate measurement.
    pub wavelength: String,
    /// Verbose object type.
    pub object_type: String,
    /// Bibcode backing the coordinates.
    pub primary_bibcode: String,
}

impl ObjectMetadata {
    /// Builds metadata from a region match, measuring its distance to `center`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when the catalog coordinates do not parse.
    pub fn from_region(region: RegionMatch, center: &SkyCoord) -> Result<Self, CoordinateError> {
        let position = SkyCoord::from_parts(&region.ra, &region.dec)?;
        let distance = round_to_hundredths(center.separation_arcsec(&position));

        Ok(Self {
            identifier: region.main_id,
            aliases: region.identifiers,
            ra: region.ra,
            dec: region.dec,
            distance_arcsec: distance,
            spectral_type: region.spectral_type,
            wavelength: region.coo_wavelength,
            object_type: region.object_type,
            primary_bibcode: region.coo_bibcode,
        })
    }
}

/// Everything needed to render one report.
#[derive(Debug)]
pub struct ObjectRecord {
    /// Region query metadata.
    pub metadata: ObjectMetadata,
    /// Taxonomy rows, consumed by rendering.
    pub taxonomy: TaxonomyEntries,
}

/// Renders reports, resolving every cited bibcode through the resolver.
pub struct ReportSynthesizer {
    catalog: Arc<dyn Catalog>,
    resolver: Arc<ReferenceResolver>,
}

impl ReportSynthesizer {
    /// Creates a synthesizer; `catalog` supplies reference page URLs.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, resolver: Arc<ReferenceResolver>) -> Self {
        Self { catalog, resolver }
    }

    /// Renders the report text of `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Citation`] when any bibcode fails to resolve.
    #[instrument(skip_all, fields(identifier = %record.metadata.identifier))]
    pub async fn render(&self, record: ObjectRecord) -> Result<String, ReportError> {
        let ObjectRecord { metadata, taxonomy } = record;
        let mut out = String::new();

        let identifier = if metadata.aliases.is_empty() {
            &metadata.identifier
        } else {
            &metadata.aliases
        };
        out.push_str(&format!("Identifier: {identifier}\n"));

        let primary = self.resolver.resolve(&metadata.primary_bibcode).await?;
        out.push_str(&format!(
            "\nCoordinates (ICRS): {} {} {primary} [{}]\n",
            metadata.ra, metadata.dec, metadata.primary_bibcode
        ));
        out.push_str(&format!(
            "\nDistance to center (arcsec): {}\n",
            format_distance(metadata.distance_arcsec)
        ));
        out.push_str(&format!("\nType: {}\n", metadata.object_type));

        let entries: Vec<_> = taxonomy.collect();
        let mut rendered = Vec::with_capacity(entries.len());
        for entry in &entries {
            let annotation = self.substitute_citations(entry.annotation()).await?;
            rendered.push(format!("{} ({annotation})", entry.tag()));
        }
        out.push_str(&format!("\nAll types: {}\n", rendered.join(", ")));

        out.push_str(&format!("\nSpectral type: {}\n", metadata.spectral_type));

        out.push_str("\nReferences:\n");
        out.push_str(&format!(
            "{} {}\n",
            metadata.primary_bibcode,
            self.catalog.reference_url(&metadata.primary_bibcode)
        ));

        let mut references = BTreeSet::new();
        for entry in &entries {
            for bibcode in braced_bibcodes(entry.annotation()) {
                let citation = self.resolver.resolve(&bibcode).await?;
                references.insert(format!(
                    "{citation} {}",
                    self.catalog.reference_url(&bibcode)
                ));
            }
        }
        debug!(references = references.len(), "collected distinct references");
        for line in references {
            out.push_str(&line);
            out.push('\n');
        }

        Ok(out)
    }

    /// Renders `record` and writes the text to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when rendering or writing fails.
    pub async fn write_report<W: Write + Send>(
        &self,
        record: ObjectRecord,
        sink: &mut W,
    ) -> Result<(), ReportError> {
        let text = self.render(record).await?;
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Replaces each `{bibcode}` in `annotation` with its citation, leaving
    /// bracketed designators untouched.
    async fn substitute_citations(&self, annotation: &str) -> Result<String, CitationError> {
        let spans: Vec<(usize, usize, String)> = BRACED_BIBCODE_RE
            .captures_iter(annotation)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let bibcode = caps.get(1)?;
                Some((whole.start(), whole.end(), bibcode.as_str().to_string()))
            })
            .collect();

        let mut out = String::with_capacity(annotation.len());
        let mut cursor = 0;
        for (start, end, bibcode) in spans {
            out.push_str(&annotation[cursor..start]);
            out.push_str(&self.resolver.resolve(&bibcode).await?);
            cursor = end;
        }
        out.push_str(&annotation[cursor..]);
        Ok(out)
    }
}

impl std::fmt::Debug for ReportSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportSynthesizer")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Returns the bibcodes wrapped in curly braces in `annotation`, in order.
fn braced_bibcodes(annotation: &str) -> Vec<String> {
    BRACED_BIBCODE_RE
        .captures_iter(annotation)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest decimal form, always with a fractional part (`0.0`, `1.5`, `12.34`).
fn format_distance(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}
