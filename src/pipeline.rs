//! Per-object report pipeline and batch processing.
//!
//! One coordinate line goes through: parse, region query, taxonomy
//! extraction, report rendering, file write. A failure aborts only that
//! object; [`ReportPipeline::run_batch`] records it and moves on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::catalog::{Catalog, CatalogError, DEFAULT_REGION_RADIUS_ARCMIN};
use crate::coordinates::{CoordinateError, REPORT_EXTENSION, SkyCoord, output_filename};
use crate::rate_gate::RateGate;
use crate::reference::ReferenceResolver;
use crate::report::{ObjectMetadata, ObjectRecord, ReportError, ReportSynthesizer};
use crate::taxonomy::{TaxonomyError, TaxonomyExtractor};

/// Errors that abort processing of a single object.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input line is not a valid coordinate
    #[error("invalid coordinates: {0}")]
    Coordinates(#[from] CoordinateError),

    /// Region query failed
    #[error("region query failed: {0}")]
    Region(#[from] CatalogError),

    /// Taxonomy extraction failed
    #[error("taxonomy extraction failed: {0}")]
    Taxonomy(#[from] TaxonomyError),

    /// Report rendering failed
    #[error("report rendering failed: {0}")]
    Report(#[from] ReportError),

    /// Report file could not be written
    #[error("failed to write report to '{path}': {source}")]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Tunables of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Directory receiving the report files.
    pub output_dir: PathBuf,
    /// Region query radius in arcminutes.
    pub radius_arcmin: f64,
    /// Memoize citations for the rest of the run.
    pub cache_citations: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            radius_arcmin: DEFAULT_REGION_RADIUS_ARCMIN,
            cache_citations: true,
        }
    }
}

/// A line that failed during a batch run.
#[derive(Debug)]
pub struct BatchFailure {
    /// 1-based position among the processed (non-comment) lines.
    pub index: usize,
    /// The coordinate line.
    pub line: String,
    /// Why it failed.
    pub error: PipelineError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Written report paths, in input order.
    pub written: Vec<PathBuf>,
    /// Lines that failed, in input order.
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    /// Number of reports written.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.written.len()
    }

    /// Number of failed lines.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of lines processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.failed()
    }
}

/// Returns the coordinate lines of an input file: trimmed, without blank
/// lines or `#` comments.
pub fn input_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Wires the catalog, rate gate, extractor and synthesizer together.
pub struct ReportPipeline {
    catalog: Arc<dyn Catalog>,
    gate: Arc<RateGate>,
    extractor: TaxonomyExtractor,
    synthesizer: ReportSynthesizer,
    options: PipelineOptions,
}

impl ReportPipeline {
    /// Creates a pipeline; every catalog call shares `gate`.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, gate: Arc<RateGate>, options: PipelineOptions) -> Self {
        let resolver = if options.cache_citations {
            ReferenceResolver::with_cache(Arc::clone(&catalog), Arc::clone(&gate))
        } else {
            ReferenceResolver::new(Arc::clone(&catalog), Arc::clone(&gate))
        };

        Self {
            extractor: TaxonomyExtractor::new(Arc::clone(&catalog), Arc::clone(&gate)),
            synthesizer: ReportSynthesizer::new(Arc::clone(&catalog), Arc::new(resolver)),
            catalog,
            gate,
            options,
        }
    }

    /// Returns the directory reports are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.options.output_dir
    }

    /// Processes one coordinate line and returns the written report path.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for any failure along the way; nothing is
    /// written in that case.
    #[instrument(skip(self))]
    pub async fn process(&self, line: &str) -> Result<PathBuf, PipelineError> {
        let center = SkyCoord::parse(line)?;

        self.gate.acquire().await;
        let region = self
            .catalog
            .query_region(&center, self.options.radius_arcmin)
            .await?;
        let metadata = ObjectMetadata::from_region(region, &center).map_err(|error| {
            CatalogError::malformed(line, format!("unparseable object coordinates: {error}"))
        })?;

        let taxonomy = self.extractor.extract(&metadata.identifier).await?;
        let record = ObjectRecord { metadata, taxonomy };
        let text = self.synthesizer.render(record).await?;

        let path = self
            .options
            .output_dir
            .join(output_filename(&center, REPORT_EXTENSION));
        tokio::fs::write(&path, text)
            .await
            .map_err(|source| PipelineError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    /// Processes lines one at a time, recording failures and continuing.
    pub async fn run_batch<'a, I>(&self, lines: I) -> BatchSummary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = BatchSummary::default();

        for (offset, line) in lines.into_iter().enumerate() {
            let index = offset + 1;
            match self.process(line).await {
                Ok(path) => {
                    info!(index, line, path = %path.display(), "report saved");
                    summary.written.push(path);
                }
                Err(error) => {
                    warn!(index, line, error = %error, "object failed; continuing with next line");
                    summary.failures.push(BatchFailure {
                        index,
                        line: line.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            completed = summary.completed(),
            failed = summary.failed(),
            "batch complete"
        );
        summary
    }
}

impl std::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("options", &self.options)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
