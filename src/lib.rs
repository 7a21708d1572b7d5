//! SIMBAD Report Core Library
//!
//! This library resolves astronomical objects by sky coordinates against the
//! SIMBAD catalog and synthesizes a plain-text report per object: the
//! classification taxonomy, spectral type, distance from the query center and
//! a deduplicated list of bibliographic citations.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`rate_gate`] - Process-wide minimum spacing between catalog calls
//! - [`catalog`] - Remote catalog endpoints behind the [`Catalog`] trait
//! - [`reference`] - Bibcode to `SurnameYY` citation resolution
//! - [`taxonomy`] - Classification rows extracted from the object detail page
//! - [`report`] - Report text synthesis
//! - [`coordinates`] - Sexagesimal coordinate parsing and output naming
//! - [`pipeline`] - Per-object processing and batch iteration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod coordinates;
pub mod pipeline;
pub mod rate_gate;
pub mod reference;
pub mod report;
pub mod taxonomy;
mod user_agent;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, HttpSettings, RegionMatch, SimbadClient};
pub use coordinates::{CoordinateError, SkyCoord, output_filename};
pub use pipeline::{
    BatchFailure, BatchSummary, PipelineError, PipelineOptions, ReportPipeline, input_lines,
};
pub use rate_gate::{DEFAULT_INTERVAL, RateGate};
pub use reference::{CitationError, ReferenceResolver, parse_citation};
pub use report::{ObjectMetadata, ObjectRecord, ReportError, ReportSynthesizer};
pub use taxonomy::{
    ClassificationRows, SimbadTypesTable, TaxonomyEntries, TaxonomyEntry, TaxonomyError,
    TaxonomyExtractor,
};
