//! Classification taxonomy of a catalog object.
//!
//! Each object carries an ordered list of [`TaxonomyEntry`] rows: a short
//! type mnemonic (`Rad`, `IR`, `Y*O`, ...) plus an annotation listing the
//! references behind it. Literal catalog designators stay in square brackets
//! (`[RRC99]`); resolvable bibcodes are wrapped in curly braces
//! (`{2012ApJ...753L..35B}`) for later citation substitution.
//!
//! Locating the rows in the detail page is delegated to a
//! [`ClassificationRows`] strategy so that the page-layout specific traversal
//! can be swapped out and tested against captured documents.

mod error;
mod simbad_page;

pub use error::TaxonomyError;
pub use simbad_page::{DEFAULT_TABLE_INDEX, SimbadTypesTable};

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::rate_gate::RateGate;

/// One classification assigned to an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    tag: String,
    annotation: String,
}

impl TaxonomyEntry {
    /// Creates an entry from a type tag and its raw annotation.
    #[must_use]
    pub fn new(tag: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            annotation: annotation.into(),
        }
    }

    /// Classification mnemonic.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Comma-joined reference markers, bibcodes in curly braces.
    #[must_use]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }
}

/// Strategy that turns a detail page into ordered classification rows.
pub trait ClassificationRows: Send + Sync {
    /// Returns every classification row of `html` in document order.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError`] when the document does not have the
    /// expected structure.
    fn classification_rows(&self, html: &str) -> Result<Vec<TaxonomyEntry>, TaxonomyError>;
}

/// Single-pass sequence of taxonomy entries in document order.
///
/// Deliberately not `Clone`: extracting again requires a fresh fetch.
#[derive(Debug)]
pub struct TaxonomyEntries {
    inner: std::vec::IntoIter<TaxonomyEntry>,
}

impl TaxonomyEntries {
    /// Wraps already extracted rows.
    #[must_use]
    pub fn new(rows: Vec<TaxonomyEntry>) -> Self {
        Self {
            inner: rows.into_iter(),
        }
    }

    /// An empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Iterator for TaxonomyEntries {
    type Item = TaxonomyEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TaxonomyEntries {}

/// Fetches an object's detail page through the rate gate and extracts its
/// classification rows.
pub struct TaxonomyExtractor {
    catalog: Arc<dyn Catalog>,
    gate: Arc<RateGate>,
    strategy: Box<dyn ClassificationRows>,
}

impl TaxonomyExtractor {
    /// Creates an extractor reading the current SIMBAD page layout.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, gate: Arc<RateGate>) -> Self {
        Self::with_strategy(catalog, gate, Box::new(SimbadTypesTable::new()))
    }

    /// Creates an extractor with a custom row extraction strategy.
    #[must_use]
    pub fn with_strategy(
        catalog: Arc<dyn Catalog>,
        gate: Arc<RateGate>,
        strategy: Box<dyn ClassificationRows>,
    ) -> Self {
        Self {
            catalog,
            gate,
            strategy,
        }
    }

    /// Returns the taxonomy of `identifier` in document order.
    ///
    /// Duplicate tags are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::Fetch`] when the detail page cannot be
    /// retrieved, or a structural error from the strategy.
    #[instrument(skip(self))]
    pub async fn extract(&self, identifier: &str) -> Result<TaxonomyEntries, TaxonomyError> {
        self.gate.acquire().await;
        let html = self
            .catalog
            .object_page(identifier)
            .await
            .map_err(|source| TaxonomyError::Fetch {
                identifier: identifier.to_string(),
                source,
            })?;

        let rows = self.strategy.classification_rows(&html)?;
        debug!(entries = rows.len(), "taxonomy extracted");
        Ok(TaxonomyEntries::new(rows))
    }
}

impl std::fmt::Debug for TaxonomyExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxonomyExtractor")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
