//! Error types for taxonomy extraction.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur while extracting classification rows.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// Fetching the object detail page failed
    #[error("detail page lookup for '{identifier}' failed: {source}")]
    Fetch {
        /// Object identifier
        identifier: String,
        /// Catalog failure
        #[source]
        source: CatalogError,
    },

    /// The positional table is not present in the document
    #[error(
        "detail page has {found} tables, expected table index {index}\n  Suggestion: The catalog page layout may have changed"
    )]
    MissingTable {
        /// Expected 0-based table index
        index: usize,
        /// Tables found in the document
        found: usize,
    },

    /// A classification marker lacks the node that carries its tag
    #[error("classification marker #{marker} has no tag: {reason}")]
    MissingTag {
        /// 0-based marker position within the table
        marker: usize,
        /// Which step of the traversal failed
        reason: &'static str,
    },

    /// A `Ref` tooltip without a link to the reference
    #[error("classification marker #{marker} cites 'Ref' but has no bibcode link")]
    MissingReferenceLink {
        /// 0-based marker position within the table
        marker: usize,
    },
}
