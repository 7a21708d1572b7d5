//! Error types for catalog requests.

use thiserror::Error;

/// Errors raised while talking to the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request could not be sent or the connection failed
    #[error("catalog request to {url} failed: {source}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// Catalog answered with a non-success status
    #[error("catalog returned HTTP {status} for {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Catalog reported a script or query error in its response body
    #[error("catalog rejected query '{query}': {message}")]
    QueryRejected {
        /// The query that was submitted
        query: String,
        /// Error text from the catalog
        message: String,
    },

    /// Query succeeded but no object matched
    #[error("no catalog object matched '{query}'\n  Suggestion: Widen the search radius or check the coordinates")]
    NoMatch {
        /// The query that was submitted
        query: String,
    },

    /// Response did not have the expected shape
    #[error("unexpected catalog response for '{query}': {reason}")]
    MalformedResponse {
        /// The query that was submitted
        query: String,
        /// What was wrong with it
        reason: String,
    },

    /// HTTP client could not be built
    #[error("HTTP client construction failed: {0}")]
    ClientBuild(String),

    /// Base URL or query parameters did not form a valid URL
    #[error("invalid catalog URL '{url}': {source}")]
    InvalidUrl {
        /// The URL that failed to parse
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },
}

impl CatalogError {
    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(query: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            query: query.to_string(),
            reason: reason.into(),
        }
    }
}
