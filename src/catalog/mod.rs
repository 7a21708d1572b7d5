//! Remote catalog endpoints consumed by the report pipeline.
//!
//! The pipeline talks to three SIMBAD endpoints: a region query keyed by
//! coordinates, a bibliographic lookup keyed by bibcode, and the HTML detail
//! page of a single object. They sit behind the object-safe [`Catalog`] trait
//! so the parsing components can be exercised against canned responses.
//!
//! # Example
//!
//! ```no_run
//! use simbad_report::{Catalog, HttpSettings, SimbadClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SimbadClient::new(HttpSettings::default())?;
//! let block = client.reference_block("1999AJ....118..983R").await?;
//! println!("{block}");
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod simbad;

pub use error::CatalogError;
pub use http_client::HttpSettings;
pub use simbad::{DEFAULT_SIMBAD_BASE_URL, SimbadClient};

use async_trait::async_trait;

use crate::coordinates::SkyCoord;

/// Default radius of the region query, in arcminutes.
pub const DEFAULT_REGION_RADIUS_ARCMIN: f64 = 1.0;

/// The closest catalog object returned by a region query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionMatch {
    /// Main identifier, used for the detail page lookup.
    pub main_id: String,
    /// Identifier list as reported by the catalog.
    pub identifiers: String,
    /// Right ascension, sexagesimal hours.
    pub ra: String,
    /// Declination, sexagesimal degrees.
    pub dec: String,
    /// Bibcode backing the coordinate measurement.
    pub coo_bibcode: String,
    /// Wavelength class of the coordinate measurement.
    pub coo_wavelength: String,
    /// Spectral type.
    pub spectral_type: String,
    /// Verbose object type.
    pub object_type: String,
}

/// Remote catalog operations used by the report pipeline.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Arc<dyn Catalog>`, shared by the resolver, the extractor and the pipeline.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns the object closest to `center` within `radius_arcmin`.
    async fn query_region(
        &self,
        center: &SkyCoord,
        radius_arcmin: f64,
    ) -> Result<RegionMatch, CatalogError>;

    /// Returns the tabular text rendering of one bibliographic record.
    ///
    /// Line 3 (0-based) carries the publication year in parentheses and line
    /// 4 the author list.
    async fn reference_block(&self, bibcode: &str) -> Result<String, CatalogError>;

    /// Returns the HTML detail page for `identifier`.
    async fn object_page(&self, identifier: &str) -> Result<String, CatalogError>;

    /// Returns the public URL of the reference page for `bibcode`.
    fn reference_url(&self, bibcode: &str) -> String;
}
