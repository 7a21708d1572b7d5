//! In-memory catalog double with per-endpoint call counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use simbad_report::{Catalog, CatalogError, RegionMatch, SkyCoord};

pub const REFERENCE_BASE: &str = "http://simbad.test/simbad";

pub const VLA7_PAGE: &str = include_str!("../fixtures/simbad/vla7.html");
pub const TWOMASS_PAGE: &str = include_str!("../fixtures/simbad/2mass_j05352762.html");

/// Renders a reference block the way the catalog returns it.
pub fn reference_block(bibcode: &str, journal: &str, authors: &str) -> String {
    format!(
        "References\n{}\n{bibcode}  --  ?\n{journal}\n{authors}\nSome title.\nFiles: (abstract)",
        "-".repeat(80)
    )
}

#[derive(Default)]
pub struct FakeCatalog {
    regions: HashMap<String, RegionMatch>,
    references: HashMap<String, String>,
    pages: HashMap<String, String>,
    pub region_calls: AtomicUsize,
    pub reference_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
}

impl FakeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the two fixture objects and their references.
    #[must_use]
    pub fn orion() -> Self {
        Self::new()
            .with_region("05 35 24.550 -05 06 59.00", vla7_region())
            .with_region("05 35 27.63370 -05 09 34.3737", twomass_region())
            .with_page("[RRC99] VLA 7", VLA7_PAGE)
            .with_page("2MASS J05352762-0509337", TWOMASS_PAGE)
            .with_reference(
                "1999AJ....118..983R",
                "Astron. J., 118, 983-989 (1999)",
                "REIPURTH B., RODRIGUEZ L.F., ANGLADA G. and BALLY J.",
            )
            .with_reference(
                "2003yCat.2246....0C",
                "VizieR On-line Data Catalog: II/246 (2003)",
                "CUTRI R.M., SKRUTSKIE M.F., VAN DYK S. et al.",
            )
            .with_reference(
                "2012ApJ...753L..35B",
                "Astrophys. J., 753, L35 (2012)",
                "BILLOT N., MORALES-CALDERON M., STAUFFER J.R. et al.",
            )
            .with_reference(
                "2007MNRAS.374.1413N",
                "Mon. Not. R. Astron. Soc., 374, 1413-1420 (2007)",
                "NUTTER D. and WARD-THOMPSON D.",
            )
    }

    /// Registers the region answer for the query center written as `line`.
    #[must_use]
    pub fn with_region(mut self, line: &str, region: RegionMatch) -> Self {
        let key = SkyCoord::parse(line)
            .expect("fixture coordinates must parse")
            .to_query_string();
        self.regions.insert(key, region);
        self
    }

    #[must_use]
    pub fn with_reference(mut self, bibcode: &str, journal: &str, authors: &str) -> Self {
        self.references.insert(
            bibcode.to_string(),
            reference_block(bibcode, journal, authors),
        );
        self
    }

    #[must_use]
    pub fn with_raw_reference(mut self, bibcode: &str, block: &str) -> Self {
        self.references
            .insert(bibcode.to_string(), block.to_string());
        self
    }

    #[must_use]
    pub fn with_page(mut self, identifier: &str, html: &str) -> Self {
        self.pages.insert(identifier.to_string(), html.to_string());
        self
    }

    pub fn reference_calls(&self) -> usize {
        self.reference_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn region_calls(&self) -> usize {
        self.region_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.reference_calls() + self.page_calls() + self.region_calls()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn query_region(
        &self,
        center: &SkyCoord,
        _radius_arcmin: f64,
    ) -> Result<RegionMatch, CatalogError> {
        self.region_calls.fetch_add(1, Ordering::SeqCst);
        let query = center.to_query_string();
        self.regions
            .get(&query)
            .cloned()
            .ok_or(CatalogError::NoMatch { query })
    }

    async fn reference_block(&self, bibcode: &str) -> Result<String, CatalogError> {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        self.references
            .get(bibcode)
            .cloned()
            .ok_or_else(|| CatalogError::NoMatch {
                query: format!("query bibcode {bibcode}"),
            })
    }

    async fn object_page(&self, identifier: &str) -> Result<String, CatalogError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(identifier)
            .cloned()
            .ok_or_else(|| CatalogError::HttpStatus {
                url: format!("{REFERENCE_BASE}/sim-id?Ident={identifier}"),
                status: 404,
            })
    }

    fn reference_url(&self, bibcode: &str) -> String {
        format!(
            "{REFERENCE_BASE}/sim-ref?bibcode={}",
            urlencoding::encode(bibcode)
        )
    }
}

pub fn vla7_region() -> RegionMatch {
    RegionMatch {
        main_id: "[RRC99] VLA 7".to_string(),
        identifiers: "[RRC99] VLA 7".to_string(),
        ra: "05 35 24.5503".to_string(),
        dec: "-05 06 59.003".to_string(),
        coo_bibcode: "1999AJ....118..983R".to_string(),
        coo_wavelength: "R".to_string(),
        spectral_type: "~".to_string(),
        object_type: "Radio".to_string(),
    }
}

pub fn twomass_region() -> RegionMatch {
    RegionMatch {
        main_id: "2MASS J05352762-0509337".to_string(),
        identifiers: "2MASS J05352762-0509337, HOPS 370".to_string(),
        ra: "05 35 27.6289".to_string(),
        dec: "-05 09 33.764".to_string(),
        coo_bibcode: "2003yCat.2246....0C".to_string(),
        coo_wavelength: "I".to_string(),
        spectral_type: "~".to_string(),
        object_type: "Young Stellar Object".to_string(),
    }
}
