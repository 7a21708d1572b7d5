//! SIMBAD implementation of the [`Catalog`] trait.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument};
use url::Url;

use crate::coordinates::SkyCoord;

use super::http_client::build_catalog_http_client;
use super::{Catalog, CatalogError, HttpSettings, RegionMatch};

/// Public SIMBAD base URL.
pub const DEFAULT_SIMBAD_BASE_URL: &str = "http://simbad.u-strasbg.fr/simbad";

/// Search radius of the detail page lookup, in arcminutes.
const DETAIL_RADIUS_ARCMIN: &str = "2";

/// Field separator used in the region query output format.
const FIELD_SEPARATOR: char = '|';

/// Output format of the region query; field order matches [`RegionMatch`].
const REGION_FORMAT: &str =
    "%MAIN_ID|%IDLIST(1)|%COO(A)|%COO(D)|%COO(B)|%COO(W)|%SP(S)|%OTYPE(V)";

const REGION_FIELD_COUNT: usize = 8;

/// Header and rule of the tabular reference rendering.
const REFERENCE_HEADER: &str = "References";
const REFERENCE_RULE_WIDTH: usize = 80;

/// HTTP client for the SIMBAD script and identifier endpoints.
pub struct SimbadClient {
    client: Client,
    base_url: String,
}

impl SimbadClient {
    /// Creates a client for the public SIMBAD service.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when HTTP client construction fails.
    pub fn new(settings: HttpSettings) -> Result<Self, CatalogError> {
        Self::with_base_url(DEFAULT_SIMBAD_BASE_URL, settings)
    }

    /// Creates a client with a custom base URL (mirrors, tests).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when HTTP client construction fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        settings: HttpSettings,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            client: build_catalog_http_client(settings)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url, CatalogError> {
        let raw = format!("{}/{name}", self.base_url);
        Url::parse_with_params(&raw, params).map_err(|source| CatalogError::InvalidUrl {
            url: raw,
            source,
        })
    }

    async fn get_text(&self, url: Url, accept: &str) -> Result<String, CatalogError> {
        let url_text = url.to_string();
        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url_text.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus {
                url: url_text,
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url_text,
                source,
            })
    }

    async fn run_script(
        &self,
        query: &str,
        format: Option<&str>,
    ) -> Result<Vec<String>, CatalogError> {
        let mut script = String::from("output console=off script=off\n");
        if let Some(format) = format {
            script.push_str(&format!("format object \"{format}\"\n"));
        }
        script.push_str(query);

        let url = self.endpoint("sim-script", &[("script", script.as_str())])?;
        debug!(query, "submitting catalog script");
        let body = self.get_text(url, "text/plain").await?;
        data_section(query, &body)
    }
}

impl std::fmt::Debug for SimbadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimbadClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Catalog for SimbadClient {
    #[instrument(skip(self), fields(center = %center.to_query_string()))]
    async fn query_region(
        &self,
        center: &SkyCoord,
        radius_arcmin: f64,
    ) -> Result<RegionMatch, CatalogError> {
        let query = format!(
            "query coo {} radius={radius_arcmin}m",
            center.to_query_string()
        );
        let lines = self.run_script(&query, Some(REGION_FORMAT)).await?;
        let first = lines
            .first()
            .ok_or_else(|| CatalogError::NoMatch { query: query.clone() })?;
        parse_region_line(&query, first)
    }

    #[instrument(skip(self))]
    async fn reference_block(&self, bibcode: &str) -> Result<String, CatalogError> {
        let query = format!("query bibcode {bibcode}");
        let lines = self.run_script(&query, None).await?;
        if lines.is_empty() {
            return Err(CatalogError::NoMatch { query });
        }

        let mut block = vec![REFERENCE_HEADER.to_string(), "-".repeat(REFERENCE_RULE_WIDTH)];
        block.extend(lines);
        Ok(block.join("\n"))
    }

    #[instrument(skip(self))]
    async fn object_page(&self, identifier: &str) -> Result<String, CatalogError> {
        let url = self.endpoint(
            "sim-id",
            &[
                ("Ident", identifier),
                ("NbIdent", "1"),
                ("Radius", DETAIL_RADIUS_ARCMIN),
                ("Radius.unit", "arcmin"),
                ("submit", "submit id"),
            ],
        )?;
        self.get_text(
            url,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .await
    }

    fn reference_url(&self, bibcode: &str) -> String {
        format!(
            "{}/sim-ref?bibcode={}",
            self.base_url,
            urlencoding::encode(bibcode)
        )
    }
}

/// Extracts the non-empty lines of the `::data::` section of a script response.
///
/// An `::error::` section is turned into [`CatalogError::QueryRejected`].
/// A body without section markers is treated as data in its entirety.
fn data_section(query: &str, body: &str) -> Result<Vec<String>, CatalogError> {
    let mut section: Option<&str> = None;
    let mut data = Vec::new();
    let mut errors = Vec::new();

    for line in body.lines() {
        let trimmed = line.trim();
        if let Some(name) = section_marker(trimmed) {
            section = Some(name);
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        match section {
            Some("data") => data.push(trimmed.to_string()),
            Some("error") => errors.push(trimmed.to_string()),
            Some(_) => {}
            None => data.push(trimmed.to_string()),
        }
    }

    if !errors.is_empty() {
        return Err(CatalogError::QueryRejected {
            query: query.to_string(),
            message: errors.join(" "),
        });
    }

    Ok(data)
}

/// Returns the section name for marker lines such as `::data:::::::`.
fn section_marker(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("::")?;
    let name = rest.split("::").next()?.trim_end_matches(':');
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(name)
}

fn parse_region_line(query: &str, line: &str) -> Result<RegionMatch, CatalogError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() != REGION_FIELD_COUNT {
        return Err(CatalogError::malformed(
            query,
            format!(
                "expected {REGION_FIELD_COUNT} '{FIELD_SEPARATOR}'-separated fields, found {}",
                fields.len()
            ),
        ));
    }

    Ok(RegionMatch {
        main_id: fields[0].to_string(),
        identifiers: fields[1].to_string(),
        ra: fields[2].to_string(),
        dec: fields[3].to_string(),
        coo_bibcode: fields[4].to_string(),
        coo_wavelength: fields[5].to_string(),
        spectral_type: fields[6].to_string(),
        object_type: fields[7].to_string(),
    })
}
