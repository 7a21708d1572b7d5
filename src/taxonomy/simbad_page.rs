//! Positional extraction of classification rows from the SIMBAD detail page.
//!
//! The detail page has no stable markup for object types. The rows live in the
//! fourth `<table>` of the document; each one is a `<tt title="...">` marker
//! whose tooltip lists the references, preceded (two sibling nodes back, past
//! a whitespace text node) by the element holding the type mnemonic.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use super::{ClassificationRows, TaxonomyEntry, TaxonomyError};

/// 0-based index of the classification table on the detail page.
pub const DEFAULT_TABLE_INDEX: usize = 3;

/// Tooltip token standing for "the linked reference".
const REF_TOKEN: &str = "Ref";

/// Query parameter carrying the bibcode in reference links.
const BIBCODE_PARAM: &str = "?bibcode=";

static TABLE: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("table"));
static MARKER: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("tt[title]"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a"));

/// Compiles a CSS selector at static init; panics on invalid pattern.
fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e}"))
}

/// Reads classification rows from a fixed table position on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimbadTypesTable {
    table_index: usize,
}

impl SimbadTypesTable {
    /// Uses the table position of the current page layout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table_index(DEFAULT_TABLE_INDEX)
    }

    /// Uses a different 0-based table position.
    #[must_use]
    pub fn with_table_index(table_index: usize) -> Self {
        Self { table_index }
    }

    /// Returns the 0-based table position this strategy reads.
    #[must_use]
    pub fn table_index(&self) -> usize {
        self.table_index
    }
}

impl Default for SimbadTypesTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassificationRows for SimbadTypesTable {
    fn classification_rows(&self, html: &str) -> Result<Vec<TaxonomyEntry>, TaxonomyError> {
        let document = Html::parse_document(html);
        let tables: Vec<ElementRef<'_>> = document.select(&TABLE).collect();
        let table = tables
            .get(self.table_index)
            .ok_or(TaxonomyError::MissingTable {
                index: self.table_index,
                found: tables.len(),
            })?;

        let mut rows = Vec::new();
        for (position, marker) in table.select(&MARKER).enumerate() {
            let tag = type_tag(position, marker)?;
            let annotation = annotation(position, marker)?;
            trace!(tag = %tag, annotation = %annotation, "classification row");
            rows.push(TaxonomyEntry::new(tag, annotation));
        }

        debug!(rows = rows.len(), "extracted classification rows");
        Ok(rows)
    }
}

/// Reads the type mnemonic from the previous-previous sibling of `marker`:
/// its second child node, whose first child must be text.
fn type_tag(position: usize, marker: ElementRef<'_>) -> Result<String, TaxonomyError> {
    let missing = |reason| TaxonomyError::MissingTag {
        marker: position,
        reason,
    };

    let holder = marker
        .prev_sibling()
        .and_then(|node| node.prev_sibling())
        .ok_or_else(|| missing("no second previous sibling"))?;
    let inner = holder
        .children()
        .nth(1)
        .ok_or_else(|| missing("sibling has fewer than two child nodes"))?;
    let text = inner
        .first_child()
        .and_then(|node| node.value().as_text().map(|text| text.trim().to_string()))
        .ok_or_else(|| missing("tag node does not start with text"))?;

    Ok(text)
}

/// Normalizes the tooltip to `", "`-joined form and replaces `Ref` with the
/// linked bibcode in curly braces.
fn annotation(position: usize, marker: ElementRef<'_>) -> Result<String, TaxonomyError> {
    let title = marker.value().attr("title").unwrap_or_default();
    let title = title.split(',').collect::<Vec<_>>().join(", ");

    if !title.contains(REF_TOKEN) {
        return Ok(title);
    }

    let bibcode = marker
        .select(&ANCHOR)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .and_then(bibcode_from_href)
        .ok_or(TaxonomyError::MissingReferenceLink { marker: position })?;

    Ok(title.replace(REF_TOKEN, &format!("{{{bibcode}}}")))
}

/// Extracts the percent-decoded bibcode following `?bibcode=` in a link.
fn bibcode_from_href(href: &str) -> Option<String> {
    let (_, raw) = href.rsplit_once(BIBCODE_PARAM)?;
    let raw = raw.split(['&', '#']).next().unwrap_or_default();
    if raw.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
    Some(decoded)
}
