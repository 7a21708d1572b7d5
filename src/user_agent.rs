//! Shared User-Agent string for catalog HTTP traffic.
//!
//! Single source for the UA format so every catalog endpoint identifies the
//! tool the same way (good citizenship; RFC 9308).

/// Default User-Agent for catalog requests.
#[must_use]
pub(crate) fn default_catalog_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("simbad-report/{version} (astronomy-research-tool)")
}
