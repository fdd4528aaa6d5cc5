//! Report content selection
//!
//! Resort report pages carry a lot of chrome around a single report region.
//! Sending only that region's text to the extraction backend keeps prompts
//! small; when the region cannot be found the full markup is sent instead, so
//! extraction is always attempted.

use scraper::{Html, Selector};

/// CSS selector for the report region on resort pages
///
/// The site uses hashed CSS-module class names, so match on the stable prefix
/// rather than the full class.
const REPORT_REGION_SELECTOR: &str = "div[class*='skireport_reportContent']";

/// Returns the whitespace-collapsed text of the report region
///
/// Total function: if the region is absent the entire input is returned
/// unmodified, never an error.
pub fn select_report_content(html: &str) -> String {
    let selector = match Selector::parse(REPORT_REGION_SELECTOR) {
        Ok(s) => s,
        Err(_) => return html.to_string(),
    };

    let document = Html::parse_document(html);

    match document.select(&selector).next() {
        Some(region) => region
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        None => html.to_string(),
    }
}
