//! Anchor extraction from rendered HTML
//!
//! The browser hands back the live DOM serialized as HTML; this module pulls
//! the raw `href` values out of it. Resolution against the page URL happens
//! later in the normalizer.

use scraper::{Html, Selector};

/// Extracts raw `href` values from every `<a href>` in the document
///
/// # Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, including nav and footer
///
/// **Exclude:**
/// - empty hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
///
/// Values are returned trimmed, in document order, duplicates included.
///
/// # Example
///
/// ```
/// use docprint::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="/docs/a">A</a><a href="mailto:x@y.z">mail</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/docs/a".to_string()]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !is_ignored_scheme(href))
        .map(str::to_string)
        .collect()
}

/// Checks whether an href uses a scheme that never points at a page
fn is_ignored_scheme(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
