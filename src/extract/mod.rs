//! Source extractor capability
//!
//! Markup parsing is deliberately fenced off from the harvesting pipeline:
//! the core only depends on this module's trait, so selector churn on a
//! remote site can never destabilize the concurrency design. Each source
//! implements the trait with fallback chains: several structural patterns
//! tried in order until one matches.

mod ikman;
mod lankaweb;

pub use ikman::IkmanExtractor;
pub use lankaweb::LankawebExtractor;

use crate::record::{DetailFields, Listing, MISSING};
use scraper::{ElementRef, Selector};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors from markup extraction.
///
/// Always non-fatal: the caller converts a parse failure into zero stubs or
/// an unchanged record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no recognizable listing structure in document")]
    NoListingStructure,
}

/// A source-specific pair of pure parsing functions.
///
/// `parse_listing` turns a listing page into phase-1 stubs; `parse_detail`
/// turns a detail page into the field mapping merged by phase 2. Both take
/// only the document; no network access, no shared state.
pub trait SourceExtractor: Send + Sync {
    /// Value written into the sink's Source column.
    fn source_label(&self) -> &'static str;

    /// Parses a listing page into stubs. An empty document structure is
    /// `Err(NoListingStructure)`; stubs missing a title or link are skipped.
    fn parse_listing(&self, html: &str) -> Result<Vec<Listing>, ParseError>;

    /// Parses a detail page into its field mapping. Best effort: fields the
    /// document does not yield stay `None`.
    fn parse_detail(&self, html: &str) -> DetailFields;
}

/// Source names accepted in configuration.
pub const KNOWN_SOURCES: [&str; 2] = ["ikman", "lankaweb"];

/// Whether `name` maps to an extractor implementation.
pub fn is_known_source(name: &str) -> bool {
    KNOWN_SOURCES.contains(&name)
}

/// Resolves a configured source name to its extractor.
pub fn extractor_for(name: &str, base_url: &Url) -> Option<Arc<dyn SourceExtractor>> {
    match name {
        "ikman" => Some(Arc::new(IkmanExtractor::new(base_url.clone()))),
        "lankaweb" => Some(Arc::new(LankawebExtractor::new(base_url.clone()))),
        _ => None,
    }
}

/// Returns the matches of the first selector in the chain that matches at all.
pub(crate) fn all_in<'a>(scope: ElementRef<'a>, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            let matches: Vec<_> = scope.select(&selector).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
    }
    Vec::new()
}

/// Collected, trimmed text of an element.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First non-empty text matched by the chain.
pub(crate) fn first_text(scope: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            for element in scope.select(&selector) {
                let text = text_of(element);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// First non-empty attribute value matched by the chain; each matched element
/// is probed for the attributes in order (`src` before `data-src`, say).
pub(crate) fn first_attr(
    scope: ElementRef<'_>,
    selectors: &[&str],
    attrs: &[&str],
) -> Option<String> {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            for element in scope.select(&selector) {
                for attr in attrs {
                    if let Some(value) = element.value().attr(attr) {
                        let value = value.trim();
                        if !value.is_empty() {
                            return Some(value.to_string());
                        }
                    }
                }
            }
        }
    }
    None
}

/// Resolves an href against the source's base URL.
pub(crate) fn absolutize(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Strips a price string down to its digits. `"Rs. 45,000/month"` → `"45000"`.
pub fn clean_price(raw: &str) -> String {
    digits_of(raw)
}

/// Strips an area string down to its digits. `"1,250 sqft"` → `"1250"`.
pub fn clean_sqft(raw: &str) -> String {
    digits_of(raw)
}

fn digits_of(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        MISSING.to_string()
    } else {
        digits
    }
}

/// Removes parenthesized spans from a title: `"Shop (negotiable)"` → `"Shop"`.
pub fn strip_parentheses(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0u32;
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_clean_price() {
        assert_eq!(clean_price("Rs. 45,000/month"), "45000");
        assert_eq!(clean_price("Rs 25,000,000 (negotiable)"), "25000000");
        assert_eq!(clean_price("$ 1,200"), "1200");
        assert_eq!(clean_price("Call for price"), MISSING);
        assert_eq!(clean_price(""), MISSING);
    }

    #[test]
    fn test_clean_sqft() {
        assert_eq!(clean_sqft("1,250 sqft"), "1250");
        assert_eq!(clean_sqft("2500"), "2500");
        assert_eq!(clean_sqft("n/a"), MISSING);
    }

    #[test]
    fn test_strip_parentheses() {
        assert_eq!(strip_parentheses("Office (500 sqft) Colombo"), "Office  Colombo");
        assert_eq!(strip_parentheses("Plain title"), "Plain title");
        assert_eq!(strip_parentheses("(all gone)"), "");
    }

    #[test]
    fn test_absolutize() {
        let base = Url::parse("https://ikman.lk").unwrap();
        assert_eq!(
            absolutize(&base, "/en/ad/shop-for-rent"),
            "https://ikman.lk/en/ad/shop-for-rent"
        );
        assert_eq!(
            absolutize(&base, "https://other.example/ad/1"),
            "https://other.example/ad/1"
        );
    }

    #[test]
    fn test_selector_chain_falls_back() {
        let html = Html::parse_document(
            r#"<html><body><div class="secondary"><p>hit</p></div></body></html>"#,
        );
        let found = first_text(html.root_element(), &[".primary p", ".secondary p"]);
        assert_eq!(found, Some("hit".to_string()));
    }

    #[test]
    fn test_first_attr_probes_data_src() {
        let html = Html::parse_document(
            r#"<html><body><img data-src="https://cdn.example/a.jpg"></body></html>"#,
        );
        let found = first_attr(html.root_element(), &["img"], &["src", "data-src"]);
        assert_eq!(found, Some("https://cdn.example/a.jpg".to_string()));
    }

    #[test]
    fn test_registry() {
        let base = Url::parse("https://ikman.lk").unwrap();
        assert!(is_known_source("ikman"));
        assert!(is_known_source("lankaweb"));
        assert!(!is_known_source("zillow"));
        assert!(extractor_for("ikman", &base).is_some());
        assert!(extractor_for("zillow", &base).is_none());
    }
}
