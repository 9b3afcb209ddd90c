//! Ikman.lk extractor
//!
//! Selector chains start with the site's current hashed class names and fall
//! back to older and more generic shapes, so a markup refresh degrades to the
//! next pattern instead of an empty harvest.

use crate::extract::{
    absolutize, all_in, clean_price, first_attr, first_text, strip_parentheses, ParseError,
    SourceExtractor,
};
use crate::record::{DetailFields, Listing};
use scraper::Html;
use url::Url;

const AD_CONTAINERS: &[&str] = &["li.normal--2QYVk", "li.normal", "div.card", "div.listing-card"];
const TITLE: &[&str] = &["h2.heading--2eONR", "h2.heading", ".title", ".ad-title"];
const LINK: &[&str] = &[
    "a.card-link--3ssYv",
    "a.card-link",
    r#"a[href*="/en/ad/"]"#,
    "a.ad-link",
];
const IMAGE: &[&str] = &["img", ".card-img img", ".thumbnail img"];

const LOCATION: &[&str] = &[
    "a.subtitle-location-link--1q5zA span",
    "a.subtitle-location-link span",
    ".location span",
    ".ad-location",
];
const PRICE: &[&str] = &[
    "div.amount--3NTpl",
    "div.amount",
    ".price",
    ".ad-price",
    "span.amount",
];
const PROPERTY_TYPE: &[&str] = &[
    "a.ad-meta-desktop--1Zyra span",
    "a.ad-meta-desktop span",
    ".property-type",
    ".category span",
];
const ADDRESS_VALUES: &[&str] = &[r#"#app-wrapper div[class*="value"]"#, "div.value"];

const ADDRESS_KEYWORDS: &[&str] = &["road", "street", "lane", "avenue", "colombo", "kandy"];

pub struct IkmanExtractor {
    base_url: Url,
}

impl IkmanExtractor {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl SourceExtractor for IkmanExtractor {
    fn source_label(&self) -> &'static str {
        "Ikman.lk"
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<Listing>, ParseError> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let containers = all_in(root, AD_CONTAINERS);
        if containers.is_empty() {
            return Err(ParseError::NoListingStructure);
        }

        let mut stubs = Vec::new();
        for ad in containers {
            let title = match first_text(ad, TITLE) {
                Some(title) => strip_parentheses(&title),
                None => continue,
            };
            let link = match first_attr(ad, LINK, &["href"]) {
                Some(href) => absolutize(&self.base_url, &href),
                None => continue,
            };

            let mut stub = Listing::stub(title, link);
            if let Some(image) = first_attr(ad, IMAGE, &["src", "data-src"]) {
                stub.image_url = image;
            }
            stubs.push(stub);
        }

        Ok(stubs)
    }

    fn parse_detail(&self, html: &str) -> DetailFields {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let location = first_text(root, LOCATION);
        let sqft = find_sqft_in(root);
        let address = find_address_in(root);
        let price = first_text(root, PRICE).map(|raw| clean_price(&raw));

        let property_type = first_text(root, PROPERTY_TYPE)
            .or_else(|| first_text(root, &["title"]).map(|title| type_from_title(&title)));

        DetailFields {
            sqft,
            property_type,
            location,
            address,
            image_url: None,
            price,
        }
    }
}

/// Scans the attribute panels for a "<number> sqft" occurrence.
fn find_sqft_in(root: scraper::ElementRef<'_>) -> Option<String> {
    for element in all_in(root, &["div"]) {
        let text = crate::extract::text_of(element);
        if let Some(sqft) = find_sqft(&text) {
            return Some(sqft);
        }
    }
    None
}

/// Extracts the digits immediately preceding a "sqft" token.
fn find_sqft(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find("sqft") {
        let at = from + pos;
        let head = text[..at].trim_end();
        let run: String = head
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .collect();
        let digits: String = run.chars().filter(|c| c.is_ascii_digit()).rev().collect();
        if !digits.is_empty() {
            return Some(digits);
        }
        from = at + "sqft".len();
    }
    None
}

fn find_address_in(root: scraper::ElementRef<'_>) -> Option<String> {
    // Attribute-value panels first, skipping the sqft row.
    for element in all_in(root, ADDRESS_VALUES) {
        let text = crate::extract::text_of(element);
        if !text.is_empty() && !text.to_ascii_lowercase().contains("sqft") {
            return Some(text);
        }
    }

    // Keyword sweep over leaf-sized nodes.
    for element in all_in(root, &["div, span"]) {
        let text = crate::extract::text_of(element);
        if text.len() <= 5 || text.len() > 100 {
            continue;
        }
        let lower = text.to_ascii_lowercase();
        if lower.contains("sqft") {
            continue;
        }
        if ADDRESS_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return Some(text);
        }
    }
    None
}

fn type_from_title(title: &str) -> String {
    let lower = title.to_ascii_lowercase();
    let label = if lower.contains("office") {
        "Office Space"
    } else if lower.contains("shop") {
        "Shop"
    } else if lower.contains("warehouse") {
        "Warehouse"
    } else if lower.contains("building") {
        "Building"
    } else {
        "Commercial Property"
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MISSING;

    fn extractor() -> IkmanExtractor {
        IkmanExtractor::new(Url::parse("https://ikman.lk").unwrap())
    }

    const LISTING_PAGE: &str = r#"<html><body><ul>
        <li class="normal">
            <h2 class="heading">Office space in Colombo 03 (prime)</h2>
            <a class="card-link" href="/en/ad/office-colombo-3">view</a>
            <img src="https://cdn.ikman.lk/office.jpg">
        </li>
        <li class="normal">
            <h2 class="heading">Shop for rent</h2>
            <a class="card-link" href="https://ikman.lk/en/ad/shop-42">view</a>
        </li>
        <li class="normal">
            <h2 class="heading">No link here</h2>
        </li>
    </ul></body></html>"#;

    #[test]
    fn test_parse_listing_with_fallback_selectors() {
        let stubs = extractor().parse_listing(LISTING_PAGE).unwrap();
        assert_eq!(stubs.len(), 2);

        assert_eq!(stubs[0].title, "Office space in Colombo 03");
        assert_eq!(stubs[0].link, "https://ikman.lk/en/ad/office-colombo-3");
        assert_eq!(stubs[0].image_url, "https://cdn.ikman.lk/office.jpg");
        assert_eq!(stubs[0].price, MISSING);

        assert_eq!(stubs[1].link, "https://ikman.lk/en/ad/shop-42");
        assert_eq!(stubs[1].image_url, MISSING);
    }

    #[test]
    fn test_parse_listing_without_structure() {
        let result = extractor().parse_listing("<html><body><p>maintenance</p></body></html>");
        assert!(matches!(result, Err(ParseError::NoListingStructure)));
    }

    const DETAIL_PAGE: &str = r#"<html><head><title>Warehouse for rent</title></head><body>
        <div id="app-wrapper">
            <a class="subtitle-location-link"><span>Colombo 05</span></a>
            <div class="amount">Rs 250,000/month</div>
            <div class="spec"><div>2,500 sqft</div></div>
            <div class="value">Galle Road</div>
        </div>
    </body></html>"#;

    #[test]
    fn test_parse_detail() {
        let details = extractor().parse_detail(DETAIL_PAGE);
        assert_eq!(details.location.as_deref(), Some("Colombo 05"));
        assert_eq!(details.price.as_deref(), Some("250000"));
        assert_eq!(details.sqft.as_deref(), Some("2500"));
        assert_eq!(details.address.as_deref(), Some("Galle Road"));
        assert_eq!(details.property_type.as_deref(), Some("Warehouse"));
        assert_eq!(details.image_url, None);
    }

    #[test]
    fn test_parse_detail_empty_document() {
        let details = extractor().parse_detail("<html><body></body></html>");
        assert_eq!(details.location, None);
        assert_eq!(details.sqft, None);
        assert_eq!(details.price, None);
    }

    #[test]
    fn test_find_sqft() {
        assert_eq!(find_sqft("about 1,250 sqft total"), Some("1250".to_string()));
        assert_eq!(find_sqft("sqft unknown"), None);
        assert_eq!(find_sqft("no area here"), None);
    }

    #[test]
    fn test_type_from_title() {
        assert_eq!(type_from_title("Modern Office Colombo"), "Office Space");
        assert_eq!(type_from_title("shop in kandy"), "Shop");
        assert_eq!(type_from_title("Bare land"), "Commercial Property");
    }
}
