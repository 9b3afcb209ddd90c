//! LankaPropertyWeb.com extractor
//!
//! Unlike Ikman, the listing cards here already expose area, type, and price,
//! so phase-1 stubs arrive richer and the detail page mostly adds location,
//! address, and the banner image.

use crate::extract::{
    absolutize, all_in, clean_price, clean_sqft, first_attr, first_text, strip_parentheses,
    text_of, ParseError, SourceExtractor,
};
use crate::record::{DetailFields, Listing};
use scraper::Html;
use url::Url;

const AD_CONTAINERS: &[&str] = &[
    "article.listing-item",
    ".property-listing-item",
    ".property-card",
    ".listing",
];
const TITLE: &[&str] = &[
    "h4.listing-title",
    ".listing-title",
    ".property-title",
    "h3",
    "h4 a",
];
const SQFT: &[&str] = &["span.count", ".sqft", ".area", ".property-area"];
const PROPERTY_TYPE: &[&str] = &["span.type", ".property-type", ".type-tag"];
const LINK: &[&str] = &[
    "a.listing-header",
    "a.property-link",
    ".listing-title a",
    "h4 a",
];
const IMAGE: &[&str] = &["img", ".property-image img", ".listing-image img"];
const PRICE: &[&str] = &[".price", ".listing-price", ".property-price"];

const DETAIL_LOCATION: &[&str] = &[
    "div.location.title-light-1",
    "div.location",
    ".property-location",
    ".address-location",
];
const DETAIL_ADDRESS: &[&str] = &[
    "div.word-break--2nyVq.value--1lKHt",
    "div.word-break.value",
    "div.value--1lKHt",
    ".property-address",
    ".address",
];
const DETAIL_IMAGE: &[&str] = &[
    "img.banner-img",
    ".property-image img",
    ".gallery img",
    ".main-image img",
];
const DETAIL_PRICE: &[&str] = &[
    "span.main_price.mb-3.mb-sm-0",
    "span.main_price",
    ".property-price",
    ".price",
];

const CITY_KEYWORDS: &[&str] = &[
    "colombo",
    "kandy",
    "galle",
    "negombo",
    "batticaloa",
    "jaffna",
    "trincomalee",
];
const STREET_KEYWORDS: &[&str] = &["road", "street", "lane", "avenue"];

pub struct LankawebExtractor {
    base_url: Url,
}

impl LankawebExtractor {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl SourceExtractor for LankawebExtractor {
    fn source_label(&self) -> &'static str {
        "Lankapropertyweb.com"
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
            if let Some(sqft) = first_text(ad, SQFT) {
                stub.sqft = clean_sqft(&sqft);
            }
            if let Some(property_type) = first_text(ad, PROPERTY_TYPE) {
                stub.property_type = property_type;
            }
            if let Some(image) = first_attr(ad, IMAGE, &["src", "data-src"]) {
                stub.image_url = image;
            }
            if let Some(price) = first_text(ad, PRICE) {
                stub.price = clean_price(&price);
            }
            stubs.push(stub);
        }

        Ok(stubs)
    }

    fn parse_detail(&self, html: &str) -> DetailFields {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let location = first_text(root, DETAIL_LOCATION).or_else(|| keyword_text(root, CITY_KEYWORDS));
        let address =
            first_text(root, DETAIL_ADDRESS).or_else(|| keyword_text(root, STREET_KEYWORDS));
        let image_url = first_attr(root, DETAIL_IMAGE, &["src"]);
        let price = first_text(root, DETAIL_PRICE)
            .map(|raw| clean_price(&raw))
            .or_else(|| currency_text(root));

        DetailFields {
            sqft: None,
            property_type: None,
            location,
            address,
            image_url,
            price,
        }
    }
}

/// Keyword sweep over leaf-sized div/span/p nodes.
fn keyword_text(root: scraper::ElementRef<'_>, keywords: &[&str]) -> Option<String> {
    for element in all_in(root, &["div, span, p"]) {
        let text = text_of(element);
        if text.len() <= 5 || text.len() > 100 {
            continue;
        }
        let lower = text.to_ascii_lowercase();
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return Some(text);
        }
    }
    None
}

/// Last-resort price sweep: any small node carrying a currency mark and digits.
fn currency_text(root: scraper::ElementRef<'_>) -> Option<String> {
    for element in all_in(root, &["span, div"]) {
        let text = text_of(element);
        if text.len() > 60 {
            continue;
        }
        if (text.contains("Rs.") || text.contains('$'))
            && text.chars().any(|c| c.is_ascii_digit())
        {
            let cleaned = clean_price(&text);
            if cleaned != crate::record::MISSING {
                return Some(cleaned);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MISSING;

    fn extractor() -> LankawebExtractor {
        LankawebExtractor::new(Url::parse("https://www.lankapropertyweb.com").unwrap())
    }

    const LISTING_PAGE: &str = r#"<html><body>
        <article class="listing-item">
            <h4 class="listing-title">Commercial building in Galle</h4>
            <span class="count">3,400 sqft</span>
            <span class="type">Building</span>
            <a class="listing-header" href="/sale/building-galle.html">view</a>
            <img src="https://cdn.lpw.example/building.jpg">
            <div class="price">Rs. 85,000,000</div>
        </article>
        <article class="listing-item">
            <h4 class="listing-title">Shop space (city center)</h4>
            <a class="listing-header" href="sale/shop-center.html">view</a>
        </article>
    </body></html>"#;

    #[test]
    fn test_parse_listing_rich_stubs() {
        let stubs = extractor().parse_listing(LISTING_PAGE).unwrap();
        assert_eq!(stubs.len(), 2);

        assert_eq!(stubs[0].title, "Commercial building in Galle");
        assert_eq!(stubs[0].sqft, "3400");
        assert_eq!(stubs[0].property_type, "Building");
        assert_eq!(
            stubs[0].link,
            "https://www.lankapropertyweb.com/sale/building-galle.html"
        );
        assert_eq!(stubs[0].price, "85000000");

        assert_eq!(stubs[1].title, "Shop space");
        assert_eq!(
            stubs[1].link,
            "https://www.lankapropertyweb.com/sale/shop-center.html"
        );
        assert_eq!(stubs[1].sqft, MISSING);
        assert_eq!(stubs[1].price, MISSING);
    }

    #[test]
    fn test_parse_listing_without_structure() {
        let result = extractor().parse_listing("<html><body><h1>503</h1></body></html>");
        assert!(matches!(result, Err(ParseError::NoListingStructure)));
    }

    const DETAIL_PAGE: &str = r#"<html><body>
        <div class="location title-light-1">Negombo</div>
        <div class="word-break value">12 Beach Road, Negombo</div>
        <img class="banner-img" src="https://cdn.lpw.example/banner.jpg">
        <span class="main_price">Rs. 45,000 per month</span>
    </body></html>"#;

    #[test]
    fn test_parse_detail() {
        let details = extractor().parse_detail(DETAIL_PAGE);
        assert_eq!(details.location.as_deref(), Some("Negombo"));
        assert_eq!(details.address.as_deref(), Some("12 Beach Road, Negombo"));
        assert_eq!(
            details.image_url.as_deref(),
            Some("https://cdn.lpw.example/banner.jpg")
        );
        assert_eq!(details.price.as_deref(), Some("45000"));
        assert_eq!(details.sqft, None);
    }

    #[test]
    fn test_detail_price_currency_fallback() {
        let html = r#"<html><body><span class="offer">Rs. 1,500,000</span></body></html>"#;
        let details = extractor().parse_detail(html);
        assert_eq!(details.price.as_deref(), Some("1500000"));
    }

    #[test]
    fn test_detail_location_keyword_fallback() {
        let html = r#"<html><body><span>Close to Kandy town</span></body></html>"#;
        let details = extractor().parse_detail(html);
        assert_eq!(details.location.as_deref(), Some("Close to Kandy town"));
    }
}
