//! Listing records and the phase-2 merge rule
//!
//! A `Listing` is created as a stub by the list phase with `"N/A"` in every
//! field the listing page could not supply, then enriched in place by the
//! detail phase. Field order matches the sink schema exactly; the CSV writer
//! serializes records in declaration order.

use serde::Serialize;
use std::fmt;

/// Placeholder token for fields with no known value.
pub const MISSING: &str = "N/A";

/// The status axis of the lane matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    Rent,
    Sale,
}

impl ListingStatus {
    /// All statuses, in lane-matrix order.
    pub const ALL: [ListingStatus; 2] = [ListingStatus::Rent, ListingStatus::Sale];

    /// The value written into the sink's Status column.
    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Rent => "Rent",
            ListingStatus::Sale => "Sale",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One harvested ad. Identity is the `link`; duplicates across runs are
/// permitted by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Sqft")]
    pub sqft: String,

    #[serde(rename = "Property Type")]
    pub property_type: String,

    #[serde(rename = "Link")]
    pub link: String,

    #[serde(rename = "Location")]
    pub location: String,

    #[serde(rename = "Address")]
    pub address: String,

    #[serde(rename = "Image URL")]
    pub image_url: String,

    #[serde(rename = "Price")]
    pub price: String,

    #[serde(rename = "Status")]
    pub status: String,

    #[serde(rename = "Source")]
    pub source: String,

    #[serde(rename = "Scrape Date")]
    pub scrape_date: String,
}

impl Listing {
    /// Sink header, in column order.
    pub const COLUMNS: [&'static str; 11] = [
        "Title",
        "Sqft",
        "Property Type",
        "Link",
        "Location",
        "Address",
        "Image URL",
        "Price",
        "Status",
        "Source",
        "Scrape Date",
    ];

    /// Creates a phase-1 stub: title and link known, everything else `"N/A"`.
    pub fn stub(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sqft: MISSING.to_string(),
            property_type: MISSING.to_string(),
            link: link.into(),
            location: MISSING.to_string(),
            address: MISSING.to_string(),
            image_url: MISSING.to_string(),
            price: MISSING.to_string(),
            status: MISSING.to_string(),
            source: MISSING.to_string(),
            scrape_date: MISSING.to_string(),
        }
    }

    /// Stamps the fields the list phase owns.
    pub fn stamp(&mut self, status: ListingStatus, source: &str, scrape_date: &str) {
        self.status = status.label().to_string();
        self.source = source.to_string();
        self.scrape_date = scrape_date.to_string();
    }

    /// Merges detail-phase fields into the record.
    ///
    /// A detail value overwrites whatever the list phase had, but only if it
    /// is present and not the placeholder; absent or `"N/A"` detail values
    /// leave the existing field untouched.
    pub fn merge_details(&mut self, details: DetailFields) {
        merge_field(&mut self.sqft, details.sqft);
        merge_field(&mut self.property_type, details.property_type);
        merge_field(&mut self.location, details.location);
        merge_field(&mut self.address, details.address);
        merge_field(&mut self.image_url, details.image_url);
        merge_field(&mut self.price, details.price);
    }
}

/// Detail-phase fields for one ad. `None` means the extractor found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub sqft: Option<String>,
    pub property_type: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<String>,
}

fn merge_field(slot: &mut String, value: Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        if !value.is_empty() && value != MISSING {
            *slot = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_has_placeholders() {
        let stub = Listing::stub("Office space", "https://example.com/ad/1");
        assert_eq!(stub.title, "Office space");
        assert_eq!(stub.link, "https://example.com/ad/1");
        assert_eq!(stub.sqft, MISSING);
        assert_eq!(stub.price, MISSING);
        assert_eq!(stub.location, MISSING);
        assert_eq!(stub.scrape_date, MISSING);
    }

    #[test]
    fn test_stamp_sets_list_phase_fields() {
        let mut stub = Listing::stub("Shop", "https://example.com/ad/2");
        stub.stamp(ListingStatus::Rent, "Ikman.lk", "2025-06-01");
        assert_eq!(stub.status, "Rent");
        assert_eq!(stub.source, "Ikman.lk");
        assert_eq!(stub.scrape_date, "2025-06-01");
    }

    #[test]
    fn test_merge_overwrites_placeholders() {
        let mut stub = Listing::stub("Shop", "https://example.com/ad/3");
        stub.merge_details(DetailFields {
            sqft: Some("1250".to_string()),
            price: Some("45000".to_string()),
            ..DetailFields::default()
        });
        assert_eq!(stub.sqft, "1250");
        assert_eq!(stub.price, "45000");
        assert_eq!(stub.location, MISSING);
    }

    #[test]
    fn test_merge_overrides_list_phase_values() {
        let mut stub = Listing::stub("Shop", "https://example.com/ad/4");
        stub.sqft = "900".to_string();
        stub.merge_details(DetailFields {
            sqft: Some("1000".to_string()),
            ..DetailFields::default()
        });
        assert_eq!(stub.sqft, "1000");
    }

    #[test]
    fn test_merge_ignores_missing_and_empty() {
        let mut stub = Listing::stub("Shop", "https://example.com/ad/5");
        stub.location = "Colombo".to_string();
        stub.merge_details(DetailFields {
            location: Some(MISSING.to_string()),
            address: Some("  ".to_string()),
            ..DetailFields::default()
        });
        assert_eq!(stub.location, "Colombo");
        assert_eq!(stub.address, MISSING);
    }

    #[test]
    fn test_column_order_matches_serialization() {
        // COLUMNS must agree with the serde renames, field for field.
        assert_eq!(Listing::COLUMNS.len(), 11);
        assert_eq!(Listing::COLUMNS[0], "Title");
        assert_eq!(Listing::COLUMNS[3], "Link");
        assert_eq!(Listing::COLUMNS[10], "Scrape Date");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ListingStatus::Rent.label(), "Rent");
        assert_eq!(ListingStatus::Sale.label(), "Sale");
        assert_eq!(ListingStatus::ALL.len(), 2);
    }
}
