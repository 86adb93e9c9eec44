// src/domain/listing.rs

use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed asking price. History is kept oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

/// The two location encodings the store hands back: a WKT point as text
/// (`"POINT(19.04 47.49)"`) or a GeoJSON-ish object with `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    Wkt(String),
    Structured { coordinates: Vec<f64> },
}

/// A scraped property record, as fetched for one map session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Floor area in m². Zero means unknown.
    #[serde(default)]
    pub size_m2: f64,
    #[serde(default)]
    pub rooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn default_currency() -> String {
    "EUR".to_string()
}

impl Listing {
    /// Price per m², only defined when the floor area is known.
    pub fn price_per_m2(&self) -> Option<f64> {
        if self.size_m2 > 0.0 {
            Some(self.price / self.size_m2)
        } else {
            None
        }
    }

    /// Year of construction when it carries information (present and positive).
    pub fn known_year(&self) -> Option<i32> {
        self.year_built.filter(|y| *y > 0)
    }
}

/// A listing as it arrives from the webhook, before it has a stored history.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub id: String,
    pub source: String,
    pub title: String,
    pub price: f64,
    pub currency: String,
    pub size_m2: f64,
    pub rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    /// Stored as WKT text.
    pub location_wkt: Option<String>,
    pub year_built: Option<i32>,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

/// Anything that can hand back the full listing collection in one go.
pub trait ListingSource {
    fn fetch_listings(&self) -> Result<Vec<Listing>, ServerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_both_location_encodings() {
        let wkt: RawLocation = serde_json::from_str(r#""POINT(19.1 47.5)""#).unwrap();
        assert_eq!(wkt, RawLocation::Wkt("POINT(19.1 47.5)".to_string()));

        let structured: RawLocation =
            serde_json::from_str(r#"{"type":"Point","coordinates":[19.1,47.5]}"#).unwrap();
        assert_eq!(
            structured,
            RawLocation::Structured {
                coordinates: vec![19.1, 47.5]
            }
        );
    }

    #[test]
    fn sparse_listing_fills_defaults() {
        let listing: Listing = serde_json::from_str(
            r#"{"id":"a1","created_at":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(listing.currency, "EUR");
        assert_eq!(listing.size_m2, 0.0);
        assert!(listing.price_history.is_empty());
        assert_eq!(listing.price_per_m2(), None);
    }

    #[test]
    fn zero_year_is_not_a_known_year() {
        let mut listing: Listing =
            serde_json::from_str(r#"{"id":"a1","created_at":"2024-03-01T12:00:00Z"}"#).unwrap();
        listing.year_built = Some(0);
        assert_eq!(listing.known_year(), None);
        listing.year_built = Some(1990);
        assert_eq!(listing.known_year(), Some(1990));
    }
}
