// src/map/filter.rs

use crate::domain::Listing;
use crate::map::bounds::{listing_days, FilterBounds};
use crate::map::geometry::{point_in_polygon, LngLat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Price per m² below this is cheap.
pub const CHEAP_BELOW: f64 = 3000.0;
/// Price per m² from this up is expensive.
pub const EXPENSIVE_FROM: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceCategory {
    Cheap,
    Medium,
    Expensive,
    Unknown,
}

impl PriceCategory {
    pub const ALL: [PriceCategory; 4] = [
        PriceCategory::Cheap,
        PriceCategory::Medium,
        PriceCategory::Expensive,
        PriceCategory::Unknown,
    ];

    pub fn classify(price: f64, size_m2: f64) -> Self {
        if size_m2 <= 0.0 {
            return PriceCategory::Unknown;
        }
        let per_m2 = price / size_m2;
        if per_m2 < CHEAP_BELOW {
            PriceCategory::Cheap
        } else if per_m2 < EXPENSIVE_FROM {
            PriceCategory::Medium
        } else {
            PriceCategory::Expensive
        }
    }

    pub fn of(listing: &Listing) -> Self {
        Self::classify(listing.price, listing.size_m2)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceCategory::Cheap => "cheap",
            PriceCategory::Medium => "medium",
            PriceCategory::Expensive => "expensive",
            PriceCategory::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The facet that excluded a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Price,
    Size,
    Category,
    Year,
    Timeline,
    Polygon,
}

/// Every filter dimension the user controls, minus the polygon, which lives in
/// the draw editor and is passed in per check.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub categories: BTreeSet<PriceCategory>,
    pub bounds: FilterBounds,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            categories: PriceCategory::ALL.into_iter().collect(),
            bounds: FilterBounds::default(),
        }
    }
}

impl FilterState {
    pub fn toggle_category(&mut self, category: PriceCategory) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    pub fn is_visible(&self, category: PriceCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Run every facet against one listing, stopping at the first failure.
    /// `polygon` is only the *active* polygon (closed, three or more points).
    pub fn check(
        &self,
        listing: &Listing,
        point: LngLat,
        polygon: Option<&[LngLat]>,
    ) -> Result<(), Rejection> {
        let b = &self.bounds;

        if listing.price > 0.0 && !b.price.selected.contains(listing.price) {
            return Err(Rejection::Price);
        }

        // unknown sizes are governed by the category toggle only
        if listing.size_m2 > 0.0 && !b.size.selected.contains(listing.size_m2) {
            return Err(Rejection::Size);
        }

        if !self.is_visible(PriceCategory::of(listing)) {
            return Err(Rejection::Category);
        }

        if let Some(year) = listing.known_year() {
            if !b.year.selected.contains(year) {
                return Err(Rejection::Year);
            }
        }

        let start = b.timeline.selected.min;
        let end = b.timeline.available.max;
        let on_market = if listing.price_history.is_empty() {
            start <= end
        } else {
            listing_days(listing)
                .into_iter()
                .any(|d| d >= start && d <= end)
        };
        if !on_market {
            return Err(Rejection::Timeline);
        }

        if let Some(ring) = polygon {
            if !point_in_polygon(point, ring) {
                return Err(Rejection::Polygon);
            }
        }

        Ok(())
    }

    pub fn passes(&self, listing: &Listing, point: LngLat, polygon: Option<&[LngLat]>) -> bool {
        self.check(listing, point, polygon).is_ok()
    }
}

/// How many listings each facet knocked out during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub price: usize,
    pub size: usize,
    pub category: usize,
    pub year: usize,
    pub timeline: usize,
    pub polygon: usize,
}

impl FilterStats {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Price => self.price += 1,
            Rejection::Size => self.size += 1,
            Rejection::Category => self.category += 1,
            Rejection::Year => self.year += 1,
            Rejection::Timeline => self.timeline += 1,
            Rejection::Polygon => self.polygon += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.price + self.size + self.category + self.year + self.timeline + self.polygon
    }
}
