// src/map/bounds.rs

use crate::domain::Listing;
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

pub const SIZE_STEP: f64 = 10.0;
pub const PRICE_STEP: f64 = 10_000.0;
/// Price sliders never offer more than this, even if a listing asks for it.
pub const PRICE_CEILING: f64 = 1_000_000.0;

pub const DEFAULT_SIZE_MAX: f64 = 200.0;
pub const DEFAULT_YEAR_MIN: i32 = 1900;

/// Inclusive `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Span<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One slider: the data-derived outer bound and the user's sub-range inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet<T> {
    pub available: Span<T>,
    pub selected: Span<T>,
}

impl<T: PartialOrd + Copy> Facet<T> {
    pub fn new(min: T, max: T) -> Self {
        let span = Span::new(min, max);
        Self {
            available: span,
            selected: span,
        }
    }

    /// Replace the available span and reset the selection to all of it.
    pub fn reset(&mut self, min: T, max: T) {
        *self = Self::new(min, max);
    }

    /// Set the selected range, ordered and clamped into the available span.
    pub fn select(&mut self, a: T, b: T) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.selected = Span::new(self.clamp(lo), self.clamp(hi));
    }

    fn clamp(&self, value: T) -> T {
        if value < self.available.min {
            self.available.min
        } else if value > self.available.max {
            self.available.max
        } else {
            value
        }
    }
}

/// Truncate a timestamp to its calendar day in local time.
pub fn day_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Days a listing "was on the market": its history days, or its creation day
/// when it has no history.
pub fn listing_days(listing: &Listing) -> Vec<NaiveDate> {
    if listing.price_history.is_empty() {
        vec![day_of(listing.created_at)]
    } else {
        listing
            .price_history
            .iter()
            .map(|p| day_of(p.recorded_at))
            .collect()
    }
}

/// Slider bounds derived from the current listing array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterBounds {
    pub size: Facet<f64>,
    pub price: Facet<f64>,
    pub year: Facet<i32>,
    pub timeline: Facet<NaiveDate>,
}

impl Default for FilterBounds {
    fn default() -> Self {
        let today = Local::now().date_naive();
        Self {
            size: Facet::new(0.0, DEFAULT_SIZE_MAX),
            price: Facet::new(0.0, PRICE_CEILING),
            year: Facet::new(DEFAULT_YEAR_MIN, today.year()),
            timeline: Facet::new(today, today),
        }
    }
}

impl FilterBounds {
    /// Recompute every facet from a freshly loaded listing array.
    ///
    /// Price, year and timeline reset to the new data each time. Size only ever
    /// widens. A facet with nothing to measure keeps its previous spans.
    pub fn recompute(&mut self, listings: &[Listing]) {
        self.recompute_size(listings);
        self.recompute_price(listings);
        self.recompute_year(listings);
        self.recompute_timeline(listings);
    }

    fn recompute_size(&mut self, listings: &[Listing]) {
        let Some(max) = max_f64(listings.iter().map(|l| l.size_m2)) else {
            return;
        };
        let ceiled = (max / SIZE_STEP).ceil() * SIZE_STEP;
        if ceiled > self.size.available.max {
            self.size.reset(self.size.available.min, ceiled);
        }
    }

    fn recompute_price(&mut self, listings: &[Listing]) {
        let prices = || listings.iter().map(|l| l.price).filter(|p| *p > 0.0);
        let (Some(min), Some(max)) = (min_f64(prices()), max_f64(prices())) else {
            return;
        };
        let max = ((max / PRICE_STEP).ceil() * PRICE_STEP).min(PRICE_CEILING);
        let min = ((min / PRICE_STEP).floor() * PRICE_STEP).min(max);
        self.price.reset(min, max);
    }

    fn recompute_year(&mut self, listings: &[Listing]) {
        let years = || listings.iter().filter_map(Listing::known_year);
        if let (Some(min), Some(max)) = (years().min(), years().max()) {
            self.year.reset(min, max);
        }
    }

    fn recompute_timeline(&mut self, listings: &[Listing]) {
        let days: Vec<NaiveDate> = listings.iter().flat_map(listing_days).collect();
        if let (Some(min), Some(max)) = (days.iter().min(), days.iter().max()) {
            self.timeline.reset(*min, *max);
        }
    }

    /// Move the start of the timeline window. The end always tracks the
    /// newest day in the data.
    pub fn select_timeline_start(&mut self, start: NaiveDate) {
        let end = self.timeline.available.max;
        self.timeline.select(start.min(end), end);
    }
}

fn min_f64(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
}

fn max_f64(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}
