// src/map/sync.rs

use crate::config::MapConfig;
use crate::domain::Listing;
use crate::map::filter::{FilterState, FilterStats, PriceCategory};
use crate::map::geometry::{parse_coordinates, BoundingBox, LngLat};
use crate::map::polygon::Cursor;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::json;
use tracing::{debug, info, warn};

/// Camera position as the engine reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LngLat,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub padding_px: u32,
    pub max_zoom: f64,
    pub duration_ms: u32,
}

/// What the core needs from the map renderer. Tiles, clustering and
/// projection stay on the engine's side.
pub trait MapEngine {
    /// Replace the whole listing point source.
    fn set_listing_source(&mut self, data: FeatureCollection);
    /// Replace the whole polygon overlay source.
    fn set_polygon_source(&mut self, data: FeatureCollection);
    fn camera(&self) -> Camera;
    fn fit_bounds(&mut self, bounds: BoundingBox, options: FitOptions);
    fn set_drag_pan(&mut self, enabled: bool);
    fn set_cursor(&mut self, cursor: Cursor);
    /// Release the engine. Called exactly once when the view goes away.
    fn remove(&mut self);
}

/// Outcome of one filter-and-push pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub total: usize,
    /// Listings without a usable coordinate.
    pub unrenderable: usize,
    pub visible: usize,
    pub framed: bool,
    pub stats: FilterStats,
}

/// Pushes the filtered listing set into the engine and frames the first
/// non-empty result once per session.
#[derive(Debug, Clone)]
pub struct MapSync {
    initial: Camera,
    fit: FitOptions,
    auto_framed: bool,
}

impl MapSync {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            initial: Camera {
                center: config.center,
                zoom: config.zoom,
            },
            fit: FitOptions {
                padding_px: config.fit_padding_px,
                max_zoom: config.fit_max_zoom,
                duration_ms: config.fit_duration_ms,
            },
            auto_framed: false,
        }
    }

    pub fn auto_framed(&self) -> bool {
        self.auto_framed
    }

    pub fn sync<E: MapEngine>(
        &mut self,
        engine: &mut E,
        listings: &[Listing],
        filters: &FilterState,
        polygon: Option<&[LngLat]>,
    ) -> SyncReport {
        let mut report = SyncReport {
            total: listings.len(),
            ..SyncReport::default()
        };
        let mut features = Vec::new();
        let mut points = Vec::new();

        for listing in listings {
            let point = match parse_coordinates(listing.location.as_ref()) {
                Ok(p) => p,
                Err(e) => {
                    debug!(id = %listing.id, error = %e, "skipping listing");
                    report.unrenderable += 1;
                    continue;
                }
            };

            if let Err(rejection) = filters.check(listing, point, polygon) {
                report.stats.record(rejection);
                continue;
            }

            features.push(listing_feature(listing, point));
            points.push(point);
        }

        report.visible = features.len();
        debug!(
            total = report.total,
            visible = report.visible,
            unrenderable = report.unrenderable,
            price = report.stats.price,
            size = report.stats.size,
            category = report.stats.category,
            year = report.stats.year,
            timeline = report.stats.timeline,
            polygon = report.stats.polygon,
            "listing source rebuilt"
        );

        engine.set_listing_source(features.into_iter().collect());

        if !self.auto_framed && !points.is_empty() && self.at_initial_view(engine.camera()) {
            if let Some(bbox) = BoundingBox::from_points(&points) {
                info!(bbox = ?bbox.as_array(), points = points.len(), "framing first results");
                engine.fit_bounds(bbox, self.fit);
                self.auto_framed = true;
                report.framed = true;
            }
        }

        report
    }

    fn at_initial_view(&self, camera: Camera) -> bool {
        const EPS: f64 = 1e-9;
        (camera.zoom - self.initial.zoom).abs() < EPS
            && (camera.center.lng - self.initial.center.lng).abs() < EPS
            && (camera.center.lat - self.initial.center.lat).abs() < EPS
    }
}

/// Project one listing into a point feature with the flat property bag the
/// popup reads back later.
pub fn listing_feature(listing: &Listing, point: LngLat) -> Feature {
    let history = serde_json::to_string(&listing.price_history).unwrap_or_else(|e| {
        warn!(id = %listing.id, error = %e, "could not serialize price history");
        "[]".to_string()
    });

    let mut feature = Feature::from(Geometry::new(Value::Point(point.position())));
    feature.set_property("id", listing.id.clone());
    feature.set_property("title", listing.title.clone());
    feature.set_property("price", listing.price);
    feature.set_property("currency", listing.currency.clone());
    feature.set_property("size", listing.size_m2);
    feature.set_property("price_per_m2", json!(listing.price_per_m2()));
    feature.set_property("category", PriceCategory::of(listing).as_str());
    feature.set_property("rooms", json!(listing.rooms));
    feature.set_property("bathrooms", json!(listing.bathrooms));
    feature.set_property("url", json!(listing.url));
    feature.set_property("image", json!(listing.image_url));
    feature.set_property("year", json!(listing.year_built));
    feature.set_property("history", history);
    feature
}
