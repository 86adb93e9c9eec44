// src/map/view.rs

use crate::config::MapConfig;
use crate::domain::{Listing, ListingSource};
use crate::errors::MapError;
use crate::map::bounds::FilterBounds;
use crate::map::filter::{FilterState, PriceCategory};
use crate::map::geometry::LngLat;
use crate::map::polygon::PolygonEditor;
use crate::map::selection::{resolve, Selections, Storage};
use crate::map::sync::{MapEngine, MapSync, SyncReport};
use crate::templates::components::{compare_table, favorites_list, popup_content, PopupListing};
use chrono::{NaiveDate, Utc};
use geojson::JsonObject;
use maud::Markup;
use tracing::{debug, error, info, warn};

/// Input from the map engine, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Style and sources are ready; listing pushes start from here.
    EngineLoaded,
    MapClick { at: LngLat, on_feature: bool },
    PointerDown { at: LngLat, on_vertex: bool },
    PointerMove { at: LngLat, over_vertex: bool },
    PointerUp,
    DragEnd,
    /// Click on one or more listing points; carries their property bags.
    FeatureClick { features: Vec<JsonObject> },
}

/// Everything the controls (sliders, buttons, popup toggles) can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ToggleCategory(PriceCategory),
    SelectSize(f64, f64),
    SelectPrice(f64, f64),
    SelectYear(i32, i32),
    SelectTimelineStart(NaiveDate),
    StartDrawing,
    CompletePolygon,
    ClearPolygon,
    ToggleFavorite(String),
    ToggleCompare(String),
}

impl Command {
    // `data-command` values
    pub const TOGGLE_FAVORITE: &'static str = "toggle-favorite";
    pub const TOGGLE_COMPARE: &'static str = "toggle-compare";
    pub const START_DRAWING: &'static str = "start-drawing";
    pub const COMPLETE_POLYGON: &'static str = "complete-polygon";
    pub const CLEAR_POLYGON: &'static str = "clear-polygon";

    // filter input names
    pub const CATEGORY: &'static str = "category";
    pub const SIZE_MIN: &'static str = "size-min";
    pub const SIZE_MAX: &'static str = "size-max";
    pub const PRICE_MIN: &'static str = "price-min";
    pub const PRICE_MAX: &'static str = "price-max";
    pub const YEAR_MIN: &'static str = "year-min";
    pub const YEAR_MAX: &'static str = "year-max";
    pub const TIMELINE_START: &'static str = "timeline-start";

    /// Decode a button embedded in page, popup or panel markup
    /// (`data-command` + `data-id`). Only the selection toggles need an id.
    pub fn from_control(action: &str, id: &str) -> Option<Command> {
        match action {
            Self::START_DRAWING => Some(Command::StartDrawing),
            Self::COMPLETE_POLYGON => Some(Command::CompletePolygon),
            Self::CLEAR_POLYGON => Some(Command::ClearPolygon),
            Self::TOGGLE_FAVORITE if !id.is_empty() => Some(Command::ToggleFavorite(id.to_string())),
            Self::TOGGLE_COMPARE if !id.is_empty() => Some(Command::ToggleCompare(id.to_string())),
            _ => None,
        }
    }

    /// Decode a filter input (`name` + `value`). A slider moves one end of
    /// its range; the other end comes from the current selection.
    pub fn from_input(name: &str, value: &str, bounds: &FilterBounds) -> Option<Command> {
        let value = value.trim();
        match name {
            Self::CATEGORY => PriceCategory::parse(value).map(Command::ToggleCategory),
            Self::SIZE_MIN => Some(Command::SelectSize(value.parse().ok()?, bounds.size.selected.max)),
            Self::SIZE_MAX => Some(Command::SelectSize(bounds.size.selected.min, value.parse().ok()?)),
            Self::PRICE_MIN => Some(Command::SelectPrice(value.parse().ok()?, bounds.price.selected.max)),
            Self::PRICE_MAX => Some(Command::SelectPrice(bounds.price.selected.min, value.parse().ok()?)),
            Self::YEAR_MIN => Some(Command::SelectYear(value.parse().ok()?, bounds.year.selected.max)),
            Self::YEAR_MAX => Some(Command::SelectYear(bounds.year.selected.min, value.parse().ok()?)),
            Self::TIMELINE_START => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(Command::SelectTimelineStart),
            _ => None,
        }
    }
}

/// Owner of all map-session state. The engine is created on mount and
/// released when the view is dropped.
pub struct MapView<E: MapEngine, S: Storage> {
    engine: E,
    listings: Vec<Listing>,
    filters: FilterState,
    editor: PolygonEditor,
    selections: Selections<S>,
    sync: MapSync,
    loaded: bool,
    last_report: Option<SyncReport>,
}

impl<E: MapEngine, S: Storage> MapView<E, S> {
    pub fn mount<F>(config: &MapConfig, storage: S, factory: F) -> Result<Self, MapError>
    where
        F: FnOnce(&MapConfig) -> Result<E, MapError>,
    {
        if config.token.is_none() {
            error!("map credential missing, refusing to start the map");
            return Err(MapError::MissingToken);
        }

        let engine = factory(config).map_err(|e| {
            error!(error = %e, "map engine failed to start");
            e
        })?;

        info!(style = %config.style_url, "map view mounted");

        Ok(Self {
            engine,
            listings: Vec::new(),
            filters: FilterState::default(),
            editor: PolygonEditor::new(),
            selections: Selections::load(storage),
            sync: MapSync::new(config),
            loaded: false,
            last_report: None,
        })
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn editor(&self) -> &PolygonEditor {
        &self.editor
    }

    pub fn selections(&self) -> &Selections<S> {
        &self.selections
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_report(&self) -> Option<&SyncReport> {
        self.last_report.as_ref()
    }

    /// Fetch the whole collection and swap it in. A failed fetch leaves the
    /// current listings untouched.
    pub fn load(&mut self, source: &dyn ListingSource) {
        match source.fetch_listings() {
            Ok(listings) => self.replace_listings(listings),
            Err(e) => error!(error = %e, "failed to fetch listings"),
        }
    }

    /// Last one in wins; there is no generation check between fetches.
    pub fn replace_listings(&mut self, listings: Vec<Listing>) {
        info!(count = listings.len(), "listings replaced");
        self.listings = listings;
        self.filters.bounds.recompute(&self.listings);
        self.resync();
    }

    /// Apply one engine event. Returns popup markup for feature clicks.
    pub fn handle(&mut self, event: Event) -> Option<Markup> {
        match event {
            Event::EngineLoaded => {
                self.loaded = true;
                self.refresh_overlay();
                self.resync();
            }
            Event::MapClick { at, on_feature } => {
                if !on_feature && self.editor.add_point(at) {
                    self.polygon_changed();
                }
            }
            Event::PointerDown { at, on_vertex } => {
                if on_vertex && self.editor.begin_drag(at) {
                    debug!(vertex = ?self.editor.dragging(), "vertex drag started");
                    self.refresh_overlay();
                }
            }
            Event::PointerMove { at, over_vertex } => {
                self.editor.set_hovering_vertex(over_vertex);
                if self.editor.drag_to(at) {
                    self.polygon_changed();
                } else {
                    self.engine.set_cursor(self.editor.cursor());
                }
            }
            Event::PointerUp | Event::DragEnd => {
                if self.editor.end_drag() {
                    self.refresh_overlay();
                }
            }
            Event::FeatureClick { features } => return self.popup(&features),
        }
        None
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatch");
        match command {
            Command::ToggleCategory(category) => {
                self.filters.toggle_category(category);
                self.resync();
            }
            Command::SelectSize(a, b) => {
                self.filters.bounds.size.select(a, b);
                self.resync();
            }
            Command::SelectPrice(a, b) => {
                self.filters.bounds.price.select(a, b);
                self.resync();
            }
            Command::SelectYear(a, b) => {
                self.filters.bounds.year.select(a, b);
                self.resync();
            }
            Command::SelectTimelineStart(day) => {
                self.filters.bounds.select_timeline_start(day);
                self.resync();
            }
            Command::StartDrawing => {
                self.editor.start_drawing();
                self.polygon_changed();
            }
            Command::CompletePolygon => {
                if self.editor.complete() {
                    self.polygon_changed();
                } else {
                    debug!(points = self.editor.points().len(), "not enough points to close");
                }
            }
            Command::ClearPolygon => {
                self.editor.clear();
                self.polygon_changed();
            }
            Command::ToggleFavorite(id) => self.selections.toggle_favorite(&id),
            Command::ToggleCompare(id) => self.selections.toggle_compare(&id),
        }
    }

    pub fn compare_panel(&self) -> Markup {
        compare_table(&resolve(self.selections.compare(), &self.listings))
    }

    pub fn favorites_panel(&self) -> Markup {
        favorites_list(&resolve(self.selections.favorites(), &self.listings))
    }

    fn popup(&self, features: &[JsonObject]) -> Option<Markup> {
        if self.editor.is_drawing() {
            debug!("feature click ignored while drawing");
            return None;
        }

        let listings: Vec<PopupListing> = features
            .iter()
            .filter_map(|props| match PopupListing::from_properties(props) {
                Ok(l) => Some(l),
                Err(e) => {
                    warn!(error = %e, "unreadable feature properties");
                    None
                }
            })
            .collect();

        if listings.is_empty() {
            return None;
        }

        Some(popup_content(&listings, self.selections.snapshot(), Utc::now()))
    }

    fn polygon_changed(&mut self) {
        self.refresh_overlay();
        self.resync();
    }

    fn refresh_overlay(&mut self) {
        self.engine.set_drag_pan(self.editor.panning_enabled());
        self.engine.set_cursor(self.editor.cursor());
        self.engine.set_polygon_source(self.editor.overlay());
    }

    fn resync(&mut self) {
        if !self.loaded {
            return;
        }
        let report = self.sync.sync(
            &mut self.engine,
            &self.listings,
            &self.filters,
            self.editor.active_polygon(),
        );
        self.last_report = Some(report);
    }
}

impl<E: MapEngine, S: Storage> Drop for MapView<E, S> {
    fn drop(&mut self) {
        debug!("map view unmounted");
        self.engine.remove();
    }
}
