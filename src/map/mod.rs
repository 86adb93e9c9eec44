// src/map/mod.rs
//
// Listing map engine: geometry, slider bounds, the filter predicate, polygon
// editing, source synchronization, selections and the owning view.

pub mod bounds;
pub mod filter;
pub mod geometry;
pub mod polygon;
pub mod selection;
pub mod sync;
pub mod view;

pub use filter::{FilterState, PriceCategory};
pub use geometry::LngLat;
pub use sync::MapEngine;
pub use view::{Command, Event, MapView};
