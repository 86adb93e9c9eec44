// src/map/polygon.rs

use crate::map::geometry::{nearest_vertex, LngLat};
use geojson::{Feature, FeatureCollection, Geometry, Value};

/// Lifecycle of the user-drawn search area. Points live inside the state so an
/// idle editor can't hold stale vertices and a drag can't start mid-draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing(Vec<LngLat>),
    Closed {
        points: Vec<LngLat>,
        /// Vertex currently under the pointer, if a drag is in progress.
        dragging: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Crosshair,
    Grab,
    Grabbing,
}

impl Cursor {
    pub fn as_css(&self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Crosshair => "crosshair",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonEditor {
    state: DrawState,
    hovering_vertex: bool,
}

impl PolygonEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn points(&self) -> &[LngLat] {
        match &self.state {
            DrawState::Idle => &[],
            DrawState::Drawing(points) | DrawState::Closed { points, .. } => points,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, DrawState::Closed { .. })
    }

    pub fn dragging(&self) -> Option<usize> {
        match self.state {
            DrawState::Closed { dragging, .. } => dragging,
            _ => None,
        }
    }

    /// The polygon the filter should apply, if any.
    pub fn active_polygon(&self) -> Option<&[LngLat]> {
        match &self.state {
            DrawState::Closed { points, .. } if points.len() >= 3 => Some(points),
            _ => None,
        }
    }

    /// Begin a fresh outline, dropping whatever was there.
    pub fn start_drawing(&mut self) {
        self.state = DrawState::Drawing(Vec::new());
    }

    /// Append a clicked coordinate. Only meaningful while drawing.
    pub fn add_point(&mut self, at: LngLat) -> bool {
        match &mut self.state {
            DrawState::Drawing(points) => {
                points.push(at);
                true
            }
            _ => false,
        }
    }

    /// Close the outline. Needs at least three points; otherwise nothing happens.
    pub fn complete(&mut self) -> bool {
        match &mut self.state {
            DrawState::Drawing(points) if points.len() >= 3 => {
                let points = std::mem::take(points);
                self.state = DrawState::Closed {
                    points,
                    dragging: None,
                };
                true
            }
            _ => false,
        }
    }

    /// Pointer pressed on a vertex of the closed outline: grab the nearest one.
    pub fn begin_drag(&mut self, at: LngLat) -> bool {
        match &mut self.state {
            DrawState::Closed { points, dragging } if dragging.is_none() => {
                *dragging = nearest_vertex(points, at);
                dragging.is_some()
            }
            _ => false,
        }
    }

    /// Move the grabbed vertex. Other vertices stay put.
    pub fn drag_to(&mut self, at: LngLat) -> bool {
        match &mut self.state {
            DrawState::Closed {
                points,
                dragging: Some(i),
            } => match points.get_mut(*i) {
                Some(p) => {
                    *p = at;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn end_drag(&mut self) -> bool {
        match &mut self.state {
            DrawState::Closed { dragging, .. } if dragging.is_some() => {
                *dragging = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.state = DrawState::Idle;
        self.hovering_vertex = false;
    }

    pub fn set_hovering_vertex(&mut self, hovering: bool) {
        self.hovering_vertex = hovering;
    }

    /// Map panning is suspended only while a vertex is being dragged.
    pub fn panning_enabled(&self) -> bool {
        self.dragging().is_none()
    }

    pub fn cursor(&self) -> Cursor {
        if self.dragging().is_some() {
            Cursor::Grabbing
        } else if self.is_drawing() {
            Cursor::Crosshair
        } else if self.hovering_vertex && !self.points().is_empty() {
            Cursor::Grab
        } else {
            Cursor::Default
        }
    }

    /// Overlay source: the outline so far, its vertices, and the filled ring
    /// once closed.
    pub fn overlay(&self) -> FeatureCollection {
        let points = self.points();
        let positions: Vec<Vec<f64>> = points.iter().map(LngLat::position).collect();
        let mut features = Vec::new();

        if positions.len() >= 2 {
            let mut f = Feature::from(Geometry::new(Value::LineString(positions.clone())));
            f.set_property("kind", "outline");
            features.push(f);
        }

        if !positions.is_empty() {
            let mut f = Feature::from(Geometry::new(Value::MultiPoint(positions.clone())));
            f.set_property("kind", "vertices");
            features.push(f);
        }

        if let Some(ring) = self.active_polygon() {
            let mut ring: Vec<Vec<f64>> = ring.iter().map(LngLat::position).collect();
            ring.push(ring[0].clone());
            let mut f = Feature::from(Geometry::new(Value::Polygon(vec![ring])));
            f.set_property("kind", "area");
            features.push(f);
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}
