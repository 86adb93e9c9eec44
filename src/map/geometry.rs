// src/map/geometry.rs

use crate::domain::RawLocation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Guards the ray-casting slope against a zero-height edge.
const EDGE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn position(&self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("listing has no usable location")]
    NoLocation,
}

/// Resolve a listing location into a coordinate pair.
///
/// Accepts `POINT(lng lat)` text (optionally `SRID=...;` prefixed, keyword in any
/// case) or a structured `{coordinates: [lng, lat]}` value.
pub fn parse_coordinates(location: Option<&RawLocation>) -> Result<LngLat, GeometryError> {
    match location {
        Some(RawLocation::Wkt(text)) => parse_wkt_point(text),
        Some(RawLocation::Structured { coordinates }) => match coordinates.as_slice() {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Ok(LngLat::new(*lng, *lat)),
            _ => Err(GeometryError::NoLocation),
        },
        None => Err(GeometryError::NoLocation),
    }
}

fn parse_wkt_point(text: &str) -> Result<LngLat, GeometryError> {
    let text = text.trim();
    // EWKT from PostGIS-style stores
    let text = match text.split_once(';') {
        Some((srid, rest)) if srid.trim().to_ascii_uppercase().starts_with("SRID=") => rest.trim(),
        _ => text,
    };

    let keyword = text.get(..5).ok_or(GeometryError::NoLocation)?;
    if !keyword.eq_ignore_ascii_case("POINT") {
        return Err(GeometryError::NoLocation);
    }

    let inner = text[5..]
        .trim_start()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or(GeometryError::NoLocation)?;

    let mut parts = inner.split_whitespace().map(str::parse::<f64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(lng)), Some(Ok(lat)), None) if lng.is_finite() && lat.is_finite() => {
            Ok(LngLat::new(lng, lat))
        }
        _ => Err(GeometryError::NoLocation),
    }
}

/// Even-odd ray casting. The ring is closed implicitly (last vertex connects to
/// the first); fewer than three vertices never contain anything.
pub fn point_in_polygon(point: LngLat, polygon: &[LngLat]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].lng, polygon[i].lat);
        let (xj, yj) = (polygon[j].lng, polygon[j].lat);

        let crosses = (yi > y) != (yj > y)
            && x < (xj - xi) * (y - yi) / ((yj - yi) + EDGE_EPSILON) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Index of the vertex closest to `target` in plain coordinate space.
/// Ties go to the earliest vertex.
pub fn nearest_vertex(points: &[LngLat], target: LngLat) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, p) in points.iter().enumerate() {
        let dx = p.lng - target.lng;
        let dy = p.lat - target.lat;
        let dist_sq = dx * dx + dy * dy;

        match best {
            Some((_, d)) if dist_sq >= d => {}
            _ => best = Some((i, dist_sq)),
        }
    }

    best.map(|(i, _)| i)
}

/// `[west, south, east, north]` envelope of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LngLat>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox {
            west: first.lng,
            south: first.lat,
            east: first.lng,
            north: first.lat,
        };
        for p in iter {
            bbox.west = bbox.west.min(p.lng);
            bbox.south = bbox.south.min(p.lat);
            bbox.east = bbox.east.max(p.lng);
            bbox.north = bbox.north.max(p.lat);
        }
        Some(bbox)
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<LngLat> {
        vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(0.0, 10.0),
            LngLat::new(10.0, 10.0),
            LngLat::new(10.0, 0.0),
        ]
    }

    #[test]
    fn parses_wkt_points() {
        let loc = RawLocation::Wkt("POINT(19.0402 47.4979)".to_string());
        assert_eq!(parse_coordinates(Some(&loc)), Ok(LngLat::new(19.0402, 47.4979)));

        let loose = RawLocation::Wkt("  point ( -3.5   40.25 ) ".to_string());
        assert_eq!(parse_coordinates(Some(&loose)), Ok(LngLat::new(-3.5, 40.25)));

        let ewkt = RawLocation::Wkt("SRID=4326;POINT(2 3)".to_string());
        assert_eq!(parse_coordinates(Some(&ewkt)), Ok(LngLat::new(2.0, 3.0)));
    }

    #[test]
    fn parses_structured_coordinates() {
        let loc = RawLocation::Structured {
            coordinates: vec![19.5, 47.1],
        };
        assert_eq!(parse_coordinates(Some(&loc)), Ok(LngLat::new(19.5, 47.1)));
    }

    #[test]
    fn rejects_unusable_locations() {
        let cases = [
            RawLocation::Wkt("LINESTRING(0 0, 1 1)".to_string()),
            RawLocation::Wkt("POINT(1)".to_string()),
            RawLocation::Wkt("POINT(a b)".to_string()),
            RawLocation::Wkt("POINT(1 2 3)".to_string()),
            RawLocation::Wkt("".to_string()),
            RawLocation::Structured {
                coordinates: vec![1.0],
            },
        ];
        for loc in &cases {
            assert_eq!(parse_coordinates(Some(loc)), Err(GeometryError::NoLocation), "{loc:?}");
        }
        assert_eq!(parse_coordinates(None), Err(GeometryError::NoLocation));
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        let p = LngLat::new(0.0, 0.0);
        assert!(!point_in_polygon(p, &[]));
        assert!(!point_in_polygon(p, &[LngLat::new(0.0, 0.0)]));
        assert!(!point_in_polygon(p, &[LngLat::new(-1.0, -1.0), LngLat::new(1.0, 1.0)]));
    }

    #[test]
    fn square_inside_and_outside() {
        let sq = square();
        assert!(point_in_polygon(LngLat::new(5.0, 5.0), &sq));
        assert!(!point_in_polygon(LngLat::new(15.0, 15.0), &sq));
        assert!(!point_in_polygon(LngLat::new(-0.1, 5.0), &sq));
    }

    #[test]
    fn square_boundary_is_pinned() {
        let sq = square();
        // left and bottom edges count as inside, right and top as outside
        assert!(point_in_polygon(LngLat::new(0.0, 5.0), &sq));
        assert!(point_in_polygon(LngLat::new(5.0, 0.0), &sq));
        assert!(!point_in_polygon(LngLat::new(10.0, 5.0), &sq));
        assert!(!point_in_polygon(LngLat::new(5.0, 10.0), &sq));
    }

    #[test]
    fn horizontal_edges_do_not_blow_up() {
        let tri = [
            LngLat::new(0.0, 0.0),
            LngLat::new(4.0, 0.0),
            LngLat::new(2.0, 3.0),
        ];
        assert!(point_in_polygon(LngLat::new(2.0, 1.0), &tri));
        assert!(!point_in_polygon(LngLat::new(2.0, -1.0), &tri));
    }

    #[test]
    fn nearest_vertex_prefers_first_on_ties() {
        let pts = [
            LngLat::new(0.0, 0.0),
            LngLat::new(2.0, 0.0),
            LngLat::new(5.0, 5.0),
        ];
        assert_eq!(nearest_vertex(&pts, LngLat::new(1.0, 0.0)), Some(0));
        assert_eq!(nearest_vertex(&pts, LngLat::new(4.0, 4.0)), Some(2));
        assert_eq!(nearest_vertex(&[], LngLat::new(0.0, 0.0)), None);
    }

    #[test]
    fn bounding_box_spans_points() {
        let pts = [
            LngLat::new(1.0, 5.0),
            LngLat::new(-2.0, 3.0),
            LngLat::new(4.0, -1.0),
        ];
        let bbox = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bbox.as_array(), [-2.0, -1.0, 4.0, 5.0]);
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}
