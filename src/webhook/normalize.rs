use crate::domain::{listing::default_currency, NewListing};
use crate::webhook::models::{RawListing, RawNumber, RawPoint, RawPrice};
use serde_json::Value;

pub const DEFAULT_SOURCE: &str = "webhook";

/// Reshape one scraper record. `None` when it carries no usable id.
pub fn normalize(raw: RawListing) -> Option<NewListing> {
    let id = raw.id.as_ref().and_then(id_string)?;

    let (price, price_currency) = match raw.price {
        Some(RawPrice::Amount(n)) => (n.as_f64(), None),
        Some(RawPrice::Detailed { value, currency }) => (value.as_f64(), currency),
        None => (None, None),
    };

    let currency = raw
        .currency
        .or(price_currency)
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(default_currency);

    let location_wkt = match raw.location {
        Some(point) => point_wkt(point),
        None => None,
    }
    .or_else(|| match (raw.lng.and_then(|n| n.as_f64()), raw.lat.and_then(|n| n.as_f64())) {
        (Some(lng), Some(lat)) => Some(wkt(lng, lat)),
        _ => None,
    });

    let image_url = non_blank(raw.image)
        .or_else(|| raw.images.and_then(|imgs| imgs.into_iter().find(|i| !i.trim().is_empty())));

    Some(NewListing {
        id,
        source: non_blank(raw.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        title: raw.title.map(|t| t.trim().to_string()).unwrap_or_default(),
        price: price.filter(|p| *p >= 0.0).unwrap_or(0.0),
        currency,
        size_m2: raw.size.and_then(|n| n.as_f64()).filter(|s| *s > 0.0).unwrap_or(0.0),
        rooms: raw.rooms.and_then(|n| n.as_count()),
        bathrooms: raw.bathrooms.and_then(|n| n.as_count()),
        location_wkt,
        year_built: raw.year_built.and_then(|n| n.as_f64()).map(|y| y.round() as i32).filter(|y| *y > 0),
        image_url,
        url: non_blank(raw.url),
    })
}

fn id_string(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn point_wkt(point: RawPoint) -> Option<String> {
    match point {
        RawPoint::Wkt(s) => non_blank(Some(s)),
        RawPoint::Coordinates { coordinates } => match coordinates.as_slice() {
            [lng, lat, ..] => Some(wkt(*lng, *lat)),
            _ => None,
        },
        RawPoint::LatLng { lat, lng } => Some(wkt(lng, lat)),
    }
}

fn wkt(lng: f64, lat: f64) -> String {
    format!("POINT({lng} {lat})")
}

impl RawNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n).filter(|n| n.is_finite()),
            RawNumber::Text(s) => parse_amount(s),
        }
    }

    fn as_count(&self) -> Option<u32> {
        self.as_f64().filter(|n| *n >= 0.0).map(|n| n.round() as u32)
    }
}

/// Read the first human-formatted amount in `text`: `"250.000 €"`,
/// `"1,234,567"`, `"85,5 m²"`. Trailing units are ignored.
///
/// When both `.` and `,` appear, the later one is the decimal mark. A lone
/// separator followed by exactly three digits groups thousands.
pub fn parse_amount(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let negative = text[..start].trim_end().ends_with('-');
    let mut kept: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',') || c.is_whitespace())
        .filter(|c| !c.is_whitespace())
        .collect();
    if negative {
        kept.insert(0, '-');
    }

    let last_dot = kept.rfind('.');
    let last_comma = kept.rfind(',');
    let decimal = match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(if d > c { '.' } else { ',' }),
        (Some(_), None) => lone_separator_decimal(&kept, '.'),
        (None, Some(_)) => lone_separator_decimal(&kept, ','),
        (None, None) => None,
    };

    let normalized: String = kept
        .chars()
        .filter_map(|c| match c {
            '.' | ',' if Some(c) == decimal => Some('.'),
            '.' | ',' => None,
            other => Some(other),
        })
        .collect();

    normalized.parse::<f64>().ok()
}

fn lone_separator_decimal(s: &str, sep: char) -> Option<char> {
    if s.matches(sep).count() > 1 {
        return None;
    }
    let tail = s.rsplit(sep).next().unwrap_or("");
    if tail.len() == 3 {
        None
    } else {
        Some(sep)
    }
}
