use serde::Deserialize;
use serde_json::Value;

// Payload shapes seen from the scrapers:
//
//  [ {listing}, ... ]
//  { "data" | "items" | "results": [ {listing}, ... ] }
//  {listing}
//
// listing
//  ├── id | listing_id | external_id        (string or number)
//  ├── title | name
//  ├── price                                (number, "250.000 €", or { value, currency })
//  ├── currency
//  ├── size | area | surface | m2 | size_m2
//  ├── rooms | bedrooms, bathrooms | baths
//  ├── location                             ("POINT(lng lat)" or { coordinates: [lng, lat] })
//  ├── lat | latitude, lng | lon | longitude
//  ├── year_built | yearBuilt | construction_year
//  ├── url | link
//  └── image | image_url, images[]

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Many(Vec<Value>),
    Envelope {
        #[serde(alias = "items", alias = "results")]
        data: Vec<Value>,
    },
    One(serde_json::Map<String, Value>),
}

impl Payload {
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Payload::Many(items) | Payload::Envelope { data: items } => items,
            Payload::One(item) => vec![Value::Object(item)],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawListing {
    #[serde(alias = "listing_id", alias = "external_id")]
    pub id: Option<Value>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    pub price: Option<RawPrice>,
    pub currency: Option<String>,
    #[serde(alias = "area", alias = "surface", alias = "m2", alias = "size_m2")]
    pub size: Option<RawNumber>,
    #[serde(alias = "bedrooms")]
    pub rooms: Option<RawNumber>,
    #[serde(alias = "baths")]
    pub bathrooms: Option<RawNumber>,
    pub location: Option<RawPoint>,
    #[serde(alias = "latitude")]
    pub lat: Option<RawNumber>,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: Option<RawNumber>,
    #[serde(alias = "yearBuilt", alias = "construction_year")]
    pub year_built: Option<RawNumber>,
    #[serde(alias = "link")]
    pub url: Option<String>,
    #[serde(alias = "image_url")]
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Amount(RawNumber),
    Detailed {
        value: RawNumber,
        currency: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPoint {
    Wkt(String),
    Coordinates { coordinates: Vec<f64> },
    LatLng {
        #[serde(alias = "latitude")]
        lat: f64,
        #[serde(alias = "lon", alias = "longitude")]
        lng: f64,
    },
}
