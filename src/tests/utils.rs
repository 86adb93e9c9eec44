use crate::config::Config;
use crate::db::connection::{init_db, Database};
use crate::domain::NewListing;
use crate::router::AppState;
use astra::{Body, Request, Response};
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

/// A fresh database file under the temp dir with the production schema.
pub fn temp_db(prefix: &str) -> Database {
    let path = std::env::temp_dir().join(format!(
        "{prefix}_{}_{:?}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
        std::thread::current().id(),
    ));
    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db).expect("Failed to initialize DB");
    db
}

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        db_path: String::new(),
        log_level: "debug".to_string(),
        max_workers: 1,
        map_token: Some("pk.test-token".to_string()),
        map_style_url: "mapbox://styles/mapbox/light-v11".to_string(),
        webhook_secret: None,
    }
}

pub fn test_state(prefix: &str) -> AppState {
    AppState {
        db: temp_db(prefix),
        config: test_config(),
    }
}

pub fn request(method: &str, uri: &str, body: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn body_string(mut resp: Response) -> String {
    let mut bytes = Vec::new();
    resp.body_mut().reader().read_to_end(&mut bytes).unwrap();
    String::from_utf8(bytes).unwrap()
}

pub fn new_listing(id: &str, price: f64) -> NewListing {
    NewListing {
        id: id.to_string(),
        source: "test".to_string(),
        title: format!("Listing {id}"),
        price,
        currency: "EUR".to_string(),
        size_m2: 50.0,
        rooms: None,
        bathrooms: None,
        location_wkt: None,
        year_built: None,
        image_url: None,
        url: None,
    }
}
