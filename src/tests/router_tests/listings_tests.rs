// src/tests/router_tests/listings_tests.rs

use crate::db::upsert_listings;
use crate::domain::{Listing, RawLocation};
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, new_listing, request, test_state};
use chrono::Utc;

#[test]
fn api_returns_the_whole_collection() {
    let state = test_state("api_listings");
    let mut located = new_listing("a", 180_000.0);
    located.location_wkt = Some("POINT(19.04 47.49)".to_string());
    upsert_listings(&state.db, &[located, new_listing("b", 0.0)], Utc::now()).unwrap();

    let resp = handle(request("GET", "/api/listings", ""), &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/json"
    );

    let listings: Vec<Listing> = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(listings.len(), 2);
    let a = listings.iter().find(|l| l.id == "a").unwrap();
    assert_eq!(a.location, Some(RawLocation::Wkt("POINT(19.04 47.49)".to_string())));
    assert_eq!(a.price_history.len(), 1);
}

#[test]
fn empty_store_is_an_empty_array() {
    let state = test_state("api_empty");
    let resp = handle(request("GET", "/api/listings", ""), &state).unwrap();
    assert_eq!(body_string(resp), "[]");
}

#[test]
fn unknown_route_is_not_found() {
    let state = test_state("api_404");
    let err = handle(request("GET", "/nope", ""), &state).err().unwrap();
    assert!(matches!(err, ServerError::NotFound));

    let err = handle(request("DELETE", "/api/listings", ""), &state).err().unwrap();
    assert_eq!(err.status(), 404);
}
