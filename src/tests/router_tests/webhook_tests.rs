// src/tests/router_tests/webhook_tests.rs

use crate::db::fetch_listings;
use crate::router::handle;
use crate::tests::utils::{body_string, request, test_state};
use serde_json::Value;

#[test]
fn webhook_stores_listings_and_reports_counts() {
    let state = test_state("webhook_store");
    let payload = r#"{
        "results": [
            { "listing_id": "r-1", "title": "Corner flat", "price": "250.000 €",
              "area": 70, "location": "POINT(19.05 47.5)" },
            { "external_id": 2, "name": "Loft", "price": { "value": 99000, "currency": "eur" },
              "lat": 47.4, "lng": 19.1 },
            { "title": "No id at all" }
        ]
    }"#;

    let resp = handle(request("POST", "/webhook", payload), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let report: Value = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(report["received"], 3);
    assert_eq!(report["stored"], 2);
    assert_eq!(report["skipped"], 1);

    let listings = fetch_listings(&state.db).unwrap();
    assert_eq!(listings.len(), 2);
    let flat = listings.iter().find(|l| l.id == "r-1").unwrap();
    assert_eq!(flat.price, 250_000.0);
    assert_eq!(flat.size_m2, 70.0);
    assert_eq!(flat.price_history.len(), 1);
}

#[test]
fn repeated_push_appends_history_only_on_change() {
    let state = test_state("webhook_history");
    let push = |price: u32| {
        let body = format!(r#"[{{ "id": "h-1", "price": {price} }}]"#);
        handle(request("POST", "/webhook", &body), &state).unwrap();
    };

    push(100_000);
    push(100_000);
    push(90_000);

    let listings = fetch_listings(&state.db).unwrap();
    let prices: Vec<f64> = listings[0].price_history.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![100_000.0, 90_000.0]);
}

#[test]
fn webhook_secret_is_enforced_when_configured() {
    let mut state = test_state("webhook_secret");
    state.config.webhook_secret = Some("hunter2".to_string());

    let err = handle(request("POST", "/webhook", r#"[{"id": "x"}]"#), &state).err().unwrap();
    assert_eq!(err.status(), 401);

    let mut req = request("POST", "/webhook", r#"[{"id": "x"}]"#);
    req.headers_mut()
        .insert("x-webhook-secret", "hunter2".parse().unwrap());
    let resp = handle(req, &state).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(fetch_listings(&state.db).unwrap().len(), 1);
}

#[test]
fn malformed_payload_is_rejected() {
    let state = test_state("webhook_malformed");
    let err = handle(request("POST", "/webhook", "not json"), &state).err().unwrap();
    assert_eq!(err.status(), 400);
}
