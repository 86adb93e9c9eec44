// src/tests/router_tests/selection_tests.rs

use crate::db::{upsert_listings, SqliteStorage};
use crate::map::selection::{Selections, Storage, COMPARE_KEY};
use crate::router::handle;
use crate::tests::utils::{body_string, new_listing, request, test_state};
use chrono::Utc;

#[test]
fn toggles_persist_and_render_panels() {
    let state = test_state("selections");
    upsert_listings(&state.db, &[new_listing("a", 100_000.0)], Utc::now()).unwrap();

    let resp = handle(
        request("POST", "/api/selections", r#"{"command": "toggle-compare", "id": "a"}"#),
        &state,
    )
    .unwrap();
    let html = body_string(resp);
    assert!(html.contains("Compare (1)"));
    assert!(html.contains("Listing a"));

    handle(
        request("POST", "/api/selections", r#"{"command": "toggle-favorite", "id": "gone"}"#),
        &state,
    )
    .unwrap();

    let stored = Selections::load(SqliteStorage::new(state.db.clone()));
    assert_eq!(stored.compare(), &["a"]);
    assert_eq!(stored.favorites(), &["gone"]);

    // the orphaned favorite is kept but not rendered on the page
    let page = body_string(handle(request("GET", "/", ""), &state).unwrap());
    assert!(page.contains("Favorites (0)"));
    assert!(page.contains("Compare (1)"));

    let raw = SqliteStorage::new(state.db.clone()).get(COMPARE_KEY).unwrap();
    assert_eq!(raw.as_deref(), Some(r#"["a"]"#));
}

#[test]
fn unknown_command_is_a_bad_request() {
    let state = test_state("selections_bad");
    let err = handle(
        request("POST", "/api/selections", r#"{"command": "launch", "id": "a"}"#),
        &state,
    )
    .err().unwrap();
    assert_eq!(err.status(), 400);
}

#[test]
fn concurrent_toggles_all_land() {
    let state = test_state("selections_concurrent");
    let ids: Vec<String> = (0..8).map(|i| format!("id-{i}")).collect();

    std::thread::scope(|scope| {
        for id in &ids {
            let state = &state;
            scope.spawn(move || {
                let body = format!(r#"{{"command": "toggle-favorite", "id": "{id}"}}"#);
                let resp = handle(request("POST", "/api/selections", &body), state);
                assert_eq!(resp.ok().map(|r| r.status().as_u16()), Some(200));
            });
        }
    });

    let stored = Selections::load(SqliteStorage::new(state.db.clone()));
    let mut favorites = stored.favorites().to_vec();
    favorites.sort();
    assert_eq!(favorites, ids);
}

#[test]
fn polygon_commands_are_not_selection_toggles() {
    let state = test_state("selections_polygon");
    let err = handle(
        request("POST", "/api/selections", r#"{"command": "start-drawing", "id": ""}"#),
        &state,
    )
    .err().unwrap();
    assert_eq!(err.status(), 400);
}
