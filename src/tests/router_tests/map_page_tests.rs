// src/tests/router_tests/map_page_tests.rs

use crate::db::upsert_listings;
use crate::map::bounds::FilterBounds;
use crate::map::view::Command;
use crate::router::handle;
use crate::tests::utils::{body_string, new_listing, request, test_state};
use chrono::{TimeZone, Utc};

#[test]
fn map_page_embeds_engine_config_and_slider_bounds() {
    let state = test_state("map_page");
    let mut big = new_listing("big", 430_500.0);
    big.size_m2 = 143.0;
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    upsert_listings(&state.db, &[new_listing("small", 61_000.0), big], now).unwrap();

    let resp = handle(request("GET", "/", ""), &state).unwrap();
    assert_eq!(resp.status(), 200);
    let html = body_string(resp);

    assert!(html.contains(r#"data-token="pk.test-token""#));
    assert!(html.contains(r#"data-source="/api/listings""#));
    assert!(html.contains("2 listings loaded"));
    // price slider snaps outward to 10k steps
    assert!(html.contains(r#"name="price-min" step="10000" min="60000" max="440000""#));
    // size only widens past its default
    assert!(html.contains(r#"name="size-max" step="10" min="0" max="200""#));
}

#[test]
fn missing_token_blocks_the_map() {
    let mut state = test_state("map_page_no_token");
    state.config.map_token = None;

    let html = body_string(handle(request("GET", "/", ""), &state).unwrap());
    assert!(html.contains(r#"role="alert""#));
    assert!(html.contains("Map credential is not configured"));
    assert!(!html.contains("data-token"));
}

/// Opening tags of one element kind, without the `<name ` prefix.
fn tags<'a>(html: &'a str, element: &str) -> Vec<&'a str> {
    html.split(&format!("<{element} "))
        .skip(1)
        .filter_map(|rest| rest.split_once('>').map(|(tag, _)| tag))
        .collect()
}

fn attr(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let (at, _) = tag
        .match_indices(&needle)
        .find(|(i, _)| *i == 0 || tag.as_bytes()[i - 1] == b' ')?;
    let rest = &tag[at + needle.len()..];
    rest.split_once('"').map(|(value, _)| value.to_string())
}

#[test]
fn every_page_control_decodes_to_a_command() {
    let state = test_state("map_page_controls");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    upsert_listings(&state.db, &[new_listing("a", 61_000.0), new_listing("b", 430_500.0)], now)
        .unwrap();
    for body in [
        r#"{"command": "toggle-compare", "id": "a"}"#,
        r#"{"command": "toggle-favorite", "id": "b"}"#,
    ] {
        handle(request("POST", "/api/selections", body), &state).unwrap();
    }

    let html = body_string(handle(request("GET", "/", ""), &state).unwrap());
    let bounds = FilterBounds::default();

    let buttons = tags(&html, "button");
    // three polygon buttons plus one remove button per panel
    assert_eq!(buttons.len(), 5);
    for tag in buttons {
        let action = attr(tag, "data-command").unwrap();
        let id = attr(tag, "data-id").unwrap_or_default();
        assert!(Command::from_control(&action, &id).is_some(), "undecodable button: {tag}");
    }

    let inputs = tags(&html, "input");
    // four category boxes, six range ends, one timeline start
    assert_eq!(inputs.len(), 11);
    for tag in inputs {
        let name = attr(tag, "name").unwrap();
        let value = attr(tag, "value").unwrap();
        assert!(
            Command::from_input(&name, &value, &bounds).is_some(),
            "undecodable input: {tag}"
        );
    }
}

#[test]
fn page_only_links_to_served_routes() {
    let state = test_state("map_page_links");
    let html = body_string(handle(request("GET", "/", ""), &state).unwrap());

    let mut paths = Vec::new();
    for needle in [" href=\"/", " src=\"/", " data-source=\"/"] {
        for (at, _) in html.match_indices(needle) {
            let rest = &html[at + needle.len() - 1..];
            if let Some((path, _)) = rest.split_once('"') {
                paths.push(path.to_string());
            }
        }
    }
    assert!(paths.iter().any(|p| p == "/api/listings"));

    for path in paths {
        let resp = handle(request("GET", &path, ""), &state);
        assert_eq!(resp.ok().map(|r| r.status().as_u16()), Some(200), "{path}");
    }
}
