use crate::config::Config;
use crate::db::{fetch_listings, Database, SqliteStorage};
use crate::errors::ServerError;
use crate::map::bounds::FilterBounds;
use crate::map::selection::{resolve, Selections};
use crate::map::view::Command;
use crate::responses::{html_response, json_response, ResultResp};
use crate::templates::components::{compare_table, favorites_list};
use crate::templates::pages::{map_page, MapPageVm};
use crate::webhook::{self, check_secret, SECRET_HEADER};
use astra::Request;
use chrono::Utc;
use maud::html;
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

/// Largest request body accepted on POST routes.
const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// Everything a request handler can reach.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

pub fn handle(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    debug!(%method, %path, "request");

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => map(state),
        ("GET", "/api/listings") => json_response(200, &fetch_listings(&state.db)?),
        ("POST", "/api/selections") => {
            let body = read_body(&mut req)?;
            toggle_selection(state, &body)
        }
        ("POST", "/webhook") => {
            let provided = req
                .headers()
                .get(SECRET_HEADER)
                .and_then(|v| v.to_str().ok());
            check_secret(state.config.webhook_secret.as_deref(), provided)?;

            let body = read_body(&mut req)?;
            let report = webhook::ingest(&state.db, &body, Utc::now())?;
            json_response(200, &report)
        }
        _ => Err(ServerError::NotFound),
    }
}

fn map(state: &AppState) -> ResultResp {
    let listings = fetch_listings(&state.db)?;
    let mut bounds = FilterBounds::default();
    bounds.recompute(&listings);
    let selections = Selections::load(SqliteStorage::new(state.db.clone()));
    let map_config = state.config.map_config();

    html_response(map_page(&MapPageVm {
        config: &map_config,
        bounds: &bounds,
        listing_count: listings.len(),
        favorites: resolve(selections.favorites(), &listings),
        compare: resolve(selections.compare(), &listings),
    }))
}

#[derive(Debug, Deserialize)]
struct SelectionToggle {
    command: String,
    id: String,
}

/// Popup and panel toggles posted back as `{ command, id }`. Answers with the
/// refreshed selection panels.
fn toggle_selection(state: &AppState, body: &[u8]) -> ResultResp {
    let toggle: SelectionToggle = serde_json::from_slice(body)?;
    let command = Command::from_control(&toggle.command, &toggle.id).ok_or_else(|| {
        ServerError::BadRequest(format!("unknown selection command {:?}", toggle.command))
    })?;

    let mut selections = Selections::load(SqliteStorage::new(state.db.clone()));
    match command {
        Command::ToggleFavorite(id) => selections.toggle_favorite(&id),
        Command::ToggleCompare(id) => selections.toggle_compare(&id),
        _ => return Err(ServerError::BadRequest("not a selection command".to_string())),
    }

    let listings = fetch_listings(&state.db)?;
    html_response(html! {
        (compare_table(&resolve(selections.compare(), &listings)))
        (favorites_list(&resolve(selections.favorites(), &listings)))
    })
}

fn read_body(req: &mut Request) -> Result<Vec<u8>, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("could not read body: {e}")))?;
    Ok(body)
}
