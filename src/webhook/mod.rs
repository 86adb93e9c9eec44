//! Ingestion of scraper pushes into the listing store.

mod models;
mod normalize;

pub use models::{Payload, RawListing};
pub use normalize::{normalize, parse_amount, DEFAULT_SOURCE};

use crate::db::{upsert_listings, Database};
use crate::domain::NewListing;
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub const SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing or wrong webhook secret")]
    BadSecret,
}

impl From<WebhookError> for ServerError {
    fn from(e: WebhookError) -> Self {
        let message = e.to_string();
        match e {
            WebhookError::InvalidJson(_) => ServerError::BadRequest(message),
            WebhookError::BadSecret => ServerError::Unauthorized(message),
        }
    }
}

/// Response body for `POST /webhook`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub received: usize,
    pub stored: usize,
    pub skipped: usize,
}

/// Compare the shared secret, if one is configured.
pub fn check_secret(expected: Option<&str>, provided: Option<&str>) -> Result<(), WebhookError> {
    match expected {
        None => Ok(()),
        Some(expected) if provided.map(str::trim) == Some(expected) => Ok(()),
        Some(_) => Err(WebhookError::BadSecret),
    }
}

/// Decode a payload into normalized listings. Records that don't parse or
/// lack an id are counted as skipped.
pub fn parse_payload(body: &[u8]) -> Result<(Vec<NewListing>, IngestReport), WebhookError> {
    let items = serde_json::from_slice::<Payload>(body)?.into_items();
    let mut report = IngestReport {
        received: items.len(),
        ..IngestReport::default()
    };

    let mut listings = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let raw: RawListing = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(index, error = %e, "unreadable webhook record");
                report.skipped += 1;
                continue;
            }
        };
        match normalize(raw) {
            Some(listing) => listings.push(listing),
            None => {
                warn!(index, "webhook record without id");
                report.skipped += 1;
            }
        }
    }

    Ok((listings, report))
}

pub fn ingest(db: &Database, body: &[u8], now: DateTime<Utc>) -> Result<IngestReport, ServerError> {
    let (listings, mut report) = parse_payload(body)?;
    let summary = upsert_listings(db, &listings, now)?;
    report.stored = summary.stored();

    info!(
        received = report.received,
        stored = report.stored,
        skipped = report.skipped,
        "webhook ingested"
    );
    Ok(report)
}
