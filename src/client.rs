// client.rs
use crate::domain::{Listing, ListingSource};
use crate::errors::ServerError;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("listing_map/", env!("CARGO_PKG_VERSION"));
pub const LISTINGS_PATH: &str = "api/listings";

/// Fetches the whole collection from a running listing_map server.
pub struct RemoteListings {
    client: Client,
    endpoint: Url,
}

impl RemoteListings {
    pub fn new(base_url: &str) -> Result<Self, ServerError> {
        let endpoint = listings_endpoint(base_url)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ListingSource for RemoteListings {
    fn fetch_listings(&self) -> Result<Vec<Listing>, ServerError> {
        debug!(url = %self.endpoint, "fetching listings");
        let listings: Vec<Listing> = self
            .client
            .get(self.endpoint.clone())
            .send()?
            .error_for_status()?
            .json()?;
        info!(count = listings.len(), "remote listings fetched");
        Ok(listings)
    }
}

/// `{base}/api/listings`, tolerant of a missing trailing slash on `base`.
pub fn listings_endpoint(base_url: &str) -> Result<Url, ServerError> {
    let mut base = Url::parse(base_url)
        .map_err(|e| ServerError::BadRequest(format!("invalid base url {base_url:?}: {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(LISTINGS_PATH)
        .map_err(|e| ServerError::BadRequest(format!("invalid listings url: {e}")))
}
