use crate::db::connection::Database;
use crate::domain::{Listing, ListingSource, NewListing, PricePoint, RawLocation};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use tracing::{debug, info};

const PRICE_EPSILON: f64 = 1e-9;

/// What one upsert batch did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
    /// History rows appended (new listings plus price changes).
    pub price_points: usize,
}

impl UpsertSummary {
    pub fn stored(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Insert or overwrite listings in one transaction. Last write wins on every
/// column except `created_at`. A history row is appended when the listing is
/// new or its price moved.
pub fn upsert_listings(
    db: &Database,
    listings: &[NewListing],
    now: DateTime<Utc>,
) -> Result<UpsertSummary, ServerError> {
    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        let mut summary = UpsertSummary::default();

        for l in listings {
            let previous: Option<f64> = tx
                .query_row("SELECT price FROM listings WHERE id = ?1", params![l.id], |r| {
                    r.get(0)
                })
                .optional()?;

            tx.execute(
                r#"
                INSERT INTO listings (
                    id, source, title, price, currency, size_m2,
                    rooms, bathrooms, location_wkt, year_built,
                    image_url, url, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
                ON CONFLICT(id) DO UPDATE SET
                    source = excluded.source,
                    title = excluded.title,
                    price = excluded.price,
                    currency = excluded.currency,
                    size_m2 = excluded.size_m2,
                    rooms = excluded.rooms,
                    bathrooms = excluded.bathrooms,
                    location_wkt = excluded.location_wkt,
                    year_built = excluded.year_built,
                    image_url = excluded.image_url,
                    url = excluded.url,
                    updated_at = excluded.updated_at
                "#,
                params![
                    l.id,
                    l.source,
                    l.title,
                    l.price,
                    l.currency,
                    l.size_m2,
                    l.rooms,
                    l.bathrooms,
                    l.location_wkt,
                    l.year_built,
                    l.image_url,
                    l.url,
                    now,
                ],
            )?;

            let price_moved = match previous {
                None => {
                    summary.inserted += 1;
                    true
                }
                Some(old) => {
                    summary.updated += 1;
                    (old - l.price).abs() > PRICE_EPSILON
                }
            };

            if price_moved {
                tx.execute(
                    "INSERT INTO price_history (listing_id, price, recorded_at) VALUES (?1, ?2, ?3)",
                    params![l.id, l.price, now],
                )?;
                summary.price_points += 1;
            }
        }

        tx.commit()?;
        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            price_points = summary.price_points,
            "listings upserted"
        );
        Ok(summary)
    })
}

/// Every stored listing with its history, oldest listing first.
pub fn fetch_listings(db: &Database) -> Result<Vec<Listing>, ServerError> {
    db.with_conn(|conn| {
        let mut history: HashMap<String, Vec<PricePoint>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                "SELECT listing_id, price, recorded_at FROM price_history
                 ORDER BY listing_id, recorded_at, id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    PricePoint {
                        price: row.get(1)?,
                        recorded_at: row.get(2)?,
                    },
                ))
            })?;
            for r in rows {
                let (id, point) = r?;
                history.entry(id).or_default().push(point);
            }
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, price, currency, size_m2, rooms, bathrooms,
                   location_wkt, year_built, image_url, url, created_at
            FROM listings
            ORDER BY created_at, id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Listing {
                id: row.get(0)?,
                title: row.get(1)?,
                price: row.get(2)?,
                currency: row.get(3)?,
                size_m2: row.get(4)?,
                rooms: row.get(5)?,
                bathrooms: row.get(6)?,
                location: row.get::<_, Option<String>>(7)?.map(RawLocation::Wkt),
                year_built: row.get(8)?,
                price_history: Vec::new(),
                image_url: row.get(9)?,
                url: row.get(10)?,
                created_at: row.get(11)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            let mut listing = r?;
            listing.price_history = history.remove(&listing.id).unwrap_or_default();
            out.push(listing);
        }

        debug!(count = out.len(), "listings fetched");
        Ok(out)
    })
}

impl ListingSource for Database {
    fn fetch_listings(&self) -> Result<Vec<Listing>, ServerError> {
        fetch_listings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::{new_listing, temp_db};
    use chrono::{Duration, TimeZone};

    #[test]
    fn history_grows_only_on_price_change() {
        let db = temp_db("listings_history");
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let first = upsert_listings(&db, &[new_listing("a", 100_000.0)], t0).unwrap();
        assert_eq!(first, UpsertSummary { inserted: 1, updated: 0, price_points: 1 });

        // same price: overwritten, no new point
        let mut same = new_listing("a", 100_000.0);
        same.title = "Renamed".to_string();
        let second = upsert_listings(&db, &[same], t0 + Duration::days(1)).unwrap();
        assert_eq!(second, UpsertSummary { inserted: 0, updated: 1, price_points: 0 });

        let third =
            upsert_listings(&db, &[new_listing("a", 95_000.0)], t0 + Duration::days(2)).unwrap();
        assert_eq!(third.price_points, 1);

        let listings = fetch_listings(&db).unwrap();
        assert_eq!(listings.len(), 1);
        let a = &listings[0];
        assert_eq!(a.price, 95_000.0);
        assert_eq!(a.created_at, t0);
        let prices: Vec<f64> = a.price_history.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![100_000.0, 95_000.0]);
    }

    #[test]
    fn fetch_round_trips_location_and_optionals() {
        let db = temp_db("listings_fetch");
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut with_point = new_listing("p", 200_000.0);
        with_point.location_wkt = Some("POINT(19.05 47.5)".to_string());
        with_point.rooms = Some(3);
        let bare = new_listing("q", 0.0);

        upsert_listings(&db, &[with_point, bare], now).unwrap();
        let listings = db.fetch_listings().unwrap();

        assert_eq!(listings.len(), 2);
        let p = listings.iter().find(|l| l.id == "p").unwrap();
        assert_eq!(p.location, Some(RawLocation::Wkt("POINT(19.05 47.5)".to_string())));
        assert_eq!(p.rooms, Some(3));
        let q = listings.iter().find(|l| l.id == "q").unwrap();
        assert_eq!(q.location, None);
        assert_eq!(q.year_built, None);
    }
}
