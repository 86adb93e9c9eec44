pub mod connection;
pub mod listings;
pub mod local_storage;

pub use connection::{init_db, Database};
pub use listings::{fetch_listings, upsert_listings, UpsertSummary};
pub use local_storage::SqliteStorage;
