pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod map;
pub mod responses;
pub mod router;
pub mod templates;
pub mod webhook;

#[cfg(test)]
mod tests;

pub use db::connection::{init_db, Database};
pub use router::{handle, AppState};
