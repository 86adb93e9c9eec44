pub mod listing;

pub use listing::{Listing, ListingSource, NewListing, PricePoint, RawLocation};
