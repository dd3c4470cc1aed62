//! Data models for kinoscrape.

mod listing;
mod movie;
mod options;

pub use listing::ListingRecord;
pub use movie::{MovieRecord, Person, PlatformRating, RawMovie, RoleGroup, AGE_UNKNOWN};
pub use options::{Genre, ListingQuery, PerPageLimit, QueryError};
