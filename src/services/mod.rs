// Service exports
pub mod cache;
pub mod directory;
pub mod fetcher;
pub mod overpass;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use directory::{DirectoryClient, DirectoryError};
pub use fetcher::{FetchError, PlaceFetcher};
pub use overpass::{OverpassClient, OverpassError};
