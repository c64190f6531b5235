// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, Coordinates, Place, PlaceDetails, PlaceSource, RatingAck, RatingSubmission,
    RawCenter, RawPoi, Review, SortOrder, View,
};
pub use requests::{NearbyQuery, RatingRequest, SearchQuery};
pub use responses::{ErrorResponse, HealthResponse, PlacesResponse};
