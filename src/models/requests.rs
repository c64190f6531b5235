use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query for the nearby endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[serde(default)]
    #[validate(range(min = 100, max = 50000))]
    pub radius: Option<u32>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Query for the free-text search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 100))]
    pub q: String,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Request to rate a place
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RatingRequest {
    #[validate(length(min = 1, max = 50))]
    #[serde(alias = "rater_name")]
    pub rater: String,
    #[validate(range(min = 1, max = 5))]
    pub score: u8,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}
