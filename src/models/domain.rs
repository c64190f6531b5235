use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A WGS84 point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Which provider a place record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceSource {
    Directory,
    Google,
    Osm,
}

impl Default for PlaceSource {
    fn default() -> Self {
        PlaceSource::Directory
    }
}

/// Canonical place record shared by both providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Identity key. Empty on the wire means the provider sent none.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(rename = "lat", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "lng", default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub source: PlaceSource,
    #[serde(rename = "ratingAverage", default)]
    pub rating_average: f64,
    #[serde(rename = "ratingCount", default)]
    pub rating_count: u32,
    #[serde(rename = "distanceKm", default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Place {
    /// Coordinates if both are present and within valid ranges
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if crate::core::geo::is_valid_coordinate(lat, lng) => {
                Some(Coordinates::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// Directory ids arrive as either numbers or strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// A single user rating attached to a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub rater: String,
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Place plus its review list, as returned by the details call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(flatten)]
    pub place: Place,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Rating payload forwarded to the directory backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSubmission {
    pub rater: String,
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAck {
    pub message: String,
}

/// Ordering criterion for the canonical list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Distance,
    Rating,
    Reviews,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Distance
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::Distance => "distance",
            SortOrder::Rating => "rating",
            SortOrder::Reviews => "reviews",
        };
        f.write_str(s)
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" | "by-distance" => Ok(SortOrder::Distance),
            "rating" | "by-rating" => Ok(SortOrder::Rating),
            "reviews" | "by-review-count" => Ok(SortOrder::Reviews),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Which list the presentation layer is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Nearby,
    Favorites,
    Settings,
}

impl Default for View {
    fn default() -> Self {
        View::Nearby
    }
}

/// Element returned by the secondary geodata provider (Overpass)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoi {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Ways and relations carry their position here when queried with `out center`
    #[serde(default)]
    pub center: Option<RawCenter>,
    #[serde(default)]
    pub tags: std::collections::HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCenter {
    pub lat: f64,
    pub lon: f64,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}
