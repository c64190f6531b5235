use crate::core::reconcile::ensure_identity;
use crate::models::{Place, PlaceDetails, RatingAck, RatingSubmission};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the directory backend
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the primary data source
///
/// Handles all communication with the directory backend:
/// - Nearby and free-text place searches
/// - Place details with reviews
/// - Rating submission
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    base_url: String,
    client: Client,
}

impl DirectoryClient {
    /// Create a new directory client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Places within `radius_m` meters of a point
    pub async fn nearby(&self, lat: f64, lng: f64, radius_m: u32) -> Result<Vec<Place>, DirectoryError> {
        let url = format!(
            "{}?lat={}&lng={}&radius={}",
            self.url("places/nearby"),
            lat,
            lng,
            radius_m
        );

        tracing::debug!("Fetching nearby places from: {}", url);

        self.get_places(&url).await
    }

    /// Free-text search, optionally biased towards a location
    pub async fn search(&self, query: &str, lat: Option<f64>, lng: Option<f64>) -> Result<Vec<Place>, DirectoryError> {
        let mut url = format!("{}?q={}", self.url("places/search"), urlencoding::encode(query));
        if let (Some(lat), Some(lng)) = (lat, lng) {
            url.push_str(&format!("&lat={}&lng={}", lat, lng));
        }

        tracing::debug!("Searching places: {}", url);

        self.get_places(&url).await
    }

    /// A single place with its reviews
    pub async fn details(&self, id: &str) -> Result<PlaceDetails, DirectoryError> {
        let url = self.url(&format!("places/{}", urlencoding::encode(id)));

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(format!("Place {} not found", id)));
        }
        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to fetch details: {}",
                response.status()
            )));
        }

        let mut details: PlaceDetails = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse details: {}", e)))?;
        details.place = ensure_identity(details.place);

        Ok(details)
    }

    /// Submit a rating for a place
    pub async fn submit_rating(&self, id: &str, rating: &RatingSubmission) -> Result<RatingAck, DirectoryError> {
        let url = self.url(&format!("places/{}/ratings", urlencoding::encode(id)));

        let response = self.client.post(&url).json(rating).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(format!("Place {} not found", id)));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to submit rating for {}: {} - {}", id, status, body);
            return Err(DirectoryError::ApiError(format!("Failed to submit rating: {}", status)));
        }

        tracing::debug!("Recorded rating {} for place {}", rating.score, id);

        response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse rating ack: {}", e)))
    }

    async fn get_places(&self, url: &str) -> Result<Vec<Place>, DirectoryError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Failed to fetch places: {}",
                response.status()
            )));
        }

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse places: {}", e)))?;

        Ok(places.into_iter().map(ensure_identity).collect())
    }
}
