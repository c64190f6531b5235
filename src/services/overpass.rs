use crate::models::{BoundingBox, RawPoi};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Overpass returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the secondary geodata provider (OpenStreetMap via Overpass)
#[derive(Debug, Clone)]
pub struct OverpassClient {
    endpoint: String,
    client: Client,
    /// `key=value` tag filters, e.g. `shop=hairdresser`
    tag_filters: Vec<String>,
    query_timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(
        endpoint: String,
        tag_filters: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, OverpassError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            client,
            tag_filters,
            query_timeout_secs: timeout.as_secs().max(1),
        })
    }

    /// Build the Overpass QL query for a bounding box
    pub fn build_query(&self, bbox: &BoundingBox) -> String {
        let area = format!(
            "({},{},{},{})",
            bbox.min_lat, bbox.min_lng, bbox.max_lat, bbox.max_lng
        );

        let mut query = format!("[out:json][timeout:{}];(", self.query_timeout_secs);
        for filter in &self.tag_filters {
            let Some((key, value)) = filter.split_once('=') else {
                tracing::warn!("Skipping malformed tag filter: {}", filter);
                continue;
            };
            for element in ["node", "way"] {
                query.push_str(&format!(
                    "{}[\"{}\"=\"{}\"]{};",
                    element,
                    escape_ql(key),
                    escape_ql(value),
                    area
                ));
            }
        }
        query.push_str(");out center;");
        query
    }

    /// Raw points of interest inside a bounding box
    pub async fn query_area(&self, bbox: &BoundingBox) -> Result<Vec<RawPoi>, OverpassError> {
        let query = self.build_query(bbox);
        tracing::debug!("Querying Overpass: {}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(&query)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OverpassError::ApiError(format!(
                "Area query failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let elements = json
            .get("elements")
            .and_then(|e| e.as_array())
            .ok_or_else(|| OverpassError::InvalidResponse("Missing elements array".into()))?;

        let pois: Vec<RawPoi> = elements
            .iter()
            .filter_map(|element| serde_json::from_value(element.clone()).ok())
            .collect();

        tracing::debug!("Overpass returned {} elements ({} usable)", elements.len(), pois.len());

        Ok(pois)
    }
}

/// Escape a string for use inside a double-quoted Overpass QL literal
fn escape_ql(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
