use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::ranking::{annotate_distances, rank};
use crate::models::{
    Coordinates, ErrorResponse, HealthResponse, NearbyQuery, Place, PlacesResponse, RatingRequest,
    RatingSubmission, SearchQuery, SortOrder,
};
use crate::services::{DirectoryError, FetchError, PlaceFetcher};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<PlaceFetcher>,
    pub default_sort: SortOrder,
    pub default_radius_m: u32,
}

/// Configure all place-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/places/nearby", web::get().to(nearby_places))
        .route("/places/search", web::get().to(search_places))
        .route("/places/{id}", web::get().to(place_details))
        .route("/places/{id}/ratings", web::post().to(rate_place));
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

fn upstream_error(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadGateway().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 502,
    })
}

/// Parse the `sort` query parameter, falling back to the configured default
fn parse_sort(raw: Option<&str>, default: SortOrder) -> Result<SortOrder, HttpResponse> {
    match raw {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|e: String| bad_request("Invalid sort order", e)),
    }
}

fn places_response(mut places: Vec<Place>, sort: SortOrder, origin: Option<Coordinates>) -> HttpResponse {
    if let Some(origin) = origin {
        annotate_distances(&mut places, origin);
    }
    let places = rank(places, sort, origin);
    HttpResponse::Ok().json(PlacesResponse {
        total_results: places.len(),
        places,
        sort,
    })
}

/// Nearby places from both providers, reconciled and ranked
///
/// GET /api/v1/places/nearby?lat=19.43&lng=-99.13&radius=5000&sort=distance
async fn nearby_places(state: web::Data<AppState>, query: web::Query<NearbyQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    let sort = match parse_sort(query.sort.as_deref(), state.default_sort) {
        Ok(sort) => sort,
        Err(response) => return response,
    };

    let origin = Coordinates::new(query.lat, query.lng);
    let radius_m = query.radius.unwrap_or(state.default_radius_m);

    tracing::info!("Nearby lookup at ({}, {}) radius {}m sort {}", query.lat, query.lng, radius_m, sort);

    match state.fetcher.nearby(origin, radius_m).await {
        Ok(places) => places_response(places, sort, Some(origin)),
        Err(e) => {
            tracing::error!("Nearby lookup failed: {}", e);
            upstream_error("Failed to fetch nearby places", e.to_string())
        }
    }
}

/// Free-text search against the directory
///
/// GET /api/v1/places/search?q=fade&lat=19.43&lng=-99.13
async fn search_places(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    let sort = match parse_sort(query.sort.as_deref(), state.default_sort) {
        Ok(sort) => sort,
        Err(response) => return response,
    };

    let origin = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    };

    tracing::info!("Search for {:?} (located: {})", query.q, origin.is_some());

    match state.fetcher.search(query.q.trim(), origin).await {
        Ok(places) => places_response(places, sort, origin),
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            upstream_error("Failed to search places", e.to_string())
        }
    }
}

/// Place details with reviews
///
/// GET /api/v1/places/{id}
async fn place_details(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match state.fetcher.directory().details(&id).await {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(e) => directory_error_response("Failed to fetch place details", e),
    }
}

/// Rate a place
///
/// POST /api/v1/places/{id}/ratings
///
/// Request body:
/// ```json
/// {
///   "rater": "string",
///   "score": 1,
///   "comment": "string"
/// }
/// ```
async fn rate_place(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RatingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rating request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let id = path.into_inner();
    let RatingRequest { rater, score, comment } = req.into_inner();
    let submission = RatingSubmission {
        rater: rater.trim().to_string(),
        score,
        comment: comment.filter(|c| !c.trim().is_empty()),
    };

    match state.fetcher.directory().submit_rating(&id, &submission).await {
        Ok(ack) => {
            tracing::info!("Rating {} submitted for place {}", score, id);
            HttpResponse::Created().json(ack)
        }
        Err(e) => directory_error_response("Failed to submit rating", e),
    }
}

fn directory_error_response(error: &str, e: DirectoryError) -> HttpResponse {
    match e {
        DirectoryError::NotFound(message) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
            message,
            status_code: 404,
        }),
        other => {
            tracing::error!("{}: {}", error, other);
            upstream_error(error, FetchError::from(other).to_string())
        }
    }
}
