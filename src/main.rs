use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use placefinder::config::Settings;
use placefinder::routes::{self, places::AppState};
use placefinder::services::{CacheManager, DirectoryClient, OverpassClient, PlaceFetcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn to_io_error<E: std::fmt::Display>(context: &str, e: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration errors are reported on stderr since logging is configured from it
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        to_io_error("Configuration error", e)
    })?;

    let filter = EnvFilter::try_new(&settings.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting placefinder gateway...");

    let directory = DirectoryClient::new(
        settings.directory.endpoint.clone(),
        Duration::from_secs(settings.directory.timeout_secs),
    )
    .map_err(|e| {
        error!("Failed to build directory client: {}", e);
        to_io_error("Directory client error", e)
    })?;

    info!("Directory client initialized ({})", settings.directory.endpoint);

    // Overpass is optional - the directory alone is enough to serve results
    let overpass = if settings.overpass.enabled {
        match OverpassClient::new(
            settings.overpass.endpoint.clone(),
            settings.overpass.tag_filters.clone(),
            Duration::from_secs(settings.overpass.timeout_secs),
        ) {
            Ok(client) => {
                info!("Overpass client initialized ({} tag filters)", settings.overpass.tag_filters.len());
                Some(client)
            }
            Err(e) => {
                warn!("Failed to build Overpass client ({}), continuing with directory only", e);
                None
            }
        }
    } else {
        info!("Overpass disabled");
        None
    };

    let cache = if settings.cache.enabled {
        info!(
            "Result cache initialized ({} entries, TTL: {}s)",
            settings.cache.capacity, settings.cache.ttl_secs
        );
        Some(CacheManager::new(settings.cache.capacity, settings.cache.ttl_secs))
    } else {
        None
    };

    let app_state = AppState {
        fetcher: Arc::new(PlaceFetcher::new(directory, overpass, cache)),
        default_sort: settings.search.default_sort,
        default_radius_m: settings.search.default_radius_m,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
