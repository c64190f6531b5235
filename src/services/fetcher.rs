use crate::core::geo::bounding_box;
use crate::core::ranking::annotate_distances;
use crate::core::reconcile::{merge, normalize_poi};
use crate::core::view_state::{FetchCommand, ViewAction};
use crate::models::{Coordinates, Place};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::directory::{DirectoryClient, DirectoryError};
use crate::services::overpass::{OverpassClient, OverpassError};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Directory unavailable: {0}")]
    Directory(#[from] DirectoryError),

    #[error("All providers failed (directory: {primary}; overpass: {secondary})")]
    AllProvidersFailed {
        primary: DirectoryError,
        secondary: OverpassError,
    },
}

/// I/O adapter between the view-state controller and the data sources
///
/// Executes [`FetchCommand`]s against both providers, reconciles the results
/// and reports back with a [`ViewAction`] carrying the command's sequence
/// number.
#[derive(Clone)]
pub struct PlaceFetcher {
    directory: DirectoryClient,
    overpass: Option<OverpassClient>,
    cache: Option<CacheManager>,
}

impl PlaceFetcher {
    pub fn new(directory: DirectoryClient, overpass: Option<OverpassClient>, cache: Option<CacheManager>) -> Self {
        Self {
            directory,
            overpass,
            cache,
        }
    }

    pub fn directory(&self) -> &DirectoryClient {
        &self.directory
    }

    /// Canonical list around a point, from both providers
    ///
    /// One provider failing is logged and tolerated; only both failing is an error.
    /// Records carry no distance; `center` is a search area, not the user.
    pub async fn nearby(&self, center: Coordinates, radius_m: u32) -> Result<Vec<Place>, FetchError> {
        let key = CacheKey::nearby(center.lat, center.lng, radius_m);
        if let Some(cache) = &self.cache {
            if let Ok(places) = cache.get::<Vec<Place>>(&key).await {
                return Ok(places);
            }
        }

        let bbox = bounding_box(center.lat, center.lng, radius_m as f64 / 1000.0);
        let primary_fut = self.directory.nearby(center.lat, center.lng, radius_m);
        let secondary_fut = async {
            match &self.overpass {
                Some(overpass) => overpass.query_area(&bbox).await,
                None => Ok(Vec::new()),
            }
        };

        let (primary, secondary) = tokio::join!(primary_fut, secondary_fut);

        let (primary, secondary) = match (primary, secondary) {
            (Ok(p), Ok(s)) => (p, s),
            (Ok(p), Err(e)) => {
                tracing::warn!("Overpass query failed, using directory results only: {}", e);
                (p, Vec::new())
            }
            (Err(e), Ok(s)) => {
                tracing::warn!("Directory nearby failed, using Overpass results only: {}", e);
                (Vec::new(), s)
            }
            (Err(primary), Err(secondary)) => {
                return Err(FetchError::AllProvidersFailed { primary, secondary });
            }
        };

        let secondary: Vec<Place> = secondary.into_iter().map(normalize_poi).collect();
        let places = merge(primary, secondary);

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &places).await {
                tracing::warn!("Failed to cache nearby results: {}", e);
            }
        }

        Ok(places)
    }

    /// Free-text search against the directory
    pub async fn search(&self, query: &str, location: Option<Coordinates>) -> Result<Vec<Place>, FetchError> {
        let key = CacheKey::search(query, location.map(|l| l.lat), location.map(|l| l.lng));
        if let Some(cache) = &self.cache {
            if let Ok(places) = cache.get::<Vec<Place>>(&key).await {
                return Ok(places);
            }
        }

        let places = self
            .directory
            .search(query, location.map(|l| l.lat), location.map(|l| l.lng))
            .await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &places).await {
                tracing::warn!("Failed to cache search results: {}", e);
            }
        }

        Ok(places)
    }

    /// Run one command and turn the outcome into a view action
    ///
    /// Distances are filled in only when the command carries the user's location.
    pub async fn execute(&self, command: FetchCommand) -> ViewAction {
        let seq = command.seq();
        let (result, origin) = match command {
            FetchCommand::Nearby { center, origin, radius_m, .. } => (self.nearby(center, radius_m).await, origin),
            FetchCommand::Search { query, location, .. } => (self.search(&query, location).await, location),
        };

        match result {
            Ok(mut places) => {
                if let Some(origin) = origin {
                    annotate_distances(&mut places, origin);
                }
                ViewAction::PlacesLoaded { seq, places }
            }
            Err(e) => ViewAction::FetchFailed {
                seq,
                reason: e.to_string(),
            },
        }
    }

    /// Execute commands from `commands` until the channel closes
    ///
    /// Commands run one after another; the sequence numbers let the
    /// controller drop results that were superseded in the meantime.
    pub async fn run(self, mut commands: mpsc::Receiver<FetchCommand>, actions: mpsc::Sender<ViewAction>) {
        while let Some(command) = commands.recv().await {
            let action = self.execute(command).await;
            if actions.send(action).await.is_err() {
                tracing::debug!("Action receiver dropped, stopping fetch worker");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fetcher(directory_url: String, overpass_url: String) -> PlaceFetcher {
        PlaceFetcher::new(
            DirectoryClient::new(directory_url, Duration::from_secs(5)).unwrap(),
            Some(
                OverpassClient::new(overpass_url, vec!["shop=hairdresser".to_string()], Duration::from_secs(5))
                    .unwrap(),
            ),
            None,
        )
    }

    #[tokio::test]
    async fn test_nearby_merges_both_providers() {
        let mut directory = mockito::Server::new_async().await;
        let mut overpass = mockito::Server::new_async().await;
        directory
            .mock("GET", "/places/nearby")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": "osm_1", "name": "Directory copy", "lat": 19.43, "lng": -99.13}]"#)
            .create_async()
            .await;
        overpass
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"elements": [
                    {"type": "node", "id": 1, "lat": 19.43, "lon": -99.13, "tags": {"name": "OSM copy"}},
                    {"type": "node", "id": 2, "lat": 19.44, "lon": -99.13}
                ]}"#,
            )
            .create_async()
            .await;

        let places = fetcher(directory.url(), overpass.url())
            .nearby(Coordinates::new(19.43, -99.13), 5000)
            .await
            .unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Directory copy");
        assert_eq!(places[1].id, "osm_2");
        assert!(places.iter().all(|p| p.distance_km.is_none()));
    }

    #[tokio::test]
    async fn test_execute_reports_failure_with_seq() {
        let mut directory = mockito::Server::new_async().await;
        let mut overpass = mockito::Server::new_async().await;
        directory
            .mock("GET", "/places/nearby")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        overpass.mock("POST", "/").with_status(504).create_async().await;

        let action = fetcher(directory.url(), overpass.url())
            .execute(FetchCommand::Nearby {
                seq: 9,
                center: Coordinates::new(19.43, -99.13),
                origin: None,
                radius_m: 5000,
            })
            .await;

        assert!(matches!(action, ViewAction::FetchFailed { seq: 9, .. }));
    }

    #[tokio::test]
    async fn test_execute_measures_from_user_location_only() {
        let mut directory = mockito::Server::new_async().await;
        let mut overpass = mockito::Server::new_async().await;
        directory
            .mock("GET", "/places/nearby")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": "a", "name": "Centro", "lat": 19.4326, "lng": -99.1332}]"#)
            .expect(2)
            .create_async()
            .await;
        overpass.mock("POST", "/").with_status(504).create_async().await;
        let fetcher = fetcher(directory.url(), overpass.url());
        let center = Coordinates::new(19.4326, -99.1332);

        let unlocated = fetcher
            .execute(FetchCommand::Nearby { seq: 1, center, origin: None, radius_m: 5000 })
            .await;
        let located = fetcher
            .execute(FetchCommand::Nearby {
                seq: 2,
                center,
                origin: Some(Coordinates::new(19.0, -99.1332)),
                radius_m: 5000,
            })
            .await;

        match (unlocated, located) {
            (ViewAction::PlacesLoaded { places: a, .. }, ViewAction::PlacesLoaded { places: b, .. }) => {
                assert_eq!(a[0].distance_km, None);
                assert!(b[0].distance_km.unwrap() > 40.0);
            }
            other => panic!("unexpected actions: {:?}", other),
        }
    }
}
