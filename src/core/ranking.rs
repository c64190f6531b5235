use std::cmp::Ordering;

use crate::core::geo::distance_km;
use crate::models::{Coordinates, Place, SortOrder};

/// Order the canonical list by the given criterion
///
/// All orderings are stable: records with equal keys keep their input order.
/// Distance ordering fills in `distance_km` for records that lack it and
/// degrades to a pass-through when the user location is unknown.
pub fn rank(mut places: Vec<Place>, order: SortOrder, user_location: Option<Coordinates>) -> Vec<Place> {
    match order {
        SortOrder::Distance => {
            let Some(origin) = user_location else {
                tracing::trace!("No user location, distance ranking is a pass-through");
                return places;
            };
            annotate_distances(&mut places, origin);
            places.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));
        }
        SortOrder::Rating => {
            places.sort_by(|a, b| {
                b.rating_average
                    .partial_cmp(&a.rating_average)
                    .unwrap_or(Ordering::Equal)
            });
        }
        SortOrder::Reviews => {
            places.sort_by(|a, b| b.rating_count.cmp(&a.rating_count));
        }
    }

    places
}

/// Fill in `distance_km` where it is missing and the record has valid coordinates
pub fn annotate_distances(places: &mut [Place], origin: Coordinates) {
    for place in places.iter_mut() {
        if place.distance_km.is_none() {
            place.distance_km = place
                .coordinates()
                .map(|c| distance_km(origin.lat, origin.lng, c.lat, c.lng));
        }
    }
}

/// Ascending, with missing or non-finite distances after every finite one
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|d| d.is_finite());
    let b = b.filter(|d| d.is_finite());

    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceSource;

    fn place(id: &str, lat: Option<f64>, rating: f64, count: u32) -> Place {
        Place {
            id: id.to_string(),
            name: format!("Place {}", id),
            address: String::new(),
            phone: None,
            hours: None,
            latitude: lat,
            longitude: lat.map(|_| -99.1332),
            source: PlaceSource::Directory,
            rating_average: rating,
            rating_count: count,
            distance_km: None,
            category: None,
        }
    }

    fn ids(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_rank_by_distance() {
        let origin = Coordinates::new(19.4326, -99.1332);
        let places = vec![
            place("far", Some(19.60), 0.0, 0),
            place("none", None, 0.0, 0),
            place("near", Some(19.44), 0.0, 0),
        ];

        let ranked = rank(places, SortOrder::Distance, Some(origin));

        assert_eq!(ids(&ranked), vec!["near", "far", "none"]);
        assert!(ranked[0].distance_km.is_some());
        assert!(ranked[2].distance_km.is_none());
    }

    #[test]
    fn test_rank_by_distance_without_location_is_passthrough() {
        let places = vec![place("b", Some(19.6), 0.0, 0), place("a", Some(19.4), 0.0, 0)];

        let ranked = rank(places, SortOrder::Distance, None);

        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn test_cached_distance_is_respected() {
        let mut cached = place("cached", Some(19.9), 0.0, 0);
        cached.distance_km = Some(0.1);
        let places = vec![place("near", Some(19.44), 0.0, 0), cached];

        let ranked = rank(places, SortOrder::Distance, Some(Coordinates::new(19.4326, -99.1332)));

        assert_eq!(ids(&ranked), vec!["cached", "near"]);
    }

    #[test]
    fn test_rank_by_rating_keeps_unrated_in_order() {
        let places = vec![
            place("u1", None, 0.0, 0),
            place("mid", None, 3.5, 2),
            place("u2", None, 0.0, 0),
            place("top", None, 4.8, 1),
        ];

        let ranked = rank(places, SortOrder::Rating, None);

        assert_eq!(ids(&ranked), vec!["top", "mid", "u1", "u2"]);
    }

    #[test]
    fn test_rank_by_review_count_is_stable() {
        let places = vec![
            place("a", None, 0.0, 3),
            place("b", None, 0.0, 10),
            place("c", None, 0.0, 3),
        ];

        let first = rank(places.clone(), SortOrder::Reviews, None);
        let second = rank(places, SortOrder::Reviews, None);

        assert_eq!(ids(&first), vec!["b", "a", "c"]);
        assert_eq!(first, second);
    }
}
