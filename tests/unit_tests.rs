// Unit tests for Placefinder

use placefinder::core::{
    bounding_box, classify, distance_km, ensure_identity, merge, normalize_poi,
    rank, DragMetrics, DragOutcome, GestureThresholds,
};
use placefinder::core::gesture::CloseRule;
use placefinder::core::reconcile::{ADDRESS_UNAVAILABLE, NOT_AVAILABLE, UNNAMED_PLACE};
use placefinder::models::{Coordinates, Place, PlaceSource, RawPoi, SortOrder};
use std::collections::{HashMap, HashSet};

fn create_place(id: &str, name: &str, lat: Option<f64>, lng: Option<f64>, rating: f64, count: u32) -> Place {
    Place {
        id: id.to_string(),
        name: name.to_string(),
        address: String::new(),
        phone: None,
        hours: None,
        latitude: lat,
        longitude: lng,
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

fn metrics(distance_px: f64, duration_ms: f64, height_percent: f64) -> DragMetrics {
    DragMetrics {
        distance_px,
        duration_ms,
        velocity: if duration_ms < 1.0 { 0.0 } else { distance_px.abs() / duration_ms },
        height_percent,
    }
}

#[test]
fn test_distance_zero_for_same_point() {
    let distance = distance_km(19.432608, -99.133209, 19.432608, -99.133209);
    assert_eq!(distance, 0.0);
}

#[test]
fn test_distance_is_symmetric() {
    // Zocalo to Coyoacan
    let a = distance_km(19.4326, -99.1332, 19.3500, -99.1620);
    let b = distance_km(19.3500, -99.1620, 19.4326, -99.1332);

    assert!((a - b).abs() < 1e-9);
    assert!(a > 8.0 && a < 11.0);
}

#[test]
fn test_bounding_box_contains_center() {
    let bbox = bounding_box(19.432608, -99.133209, 5.0);

    assert!(bbox.min_lat < 19.432608 && bbox.max_lat > 19.432608);
    assert!(bbox.min_lng < -99.133209 && bbox.max_lng > -99.133209);
    assert!(bbox.max_lat < 20.0);

    // Roughly 0.09 degrees in latitude (10km / 111km per degree)
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.09).abs() < 0.01);
}

#[test]
fn test_merge_with_empty_secondary_is_identity() {
    let primary = vec![
        create_place("1", "Uno", None, None, 0.0, 0),
        create_place("2", "Dos", None, None, 0.0, 0),
        create_place("3", "Tres", None, None, 0.0, 0),
    ];

    let merged = merge(primary.clone(), Vec::new());

    assert_eq!(merged, primary);
}

#[test]
fn test_merge_with_itself_has_no_duplicates() {
    let list = vec![
        create_place("1", "Uno", None, None, 0.0, 0),
        create_place("2", "Dos", None, None, 0.0, 0),
    ];

    let merged = merge(list.clone(), list);
    let unique: HashSet<&str> = merged.iter().map(|p| p.id.as_str()).collect();

    assert_eq!(merged.len(), 2);
    assert_eq!(unique.len(), merged.len());
}

#[test]
fn test_merge_primary_name_wins() {
    let primary = vec![create_place("1", "X", None, None, 0.0, 0)];
    let secondary = vec![create_place("1", "Y", None, None, 0.0, 0)];

    let merged = merge(primary, secondary);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, "X");
}

#[test]
fn test_normalize_poi_fills_placeholders() {
    let raw = RawPoi {
        kind: "node".to_string(),
        id: 42,
        lat: Some(19.43),
        lon: Some(-99.13),
        center: None,
        tags: HashMap::new(),
    };

    let place = normalize_poi(raw);

    assert_eq!(place.id, "osm_42");
    assert_eq!(place.name, UNNAMED_PLACE);
    assert_eq!(place.address, ADDRESS_UNAVAILABLE);
    assert_eq!(place.phone.as_deref(), Some(NOT_AVAILABLE));
    assert_eq!(place.source, PlaceSource::Osm);
    assert_eq!(place.rating_count, 0);
}

#[test]
fn test_ensure_identity_is_deterministic() {
    let a = ensure_identity(create_place("", "Barberia Roma", Some(19.41), Some(-99.16), 0.0, 0));
    let b = ensure_identity(create_place("", "  barberia roma ", Some(19.41), Some(-99.16), 0.0, 0));

    assert!(a.id.starts_with("syn_"));
    assert_eq!(a.id, b.id);
}

#[test]
fn test_rank_by_rating_is_stable() {
    let places = vec![
        create_place("a", "A", None, None, 4.0, 3),
        create_place("b", "B", None, None, 4.5, 1),
        create_place("c", "C", None, None, 4.0, 9),
        create_place("d", "D", None, None, 4.5, 2),
    ];

    let first = rank(places.clone(), SortOrder::Rating, None);
    let second = rank(places, SortOrder::Rating, None);

    assert_eq!(ids(&first), vec!["b", "d", "a", "c"]);
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn test_rank_by_distance_puts_unknown_last() {
    let origin = Coordinates::new(19.4326, -99.1332);
    let places = vec![
        create_place("nowhere", "No coords", None, None, 5.0, 10),
        create_place("far", "Far", Some(19.50), Some(-99.13), 0.0, 0),
        create_place("bad", "Bad coords", Some(123.0), Some(-99.13), 0.0, 0),
        create_place("near", "Near", Some(19.433), Some(-99.133), 0.0, 0),
    ];

    let ranked = rank(places, SortOrder::Distance, Some(origin));

    assert_eq!(ids(&ranked)[..2], ["near", "far"]);
    assert!(ranked[2..].iter().all(|p| p.distance_km.is_none()));
}

#[test]
fn test_rank_by_distance_without_location_is_pass_through() {
    let places = vec![
        create_place("far", "Far", Some(19.50), Some(-99.13), 0.0, 0),
        create_place("near", "Near", Some(19.433), Some(-99.133), 0.0, 0),
    ];

    let ranked = rank(places, SortOrder::Distance, None);

    assert_eq!(ids(&ranked), vec!["far", "near"]);
}

#[test]
fn test_rank_by_reviews() {
    let places = vec![
        create_place("a", "A", None, None, 0.0, 3),
        create_place("b", "B", None, None, 0.0, 30),
        create_place("c", "C", None, None, 0.0, 3),
    ];

    let ranked = rank(places, SortOrder::Reviews, None);

    assert_eq!(ids(&ranked), vec!["b", "a", "c"]);
}

#[test]
fn test_classify_close_cascade_order() {
    let t = GestureThresholds::default();

    // 150px down over 200ms
    assert_eq!(classify(&metrics(-150.0, 200.0, 60.0), &t), DragOutcome::Close(CloseRule::FastDown));
    // 120px down, slowly
    assert_eq!(classify(&metrics(-120.0, 2000.0, 60.0), &t), DragOutcome::Close(CloseRule::LongDown));
    // Any direction below the minimum height
    assert_eq!(classify(&metrics(40.0, 2000.0, 20.0), &t), DragOutcome::Close(CloseRule::BelowMinHeight));
    // 60px down at 0.3 px/ms
    assert_eq!(classify(&metrics(-60.0, 200.0, 60.0), &t), DragOutcome::Close(CloseRule::MediumDown));
}

#[test]
fn test_classify_snaps_without_close() {
    let t = GestureThresholds::default();

    // 60px down over 500ms matches no close rule
    assert_eq!(classify(&metrics(-60.0, 500.0, 67.5), &t), DragOutcome::Snap(25.0));
    // Fast upward
    assert_eq!(classify(&metrics(80.0, 100.0, 85.0), &t), DragOutcome::Snap(90.0));
    // No movement falls back to the height buckets
    assert_eq!(classify(&metrics(0.0, 30.0, 40.0), &t), DragOutcome::Snap(25.0));
    assert_eq!(classify(&metrics(0.0, 30.0, 60.0), &t), DragOutcome::Snap(75.0));
    assert_eq!(classify(&metrics(0.0, 30.0, 80.0), &t), DragOutcome::Snap(90.0));
}

#[test]
fn test_classify_zero_duration_uses_position() {
    let t = GestureThresholds::default();

    let m = metrics(3.0, 0.0, 76.0);

    assert_eq!(m.velocity, 0.0);
    assert_eq!(classify(&m, &t), DragOutcome::Snap(90.0));
}
