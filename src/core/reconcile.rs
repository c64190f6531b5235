use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{Place, PlaceSource, RawPoi};

/// Placeholder for secondary records without a `name` tag
pub const UNNAMED_PLACE: &str = "Barbershop / Salon";
/// Placeholder for records without any address information
pub const ADDRESS_UNAVAILABLE: &str = "Address unavailable";
/// Placeholder for missing phone/hours
pub const NOT_AVAILABLE: &str = "Not available";

/// Merge two provider result sets into one canonical list
///
/// Every primary record is kept in input order; a secondary record is
/// appended only when its identity key has not been seen. The primary record
/// always wins a conflict and no field-level merging takes place.
/// Within a single input the first occurrence of a key is kept.
pub fn merge(primary: Vec<Place>, secondary: Vec<Place>) -> Vec<Place> {
    let mut seen: HashSet<String> = HashSet::with_capacity(primary.len() + secondary.len());
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    let primary_len = primary.len();
    for place in primary {
        if seen.insert(place.id.clone()) {
            merged.push(place);
        }
    }

    let secondary_len = secondary.len();
    for place in secondary {
        if seen.insert(place.id.clone()) {
            merged.push(place);
        }
    }

    tracing::debug!(
        "Merged {} primary + {} secondary records into {} canonical",
        primary_len,
        secondary_len,
        merged.len()
    );

    merged
}

/// Normalize a raw secondary-provider element into canonical shape
pub fn normalize_poi(raw: RawPoi) -> Place {
    let (latitude, longitude) = match (raw.lat, raw.lon, raw.center) {
        (Some(lat), Some(lon), _) => (Some(lat), Some(lon)),
        (_, _, Some(center)) => (Some(center.lat), Some(center.lon)),
        _ => (None, None),
    };

    let name = raw
        .tags
        .get("name")
        .filter(|n| !n.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| UNNAMED_PLACE.to_string());

    let address = compose_address(&raw).unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string());

    let phone = raw
        .tags
        .get("phone")
        .or_else(|| raw.tags.get("contact:phone"))
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let hours = raw
        .tags
        .get("opening_hours")
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let category = raw
        .tags
        .get("shop")
        .or_else(|| raw.tags.get("amenity"))
        .cloned();

    Place {
        id: format!("osm_{}", raw.id),
        name,
        address,
        phone: Some(phone),
        hours: Some(hours),
        latitude,
        longitude,
        source: PlaceSource::Osm,
        rating_average: 0.0,
        rating_count: 0,
        distance_km: None,
        category,
    }
}

fn compose_address(raw: &RawPoi) -> Option<String> {
    if let Some(full) = raw.tags.get("addr:full") {
        return Some(full.clone());
    }

    let street = raw.tags.get("addr:street")?;
    let mut address = match raw.tags.get("addr:housenumber") {
        Some(number) => format!("{} {}", street, number),
        None => street.clone(),
    };
    if let Some(city) = raw.tags.get("addr:city") {
        address.push_str(", ");
        address.push_str(city);
    }
    Some(address)
}

/// Give a record without a provider id a deterministic fallback key
///
/// The key is a v5 UUID over the name and coordinates rounded to 5 decimals
/// (about one meter), so identical inputs always receive identical keys.
pub fn ensure_identity(mut place: Place) -> Place {
    if place.id.trim().is_empty() {
        let seed = format!(
            "{}|{:.5}|{:.5}",
            place.name.trim().to_lowercase(),
            place.latitude.unwrap_or(0.0),
            place.longitude.unwrap_or(0.0)
        );
        place.id = format!("syn_{}", Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()));
    }
    place
}
