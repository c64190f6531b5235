use crate::models::BoundingBox;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (approximate)
const KM_PER_DEGREE: f64 = 111.0;

/// Great-circle distance between two points in kilometers (haversine)
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lng1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lng2` - Longitude of second point in degrees
///
/// NaN inputs propagate to a NaN result; callers validate coordinates first.
#[inline]
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box around a center point
///
/// Used to build the secondary provider's area query.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let lng_delta = radius_km / (KM_PER_DEGREE * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lng: lng - lng_delta,
        max_lng: lng + lng_delta,
    }
}

/// Finite and inside the WGS84 ranges
#[inline]
pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_mexico_city_to_puebla() {
        // Zócalo to Puebla centro is roughly 105 km
        let distance = distance_km(19.4326, -99.1332, 19.0414, -98.2063);
        assert!((distance - 105.0).abs() < 10.0, "Distance should be ~105km, got {}", distance);
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance_km(19.4326, -99.1332, 19.4326, -99.1332), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let ab = distance_km(51.5074, -0.1278, 48.8566, 2.3522);
        let ba = distance_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_km(f64::NAN, 0.0, 1.0, 1.0).is_nan());
    }

    #[test]
    fn test_bounding_box() {
        let bbox = bounding_box(19.4326, -99.1332, 5.0);

        assert!(bbox.min_lat < 19.4326 && bbox.max_lat > 19.4326);
        assert!(bbox.min_lng < -99.1332 && bbox.max_lng > -99.1332);

        // 10km / 111km per degree = ~0.09 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.09).abs() < 0.01, "Lat span should be ~0.09 degrees");
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(is_valid_coordinate(0.0, 0.0));
        assert!(is_valid_coordinate(-90.0, 180.0));
        assert!(!is_valid_coordinate(90.5, 0.0));
        assert!(!is_valid_coordinate(0.0, -181.0));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
    }
}
