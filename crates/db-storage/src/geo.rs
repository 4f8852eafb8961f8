//! Great-circle distance math for the nearby-event listing
//!
//! Distances are computed on a spherical earth model. Radius values cover
//! tens of kilometers, where a flat-plane approximation is off by enough
//! to move events across the radius boundary.

/// Mean earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Conversion factor used at the API boundary (miles in, meters stored)
pub const METERS_PER_MILE: f64 = 1609.0;

/// One degree of latitude in meters, used for the coarse SQL prefilter
const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;

/// Great-circle distance in meters between two `(latitude, longitude)`
/// points, both in degrees.
pub fn haversine_distance_m(origin: (f64, f64), point: (f64, f64)) -> f64 {
    let (lat1, lng1) = (origin.0.to_radians(), origin.1.to_radians());
    let (lat2, lng2) = (point.0.to_radians(), point.1.to_radians());

    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Latitude interval that contains every point within `radius_m` meters of
/// `origin_lat`.
///
/// Longitude has no equivalent cheap bound (degrees shrink towards the
/// poles and wrap at the antimeridian), so only latitude is prefiltered;
/// the exact distance check runs on the candidates.
pub fn latitude_band(origin_lat: f64, radius_m: f64) -> (f64, f64) {
    let delta = radius_m / METERS_PER_DEGREE_LATITUDE;

    ((origin_lat - delta).max(-90.0), (origin_lat + delta).min(90.0))
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_within_half_percent(actual: f64, expected: f64) {
        let deviation = (actual - expected).abs() / expected;
        assert!(
            deviation < 0.005,
            "expected ~{expected} m, got {actual} m ({:.2} % off)",
            deviation * 100.0
        );
    }

    #[test]
    fn zero_distance() {
        assert_eq!(haversine_distance_m((40.0, -74.0), (40.0, -74.0)), 0.0);
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let d = haversine_distance_m((0.0, 0.0), (0.0, 1.0));
        assert_within_half_percent(d, 111_195.0);
    }

    #[test]
    fn paris_to_london() {
        let d = haversine_distance_m((48.8566, 2.3522), (51.5074, -0.1278));
        assert_within_half_percent(d, 343_500.0);
    }

    #[test]
    fn new_york_to_los_angeles() {
        let d = haversine_distance_m((40.7128, -74.0060), (34.0522, -118.2437));
        assert_within_half_percent(d, 3_936_000.0);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        // place a point exactly `radius` meters east of the origin
        let radius = 80_467.0; // 50 miles
        let lng = (radius / EARTH_RADIUS_M).to_degrees();

        let d = haversine_distance_m((0.0, 0.0), (0.0, lng));

        assert!((d - radius).abs() < 1e-6);
        assert!(d <= radius, "event on the boundary must be included");
        assert!(d > radius - 1.0, "one meter less must exclude it");
    }

    #[test]
    fn latitude_band_is_clamped_at_the_poles() {
        let (lo, hi) = latitude_band(89.9, 100_000.0);
        assert!(lo < 89.9);
        assert_eq!(hi, 90.0);
    }
}
