//! Spherical-earth geodesy: distance, bearing and forward geodesics.
//!
//! Inputs are decimal degrees. There are no failure modes; the functions are
//! not meant to be accurate near the poles.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters (haversine formula).
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial great-circle course from point 1 to point 2, in degrees [0, 360).
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    crate::engine::conventions::wrap360(y.atan2(x).to_degrees())
}

/// Forward geodesic: the point reached from (lat, lon) after travelling
/// `distance_m` meters along `bearing_deg`.
pub fn destination(lat: f64, lon: f64, bearing_deg: f64, distance_m: f64) -> (f64, f64) {
    let d = distance_m / EARTH_RADIUS_M;
    let brng = bearing_deg.to_radians();

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();

    let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * brng.cos()).asin();
    let lon2 = lon1 + (brng.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());

    (lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let d1 = distance(46.5, -2.5, 43.8, -1.8);
        let d2 = distance(43.8, -1.8, 46.5, -2.5);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn bearing_destination_round_trip() {
        let (lat1, lon1) = (46.5, -2.5);
        let (lat2, lon2) = (43.8, -1.8);
        let d = distance(lat1, lon1, lat2, lon2);
        let b = bearing(lat1, lon1, lat2, lon2);
        let (lat3, lon3) = destination(lat1, lon1, b, d);
        let residual = distance(lat2, lon2, lat3, lon3);
        assert!(residual < 1.0, "residual {residual} m");
    }

    #[test]
    fn bearing_due_north_is_zero() {
        let b = bearing(0.0, 0.0, 1.0, 0.0);
        assert!(b.abs() < 1e-6 || (b - 360.0).abs() < 1e-6);
    }

    #[test]
    fn bearing_due_east_is_90() {
        let b = bearing(0.0, 0.0, 0.0, 1.0);
        assert!((b - 90.0).abs() < 1e-6);
    }

    #[test]
    fn destination_zero_distance_is_identity() {
        let (lat, lon) = destination(48.66, -2.03, 123.0, 0.0);
        assert!((lat - 48.66).abs() < 1e-9);
        assert!((lon - (-2.03)).abs() < 1e-9);
    }
}
