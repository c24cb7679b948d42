/// Mean Earth radius used by the haversine distance, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Builds a coordinate a feed item may be placed at.
    ///
    /// Returns `None` for non-finite or out-of-range values and for the exact
    /// (0, 0) pair, which feeds use to mean "no location".
    pub fn located(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        if lat == 0.0 && lon == 0.0 {
            return None;
        }
        Some(Self { lat, lon })
    }

    /// GeoJSON position order.
    pub fn lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Great-circle distance in km.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Parses a feed number, tolerating surrounding whitespace.
#[inline]
pub fn parse_feed_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_island_is_not_a_location() {
        assert_eq!(Coordinate::located(0.0, 0.0), None);
        assert!(Coordinate::located(0.0, 12.5).is_some());
        assert!(Coordinate::located(-3.2, 0.0).is_some());
    }

    #[test]
    fn nan_and_out_of_range() {
        assert_eq!(Coordinate::located(f64::NAN, 10.0), None);
        assert_eq!(Coordinate::located(10.0, f64::INFINITY), None);
        assert_eq!(Coordinate::located(91.0, 10.0), None);
        assert_eq!(Coordinate::located(10.0, -181.0), None);
    }

    #[test]
    fn haversine_known_distance() {
        let london = Coordinate { lat: 51.5, lon: -0.1 };
        let paris = Coordinate { lat: 48.9, lon: 2.3 };
        let d = haversine_km(london, paris);
        assert!((d - 334.0).abs() < 10.0, "got {d}");
        assert_eq!(haversine_km(london, london), 0.0);
    }

    #[test]
    fn parse_feed_number_rejects_garbage() {
        assert_eq!(parse_feed_number(" 38.5 "), Some(38.5));
        assert_eq!(parse_feed_number("abc"), None);
        assert_eq!(parse_feed_number("NaN"), None);
    }
}
