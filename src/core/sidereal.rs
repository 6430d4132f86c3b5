//! Sidereal time and zenith position.
//!
//! Enough astronomy to center a map on the observer's zenith: GMST from the
//! IAU 1982 polynomial, then local sidereal time as the zenith right ascension.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::GeoLocation;

/// 2000-01-01T12:00:00Z.
pub const J2000_UNIX_MILLIS: i64 = 946_728_000_000;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
pub const GMST_BASE_DEG: f64 = 280.460_618_37;
pub const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
pub const GMST_CORRECTION: f64 = 0.000_387_933;

/// Point on the celestial sphere, equatorial frame, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialPoint {
    /// Right ascension in [0, 360).
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// Greenwich mean sidereal time in degrees, normalized to [0, 360).
#[must_use]
pub fn greenwich_mean_sidereal_time(instant: DateTime<Utc>) -> f64 {
    let days_since_j2000 = (instant.timestamp_millis() - J2000_UNIX_MILLIS) as f64
        / (1000.0 * SECONDS_PER_DAY);
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    gmst_degrees.rem_euclid(360.0)
}

/// Zenith of `location` at `instant`, or `None` for non-finite coordinates.
#[must_use]
pub fn zenith(location: GeoLocation, instant: DateTime<Utc>) -> Option<EquatorialPoint> {
    if !location.is_finite() {
        return None;
    }
    let local_sidereal = greenwich_mean_sidereal_time(instant) + location.lon;
    Some(EquatorialPoint {
        ra_deg: local_sidereal.rem_euclid(360.0),
        dec_deg: location.lat.clamp(-90.0, 90.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    #[test]
    fn gmst_at_j2000_epoch() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_abs_diff_eq!(greenwich_mean_sidereal_time(j2000), GMST_BASE_DEG, epsilon = 1e-9);
    }

    #[test]
    fn gmst_matches_almanac_value() {
        // 2024-03-01 00:00 UT: GMST is about 10h 37m 10s (159.29 deg).
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_abs_diff_eq!(greenwich_mean_sidereal_time(instant), 159.29, epsilon = 0.05);
    }

    #[test]
    fn zenith_tracks_longitude_and_latitude() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let gmst = greenwich_mean_sidereal_time(instant);
        let point = zenith(GeoLocation::new(51.5074, -0.1278), instant).expect("finite location");
        assert_abs_diff_eq!(point.ra_deg, (gmst - 0.1278).rem_euclid(360.0), epsilon = 1e-9);
        assert_abs_diff_eq!(point.dec_deg, 51.5074, epsilon = 1e-12);
        assert!(zenith(GeoLocation::new(f64::NAN, 0.0), instant).is_none());
    }
}
