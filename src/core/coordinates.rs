use serde::{Deserialize, Serialize};

use crate::core::FormState;
use crate::error::{StarMapError, StarMapResult};

/// Parses the leading decimal number of `text`, browser `parseFloat` style.
///
/// Leading whitespace is skipped and the longest prefix forming a decimal
/// literal (sign, digits, fraction, exponent) or `Infinity` is used; trailing
/// garbage is ignored. Returns NaN when no prefix parses.
#[must_use]
pub fn parse_coordinate(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// How coordinate text is turned into renderer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatePolicy {
    /// Forward whatever parses, NaN included; the renderer decides what to do.
    #[default]
    Lenient,
    /// Reject non-finite or out-of-range coordinates before rendering.
    Strict,
}

/// Observer location in degrees. Either component may be NaN under the
/// lenient policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

impl GeoLocation {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parses the form's coordinate text without validation.
    #[must_use]
    pub fn from_form(form: &FormState) -> Self {
        Self {
            lat: parse_coordinate(&form.latitude),
            lon: parse_coordinate(&form.longitude),
        }
    }

    /// Parses the form's coordinates and applies `policy`.
    pub fn resolve(form: &FormState, policy: CoordinatePolicy) -> StarMapResult<Self> {
        let location = Self::from_form(form);
        if policy == CoordinatePolicy::Strict {
            if !location.lat.is_finite() || location.lat.abs() > 90.0 {
                return Err(StarMapError::InvalidCoordinate {
                    field: "latitude",
                    value: form.latitude.clone(),
                });
            }
            if !location.lon.is_finite() || location.lon.abs() > 180.0 {
                return Err(StarMapError::InvalidCoordinate {
                    field: "longitude",
                    value: form.longitude.clone(),
                });
            }
        }
        Ok(location)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_number_and_ignores_tail() {
        assert_eq!(parse_coordinate("51.5074"), 51.5074);
        assert_eq!(parse_coordinate("  -0.1278"), -0.1278);
        assert_eq!(parse_coordinate("51.5abc"), 51.5);
        assert_eq!(parse_coordinate("1e3"), 1000.0);
        assert_eq!(parse_coordinate("1e"), 1.0);
        assert_eq!(parse_coordinate("1e+"), 1.0);
        assert_eq!(parse_coordinate("-.5"), -0.5);
        assert_eq!(parse_coordinate("+3"), 3.0);
        assert_eq!(parse_coordinate("7."), 7.0);
        assert_eq!(parse_coordinate("12.34.56"), 12.34);
        assert_eq!(parse_coordinate("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn unparseable_text_is_nan() {
        for text in ["abc", "", " ", ".", "-", "+.", "e5", "--1", "N51"] {
            assert!(parse_coordinate(text).is_nan(), "`{text}` should be NaN");
        }
    }

    #[test]
    fn lenient_policy_forwards_nan() {
        let form = FormState::new("2024-03-01", "12:00", "abc", "-0.1278");
        let location = GeoLocation::resolve(&form, CoordinatePolicy::Lenient).expect("lenient");
        assert!(location.lat.is_nan());
        assert_eq!(location.lon, -0.1278);
        assert!(!location.is_finite());
    }

    #[test]
    fn strict_policy_rejects_nan_and_out_of_range() {
        let form = FormState::new("2024-03-01", "12:00", "abc", "0");
        let err = GeoLocation::resolve(&form, CoordinatePolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            StarMapError::InvalidCoordinate { field: "latitude", .. }
        ));

        let form = FormState::new("2024-03-01", "12:00", "10", "181");
        let err = GeoLocation::resolve(&form, CoordinatePolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            StarMapError::InvalidCoordinate { field: "longitude", .. }
        ));
    }
}
