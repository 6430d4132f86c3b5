use chrono::{DateTime, Utc};

/// Combines form date and time into a UTC instant.
///
/// The text `"{date}T{time}:00Z"` must be a valid RFC 3339 timestamp, so a
/// time that already carries seconds or an empty field yields `None`. `None`
/// is the invalid instant; callers forward it rather than treat it as an error.
#[must_use]
pub fn observation_instant(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let stamp = format!("{date}T{time}:00Z");
    DateTime::parse_from_rfc3339(&stamp)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_and_time_are_read_as_utc() {
        let instant = observation_instant("2024-03-01", "21:45").expect("valid instant");
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 1, 21, 45, 0).unwrap());
    }

    #[test]
    fn malformed_parts_give_invalid_instant() {
        assert!(observation_instant("2024-03-01", "21:45:10").is_none());
        assert!(observation_instant("2024-02-30", "10:00").is_none());
        assert!(observation_instant("", "10:00").is_none());
        assert!(observation_instant("2024-03-01", "").is_none());
        assert!(observation_instant("2024-03-01", "25:00").is_none());
    }
}
