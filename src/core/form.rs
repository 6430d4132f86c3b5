use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StarMapError;

/// Default location as entered in the form: latitude and longitude text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub latitude: String,
    pub longitude: String,
}

impl Default for DefaultLocation {
    fn default() -> Self {
        // London.
        Self {
            latitude: "51.5074".to_owned(),
            longitude: "-0.1278".to_owned(),
        }
    }
}

/// Editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Date,
    Time,
    Latitude,
    Longitude,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Date,
        FormField::Time,
        FormField::Latitude,
        FormField::Longitude,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FormField::Date => "date",
            FormField::Time => "time",
            FormField::Latitude => "latitude",
            FormField::Longitude => "longitude",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = StarMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(FormField::Date),
            "time" => Ok(FormField::Time),
            "latitude" | "lat" => Ok(FormField::Latitude),
            "longitude" | "lon" | "lng" => Ok(FormField::Longitude),
            other => Err(StarMapError::InvalidSettings(format!(
                "unknown form field `{other}`"
            ))),
        }
    }
}

/// Raw text of the four inputs.
///
/// Values stay uninterpreted until a render is requested: nothing here parses
/// or validates, so whatever the user typed is what the renderer config and
/// the export filename will see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub date: String,
    pub time: String,
    pub latitude: String,
    pub longitude: String,
}

impl FormState {
    #[must_use]
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Builds defaults from explicit clocks.
    ///
    /// The date comes from the UTC calendar day while the time is local
    /// wall-clock `HH:MM`; near midnight the two can disagree.
    #[must_use]
    pub fn with_clock(
        now_utc: DateTime<Utc>,
        local_time: NaiveTime,
        location: &DefaultLocation,
    ) -> Self {
        Self {
            date: now_utc.format("%Y-%m-%d").to_string(),
            time: local_time.format("%H:%M").to_string(),
            latitude: location.latitude.clone(),
            longitude: location.longitude.clone(),
        }
    }

    /// Defaults taken from the system clock.
    #[must_use]
    pub fn now(location: &DefaultLocation) -> Self {
        Self::with_clock(Utc::now(), Local::now().time(), location)
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::Latitude => &self.latitude,
            FormField::Longitude => &self.longitude,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
            FormField::Latitude => &mut self.latitude,
            FormField::Longitude => &mut self.longitude,
        };
        *slot = value.into();
    }
}
