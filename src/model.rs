use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of astronomy data as delivered by a provider.
/// Time fields keep the provider's own string format; the renderer normalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub moonrise: Option<String>,
    pub moonset: Option<String>,
    pub moon_phase: Option<String>,
    pub illumination_percent: Option<f64>,
}

impl DayRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sunrise: None,
            sunset: None,
            moonrise: None,
            moonset: None,
            moon_phase: None,
            illumination_percent: None,
        }
    }
}

/// A day in the requested range; `record` is `None` when the provider had nothing for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub record: Option<DayRecord>,
}

impl DaySlot {
    pub fn filled(record: DayRecord) -> Self {
        Self {
            date: record.date,
            record: Some(record),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, record: None }
    }

    pub fn is_missing(&self) -> bool {
        self.record.is_none()
    }
}
