//! Astronomy API clients.
//!
//! A client turns a date (or a range) into `DayRecord`s. Failures stay inside
//! this boundary: `fetch_range` never errors, it marks the affected days as
//! missing so the caller can render placeholders.

pub mod http;
pub mod stormglass;
pub mod weatherapi;

pub use stormglass::StormglassClient;
pub use weatherapi::WeatherApiClient;

use crate::config::{Config, Provider};
use crate::error::AstroError;
use crate::model::{DayRecord, DaySlot};
use crate::range::DateRange;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use std::sync::Arc;

#[async_trait]
pub trait AstronomyClient: Send + Sync {
    /// Returns the provider name (e.g., "WeatherAPI", "Stormglass").
    fn name(&self) -> &str;

    /// Fetches one day. Non-200 responses, transport errors and payloads
    /// missing the expected fields all come back as `AstroError::FetchError`.
    async fn fetch_day(&self, date: NaiveDate) -> Result<DayRecord, AstroError>;

    /// Fetches every day of `range` in order, one call per day.
    async fn fetch_range(&self, range: &DateRange) -> Vec<DaySlot> {
        let mut slots = Vec::with_capacity(range.len_days());
        for date in range.days() {
            match self.fetch_day(date).await {
                Ok(record) => slots.push(DaySlot::filled(record)),
                Err(e) => {
                    warn!("{}: failed to fetch data for {}: {}", self.name(), date, e);
                    slots.push(DaySlot::missing(date));
                }
            }
        }
        slots
    }
}

pub fn client_for(config: &Config) -> Result<Arc<dyn AstronomyClient>, AstroError> {
    match config.provider {
        Provider::WeatherApi => Ok(Arc::new(WeatherApiClient::new(config)?)),
        Provider::Stormglass => Ok(Arc::new(StormglassClient::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OddDaysOnly;

    #[async_trait]
    impl AstronomyClient for OddDaysOnly {
        fn name(&self) -> &str {
            "odd"
        }

        async fn fetch_day(&self, date: NaiveDate) -> Result<DayRecord, AstroError> {
            use chrono::Datelike;
            if date.day() % 2 == 1 {
                Ok(DayRecord::empty(date))
            } else {
                Err(AstroError::FetchError("even day".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_default_fetch_range_degrades_failed_days() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let range = DateRange::new(start, end).unwrap();

        let slots = OddDaysOnly.fetch_range(&range).await;
        assert_eq!(slots.len(), 4);
        let missing: Vec<bool> = slots.iter().map(DaySlot::is_missing).collect();
        assert_eq!(missing, vec![false, true, false, true]);
        assert_eq!(slots[1].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_client_for_picks_provider() {
        let config = Config::new(Provider::Stormglass, "key", 0.0, 0.0);
        assert_eq!(client_for(&config).unwrap().name(), "Stormglass");
        let config = Config::new(Provider::WeatherApi, "key", 0.0, 0.0);
        assert_eq!(client_for(&config).unwrap().name(), "WeatherAPI");
    }
}
