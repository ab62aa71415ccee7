//! Stormglass astronomy point endpoint. One request covers the whole range.

use super::{http, AstronomyClient};
use crate::config::Config;
use crate::error::AstroError;
use crate::model::{DayRecord, DaySlot};
use crate::range::DateRange;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

const STORMGLASS_ASTRONOMY_URL: &str = "https://api.stormglass.io/v2/astronomy/point";

#[derive(Debug, Deserialize)]
struct PointResponse {
    data: Option<Vec<AstronomyPoint>>,
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AstronomyPoint {
    time: Option<String>,
    sunrise: Option<String>,
    sunset: Option<String>,
    moonrise: Option<String>,
    moonset: Option<String>,
    moon_phase: Option<MoonPhase>,
    /// Illuminated fraction, 0.0 to 1.0.
    moon_fraction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MoonPhase {
    current: Option<PhaseValue>,
}

#[derive(Debug, Deserialize)]
struct PhaseValue {
    text: Option<String>,
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Calendar date of a point, taken in the timestamp's own offset.
fn point_date(time: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(time.trim())
        .map(|t| t.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(time.trim(), "%Y-%m-%d").ok())
}

/// Parses a Stormglass payload into records keyed by date.
/// Points without a readable `time` are skipped.
pub fn parse_point_body(body: &str) -> Result<HashMap<NaiveDate, DayRecord>, AstroError> {
    let response: PointResponse = serde_json::from_str(body)?;
    if let Some(errors) = response.errors {
        return Err(AstroError::FetchError(format!("API error: {}", errors)));
    }
    let points = response
        .data
        .ok_or_else(|| AstroError::FetchError("Invalid API response: no data array".to_string()))?;

    let mut records = HashMap::with_capacity(points.len());
    for point in points {
        let Some(date) = point.time.as_deref().and_then(point_date) else {
            debug!("Stormglass: skipping point without usable time: {:?}", point.time);
            continue;
        };
        let record = DayRecord {
            date,
            sunrise: non_empty(point.sunrise),
            sunset: non_empty(point.sunset),
            moonrise: non_empty(point.moonrise),
            moonset: non_empty(point.moonset),
            moon_phase: non_empty(point.moon_phase.and_then(|p| p.current).and_then(|c| c.text)),
            illumination_percent: point
                .moon_fraction
                .filter(|f| f.is_finite())
                .map(|f| f * 100.0),
        };
        records.entry(date).or_insert(record);
    }
    Ok(records)
}

/// Lays records out over every day of `range`; absent days become missing slots.
pub fn fill_range(range: &DateRange, mut records: HashMap<NaiveDate, DayRecord>) -> Vec<DaySlot> {
    range
        .days()
        .map(|date| match records.remove(&date) {
            Some(record) => DaySlot::filled(record),
            None => DaySlot::missing(date),
        })
        .collect()
}

pub struct StormglassClient {
    http: Client,
    config: Config,
    endpoint: String,
}

impl StormglassClient {
    pub fn new(config: &Config) -> Result<Self, AstroError> {
        Self::with_endpoint(config, STORMGLASS_ASTRONOMY_URL)
    }

    /// Points the client at another astronomy endpoint, e.g. a local mock.
    pub fn with_endpoint(config: &Config, endpoint: &str) -> Result<Self, AstroError> {
        Ok(Self {
            http: http::build_http_client(config.http_timeout_secs)?,
            config: config.clone(),
            endpoint: endpoint.to_string(),
        })
    }

    fn request_url(&self, range: &DateRange) -> Result<Url, AstroError> {
        let (lat, lon) = self.config.validate()?;
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("lat", lat.to_string()),
                ("lng", lon.to_string()),
                ("start", range.start().format("%Y-%m-%d").to_string()),
                ("end", range.end().format("%Y-%m-%d").to_string()),
            ],
        )
        .map_err(|e| AstroError::InvalidConfig(format!("bad Stormglass URL: {}", e)))
    }

    async fn fetch_points(&self, range: &DateRange) -> Result<HashMap<NaiveDate, DayRecord>, AstroError> {
        let url = self.request_url(range)?;
        let request = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.config.api_key.as_str());
        let label = format!("Stormglass astronomy {}", range);
        let body = http::get_ok_body(&label, request).await?;
        let records = parse_point_body(&body)?;
        info!("Stormglass: API returned {} days for {}", records.len(), range);
        Ok(records)
    }
}

#[async_trait]
impl AstronomyClient for StormglassClient {
    fn name(&self) -> &str {
        "Stormglass"
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<DayRecord, AstroError> {
        let range = DateRange::new(date, date)?;
        self.fetch_points(&range)
            .await?
            .remove(&date)
            .ok_or_else(|| AstroError::FetchError(format!("no data returned for {}", date)))
    }

    async fn fetch_range(&self, range: &DateRange) -> Vec<DaySlot> {
        let records = match self.fetch_points(range).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Stormglass: request for {} failed: {}", range, e);
                HashMap::new()
            }
        };
        let slots = fill_range(range, records);
        let missing = slots.iter().filter(|s| s.is_missing()).count();
        if missing > 0 {
            debug!("Stormglass: {} of {} days missing for {}", missing, slots.len(), range);
        }
        slots
    }
}
