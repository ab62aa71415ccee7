//! WeatherAPI.com astronomy endpoint, queried one day at a time.

use super::{http, AstronomyClient};
use crate::config::Config;
use crate::error::AstroError;
use crate::model::DayRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

const WEATHERAPI_ASTRONOMY_URL: &str = "http://api.weatherapi.com/v1/astronomy.json";

#[derive(Debug, Deserialize)]
struct AstronomyResponse {
    astronomy: Option<AstronomyBlock>,
}

#[derive(Debug, Deserialize)]
struct AstronomyBlock {
    astro: Option<Astro>,
}

#[derive(Debug, Deserialize)]
struct Astro {
    sunrise: Option<String>,
    sunset: Option<String>,
    moonrise: Option<String>,
    moonset: Option<String>,
    moon_phase: Option<String>,
    /// Sent as a number or a numeric string depending on plan/version.
    moon_illumination: Option<Value>,
}

/// "No moonrise" and friends mean the event does not happen that day.
fn event_time(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.to_ascii_lowercase().starts_with("no "))
}

fn illumination(raw: Option<Value>) -> Option<f64> {
    match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

/// Parses a WeatherAPI astronomy body into a record for `date`.
pub fn parse_astronomy_body(body: &str, date: NaiveDate) -> Result<DayRecord, AstroError> {
    let response: AstronomyResponse = serde_json::from_str(body)?;
    let astro = response
        .astronomy
        .and_then(|block| block.astro)
        .ok_or_else(|| AstroError::FetchError("response lacks astronomy.astro".to_string()))?;

    Ok(DayRecord {
        date,
        sunrise: event_time(astro.sunrise),
        sunset: event_time(astro.sunset),
        moonrise: event_time(astro.moonrise),
        moonset: event_time(astro.moonset),
        moon_phase: astro.moon_phase.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        illumination_percent: illumination(astro.moon_illumination),
    })
}

pub struct WeatherApiClient {
    http: Client,
    config: Config,
    endpoint: String,
}

impl WeatherApiClient {
    pub fn new(config: &Config) -> Result<Self, AstroError> {
        Self::with_endpoint(config, WEATHERAPI_ASTRONOMY_URL)
    }

    /// Points the client at another astronomy endpoint, e.g. a local mock.
    pub fn with_endpoint(config: &Config, endpoint: &str) -> Result<Self, AstroError> {
        Ok(Self {
            http: http::build_http_client(config.http_timeout_secs)?,
            config: config.clone(),
            endpoint: endpoint.to_string(),
        })
    }

    fn request_url(&self, date: NaiveDate) -> Result<Url, AstroError> {
        let (lat, lon) = self.config.validate()?;
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("key", self.config.api_key.clone()),
                ("q", format!("{},{}", lat, lon)),
                ("dt", date.format("%Y-%m-%d").to_string()),
            ],
        )
        .map_err(|e| AstroError::InvalidConfig(format!("bad WeatherAPI URL: {}", e)))
    }
}

#[async_trait]
impl AstronomyClient for WeatherApiClient {
    fn name(&self) -> &str {
        "WeatherAPI"
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<DayRecord, AstroError> {
        let url = self.request_url(date)?;
        debug!("WeatherAPI: fetching astronomy for {}", date);
        let label = format!("WeatherAPI astronomy {}", date);
        let body = http::get_ok_body(&label, self.http.get(url)).await?;
        parse_astronomy_body(&body, date).map_err(|e| {
            warn!("WeatherAPI: unexpected payload for {}: {}", date, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    const SAMPLE: &str = r#"{
        "location": {"name": "Edinburgh", "lat": 55.95, "lon": -3.19},
        "astronomy": {"astro": {
            "sunrise": "06:21 AM",
            "sunset": "06:16 PM",
            "moonrise": "No moonrise",
            "moonset": "10:05 AM",
            "moon_phase": "Full Moon",
            "moon_illumination": 98,
            "is_moon_up": 0,
            "is_sun_up": 0
        }}
    }"#;

    #[test]
    fn test_parse_full_payload() {
        let record = parse_astronomy_body(SAMPLE, d("2024-03-25")).unwrap();
        assert_eq!(record.date, d("2024-03-25"));
        assert_eq!(record.sunrise.as_deref(), Some("06:21 AM"));
        assert_eq!(record.sunset.as_deref(), Some("06:16 PM"));
        assert_eq!(record.moonrise, None);
        assert_eq!(record.moonset.as_deref(), Some("10:05 AM"));
        assert_eq!(record.moon_phase.as_deref(), Some("Full Moon"));
        assert_eq!(record.illumination_percent, Some(98.0));
    }

    #[test]
    fn test_illumination_as_string() {
        let body = r#"{"astronomy": {"astro": {"sunrise": "07:00 AM", "moon_illumination": "42"}}}"#;
        let record = parse_astronomy_body(body, d("2024-01-01")).unwrap();
        assert_eq!(record.illumination_percent, Some(42.0));
        assert_eq!(record.moon_phase, None);
    }

    #[test]
    fn test_missing_astro_block_is_fetch_error() {
        let err = parse_astronomy_body(r#"{"astronomy": {}}"#, d("2024-01-01")).unwrap_err();
        assert!(matches!(err, AstroError::FetchError(_)));

        let err = parse_astronomy_body(r#"{"error": {"code": 2006}}"#, d("2024-01-01")).unwrap_err();
        assert!(matches!(err, AstroError::FetchError(_)));

        let err = parse_astronomy_body("<html>", d("2024-01-01")).unwrap_err();
        assert!(matches!(err, AstroError::FetchError(_)));
    }

    #[test]
    fn test_request_url_carries_key_location_and_date() {
        let config = Config::new(Provider::WeatherApi, "k3y", 55.95, -3.19);
        let client = WeatherApiClient::new(&config).unwrap();
        let url = client.request_url(d("2024-03-05")).unwrap();
        assert_eq!(url.host_str(), Some("api.weatherapi.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("key".to_string(), "k3y".to_string()),
                ("q".to_string(), "55.95,-3.19".to_string()),
                ("dt".to_string(), "2024-03-05".to_string()),
            ]
        );
    }
}
