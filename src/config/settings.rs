use crate::error::AstroError;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const HOUR_SECS: u64 = 60 * 60;

/// Which astronomy API backs the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// WeatherAPI.com, one request per day.
    WeatherApi,
    /// Stormglass, one request per range.
    Stormglass,
}

impl Provider {
    /// Cache lifetime used when `ASTRO_CACHE_TTL_SECS` is not set.
    pub fn default_ttl_secs(&self) -> u64 {
        match self {
            Provider::WeatherApi => 12 * HOUR_SECS,
            Provider::Stormglass => 30 * 24 * HOUR_SECS,
        }
    }
}

impl FromStr for Provider {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weatherapi" | "weatherapi.com" => Ok(Provider::WeatherApi),
            "stormglass" => Ok(Provider::Stormglass),
            other => Err(AstroError::InvalidConfig(format!("unknown provider '{}'", other))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::WeatherApi => write!(f, "weatherapi"),
            Provider::Stormglass => write!(f, "stormglass"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(AstroError::InvalidConfig(format!("unknown cache backend '{}'", other))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub cache_backend: CacheBackend,
    pub redis_url: String,
    pub cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    /// Offset applied to provider timestamps before printing HH:MM.
    pub utc_offset_minutes: i32,
    /// Skip cache reads; fetched data still refreshes the entry.
    pub cache_bypass: bool,
}

// The API key never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("cache_backend", &self.cache_backend)
            .field("redis_url", &self.redis_url)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .field("cache_bypass", &self.cache_bypass)
            .finish()
    }
}

impl Config {
    pub fn new(provider: Provider, api_key: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Config {
            provider,
            api_key: api_key.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            cache_backend: CacheBackend::Memory,
            redis_url: "redis://localhost".to_string(),
            cache_ttl_secs: provider.default_ttl_secs(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            utc_offset_minutes: 0,
            cache_bypass: false,
        }
    }

    pub fn from_env() -> Result<Self, AstroError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any variable source. A present but malformed
    /// numeric or boolean value is an error; coordinates are checked later.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AstroError> {
        let provider: Provider = lookup("ASTRO_PROVIDER")
            .unwrap_or_else(|| "weatherapi".to_string())
            .parse()?;
        let cache_backend: CacheBackend = lookup("ASTRO_CACHE_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .parse()?;

        Ok(Config {
            provider,
            api_key: lookup("ASTRO_API_KEY").unwrap_or_default().trim().to_string(),
            latitude: coordinate(&lookup, "ASTRO_LATITUDE"),
            longitude: coordinate(&lookup, "ASTRO_LONGITUDE"),
            cache_backend,
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| "redis://localhost".to_string()),
            cache_ttl_secs: parse_var(&lookup, "ASTRO_CACHE_TTL_SECS")?
                .unwrap_or_else(|| provider.default_ttl_secs()),
            http_timeout_secs: parse_var(&lookup, "ASTRO_HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            utc_offset_minutes: parse_var(&lookup, "ASTRO_UTC_OFFSET_MINUTES")?.unwrap_or(0),
            cache_bypass: parse_flag(&lookup, "ASTRO_CACHE_BYPASS")?.unwrap_or(false),
        })
    }

    /// Returns the coordinates once key and location are usable.
    pub fn validate(&self) -> Result<(f64, f64), AstroError> {
        if self.api_key.is_empty() {
            return Err(AstroError::InvalidConfig("API key is not set".to_string()));
        }
        let (lat, lon) = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
            _ => {
                return Err(AstroError::InvalidConfig(
                    "latitude and longitude must be numeric".to_string(),
                ))
            }
        };
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(AstroError::InvalidConfig(format!(
                "coordinates out of bounds: {}, {}",
                lat, lon
            )));
        }
        if self.cache_ttl_secs == 0 {
            return Err(AstroError::InvalidConfig("cache TTL must be positive".to_string()));
        }
        if !(-14 * 60..=14 * 60).contains(&self.utc_offset_minutes) {
            return Err(AstroError::InvalidConfig(format!(
                "UTC offset of {} minutes is out of range",
                self.utc_offset_minutes
            )));
        }
        Ok((lat, lon))
    }

    pub fn validate_and_log(&self) {
        log::info!("Application Configuration Loaded: {:?}", self);
        if let Err(e) = self.validate() {
            log::warn!("Configuration is incomplete: {}", e);
        }
    }
}

fn present(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AstroError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    present(lookup, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| AstroError::InvalidConfig(format!("{}='{}' is invalid: {}", key, raw, e)))
        })
        .transpose()
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>, AstroError> {
    present(lookup, key)
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(AstroError::InvalidConfig(format!("{}='{}' is not a boolean", key, raw))),
        })
        .transpose()
}

// Left unset when malformed so that clear-cache works without a location.
fn coordinate(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<f64> {
    let raw = present(lookup, key)?;
    match raw.parse::<f64>() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring {}='{}': {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_missing_key() {
        let mut config = Config::new(Provider::WeatherApi, "", 51.5, -0.12);
        assert!(matches!(config.validate(), Err(AstroError::InvalidConfig(_))));
        config.api_key = "abc".to_string();
        assert_eq!(config.validate().unwrap(), (51.5, -0.12));
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_coordinates() {
        let config = Config::new(Provider::Stormglass, "key", 91.0, 0.0);
        assert!(matches!(config.validate(), Err(AstroError::InvalidConfig(_))));
        let config = Config::new(Provider::Stormglass, "key", 0.0, -180.5);
        assert!(matches!(config.validate(), Err(AstroError::InvalidConfig(_))));

        let mut config = Config::new(Provider::Stormglass, "key", 0.0, 0.0);
        config.longitude = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_parsing_and_ttl() {
        assert_eq!("WeatherAPI".parse::<Provider>().unwrap(), Provider::WeatherApi);
        assert_eq!("stormglass".parse::<Provider>().unwrap(), Provider::Stormglass);
        assert!("darksky".parse::<Provider>().is_err());
        assert_eq!(Provider::WeatherApi.default_ttl_secs(), 43_200);
        assert_eq!(Provider::Stormglass.default_ttl_secs(), 2_592_000);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::new(Provider::WeatherApi, "super-secret", 1.0, 2.0);
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_values_and_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("ASTRO_PROVIDER", "stormglass"),
            ("ASTRO_API_KEY", " k3y "),
            ("ASTRO_LATITUDE", "55.95"),
            ("ASTRO_LONGITUDE", "-3.19"),
            ("ASTRO_UTC_OFFSET_MINUTES", "-300"),
            ("ASTRO_CACHE_BYPASS", "1"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Stormglass);
        assert_eq!(config.api_key, "k3y");
        assert_eq!(config.validate().unwrap(), (55.95, -3.19));
        assert_eq!(config.cache_ttl_secs, 2_592_000);
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
        assert_eq!(config.utc_offset_minutes, -300);
        assert!(config.cache_bypass);
    }

    #[test]
    fn test_malformed_numbers_and_flags_are_config_errors() {
        for (key, value) in [
            ("ASTRO_CACHE_TTL_SECS", "12h"),
            ("ASTRO_HTTP_TIMEOUT_SECS", "-1"),
            ("ASTRO_UTC_OFFSET_MINUTES", "+01:00"),
            ("ASTRO_CACHE_BYPASS", "maybe"),
        ] {
            match Config::from_lookup(lookup_from(&[(key, value)])) {
                Err(AstroError::InvalidConfig(msg)) => assert!(msg.contains(key), "{}", msg),
                other => panic!("{}={} gave {:?}", key, value, other),
            }
        }
    }

    #[test]
    fn test_malformed_coordinates_stay_unset() {
        let config = Config::from_lookup(lookup_from(&[
            ("ASTRO_API_KEY", "key"),
            ("ASTRO_LATITUDE", "north"),
            ("ASTRO_LONGITUDE", "0.5"),
        ]))
        .unwrap();
        assert_eq!(config.latitude, None);
        assert_eq!(config.longitude, Some(0.5));
        assert!(matches!(config.validate(), Err(AstroError::InvalidConfig(_))));
    }
}
