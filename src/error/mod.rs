use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AstroError {
    /// A start/end/period attribute could not be parsed
    #[error("Invalid Date: {0}")]
    InvalidDate(String),

    /// Resolved end date lies before the start date
    #[error("Invalid Range: end {end} is before start {start}")]
    InvalidRange { start: String, end: String },

    /// Missing API key, coordinates out of bounds, unknown provider, etc.
    #[error("Config Error: {0}")]
    InvalidConfig(String),

    /// None of the requested fields is recognized
    #[error("No valid fields in '{0}'")]
    NoValidFields(String),

    /// Resolved range covers more days than one table may show
    #[error("Range Too Long: {start} to {end} is {days} days, limit is {max}")]
    RangeTooLong { start: String, end: String, days: i64, max: i64 },

    /// Network/HTTP/parse failure for a single provider call
    #[error("Fetch Error: {0}")]
    FetchError(String),

    /// The provider returned nothing usable for the whole range
    #[error("No astronomy data available for {start} to {end}")]
    EmptyResult { start: String, end: String },

    /// Cache/Redis errors
    #[error("Cache Error: {0}")]
    CacheError(String),

    #[error("IO Error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for AstroError {
    fn from(err: serde_json::Error) -> Self {
        AstroError::FetchError(format!("JSON serialization/deserialization error: {}", err))
    }
}

impl From<reqwest::Error> for AstroError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AstroError::FetchError(format!("request timed out: {}", err))
        } else {
            AstroError::FetchError(format!("request failed: {}", err))
        }
    }
}

impl From<redis::RedisError> for AstroError {
    fn from(err: redis::RedisError) -> Self {
        AstroError::CacheError(err.to_string())
    }
}

impl From<std::io::Error> for AstroError {
    fn from(err: std::io::Error) -> Self {
        AstroError::Io(err.to_string())
    }
}

impl AstroError {
    /// Message shown inline in place of the table.
    pub fn user_message(&self) -> String {
        match self {
            AstroError::InvalidDate(detail) => format!("Invalid date: {}.", detail),
            AstroError::InvalidRange { .. } => "End date cannot be before start date.".to_string(),
            AstroError::InvalidConfig(detail) => {
                format!("API key, latitude, or longitude not set or invalid ({}).", detail)
            }
            AstroError::NoValidFields(_) => "No valid fields specified.".to_string(),
            AstroError::RangeTooLong { days, max, .. } => {
                format!("Date range is too long ({} days); at most {} days can be shown.", days, max)
            }
            AstroError::FetchError(detail) => format!("API request failed: {}", detail),
            AstroError::EmptyResult { .. } => {
                "Could not retrieve astronomy data for the requested dates.".to_string()
            }
            AstroError::CacheError(_) => "Astronomy cache is unavailable.".to_string(),
            AstroError::Io(detail) => format!("Output error: {}", detail),
        }
    }

    /// Categorizes error for logging
    pub fn categorize(&self) -> ErrorCategory {
        match self {
            AstroError::InvalidDate(_)
            | AstroError::InvalidRange { .. }
            | AstroError::RangeTooLong { .. }
            | AstroError::NoValidFields(_) => ErrorCategory::Input,
            AstroError::InvalidConfig(_) => ErrorCategory::Configuration,
            AstroError::FetchError(_) | AstroError::EmptyResult { .. } => ErrorCategory::Network,
            AstroError::CacheError(_) | AstroError::Io(_) => ErrorCategory::Infrastructure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    Infrastructure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_match_inline_errors() {
        let err = AstroError::InvalidRange {
            start: "2024-03-10".to_string(),
            end: "2024-03-01".to_string(),
        };
        assert_eq!(err.user_message(), "End date cannot be before start date.");
        assert_eq!(err.categorize(), ErrorCategory::Input);

        let err = AstroError::NoValidFields("bogus".to_string());
        assert_eq!(err.user_message(), "No valid fields specified.");

        let err = AstroError::RangeTooLong {
            start: "2024-01-01".to_string(),
            end: "2024-12-31".to_string(),
            days: 366,
            max: 62,
        };
        assert_eq!(err.user_message(), "Date range is too long (366 days); at most 62 days can be shown.");
        assert_eq!(err.categorize(), ErrorCategory::Input);
    }

    #[test]
    fn test_json_error_becomes_fetch_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AstroError = parse_err.into();
        assert!(matches!(err, AstroError::FetchError(_)));
        assert_eq!(err.categorize(), ErrorCategory::Network);
    }
}
