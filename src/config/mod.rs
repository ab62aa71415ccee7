pub mod settings;

pub use settings::{CacheBackend, Config, Provider};

use crate::error::AstroError;

/// Loads `.env` (if present) and the environment into a `Config`.
/// Location and key are validated later, at render time, so that
/// `clear-cache` still works with an incomplete configuration.
pub fn load_config() -> Result<Config, AstroError> {
    dotenv::dotenv().ok(); // Load .env file if present, ignore errors

    let config = Config::from_env()?;
    if config.cache_backend == CacheBackend::Redis && config.redis_url.is_empty() {
        return Err(AstroError::InvalidConfig("REDIS_URL cannot be empty".to_string()));
    }

    config.validate_and_log();
    Ok(config)
}
