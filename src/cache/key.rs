use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Every key this crate writes starts with this prefix; `clear-cache` purges by it.
pub const CACHE_NAMESPACE: &str = "astro_almanac_";

/// Derives the cache key for one table request.
///
/// Coordinates are printed with six decimals so `51.5` and `51.500000` share
/// an entry. The field list is hashed as given, before parsing.
pub fn build_cache_key(
    latitude: f64,
    longitude: f64,
    start: NaiveDate,
    end: NaiveDate,
    fields_raw: &str,
) -> String {
    // `+ 0.0` folds -0.0 into 0.0
    let material = format!(
        "{:.6},{:.6}_{}_{}_{}",
        latitude + 0.0,
        longitude + 0.0,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        fields_raw
    );
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    format!("{}{}", CACHE_NAMESPACE, hex::encode(hasher.finalize()))
}
