//! Request flow: validate, resolve range, check cache, fetch, render.

use crate::cache::{self, build_cache_key, CacheStore, CACHE_NAMESPACE};
use crate::client::{self, AstronomyClient};
use crate::config::Config;
use crate::error::{AstroError, ErrorCategory};
use crate::model::DaySlot;
use crate::range::{resolve_range, DateRange, RangeRequest, DATE_FORMAT};
use crate::render::{build_table, render_error, render_table, FieldSelection, Table};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;

pub const DEFAULT_FIELDS: &str = "all";

/// Attributes of one table request.
#[derive(Debug, Clone, Default)]
pub struct RenderAttributes {
    pub range: RangeRequest,
    /// Comma-separated field names or `all`; `None` means `all`.
    pub fields: Option<String>,
}

impl RenderAttributes {
    pub fn fields_raw(&self) -> &str {
        self.fields.as_deref().unwrap_or(DEFAULT_FIELDS)
    }
}

pub struct AlmanacService {
    config: Config,
    store: Arc<dyn CacheStore>,
    client: Arc<dyn AstronomyClient>,
}

impl AlmanacService {
    pub fn new(config: Config, store: Arc<dyn CacheStore>, client: Arc<dyn AstronomyClient>) -> Self {
        Self { config, store, client }
    }

    /// Opens the configured cache backend and provider client.
    pub async fn from_config(config: Config) -> Result<Self, AstroError> {
        let store = cache::open_store(&config).await?;
        let client = client::client_for(&config)?;
        Ok(Self::new(config, store, client))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.config.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Builds the table for `attrs`, fetching on cache miss.
    pub async fn table(&self, attrs: &RenderAttributes, today: NaiveDate) -> Result<Table, AstroError> {
        let (lat, lon) = self.config.validate()?;
        let range = resolve_range(&attrs.range, today)?;
        let selection = FieldSelection::parse(attrs.fields_raw())?;
        debug!(
            "Resolved range {} with fields {:?} for {}, {}",
            range,
            selection.fields(),
            lat,
            lon
        );

        let key = build_cache_key(lat, lon, range.start(), range.end(), attrs.fields_raw());
        let slots = self.load_slots(&key, &range).await?;
        Ok(build_table(&slots, &selection, self.display_offset()))
    }

    async fn load_slots(&self, key: &str, range: &DateRange) -> Result<Vec<DaySlot>, AstroError> {
        if self.config.cache_bypass {
            debug!("Cache bypass enabled; skipping read of {}", key);
        } else {
            match cache::get_json::<Vec<DaySlot>>(self.store.as_ref(), key).await {
                Ok(Some(slots)) => {
                    info!("Astronomy data for {} loaded from cache", range);
                    return Ok(slots);
                }
                Ok(None) => {}
                Err(e) => warn!("Cache read failed for {}, fetching instead: {}", key, e),
            }
        }

        info!(
            "No valid cache for {}; fetching {} day(s) from {}",
            range,
            range.len_days(),
            self.client.name()
        );
        let slots = self.client.fetch_range(range).await;
        if slots.iter().all(DaySlot::is_missing) {
            warn!("No data fetched for {}. Not caching empty result.", range);
            return Err(AstroError::EmptyResult {
                start: range.start().format(DATE_FORMAT).to_string(),
                end: range.end().format(DATE_FORMAT).to_string(),
            });
        }

        match cache::set_json(self.store.as_ref(), key, &slots, self.config.cache_ttl_secs).await {
            Ok(()) => info!(
                "Astronomy data for {} cached for {}s",
                range, self.config.cache_ttl_secs
            ),
            Err(e) => warn!("Failed to cache astronomy data for {}: {}", range, e),
        }
        Ok(slots)
    }

    /// Renders HTML for `attrs`. Errors become an inline message, never a failure.
    pub async fn render(&self, attrs: &RenderAttributes, today: NaiveDate) -> String {
        match self.table(attrs, today).await {
            Ok(table) => render_table(&table),
            Err(e) => {
                match e.categorize() {
                    ErrorCategory::Input => info!("Rejected table request: {}", e),
                    ErrorCategory::Configuration => warn!("Astronomy table not rendered: {}", e),
                    ErrorCategory::Network | ErrorCategory::Infrastructure => {
                        error!("Astronomy table failed: {}", e)
                    }
                }
                render_error(&e)
            }
        }
    }

    /// Deletes every cached entry this crate wrote.
    pub async fn clear_cache(&self) -> Result<usize, AstroError> {
        let removed = self.store.delete_by_prefix(CACHE_NAMESPACE).await?;
        info!("Astronomy cache cleared: {} entr{} removed", removed, if removed == 1 { "y" } else { "ies" });
        Ok(removed)
    }
}
