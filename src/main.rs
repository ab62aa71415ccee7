// src/main.rs
use anyhow::{Context, Result};
use astro_almanac::{
    config::load_config, range::parse_date, utils::setup_logging, AlmanacService, RangeRequest,
    RenderAttributes,
};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "astro-almanac", version, about = "Sunrise, sunset, moonrise, moonset and moon phase tables")]
struct Cli {
    /// Astronomy provider: weatherapi or stormglass (overrides ASTRO_PROVIDER)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Latitude in decimal degrees (overrides ASTRO_LATITUDE)
    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees (overrides ASTRO_LONGITUDE)
    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Provider API key (overrides ASTRO_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[arg(long, global = true, default_value = "info")]
    log_level: log::LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the astronomy table as HTML
    Render {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        /// "30days" for a rolling window starting today
        #[arg(long)]
        period: Option<String>,
        /// Comma-separated fields or "all"
        #[arg(long, default_value = "all")]
        fields: String,
        /// Date to treat as today, YYYY-MM-DD
        #[arg(long)]
        today: Option<String>,
        /// Write HTML here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Remove every cached astronomy entry
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level).context("Failed to initialize logging")?;

    let mut config = load_config()?;
    if let Some(provider) = &cli.provider {
        config.provider = provider.parse()?;
        if std::env::var("ASTRO_CACHE_TTL_SECS").is_err() {
            config.cache_ttl_secs = config.provider.default_ttl_secs();
        }
    }
    if let Some(lat) = cli.lat {
        config.latitude = Some(lat);
    }
    if let Some(lon) = cli.lon {
        config.longitude = Some(lon);
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = api_key;
    }

    let service = AlmanacService::from_config(config).await?;

    match cli.command {
        Command::Render {
            start,
            end,
            period,
            fields,
            today,
            output,
        } => {
            let today = match today {
                Some(raw) => parse_date(&raw)?,
                None => chrono::Local::now().date_naive(),
            };
            let attrs = RenderAttributes {
                range: RangeRequest { start, end, period },
                fields: Some(fields),
            };
            let html = service.render(&attrs, today).await;
            match output {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Astronomy table written to {}", path.display());
                }
                None => print!("{}", html),
            }
        }
        Command::ClearCache => {
            let removed = service.clear_cache().await?;
            println!("Astronomy cache cleared ({} entries).", removed);
        }
    }

    Ok(())
}
