// src/utils/mod.rs
use log::{debug, info};

/// Routes `log` records to stderr; stdout is reserved for rendered HTML.
pub fn setup_logging(level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("rustls", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    debug!("Logging initialized at {}.", level);
    Ok(())
}

/// Logs HTTP request start and duration.
pub async fn log_timed_request<T>(label: &str, f: impl std::future::Future<Output = T>) -> T {
    let start = std::time::Instant::now();
    let result = f.await;
    let duration = start.elapsed().as_millis();
    info!("{} completed in {} ms", label, duration);
    result
}
