//! Shared HTTP plumbing for astronomy providers.

use crate::error::AstroError;
use crate::utils::log_timed_request;
use log::warn;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

/// Longest response body excerpt carried into error messages.
const BODY_EXCERPT_CHARS: usize = 200;

pub fn build_http_client(timeout_secs: u64) -> Result<Client, AstroError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("astro-almanac/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AstroError::InvalidConfig(format!("failed to build HTTP client: {}", e)))
}

fn excerpt(body: &str) -> String {
    if body.chars().count() > BODY_EXCERPT_CHARS {
        let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

/// Sends the request and returns the body of a 200 response.
/// Anything else, transport failures included, is a `FetchError`.
pub async fn get_ok_body(label: &str, request: RequestBuilder) -> Result<String, AstroError> {
    let response = log_timed_request(label, request.send()).await?;
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        warn!("{}: HTTP {} body: {}", label, status, excerpt(&body));
        return Err(AstroError::FetchError(format!(
            "HTTP {} from provider: {}",
            status.as_u16(),
            excerpt(&body)
        )));
    }
    Ok(body)
}
