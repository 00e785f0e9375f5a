use reqwest::Client;
use std::time::Duration;

use crate::error::ProxyError;

/// One HTTP client shared by every upstream integration.
pub fn build_client(timeout: Duration) -> Result<Client, ProxyError> {
    let client = Client::builder()
        .user_agent(concat!("ClimaCotacao/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Turns a non-success status into an upstream error carrying the body text.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProxyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(ProxyError::Upstream(format!("HTTP {}: {}", status, error_text)))
}
