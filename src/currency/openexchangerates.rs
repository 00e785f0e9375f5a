use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{CurrencySnapshot, RatesSource};
use crate::error::ProxyError;
use crate::upstream::ensure_success;

const LATEST_PATH: &str = "/api/latest.json";
const BASE_CURRENCY: &str = "BRL";

/// Open Exchange Rates `latest.json` client, always asking for BRL as base.
pub struct OpenExchangeRatesClient {
    client: Client,
    base_url: String,
    app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    rates: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    base: Option<String>,
}

impl OpenExchangeRatesClient {
    pub fn new(client: Client, base_url: String, app_id: Option<String>) -> Self {
        Self {
            client,
            base_url,
            app_id,
        }
    }
}

#[async_trait]
impl RatesSource for OpenExchangeRatesClient {
    async fn latest(&self) -> Result<CurrencySnapshot, ProxyError> {
        let app_id = self.app_id.as_deref().ok_or_else(|| {
            ProxyError::Config("CURRENCY_KEY não configurada nas variáveis de ambiente".to_string())
        })?;

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), LATEST_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("app_id", app_id), ("base", BASE_CURRENCY)])
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;

        parse_latest(&body)
    }
}

/// Extracts a snapshot, rejecting bodies without rates or a usable timestamp.
pub fn parse_latest(body: &str) -> Result<CurrencySnapshot, ProxyError> {
    let invalid = || ProxyError::Upstream("Resposta inválida do OpenExchangeRates".to_string());

    let latest: LatestResponse = serde_json::from_str(body).map_err(|_| invalid())?;
    match (latest.timestamp, latest.rates) {
        (Some(timestamp), Some(rates)) if timestamp != 0 => Ok(CurrencySnapshot {
            timestamp,
            rates,
            base: latest.base,
        }),
        _ => Err(invalid()),
    }
}
