use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::WeatherSource;
use crate::error::ProxyError;
use crate::upstream::ensure_success;

const CURRENT_PATH: &str = "/v1/current.json";

/// WeatherAPI.com "current conditions" client.
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherApiClient {
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn current_url(&self, api_key: &str, city: &str) -> String {
        format!(
            "{}{}?key={}&q={}",
            self.base_url.trim_end_matches('/'),
            CURRENT_PATH,
            api_key,
            urlencoding::encode(city)
        )
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn current(&self, city: &str) -> Result<Value, ProxyError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProxyError::Config("WEATHER_KEY não configurada nas variáveis de ambiente".to_string())
        })?;

        let url = self.current_url(api_key, city);
        let response = self.client.get(&url).send().await?;
        let body = ensure_success(response).await?.text().await?;

        parse_current(&body)
    }
}

fn invalid_response() -> ProxyError {
    ProxyError::Upstream("Resposta inválida da WeatherAPI".to_string())
}

/// Parses a 200 body; anything that is not JSON counts as an invalid response.
pub fn parse_current(body: &str) -> Result<Value, ProxyError> {
    let body: Value = serde_json::from_str(body).map_err(|_| invalid_response())?;
    validate_current(body)
}

/// A usable payload carries a truthy `current` value.
pub fn validate_current(body: Value) -> Result<Value, ProxyError> {
    let usable = match body.get("current") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    if usable {
        Ok(body)
    } else {
        Err(invalid_response())
    }
}
