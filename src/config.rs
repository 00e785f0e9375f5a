use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub weather_key: Option<String>,
    pub weather_base_url: String,
    pub currency_key: Option<String>,
    pub currency_base_url: String,
    pub upstream_timeout: Duration,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// API keys are optional here: a missing key only fails the requests
    /// that actually need to reach upstream.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds, got {:?}", raw)
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(10),
        };

        Ok(Config {
            weather_key: non_empty(lookup("WEATHER_KEY")),
            weather_base_url: lookup("WEATHER_BASE_URL")
                .unwrap_or_else(|| "https://api.weatherapi.com".to_string()),
            currency_key: non_empty(lookup("CURRENCY_KEY")),
            currency_base_url: lookup("CURRENCY_BASE_URL")
                .unwrap_or_else(|| "https://openexchangerates.org".to_string()),
            upstream_timeout,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
