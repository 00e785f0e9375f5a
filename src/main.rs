use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod clock;
mod config;
mod currency;
mod error;
mod routes;
mod upstream;
mod weather;

#[cfg(test)]
mod testing;

use clock::{Clock, SystemClock};
use config::Config;
use currency::{history::RateHistory, openexchangerates::OpenExchangeRatesClient, CurrencyService};
use routes::{create_router, AppState};
use weather::{cache::WeatherCache, weatherapi::WeatherApiClient, WeatherService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clima_cotacao_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if config.weather_key.is_none() {
        tracing::warn!("WEATHER_KEY not set, uncached /clima requests will fail");
    }
    if config.currency_key.is_none() {
        tracing::warn!("CURRENCY_KEY not set, /cotacao refreshes will fail");
    }

    let http = upstream::build_client(config.upstream_timeout)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Caches live exactly as long as this process.
    let weather = WeatherService::new(
        WeatherCache::new(),
        Arc::new(WeatherApiClient::new(
            http.clone(),
            config.weather_base_url.clone(),
            config.weather_key.clone(),
        )),
        clock.clone(),
    );
    let currency = CurrencyService::new(
        RateHistory::new(),
        Arc::new(OpenExchangeRatesClient::new(
            http,
            config.currency_base_url.clone(),
            config.currency_key.clone(),
        )),
        clock,
    );

    let state = AppState {
        weather: Arc::new(weather),
        currency: Arc::new(currency),
    };

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
