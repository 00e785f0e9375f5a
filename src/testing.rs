//! In-memory upstream stand-ins shared by the unit and router tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::currency::{CurrencySnapshot, RatesSource};
use crate::error::ProxyError;
use crate::weather::WeatherSource;

pub struct FakeWeather {
    payload: Mutex<Option<Value>>,
    calls: AtomicUsize,
}

impl FakeWeather {
    pub fn returning(payload: Value) -> Self {
        Self {
            payload: Mutex::new(Some(payload)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            payload: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_payload(&self, payload: Value) {
        *self.payload.lock().unwrap() = Some(payload);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn current(&self, _city: &str) -> Result<Value, ProxyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payload
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProxyError::Upstream("Resposta inválida da WeatherAPI".to_string()))
    }
}

/// Hands out snapshots with consecutive timestamps, starting at `first`.
pub struct FakeRates {
    first: Option<i64>,
    calls: AtomicUsize,
}

impl FakeRates {
    pub fn sequential(first: i64) -> Self {
        Self {
            first: Some(first),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            first: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RatesSource for FakeRates {
    async fn latest(&self) -> Result<CurrencySnapshot, ProxyError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as i64;
        let first = self
            .first
            .ok_or_else(|| ProxyError::Upstream("Resposta inválida do OpenExchangeRates".to_string()))?;
        Ok(CurrencySnapshot {
            timestamp: first + n,
            rates: BTreeMap::from([
                ("EUR".to_string(), 0.17 + n as f64 / 1000.0),
                ("USD".to_string(), 0.19 + n as f64 / 1000.0),
            ]),
            base: Some("BRL".to_string()),
        })
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a local port nothing listens on.
pub const CLOSED_PORT_URL: &str = "http://127.0.0.1:1";
