pub mod history;
pub mod openexchangerates;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::ProxyError;
use history::RateHistory;

pub const WAITING_MESSAGE: &str = "Aguardando histórico suficiente.";

/// One captured set of BRL-based rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySnapshot {
    /// Upstream's own capture time, epoch seconds.
    pub timestamp: i64,
    pub rates: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CurrencyReport {
    Ready {
        historico: Vec<CurrencySnapshot>,
        atual: CurrencySnapshot,
    },
    Waiting {
        erro: &'static str,
    },
}

impl CurrencyReport {
    pub fn waiting() -> Self {
        CurrencyReport::Waiting {
            erro: WAITING_MESSAGE,
        }
    }
}

#[async_trait]
pub trait RatesSource: Send + Sync {
    async fn latest(&self) -> Result<CurrencySnapshot, ProxyError>;
}

pub struct CurrencyService {
    history: RateHistory,
    source: Arc<dyn RatesSource>,
    clock: Arc<dyn Clock>,
}

impl CurrencyService {
    pub fn new(history: RateHistory, source: Arc<dyn RatesSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            history,
            source,
            clock,
        }
    }

    /// Refreshes from upstream when the cooldown has passed, then reports
    /// the whole history with the newest snapshot as `atual`.
    ///
    /// The cooldown is a single timer for all callers. The history lock is
    /// released while upstream is in flight, so simultaneous callers may
    /// each trigger a refresh.
    pub async fn report(&self) -> Result<CurrencyReport, ProxyError> {
        let now = self.clock.now_ms();

        if self.history.needs_refresh(now).await {
            tracing::info!("refreshing BRL exchange rates from upstream");
            let snapshot = self.source.latest().await?;
            self.history.record(snapshot, now).await;
            let snapshots = self.history.len().await;
            tracing::debug!(snapshots, "exchange rate history updated");
        } else {
            tracing::debug!("exchange rates within cooldown, serving history");
        }

        Ok(self.history.report().await)
    }

    #[cfg(test)]
    pub fn history(&self) -> &RateHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;
    use crate::testing::FakeRates;
    use history::REFRESH_COOLDOWN_MS;

    fn service(source: Arc<FakeRates>, clock: Arc<ManualClock>) -> CurrencyService {
        CurrencyService::new(RateHistory::new(), source, clock)
    }

    fn timestamps(report: &CurrencyReport) -> Vec<i64> {
        match report {
            CurrencyReport::Ready { historico, .. } => historico.iter().map(|s| s.timestamp).collect(),
            CurrencyReport::Waiting { .. } => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_refresh_skipped_within_cooldown() {
        let source = Arc::new(FakeRates::sequential(1_700_000_000));
        let clock = Arc::new(ManualClock::at(5_000));
        let service = service(source.clone(), clock.clone());

        service.report().await.unwrap();
        clock.advance(REFRESH_COOLDOWN_MS);
        let report = service.report().await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(timestamps(&report), vec![1_700_000_000]);
    }

    #[tokio::test]
    async fn test_refresh_after_cooldown() {
        let source = Arc::new(FakeRates::sequential(1_700_000_000));
        let clock = Arc::new(ManualClock::at(5_000));
        let service = service(source.clone(), clock.clone());

        service.report().await.unwrap();
        clock.advance(REFRESH_COOLDOWN_MS + 1);
        let report = service.report().await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(timestamps(&report), vec![1_700_000_000, 1_700_000_001]);
        assert_eq!(service.history().last_fetch_ms().await, 5_000 + REFRESH_COOLDOWN_MS + 1);
    }

    #[tokio::test]
    async fn test_history_keeps_three_most_recent() {
        let source = Arc::new(FakeRates::sequential(1_700_000_000));
        let clock = Arc::new(ManualClock::at(5_000));
        let service = service(source.clone(), clock.clone());

        let mut report = service.report().await.unwrap();
        for _ in 0..3 {
            clock.advance(REFRESH_COOLDOWN_MS + 1);
            report = service.report().await.unwrap();
        }

        assert_eq!(source.calls(), 4);
        assert_eq!(
            timestamps(&report),
            vec![1_700_000_001, 1_700_000_002, 1_700_000_003]
        );
        match report {
            CurrencyReport::Ready { historico, atual } => assert_eq!(&atual, historico.last().unwrap()),
            CurrencyReport::Waiting { .. } => panic!("expected snapshots"),
        }
    }

    #[tokio::test]
    async fn test_failed_first_refresh_propagates() {
        let source = Arc::new(FakeRates::failing());
        let clock = Arc::new(ManualClock::at(5_000));
        let service = service(source.clone(), clock);

        let err = service.report().await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(_)));
        assert_eq!(service.history().last_fetch_ms().await, 0);
        assert_eq!(service.history().len().await, 0);
    }

    #[test]
    fn test_report_json_shapes() {
        let waiting = serde_json::to_value(CurrencyReport::waiting()).unwrap();
        assert_eq!(waiting, serde_json::json!({"erro": "Aguardando histórico suficiente."}));

        let snapshot = CurrencySnapshot {
            timestamp: 1,
            rates: BTreeMap::from([("USD".to_string(), 0.2)]),
            base: None,
        };
        let ready = serde_json::to_value(CurrencyReport::Ready {
            historico: vec![snapshot.clone()],
            atual: snapshot,
        })
        .unwrap();
        assert_eq!(
            ready,
            serde_json::json!({
                "historico": [{"timestamp": 1, "rates": {"USD": 0.2}}],
                "atual": {"timestamp": 1, "rates": {"USD": 0.2}}
            })
        );
    }
}
