use std::collections::VecDeque;
use tokio::sync::Mutex;

use super::{CurrencyReport, CurrencySnapshot};

/// Minimum gap between two upstream refreshes (55 minutes).
pub const REFRESH_COOLDOWN_MS: i64 = 55 * 60 * 1000;
pub const MAX_SNAPSHOTS: usize = 3;

struct HistoryState {
    snapshots: VecDeque<CurrencySnapshot>,
    last_fetch_ms: i64,
}

/// Rolling window of the most recent rate snapshots, oldest first, plus the
/// time of the last successful refresh.
pub struct RateHistory {
    state: Mutex<HistoryState>,
    capacity: usize,
    cooldown_ms: i64,
}

impl RateHistory {
    pub fn new() -> Self {
        Self::with_limits(MAX_SNAPSHOTS, REFRESH_COOLDOWN_MS)
    }

    pub fn with_limits(capacity: usize, cooldown_ms: i64) -> Self {
        Self {
            state: Mutex::new(HistoryState {
                snapshots: VecDeque::with_capacity(capacity + 1),
                last_fetch_ms: 0,
            }),
            capacity,
            cooldown_ms,
        }
    }

    pub async fn needs_refresh(&self, now_ms: i64) -> bool {
        let state = self.state.lock().await;
        state.last_fetch_ms == 0 || now_ms - state.last_fetch_ms > self.cooldown_ms
    }

    /// Appends a snapshot, dropping the oldest once over capacity.
    pub async fn record(&self, snapshot: CurrencySnapshot, fetched_at_ms: i64) {
        let mut state = self.state.lock().await;
        state.snapshots.push_back(snapshot);
        while state.snapshots.len() > self.capacity {
            state.snapshots.pop_front();
        }
        state.last_fetch_ms = fetched_at_ms;
    }

    pub async fn report(&self) -> CurrencyReport {
        let state = self.state.lock().await;
        match state.snapshots.back() {
            Some(latest) => CurrencyReport::Ready {
                historico: state.snapshots.iter().cloned().collect(),
                atual: latest.clone(),
            },
            None => CurrencyReport::waiting(),
        }
    }

    #[cfg(test)]
    pub async fn last_fetch_ms(&self) -> i64 {
        self.state.lock().await.last_fetch_ms
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.snapshots.len()
    }
}

impl Default for RateHistory {
    fn default() -> Self {
        Self::new()
    }
}
