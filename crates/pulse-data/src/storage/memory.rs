//! 메모리 스코어 저장소.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use pulse_core::{PulseResult, ScoreRecord, ScoreStore, ScoringResult};

use super::{select_history, select_latest};

/// 프로세스 메모리에 레코드를 보관하는 저장소.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    records: RwLock<Vec<ScoreRecord>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 보관 중인 레코드 수.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, results: &[ScoringResult]) -> PulseResult<usize> {
        let mut records = self.records.write().await;
        records.extend(results.iter().map(ScoreRecord::from));
        debug!(saved = results.len(), total = records.len(), "Scores stored in memory");
        Ok(results.len())
    }

    async fn history(&self, ticker: &str, days: u32) -> PulseResult<Vec<ScoreRecord>> {
        let records = self.records.read().await;
        Ok(select_history(records.iter().cloned(), ticker, days, Utc::now()))
    }

    async fn latest_all(&self) -> PulseResult<Vec<ScoreRecord>> {
        let records = self.records.read().await;
        Ok(select_latest(records.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_records::{days_ago, result};

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = MemoryScoreStore::new();
        assert!(store.is_empty().await);

        let saved = store
            .save(&[
                result("AAPL", 44.5, days_ago(1)),
                result("BTCUSDT", -12.0, days_ago(0)),
            ])
            .await
            .unwrap();
        assert_eq!(saved, 2);
        assert_eq!(store.len().await, 2);

        let history = store.history("AAPL", 7).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].ai_score, 44.5);

        let latest = store.latest_all().await.unwrap();
        assert_eq!(latest[0].ticker, "AAPL");
    }
}
