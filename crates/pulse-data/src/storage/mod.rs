//! 스코어 저장소.
//!
//! - [`csv::CsvScoreStore`]: 추가 전용 CSV 파일
//! - [`memory::MemoryScoreStore`]: 프로세스 메모리 (테스트/일회성 실행)
//!
//! 백엔드는 [`StorageConfig`]로 명시적으로 선택하며 [`open_store`]가 생성합니다.

pub mod csv;
pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use pulse_core::{PulseResult, ScoreRecord, ScoreStore, StorageBackend, StorageConfig};

pub use self::csv::CsvScoreStore;
pub use self::memory::MemoryScoreStore;

/// 설정에 맞는 저장소를 생성합니다.
pub fn open_store(config: &StorageConfig) -> PulseResult<Arc<dyn ScoreStore>> {
    let store: Arc<dyn ScoreStore> = match config.backend {
        StorageBackend::Csv => Arc::new(CsvScoreStore::open(&config.path)?),
        StorageBackend::Memory => Arc::new(MemoryScoreStore::new()),
    };
    info!(backend = store.backend_name(), "Score store opened");
    Ok(store)
}

/// 티커의 `days`일 이내 레코드를 시간 오름차순으로 반환합니다.
pub(crate) fn select_history(
    records: impl IntoIterator<Item = ScoreRecord>,
    ticker: &str,
    days: u32,
    now: DateTime<Utc>,
) -> Vec<ScoreRecord> {
    let since = now - Duration::days(i64::from(days));
    let mut history: Vec<ScoreRecord> = records
        .into_iter()
        .filter(|r| r.ticker.eq_ignore_ascii_case(ticker) && r.timestamp >= since)
        .collect();
    history.sort_by_key(|r| r.timestamp);
    history
}

/// 티커별 최신 레코드를 AI SCORE 내림차순으로 반환합니다.
pub(crate) fn select_latest(records: impl IntoIterator<Item = ScoreRecord>) -> Vec<ScoreRecord> {
    let mut latest: HashMap<String, ScoreRecord> = HashMap::new();
    for record in records {
        match latest.get(&record.ticker) {
            Some(existing) if existing.timestamp > record.timestamp => {}
            _ => {
                latest.insert(record.ticker.clone(), record);
            }
        }
    }
    let mut rows: Vec<ScoreRecord> = latest.into_values().collect();
    rows.sort_by(|a, b| {
        b.ai_score
            .total_cmp(&a.ai_score)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    rows
}


#[cfg(test)]
mod tests {
    use super::test_records::{days_ago, result};
    use super::*;

    #[test]
    fn test_select_history_filters_and_sorts() {
        let records = vec![
            ScoreRecord::from(&result("AAPL", 10.0, days_ago(1))),
            ScoreRecord::from(&result("AAPL", 20.0, days_ago(3))),
            ScoreRecord::from(&result("AAPL", 30.0, days_ago(40))),
            ScoreRecord::from(&result("MSFT", 40.0, days_ago(1))),
        ];
        let history = select_history(records, "aapl", 30, Utc::now());
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].ai_score, 20.0);
        assert_eq!(history[1].ai_score, 10.0);
    }

    #[test]
    fn test_select_latest_per_ticker() {
        let records = vec![
            ScoreRecord::from(&result("AAPL", 10.0, days_ago(2))),
            ScoreRecord::from(&result("AAPL", 55.0, days_ago(1))),
            ScoreRecord::from(&result("MSFT", 70.0, days_ago(1))),
            ScoreRecord::from(&result("TSLA", -30.0, days_ago(1))),
        ];
        let latest = select_latest(records);
        let tickers: Vec<&str> = latest.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["MSFT", "AAPL", "TSLA"]);
        assert_eq!(latest[1].ai_score, 55.0);
    }

    #[test]
    fn test_open_store_by_backend() {
        let store = open_store(&StorageConfig::memory()).unwrap();
        assert_eq!(store.backend_name(), "memory");

        let path = std::env::temp_dir()
            .join(format!("pulse-open-{}", uuid::Uuid::new_v4()))
            .join("scores.csv");
        let store = open_store(&StorageConfig::csv(&path)).unwrap();
        assert_eq!(store.backend_name(), "csv");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
