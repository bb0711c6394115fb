//! CSV 스코어 저장소.
//!
//! 실행마다 결과를 파일 끝에 추가합니다. 파일이 없거나 비어 있으면 헤더를 먼저 씁니다.
//!
//! ```text
//! timestamp,run_id,ticker,asset_type,trend,volatility,sentiment,fundamental,
//! relative_strength,insider_funds,macro,ai_score,signal,confidence,explanation
//! ```
//!
//! 텍스트 필드는 RFC 4180 규칙으로 인용됩니다.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pulse_core::{PulseResult, ScoreRecord, ScoreStore, ScoringResult};

use super::{select_history, select_latest};
use crate::error::{DataError, Result};

/// CSV 헤더 컬럼.
pub const HEADER: [&str; 15] = [
    "timestamp",
    "run_id",
    "ticker",
    "asset_type",
    "trend",
    "volatility",
    "sentiment",
    "fundamental",
    "relative_strength",
    "insider_funds",
    "macro",
    "ai_score",
    "signal",
    "confidence",
    "explanation",
];

/// 레코드를 CSV 바이트로 직렬화합니다.
pub fn encode_records(records: &[ScoreRecord], with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if with_header {
        writer.write_record(HEADER)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| DataError::Serialization(e.to_string()))
}

/// CSV 내용을 레코드로 파싱합니다.
///
/// 중간에 끊긴 쓰기 등으로 깨진 행은 경고 후 건너뜁니다.
pub fn decode_records(path: &Path, content: &str) -> Vec<ScoreRecord> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    reader
        .deserialize::<ScoreRecord>()
        .enumerate()
        .filter_map(|(line, row)| match row {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), row = line + 1, error = %e, "Malformed score row skipped");
                None
            }
        })
        .collect()
}

/// 파일이 비어 있지 않고 개행으로 끝나지 않는지 확인합니다.
async fn has_unterminated_tail(path: &Path) -> Result<bool> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| DataError::io(path, e))?;
    file.seek(SeekFrom::End(-1))
        .await
        .map_err(|e| DataError::io(path, e))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)
        .await
        .map_err(|e| DataError::io(path, e))?;
    Ok(last[0] != b'\n')
}

/// 추가 전용 CSV 저장소.
#[derive(Debug)]
pub struct CsvScoreStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvScoreStore {
    /// 저장소를 엽니다. 상위 디렉토리가 없으면 생성합니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }
        if path.is_dir() {
            return Err(DataError::InvalidData(format!(
                "score store path is a directory: {}",
                path.display()
            )));
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<ScoreRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(decode_records(&self.path, &content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(DataError::io(&self.path, e)),
        }
    }

    async fn append(&self, records: &[ScoreRecord]) -> Result<()> {
        let _guard = self.lock.lock().await;

        let needs_header = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(DataError::io(&self.path, e)),
        };
        let mut bytes = encode_records(records, needs_header)?;
        // 끊긴 행 뒤에 붙지 않도록 새 줄에서 시작
        if !needs_header && has_unterminated_tail(&self.path).await? {
            warn!(path = %self.path.display(), "Score file ends mid-row, starting a new line");
            bytes.insert(0, b'\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| DataError::io(&self.path, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| DataError::io(&self.path, e))?;
        file.flush().await.map_err(|e| DataError::io(&self.path, e))?;
        Ok(())
    }
}

#[async_trait]
impl ScoreStore for CsvScoreStore {
    fn backend_name(&self) -> &'static str {
        "csv"
    }

    async fn save(&self, results: &[ScoringResult]) -> PulseResult<usize> {
        if results.is_empty() {
            return Ok(0);
        }
        let records: Vec<ScoreRecord> = results.iter().map(ScoreRecord::from).collect();
        self.append(&records).await?;
        info!(
            path = %self.path.display(),
            saved = records.len(),
            "Scores appended"
        );
        Ok(records.len())
    }

    async fn history(&self, ticker: &str, days: u32) -> PulseResult<Vec<ScoreRecord>> {
        let records = self.read_all().await?;
        debug!(path = %self.path.display(), rows = records.len(), "Score file read");
        Ok(select_history(records, ticker, days, Utc::now()))
    }

    async fn latest_all(&self) -> PulseResult<Vec<ScoreRecord>> {
        Ok(select_latest(self.read_all().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_records::{assert_signal, days_ago, result};

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("pulse-csv-{}", uuid::Uuid::new_v4()))
            .join("scores.csv")
    }

    #[test]
    fn test_header_matches_record_fields() {
        let record = ScoreRecord::from(&result("AAPL", 1.0, days_ago(0)));
        let bytes = encode_records(&[record], true).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, HEADER.join(","));
    }

    #[test]
    fn test_explanation_is_quoted() {
        let record = ScoreRecord::from(&result("AAPL", 1.0, days_ago(0)));
        let text = String::from_utf8(encode_records(&[record], false).unwrap()).unwrap();
        assert!(text.contains(r#""Trend: 1, ""quoted"" | Macro: x""#));
        assert!(text.contains(",stock,"));
    }

    #[tokio::test]
    async fn test_append_and_query() {
        let path = temp_path();
        let store = CsvScoreStore::open(&path).unwrap();

        store
            .save(&[result("AAPL", 44.5, days_ago(2)), result("MSFT", -25.0, days_ago(2))])
            .await
            .unwrap();
        store.save(&[result("AAPL", 61.237, days_ago(1))]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("timestamp,run_id").count(), 1);

        let history = store.history("AAPL", 30).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].ai_score, 44.5);
        assert_eq!(history[1].ai_score, 61.24);
        assert_signal(history[1].signal, 61.237);
        assert!(history[0].explanation.contains("\"quoted\""));

        let latest = store.latest_all().await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].ticker, "AAPL");
        assert_eq!(latest[1].ticker, "MSFT");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_truncated_row_does_not_break_queries() {
        let path = temp_path();
        let store = CsvScoreStore::open(&path).unwrap();
        store.save(&[result("AAPL", 30.0, days_ago(2))]).await.unwrap();

        // 쓰기 도중 끊긴 행
        {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            write!(file, "{},{},MSFT,stock,1.0", days_ago(1).to_rfc3339(), uuid::Uuid::new_v4())
                .unwrap();
        }
        store
            .save(&[result("AAPL", 45.0, days_ago(1)), result("MSFT", -10.0, days_ago(1))])
            .await
            .unwrap();

        let history = store.history("AAPL", 30).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].ai_score, 45.0);

        let latest = store.latest_all().await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[1].ticker, "MSFT");
        assert_eq!(latest[1].ai_score, -10.0);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_decode_skips_malformed_rows() {
        let good = ScoreRecord::from(&result("AAPL", 12.0, days_ago(0)));
        let mut text = String::from_utf8(encode_records(&[good.clone()], true).unwrap()).unwrap();
        text.push_str("garbage,row\n");
        text.push_str(&String::from_utf8(encode_records(&[good], false).unwrap()).unwrap());

        let records = decode_records(Path::new("scores.csv"), &text);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.ticker == "AAPL"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let path = temp_path();
        let store = CsvScoreStore::open(&path).unwrap();
        assert!(store.latest_all().await.unwrap().is_empty());
        assert!(store.history("AAPL", 7).await.unwrap().is_empty());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
