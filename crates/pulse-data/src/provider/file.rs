//! 파일 기반 시장 데이터 소스.
//!
//! 데이터 디렉토리 구조:
//!
//! ```text
//! <dir>/ohlcv/<TICKER>.csv            date,open,high,low,close,volume
//! <dir>/macro/{vix,dxy,tnx,benchmark}.csv   date + close|value
//! <dir>/fundamentals/<TICKER>.json    FundamentalSnapshot
//! <dir>/institutional/<TICKER>.json   InstitutionalSnapshot
//! <dir>/news/<TICKER>.json            [NewsItem]
//! <dir>/peers/<TICKER>.json           [FundamentalSnapshot]
//! ```
//!
//! 개별 파일이 없거나 깨져 있으면 해당 입력을 결측으로 처리하고 경고 로그만 남깁니다.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use pulse_core::{
    Asset, AssetType, BenchmarkConfig, DataConfig, FundamentalSnapshot, InstitutionalSnapshot,
    Kline, MacroSnapshot, MarketDataSource, NewsItem, PulseResult, RawInputs, RawSeries,
};

use crate::error::{DataError, Result};

/// OHLCV CSV 행.
#[derive(Debug, Deserialize)]
struct OhlcvRow {
    date: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

impl OhlcvRow {
    fn to_kline(&self) -> std::result::Result<Kline, String> {
        let num = |field: &str, raw: &str| {
            Decimal::from_str(raw.trim()).map_err(|e| format!("{} '{}': {}", field, raw, e))
        };
        Ok(Kline::new(
            parse_date(&self.date)?,
            num("open", &self.open)?,
            num("high", &self.high)?,
            num("low", &self.low)?,
            num("close", &self.close)?,
            num("volume", &self.volume)?,
        ))
    }
}

/// 매크로 CSV 행. 값 컬럼은 `close` 또는 `value`.
#[derive(Debug, Deserialize)]
struct SeriesRow {
    date: String,
    #[serde(default)]
    close: Option<f64>,
    #[serde(default)]
    value: Option<f64>,
}

/// `YYYY-MM-DD` 또는 RFC 3339 날짜를 파싱합니다.
pub fn parse_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| format!("invalid date '{}'", raw));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid date '{}': {}", raw, e))
}

/// 티커를 파일 이름으로 변환합니다 ("BTC/USDT" → "BTC_USDT").
pub fn file_stem(ticker: &str) -> String {
    ticker
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

/// 파싱할 수 없는 행을 건너뛰고 기록합니다.
///
/// 모든 행이 깨져 있으면 첫 번째 오류를 반환합니다.
#[derive(Default)]
struct MalformedRows {
    count: usize,
    first: Option<String>,
}

impl MalformedRows {
    fn skip(&mut self, path: &Path, row: usize, reason: impl ToString) {
        let reason = format!("row {}: {}", row, reason.to_string());
        warn!(path = %path.display(), row, reason = %reason, "Malformed row skipped");
        self.count += 1;
        self.first.get_or_insert(reason);
    }

    fn finish<T>(self, path: &Path, parsed: usize, value: T) -> Result<T> {
        match self.first {
            Some(first) if parsed == 0 => Err(DataError::parse(path, first)),
            _ => {
                if self.count > 0 {
                    debug!(path = %path.display(), skipped = self.count, parsed, "Parsed with skipped rows");
                }
                Ok(value)
            }
        }
    }
}

/// OHLCV CSV 내용을 캔들로 변환합니다. 시간 오름차순으로 정렬됩니다.
///
/// 깨진 행과 비정상 캔들은 건너뜁니다.
pub fn parse_ohlcv_csv(path: &Path, content: &str) -> Result<Vec<Kline>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut klines = Vec::new();
    let mut malformed = MalformedRows::default();
    for (line, row) in reader.deserialize::<OhlcvRow>().enumerate() {
        let kline = match row.map_err(|e| e.to_string()).and_then(|r| r.to_kline()) {
            Ok(kline) => kline,
            Err(e) => {
                malformed.skip(path, line + 1, e);
                continue;
            }
        };
        if !kline.is_consistent() {
            warn!(path = %path.display(), row = line + 1, "Inconsistent candle skipped");
            continue;
        }
        klines.push(kline);
    }
    klines.sort_by_key(|k| k.open_time);
    klines.dedup_by_key(|k| k.open_time);
    let parsed = klines.len();
    malformed.finish(path, parsed, klines)
}

/// 매크로 CSV 내용을 시계열로 변환합니다. 깨진 행은 건너뜁니다.
pub fn parse_series_csv(path: &Path, metric: &str, content: &str) -> Result<RawSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut points = Vec::new();
    let mut malformed = MalformedRows::default();
    for (line, row) in reader.deserialize::<SeriesRow>().enumerate() {
        let point = row.map_err(|e| e.to_string()).and_then(|row| {
            let value = row
                .close
                .or(row.value)
                .ok_or_else(|| "missing close/value".to_string())?;
            Ok((parse_date(&row.date)?, value))
        });
        match point {
            Ok(point) => points.push(point),
            Err(e) => malformed.skip(path, line + 1, e),
        }
    }
    let parsed = points.len();
    malformed.finish(path, parsed, RawSeries::from_points(metric, points))
}

/// 파일 기반 데이터 소스.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    dir: PathBuf,
    benchmarks: BenchmarkConfig,
    lookback: usize,
}

impl FileDataSource {
    /// 데이터 디렉토리로 소스를 생성합니다. 디렉토리가 없으면 오류.
    pub fn new(dir: impl Into<PathBuf>, benchmarks: BenchmarkConfig, lookback: usize) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DataError::NotFound(format!(
                "data directory {}",
                dir.display()
            )));
        }
        info!(dir = %dir.display(), lookback, "File data source opened");
        Ok(Self {
            dir,
            benchmarks,
            lookback,
        })
    }

    /// 설정으로 소스를 생성합니다.
    pub fn from_config(config: &DataConfig) -> Result<Self> {
        Self::new(config.dir.clone(), config.benchmarks.clone(), config.lookback)
    }

    fn path(&self, kind: &str, ticker: &str, ext: &str) -> PathBuf {
        self.dir
            .join(kind)
            .join(format!("{}.{}", file_stem(ticker), ext))
    }

    /// 파일 내용을 읽습니다. 파일이 없으면 None.
    async fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Input file not present");
                Ok(None)
            }
            Err(e) => Err(DataError::io(path, e)),
        }
    }

    /// 실패를 결측으로 변환합니다.
    fn or_missing<T>(path: &Path, result: Result<Option<T>>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Input treated as missing");
                None
            }
        }
    }

    async fn load_json<T: DeserializeOwned>(&self, kind: &str, ticker: &str) -> Option<T> {
        let path = self.path(kind, ticker, "json");
        let result = match self.read_optional(&path).await {
            Ok(Some(content)) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| DataError::parse(&path, e)),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        Self::or_missing(&path, result)
    }

    /// 티커의 캔들을 읽습니다 (최근 `lookback`개).
    pub async fn load_candles(&self, ticker: &str) -> Option<Vec<Kline>> {
        let path = self.path("ohlcv", ticker, "csv");
        let result = match self.read_optional(&path).await {
            Ok(Some(content)) => parse_ohlcv_csv(&path, &content).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        Self::or_missing(&path, result).map(|mut klines| {
            if klines.len() > self.lookback {
                klines.drain(..klines.len() - self.lookback);
            }
            klines
        })
    }

    /// 매크로 시계열 하나를 읽습니다.
    pub async fn load_macro_series(&self, name: &str) -> Option<RawSeries> {
        let path = self.dir.join("macro").join(format!("{}.csv", name));
        let result = match self.read_optional(&path).await {
            Ok(Some(content)) => parse_series_csv(&path, name, &content).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        Self::or_missing(&path, result).filter(|s| !s.is_empty())
    }

    /// 자산 유형의 벤치마크 종가. 주식은 매크로 벤치마크 지수로 대체할 수 있습니다.
    async fn load_benchmark(&self, asset_type: AssetType) -> Option<RawSeries> {
        let ticker = self.benchmarks.for_asset_type(asset_type);
        if let Some(klines) = self.load_candles(ticker).await {
            return Some(RawSeries::from_closes(ticker, &klines));
        }
        match asset_type {
            AssetType::Stock => self.load_macro_series("benchmark").await,
            AssetType::Crypto => None,
        }
    }
}

#[async_trait]
impl MarketDataSource for FileDataSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_inputs(&self, asset: &Asset) -> PulseResult<RawInputs> {
        let ticker = asset.ticker.as_str();
        let candles = self.load_candles(ticker).await.unwrap_or_else(|| {
            warn!(ticker, "No OHLCV data");
            Vec::new()
        });

        let inputs = RawInputs {
            candles,
            benchmark: self.load_benchmark(asset.asset_type).await,
            fundamentals: self.load_json::<FundamentalSnapshot>("fundamentals", ticker).await,
            peer_fundamentals: self
                .load_json::<Vec<FundamentalSnapshot>>("peers", ticker)
                .await
                .unwrap_or_default(),
            news: self
                .load_json::<Vec<NewsItem>>("news", ticker)
                .await
                .unwrap_or_default(),
            institutional: self
                .load_json::<InstitutionalSnapshot>("institutional", ticker)
                .await,
            macro_data: None,
        };

        debug!(
            ticker,
            candles = inputs.candles.len(),
            benchmark = inputs.benchmark.is_some(),
            fundamentals = inputs.fundamentals.is_some(),
            news = inputs.news.len(),
            "Inputs loaded"
        );
        Ok(inputs)
    }

    async fn fetch_macro(&self) -> PulseResult<MacroSnapshot> {
        let snapshot = MacroSnapshot {
            vix: self.load_macro_series("vix").await,
            dxy: self.load_macro_series("dxy").await,
            treasury_10y: self.load_macro_series("tnx").await,
            benchmark_index: self.load_macro_series("benchmark").await,
        };
        if snapshot.is_empty() {
            warn!(dir = %self.dir.display(), "No macro series available");
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let a = parse_date("2024-03-01").unwrap();
        let b = parse_date("2024-03-01T00:00:00Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_date("03/01/2024").is_err());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("BTC/USDT"), "BTC_USDT");
        assert_eq!(file_stem("^GSPC"), "^GSPC");
    }

    #[test]
    fn test_parse_ohlcv_csv_sorts_and_skips_inconsistent() {
        let content = "\
date,open,high,low,close,volume
2024-01-03,101,103,100,102,1200
2024-01-02,100,102,99,101,1000
2024-01-04,102,101,103,102,900
";
        let klines = parse_ohlcv_csv(Path::new("t.csv"), content).unwrap();
        assert_eq!(klines.len(), 2);
        assert!(klines[0].open_time < klines[1].open_time);
        assert_eq!(klines[1].close, Decimal::from(102));
    }

    #[test]
    fn test_parse_ohlcv_csv_column_order_free() {
        let content = "close,date,volume,open,low,high\n10,2024-01-02,5,9,8,11\n";
        let klines = parse_ohlcv_csv(Path::new("t.csv"), content).unwrap();
        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].high, Decimal::from(11));
    }

    #[test]
    fn test_parse_ohlcv_csv_bad_number() {
        let content = "date,open,high,low,close,volume\n2024-01-02,abc,1,1,1,1\n";
        let err = parse_ohlcv_csv(Path::new("bad.csv"), content).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_parse_ohlcv_csv_skips_malformed_row() {
        let mut content = String::from("date,open,high,low,close,volume\n");
        for day in 1..=28 {
            content.push_str(&format!("2024-02-{:02},100,101,99,100,1000\n", day));
        }
        content.push_str("2024-03-01,100,101,99,null,1000\n");

        let klines = parse_ohlcv_csv(Path::new("t.csv"), &content).unwrap();
        assert_eq!(klines.len(), 28);
        assert_eq!(klines[27].open_time, parse_date("2024-02-28").unwrap());
    }

    #[test]
    fn test_parse_series_csv_skips_gaps() {
        let content = "date,close\n2024-01-01,13.5\n2024-01-02,\n2024-01-03,n/a\n2024-01-04,14.0\n";
        let series = parse_series_csv(Path::new("vix.csv"), "vix", content).unwrap();
        assert_eq!(series.values(), vec![13.5, 14.0]);
    }

    #[test]
    fn test_parse_series_csv_value_column() {
        let content = "date,value\n2024-01-02,4.1\n2024-01-01,4.0\n";
        let series = parse_series_csv(Path::new("tnx.csv"), "tnx", content).unwrap();
        assert_eq!(series.values(), vec![4.0, 4.1]);
        assert_eq!(series.metric, "tnx");
    }
}
