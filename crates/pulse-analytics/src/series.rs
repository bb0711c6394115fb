//! 캔들 시계열의 컬럼 뷰.
//!
//! 스코어러는 `Decimal` 캔들을 직접 다루지 않고, 한 번 변환된 `f64` 컬럼을 공유합니다.

use chrono::{DateTime, Utc};
use pulse_core::{DecimalExt, Kline};

/// 컬럼 단위로 분해한 OHLCV 시계열 (시간 오름차순).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl CandleSeries {
    /// 캔들 목록에서 생성합니다. 가격이 유한하지 않은 캔들은 건너뜁니다.
    pub fn from_klines(klines: &[Kline]) -> Self {
        let mut series = Self::default();
        for k in klines {
            let row = [
                k.open.to_f64_lossy(),
                k.high.to_f64_lossy(),
                k.low.to_f64_lossy(),
                k.close.to_f64_lossy(),
                k.volume.to_f64_lossy(),
            ];
            if row.iter().any(|v| !v.is_finite()) {
                continue;
            }
            series.timestamps.push(k.open_time);
            series.open.push(row[0]);
            series.high.push(row[1]);
            series.low.push(row[2]);
            series.close.push(row[3]);
            series.volume.push(row[4]);
        }
        series
    }

    /// 캔들 수.
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// 비어 있는지 여부.
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// 마지막 종가.
    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}
