//! 시장 데이터 구조체.
//!
//! - [`Kline`]: OHLCV 캔들 (다중 컬럼 시계열의 한 행)
//! - [`RawSeries`]: (자산, 지표) 단위의 타임스탬프 시계열. 결측/길이 부족이 있을 수 있습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{DecimalExt, Price, Quantity};

/// OHLCV 캔들.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
}

impl Kline {
    /// 새 캔들을 생성합니다.
    pub fn new(
        open_time: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 고가 >= max(시가, 종가), 저가 <= min(시가, 종가), 음수 없음.
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.low >= Decimal::ZERO
            && self.volume >= Decimal::ZERO
    }
}

/// 단일 관측치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 관측 시각
    pub timestamp: DateTime<Utc>,
    /// 관측 값
    pub value: f64,
}

/// 타임스탬프 순으로 정렬된 단일 지표 시계열.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// 지표 이름 (예: "close", "vix")
    pub metric: String,
    /// 관측치 (시간 오름차순)
    pub observations: Vec<Observation>,
}

impl RawSeries {
    /// 빈 시계열을 생성합니다.
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            observations: Vec::new(),
        }
    }

    /// (시각, 값) 쌍에서 시계열을 생성합니다. 시간순 정렬 후 중복 시각은 마지막 값을 남깁니다.
    pub fn from_points(
        metric: impl Into<String>,
        points: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> Self {
        let mut observations: Vec<Observation> = points
            .into_iter()
            .map(|(timestamp, value)| Observation { timestamp, value })
            .collect();
        observations.sort_by_key(|o| o.timestamp);

        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.timestamp == obs.timestamp => *last = obs,
                _ => deduped.push(obs),
            }
        }

        Self {
            metric: metric.into(),
            observations: deduped,
        }
    }

    /// 캔들 종가로 시계열을 생성합니다.
    pub fn from_closes(metric: impl Into<String>, candles: &[Kline]) -> Self {
        Self::from_points(
            metric,
            candles.iter().map(|k| (k.open_time, k.close.to_f64_lossy())),
        )
    }

    /// 관측치 수.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// 비어 있는지 여부.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// 유한한 값만 시간순으로 반환합니다. 비유한 값은 결측(gap)으로 취급합니다.
    pub fn values(&self) -> Vec<f64> {
        self.observations
            .iter()
            .map(|o| o.value)
            .filter(|v| v.is_finite())
            .collect()
    }

    /// 마지막 유한 관측치.
    pub fn latest(&self) -> Option<&Observation> {
        self.observations.iter().rev().find(|o| o.value.is_finite())
    }
}
