//! 기술적 지표 모듈.
//!
//! 팩터 스코어러가 사용하는 기술적 지표를 `f64` 시계열로 계산합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균
//! - **pct change**: 기간 수익률
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수
//! - **Williams %R**
//! - **CCI**: Commodity Channel Index
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드 및 밴드 폭
//! - **ATR**: 평균 실제 범위, 가격 대비 ATR%
//!
//! ## 거래량 지표 (Volume Indicators)
//! - **OBV**, **VPT**, 거래량 급증 비율
//!
//! # 사용 예시
//!
//! ```ignore
//! use pulse_analytics::indicators::{IndicatorEngine, SmaParams, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//! let sma = engine.sma(&closes, SmaParams { period: 20 })?;
//! let rsi = engine.rsi(&closes, RsiParams { period: 14 })?;
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

use thiserror::Error;

pub use momentum::{CciParams, MomentumCalculator, RsiParams, WilliamsRParams};
pub use trend::{SmaParams, TrendIndicators};
pub use volatility::{AtrParams, BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};
pub use volume::{VolumeIndicators, VolumeSurgeParams};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    volume: VolumeIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.trend.sma(prices, params)
    }

    /// 마지막 시점의 SMA.
    pub fn sma_last(&self, prices: &[f64], period: usize) -> IndicatorResult<f64> {
        last_defined(self.sma(prices, SmaParams { period })?, period)
    }

    /// 기간 수익률 계산.
    pub fn pct_change(&self, prices: &[f64], periods: usize) -> IndicatorResult<Vec<Option<f64>>> {
        self.trend.pct_change(prices, periods)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI 계산.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.rsi(prices, params)
    }

    /// Williams %R 계산.
    pub fn williams_r(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: WilliamsRParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.williams_r(high, low, close, params)
    }

    /// CCI 계산.
    pub fn cci(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: CciParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.cci(high, low, close, params)
    }

    // ==================== 변동성 지표 ====================

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    /// 가격 대비 ATR (%) 계산.
    pub fn atr_percent(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.volatility.atr_percent(high, low, close, params)
    }

    // ==================== 거래량 지표 ====================

    /// OBV 계산.
    pub fn obv(&self, close: &[f64], volume: &[f64]) -> IndicatorResult<Vec<f64>> {
        self.volume.obv(close, volume)
    }

    /// VPT 계산.
    pub fn vpt(&self, close: &[f64], volume: &[f64]) -> IndicatorResult<Vec<f64>> {
        self.volume.vpt(close, volume)
    }

    /// 거래량 급증 비율 계산.
    pub fn volume_surge(
        &self,
        volume: &[f64],
        params: VolumeSurgeParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.volume.surge_ratio(volume, params)
    }
}

/// 정의된(유한한) 값만 남깁니다.
pub fn defined(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect()
}

fn last_defined(values: Vec<Option<f64>>, required: usize) -> IndicatorResult<f64> {
    let provided = values.len();
    values
        .into_iter()
        .last()
        .flatten()
        .filter(|v| v.is_finite())
        .ok_or(IndicatorError::InsufficientData { required, provided })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_sma_last() {
        let engine = IndicatorEngine::new();
        let prices: Vec<f64> = (1..=50).map(f64::from).collect();
        assert_eq!(engine.sma_last(&prices, 50).unwrap(), 25.5);
        assert_eq!(engine.sma_last(&prices, 20).unwrap(), 40.5);
    }

    #[test]
    fn test_defined_filters_gaps() {
        assert_eq!(
            defined(&[None, Some(1.0), Some(f64::NAN), Some(2.0)]),
            vec![1.0, 2.0]
        );
    }
}
