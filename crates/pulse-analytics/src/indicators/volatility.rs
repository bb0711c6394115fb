//! 변동성 지표 (Volatility Indicators).
//!
//! - 볼린저 밴드 (Bollinger Bands) 및 밴드 폭
//! - ATR (Average True Range) 및 가격 대비 ATR%

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드.
    pub upper: Option<f64>,
    /// 중간 밴드 (SMA).
    pub middle: Option<f64>,
    /// 하단 밴드.
    pub lower: Option<f64>,
    /// 밴드 폭 ((상단 - 하단) / 중간).
    pub bandwidth: Option<f64>,
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 밴드 = SMA(period), 상/하단 = 중간 ± (배수 × 모표준편차)
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let result = (0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    return BollingerBandsResult::default();
                }
                let window = &prices[i + 1 - period..=i];
                let ma = window.iter().sum::<f64>() / period as f64;
                let variance =
                    window.iter().map(|p| (p - ma).powi(2)).sum::<f64>() / period as f64;
                let deviation = params.std_dev_multiplier * variance.sqrt();
                let upper = ma + deviation;
                let lower = ma - deviation;

                BollingerBandsResult {
                    upper: Some(upper),
                    middle: Some(ma),
                    lower: Some(lower),
                    bandwidth: (ma != 0.0).then(|| (upper - lower) / ma),
                }
            })
            .collect();

        Ok(result)
    }

    /// ATR (Average True Range) 계산.
    ///
    /// True Range = max(고가 - 저가, |고가 - 전일종가|, |저가 - 전일종가|)
    /// 첫 봉의 True Range는 고가 - 저가입니다.
    /// ATR은 첫 `period`개 TR의 단순 평균으로 시작해 alpha = 1/period EWM으로 갱신합니다.
    ///
    /// # 반환
    /// ATR 값들 (처음 period-1개는 None)
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let len = high.len().min(low.len()).min(close.len());
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if len < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: len,
            });
        }

        let mut true_ranges = Vec::with_capacity(len);
        true_ranges.push(high[0] - low[0]);
        for i in 1..len {
            let hl = high[i] - low[i];
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            true_ranges.push(hl.max(hc).max(lc));
        }

        Ok(super::momentum::ewm(&true_ranges, 1.0 / period as f64, period))
    }

    /// 가격 대비 ATR (%) 계산.
    pub fn atr_percent(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let atr = self.atr(high, low, close, params)?;

        let result = atr
            .iter()
            .zip(close.iter())
            .map(|(atr, price)| match atr {
                Some(atr) if *price != 0.0 => Some(atr / price * 100.0),
                _ => None,
            })
            .collect();

        Ok(result)
    }
}
