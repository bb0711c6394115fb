//! 모멘텀/오실레이터 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 지표들을 제공합니다.
//! - RSI (Relative Strength Index)
//! - Williams %R
//! - CCI (Commodity Channel Index)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// Williams %R 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WilliamsRParams {
    /// 조회 기간 (기본: 14).
    pub period: usize,
}

impl Default for WilliamsRParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// CCI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CciParams {
    /// 조회 기간 (기본: 20).
    pub period: usize,
    /// Lambert 상수 (기본: 0.015).
    pub constant: f64,
}

impl Default for CciParams {
    fn default() -> Self {
        Self {
            period: 20,
            constant: 0.015,
        }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS))
    /// RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 평균은 alpha = 1/period 인 EWM이며, 첫 값은 단순 평균으로 시작합니다.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());
        gains.push(0.0);
        losses.push(0.0);
        for w in prices.windows(2) {
            let delta = w[1] - w[0];
            gains.push(delta.max(0.0));
            losses.push((-delta).max(0.0));
        }

        let alpha = 1.0 / period as f64;
        let avg_gains = ewm(&gains, alpha, period);
        let avg_losses = ewm(&losses, alpha, period);

        let result = avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|pair| match pair {
                (Some(gain), Some(loss)) => {
                    if *loss == 0.0 {
                        Some(100.0)
                    } else {
                        let rs = gain / loss;
                        Some(100.0 - 100.0 / (1.0 + rs))
                    }
                }
                _ => None,
            })
            .collect();

        Ok(result)
    }

    /// Williams %R 계산.
    ///
    /// %R = (최고가 - 종가) / (최고가 - 최저가) × -100, 범위 [-100, 0].
    /// 구간 고저가 같으면 -50 (중립)입니다.
    pub fn williams_r(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: WilliamsRParams,
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

        let result = (0..len)
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let start = i + 1 - period;
                let hh = high[start..=i].iter().copied().fold(f64::MIN, f64::max);
                let ll = low[start..=i].iter().copied().fold(f64::MAX, f64::min);
                let range = hh - ll;
                if range <= 0.0 {
                    Some(-50.0)
                } else {
                    Some((hh - close[i]) / range * -100.0)
                }
            })
            .collect();

        Ok(result)
    }

    /// CCI (Commodity Channel Index) 계산.
    ///
    /// CCI = (TP - SMA(TP)) / (constant × 평균편차)
    /// TP = (고가 + 저가 + 종가) / 3
    ///
    /// 평균편차가 0이면 해당 시점은 0입니다.
    pub fn cci(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: CciParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let len = high.len().min(low.len()).min(close.len());
        let period = params.period;

        if period == 0 || params.constant <= 0.0 {
            return Err(IndicatorError::InvalidParameter(format!(
                "기간과 상수는 양수여야 합니다: period={}, constant={}",
                period, params.constant
            )));
        }

        if len < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: len,
            });
        }

        let typical: Vec<f64> = (0..len).map(|i| (high[i] + low[i] + close[i]) / 3.0).collect();

        let result = (0..len)
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = &typical[i + 1 - period..=i];
                let ma = window.iter().sum::<f64>() / period as f64;
                let mean_dev = window.iter().map(|tp| (tp - ma).abs()).sum::<f64>() / period as f64;
                if mean_dev == 0.0 {
                    Some(0.0)
                } else {
                    Some((typical[i] - ma) / (params.constant * mean_dev))
                }
            })
            .collect();

        Ok(result)
    }
}

/// EWM (Exponential Weighted Mean) 계산.
///
/// 처음 `min_periods - 1`개는 None, `min_periods`번째는 단순 평균으로 시작합니다.
pub(crate) fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    let mut current = 0.0;

    for (i, value) in values.iter().enumerate() {
        if i + 1 < min_periods {
            result.push(None);
        } else if i + 1 == min_periods {
            current = values[..=i].iter().sum::<f64>() / min_periods as f64;
            result.push(Some(current));
        } else {
            current = value * alpha + current * (1.0 - alpha);
            result.push(Some(current));
        }
    }

    result
}
