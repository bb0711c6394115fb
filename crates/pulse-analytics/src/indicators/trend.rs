//! 추세 지표 (Trend Indicators).
//!
//! - SMA (단순 이동평균)
//! - 기간 수익률 (pct change)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 인자
    /// * `prices` - 가격 데이터
    /// * `params` - SMA 파라미터
    ///
    /// # 반환
    /// 각 시점의 SMA 값 (처음 period-1개는 None)
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
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

        let mut result = Vec::with_capacity(prices.len());
        let mut window_sum = 0.0;

        for i in 0..prices.len() {
            window_sum += prices[i];
            if i >= period {
                window_sum -= prices[i - period];
            }

            if i + 1 < period {
                result.push(None);
            } else {
                result.push(Some(window_sum / period as f64));
            }
        }

        Ok(result)
    }

    /// 기간 수익률 계산.
    ///
    /// r[t] = P[t] / P[t - periods] - 1
    ///
    /// 기준 가격이 0이면 해당 시점은 None입니다.
    pub fn pct_change(&self, prices: &[f64], periods: usize) -> IndicatorResult<Vec<Option<f64>>> {
        if periods == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() <= periods {
            return Err(IndicatorError::InsufficientData {
                required: periods + 1,
                provided: prices.len(),
            });
        }

        let result = (0..prices.len())
            .map(|i| {
                if i < periods {
                    return None;
                }
                let base = prices[i - periods];
                if base == 0.0 {
                    None
                } else {
                    Some(prices[i] / base - 1.0)
                }
            })
            .collect();

        Ok(result)
    }
}
