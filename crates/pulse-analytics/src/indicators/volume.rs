//! 거래량 지표 (Volume Indicators).
//!
//! - OBV (On-Balance Volume): 가격 방향으로 부호를 붙인 누적 거래량
//! - VPT (Volume-Price Trend): 수익률로 가중한 누적 거래량
//! - 거래량 급증 비율: 최근 평균 거래량 / 장기 평균 거래량

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// 거래량 급증 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeSurgeParams {
    /// 최근 구간 길이 (기본: 5).
    pub recent: usize,
    /// 기준 평균 구간 길이 (기본: 20).
    pub baseline: usize,
}

impl Default for VolumeSurgeParams {
    fn default() -> Self {
        Self {
            recent: 5,
            baseline: 20,
        }
    }
}

/// 거래량 지표 계산기.
#[derive(Debug, Default)]
pub struct VolumeIndicators;

impl VolumeIndicators {
    /// 새로운 거래량 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// OBV 계산.
    ///
    /// OBV[i] = OBV[i-1] + sign(종가[i] - 종가[i-1]) × 거래량[i], OBV[0] = 0
    pub fn obv(&self, close: &[f64], volume: &[f64]) -> IndicatorResult<Vec<f64>> {
        let len = close.len().min(volume.len());
        if len < 2 {
            return Err(IndicatorError::InsufficientData {
                required: 2,
                provided: len,
            });
        }

        let mut result = Vec::with_capacity(len);
        let mut obv = 0.0;
        result.push(obv);
        for i in 1..len {
            if close[i] > close[i - 1] {
                obv += volume[i];
            } else if close[i] < close[i - 1] {
                obv -= volume[i];
            }
            result.push(obv);
        }

        Ok(result)
    }

    /// VPT 계산.
    ///
    /// VPT[i] = VPT[i-1] + 거래량[i] × (종가[i] - 종가[i-1]) / 종가[i-1], VPT[0] = 0
    pub fn vpt(&self, close: &[f64], volume: &[f64]) -> IndicatorResult<Vec<f64>> {
        let len = close.len().min(volume.len());
        if len < 2 {
            return Err(IndicatorError::InsufficientData {
                required: 2,
                provided: len,
            });
        }

        let mut result = Vec::with_capacity(len);
        let mut vpt = 0.0;
        result.push(vpt);
        for i in 1..len {
            if close[i - 1] != 0.0 {
                vpt += volume[i] * (close[i] - close[i - 1]) / close[i - 1];
            }
            result.push(vpt);
        }

        Ok(result)
    }

    /// 거래량 급증 비율 계산.
    ///
    /// ratio[i] = mean(거래량[i-recent+1..=i]) / mean(거래량[i-baseline+1..=i])
    ///
    /// 기준 평균이 0이면 해당 시점은 None입니다.
    pub fn surge_ratio(
        &self,
        volume: &[f64],
        params: VolumeSurgeParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        if params.recent == 0 || params.baseline < params.recent {
            return Err(IndicatorError::InvalidParameter(format!(
                "0 < recent <= baseline 이어야 합니다: recent={}, baseline={}",
                params.recent, params.baseline
            )));
        }

        if volume.len() < params.baseline {
            return Err(IndicatorError::InsufficientData {
                required: params.baseline,
                provided: volume.len(),
            });
        }

        let mean = |slice: &[f64]| slice.iter().sum::<f64>() / slice.len() as f64;

        let result = (0..volume.len())
            .map(|i| {
                if i + 1 < params.baseline {
                    return None;
                }
                let baseline = mean(&volume[i + 1 - params.baseline..=i]);
                let recent = mean(&volume[i + 1 - params.recent..=i]);
                (baseline > 0.0).then(|| recent / baseline)
            })
            .collect();

        Ok(result)
    }
}
