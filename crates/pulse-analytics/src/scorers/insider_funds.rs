//! 수급(스마트 머니) 스코어러.
//!
//! 거래량 기반 자금 흐름(OBV, 가격 방향이 반영된 거래량 급증)과
//! 기관/내부자 보유 현황을 결합합니다.

use pulse_core::{Factor, InstitutionalSnapshot, SubScore};

use super::{Blend, FactorScorer, ScorerError, ScorerResult, ScoringContext};
use crate::indicators::{defined, IndicatorEngine, VolumeSurgeParams};

const OBV_WEIGHT: f64 = 0.30;
const SURGE_WEIGHT: f64 = 0.20;
const HOLDINGS_WEIGHT: f64 = 0.50;

/// 가격 방향 판단에 쓰는 봉 수.
const DIRECTION_LOOKBACK: usize = 5;

/// 기관 보유 비율 점수. 적정 구간(50~80%)이 가장 높습니다.
pub fn ownership_points(ratio: f64) -> f64 {
    if (0.5..=0.8).contains(&ratio) {
        60.0
    } else if ratio > 0.8 {
        30.0
    } else if ratio > 0.3 {
        20.0
    } else {
        -20.0
    }
}

/// 보유 비율 변화 점수 (변화율 × 1000, ±60 제한).
pub fn ownership_change_points(change: f64) -> f64 {
    (change * 1_000.0).clamp(-60.0, 60.0)
}

/// 공매도 비율 점수.
pub fn short_interest_points(ratio: f64) -> f64 {
    match ratio {
        r if r < 0.05 => 30.0,
        r if r < 0.10 => 0.0,
        r if r < 0.20 => -30.0,
        _ => -60.0,
    }
}

/// 내부자 보유 비율 점수.
pub fn insider_points(ratio: f64) -> f64 {
    if ratio > 0.10 {
        40.0
    } else if ratio > 0.05 {
        20.0
    } else if ratio < 0.01 {
        -10.0
    } else {
        0.0
    }
}

/// 보유 현황 항목 점수의 평균. 유효 항목이 없으면 None.
pub fn holdings_score(snapshot: &InstitutionalSnapshot) -> Option<f64> {
    let points: Vec<f64> = [
        (snapshot.institutional_ownership, ownership_points as fn(f64) -> f64),
        (snapshot.ownership_change, ownership_change_points),
        (snapshot.short_interest, short_interest_points),
        (snapshot.insider_ownership, insider_points),
    ]
    .into_iter()
    .filter_map(|(raw, points)| raw.filter(|v| v.is_finite()).map(points))
    .collect();

    (!points.is_empty()).then(|| points.iter().sum::<f64>() / points.len() as f64)
}

/// 수급 스코어러.
#[derive(Debug, Default)]
pub struct InsiderFundsScorer {
    indicators: IndicatorEngine,
}

impl InsiderFundsScorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FactorScorer for InsiderFundsScorer {
    fn factor(&self) -> Factor {
        Factor::InsiderFunds
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        let c = ctx.candles;
        let norm = ctx.normalizer;
        let mut blend = Blend::new();

        if norm.has_window(&c.close) {
            let obv = self.indicators.obv(&c.close, &c.volume)?;
            blend.add("obv", norm.latest_score(&obv), OBV_WEIGHT);

            let surge_params = VolumeSurgeParams::default();
            let surge = if c.len() >= surge_params.baseline {
                defined(&self.indicators.volume_surge(&c.volume, surge_params)?)
            } else {
                Vec::new()
            };
            let n = c.close.len();
            let direction = match n
                .checked_sub(DIRECTION_LOOKBACK + 1)
                .map(|base| c.close[n - 1] - c.close[base])
            {
                Some(delta) if delta > 0.0 => 1.0,
                Some(delta) if delta < 0.0 => -1.0,
                _ => 0.0,
            };
            if norm.has_window(&surge) {
                blend.add("volume surge", norm.latest_score(&surge) * direction, SURGE_WEIGHT);
            }
        }

        let holdings = ctx.inputs.institutional.as_ref().and_then(holdings_score);
        blend.add_opt("holdings", holdings, HOLDINGS_WEIGHT);

        let value = blend.value().ok_or(ScorerError::InsufficientData {
            what: "candles (and no holdings data)",
            required: norm.window,
            provided: c.len(),
        })?;

        let rationale = format!("{} → {:+.1}", blend.describe(), value);
        Ok(SubScore::new(Factor::InsiderFunds, value, rationale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::Normalizer;
    use crate::series::CandleSeries;
    use crate::test_support::{candles_with_volume, wave_closes};
    use pulse_core::{Asset, RawInputs, ScoreStatus};

    fn score(inputs: RawInputs) -> SubScore {
        let asset = Asset::stock("TEST");
        let candles = CandleSeries::from_klines(&inputs.candles);
        let ctx = ScoringContext::new(&asset, &inputs, &candles, Normalizer::default());
        InsiderFundsScorer::new().score(&ctx)
    }

    #[test]
    fn test_point_tables() {
        assert_eq!(ownership_points(0.65), 60.0);
        assert_eq!(ownership_points(0.9), 30.0);
        assert_eq!(ownership_points(0.1), -20.0);
        assert_eq!(ownership_change_points(0.2), 60.0);
        assert_eq!(short_interest_points(0.25), -60.0);
        assert_eq!(insider_points(0.07), 20.0);
    }

    #[test]
    fn test_holdings_only() {
        let snapshot = InstitutionalSnapshot {
            institutional_ownership: Some(0.7),
            short_interest: Some(0.02),
            ..Default::default()
        };
        let sub = score(RawInputs::default().with_institutional(snapshot));
        assert!(sub.is_computed());
        assert!((sub.value - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_nothing_available_is_neutral() {
        let sub = score(RawInputs::default());
        assert_eq!(sub.status, ScoreStatus::InsufficientData);
    }

    #[test]
    fn test_accumulation_on_rising_price() {
        let mut closes = wave_closes(40, 100.0, 0.0);
        let mut volumes = vec![1_000.0; 40];
        for i in 35..40 {
            closes[i] = closes[i - 1] * 1.02;
            volumes[i] = 4_000.0;
        }
        let sub = score(RawInputs::from_candles(candles_with_volume(&closes, &volumes)));
        assert!(sub.value > 30.0, "value {}", sub.value);
    }
}
