//! 상대강도 스코어러.
//!
//! 자산과 벤치마크의 종가를 날짜로 정렬한 뒤, 여러 기간의 초과수익률
//! (자산 수익률 − 벤치마크 수익률) 시계열을 롤링 Z-score로 표준화하여 가중 결합합니다.

use std::collections::HashMap;

use chrono::NaiveDate;
use pulse_core::{Factor, RawSeries, SubScore};

use super::{Blend, FactorScorer, ScorerError, ScorerResult, ScoringContext};
use crate::series::CandleSeries;

/// (기간, 가중치). 장기일수록 비중이 큽니다.
pub const HORIZONS: [(usize, f64); 4] = [(5, 0.10), (10, 0.20), (20, 0.30), (60, 0.40)];

/// 날짜 기준으로 정렬된 (자산, 벤치마크) 종가 쌍.
pub fn align_closes(candles: &CandleSeries, benchmark: &RawSeries) -> Vec<(f64, f64)> {
    let bench: HashMap<NaiveDate, f64> = benchmark
        .observations
        .iter()
        .filter(|o| o.value.is_finite() && o.value > 0.0)
        .map(|o| (o.timestamp.date_naive(), o.value))
        .collect();

    candles
        .timestamps
        .iter()
        .zip(&candles.close)
        .filter(|(_, close)| **close > 0.0)
        .filter_map(|(ts, close)| bench.get(&ts.date_naive()).map(|b| (*close, *b)))
        .collect()
}

/// 기간 `horizon`의 초과수익률 시계열.
pub fn excess_returns(aligned: &[(f64, f64)], horizon: usize) -> Vec<f64> {
    if horizon == 0 || aligned.len() <= horizon {
        return Vec::new();
    }
    aligned
        .windows(horizon + 1)
        .filter_map(|w| {
            let (a0, b0) = w[0];
            let (a1, b1) = w[horizon];
            let excess = (a1 / a0 - 1.0) - (b1 / b0 - 1.0);
            excess.is_finite().then_some(excess)
        })
        .collect()
}

/// 상대강도 스코어러.
#[derive(Debug, Default)]
pub struct RelativeStrengthScorer;

impl RelativeStrengthScorer {
    pub fn new() -> Self {
        Self
    }
}

impl FactorScorer for RelativeStrengthScorer {
    fn factor(&self) -> Factor {
        Factor::RelativeStrength
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        let benchmark = ctx
            .inputs
            .benchmark
            .as_ref()
            .filter(|b| !b.is_empty())
            .ok_or(ScorerError::MissingInput("benchmark"))?;
        let norm = ctx.normalizer;

        let aligned = align_closes(ctx.candles, benchmark);
        let shortest = HORIZONS[0].0 + norm.window;
        if aligned.len() < shortest {
            return Err(ScorerError::InsufficientData {
                what: "closes aligned with benchmark",
                required: shortest,
                provided: aligned.len(),
            });
        }

        let mut blend = Blend::new();
        let mut notes = Vec::new();
        for (horizon, weight) in HORIZONS {
            let excess = excess_returns(&aligned, horizon);
            if !norm.has_window(&excess) {
                continue;
            }
            let z = norm.latest_z(&excess);
            let latest = excess.last().copied().unwrap_or(0.0);
            blend.add("rs", norm.scale_z(z), weight);
            notes.push(format!("{}d {:+.2}% (z {:+.2})", horizon, latest * 100.0, z));
        }

        let value = blend.value().unwrap_or(0.0);
        let rationale = format!(
            "excess return vs {}: {} → {:+.1}",
            benchmark.metric,
            notes.join(", "),
            value
        );
        Ok(SubScore::new(Factor::RelativeStrength, value, rationale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::Normalizer;
    use crate::test_support::{candles_from_closes, series, wave_closes};
    use pulse_core::{Asset, RawInputs, ScoreStatus};

    fn score(inputs: RawInputs) -> SubScore {
        let asset = Asset::stock("TEST");
        let candles = CandleSeries::from_klines(&inputs.candles);
        let ctx = ScoringContext::new(&asset, &inputs, &candles, Normalizer::default());
        RelativeStrengthScorer::new().score(&ctx)
    }

    #[test]
    fn test_excess_returns() {
        let aligned = vec![(100.0, 100.0), (110.0, 105.0), (121.0, 105.0)];
        let excess = excess_returns(&aligned, 1);
        assert_eq!(excess.len(), 2);
        assert!((excess[0] - 0.05).abs() < 1e-12);
        assert!((excess[1] - 0.10).abs() < 1e-12);
        assert!(excess_returns(&aligned, 3).is_empty());
    }

    #[test]
    fn test_missing_benchmark_is_neutral() {
        let inputs = RawInputs::from_candles(candles_from_closes(&wave_closes(90, 100.0, 0.2)));
        let sub = score(inputs);
        assert_eq!(sub.status, ScoreStatus::InsufficientData);
        assert_eq!(sub.rationale, "insufficient data: no benchmark available");
    }

    #[test]
    fn test_tracking_benchmark_is_neutral() {
        let candles = candles_from_closes(&wave_closes(90, 100.0, 0.2));
        let benchmark = RawSeries::from_closes("^GSPC", &candles);
        let sub = score(RawInputs::from_candles(candles).with_benchmark(benchmark));
        assert!(sub.is_computed());
        assert_eq!(sub.value, 0.0);
        assert!(sub.rationale.contains("60d"));
    }

    #[test]
    fn test_recent_outperformance_is_positive() {
        let bench = wave_closes(90, 100.0, 0.2);
        let mut closes = bench.clone();
        for (k, close) in closes.iter_mut().skip(85).enumerate() {
            *close *= 1.0 + 0.03 * (k + 1) as f64;
        }
        let inputs = RawInputs::from_candles(candles_from_closes(&closes))
            .with_benchmark(series("^GSPC", &bench));
        let sub = score(inputs);
        assert!(sub.value > 50.0, "value {}", sub.value);
    }

    #[test]
    fn test_short_alignment_is_neutral() {
        let closes = wave_closes(90, 100.0, 0.2);
        let inputs = RawInputs::from_candles(candles_from_closes(&closes))
            .with_benchmark(series("^GSPC", &closes[..10]));
        let sub = score(inputs);
        assert_eq!(sub.status, ScoreStatus::InsufficientData);
    }
}
