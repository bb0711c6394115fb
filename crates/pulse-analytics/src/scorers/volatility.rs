//! 변동성 스코어러.
//!
//! ATR(14)% 와 볼린저(20, 2σ) 밴드 폭을 각자의 최근 이력에 대해 Z-score로 표준화하고
//! 부호를 뒤집습니다. 상대적으로 변동성이 높을수록 음수(위험)입니다.
//! ATR 이력이 정규화 윈도우보다 짧으면 데이터 부족입니다.
//! 밴드 폭은 이력이 윈도우 이상일 때만 포함됩니다.

use pulse_core::{Factor, SubScore};

use super::{Blend, FactorScorer, ScorerError, ScorerResult, ScoringContext};
use crate::indicators::{defined, AtrParams, BollingerBandsParams, IndicatorEngine};

/// 최소 캔들 수.
pub const MIN_CANDLES: usize = 14;

/// 변동성 스코어러.
#[derive(Debug, Default)]
pub struct VolatilityScorer {
    indicators: IndicatorEngine,
}

impl VolatilityScorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FactorScorer for VolatilityScorer {
    fn factor(&self) -> Factor {
        Factor::Volatility
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        ctx.require_candles(MIN_CANDLES)?;
        let c = ctx.candles;
        let norm = ctx.normalizer;

        let atr_pct = defined(&self.indicators.atr_percent(
            &c.high,
            &c.low,
            &c.close,
            AtrParams::default(),
        )?);
        if !norm.has_window(&atr_pct) {
            return Err(ScorerError::InsufficientData {
                what: "ATR values",
                required: norm.window,
                provided: atr_pct.len(),
            });
        }
        let atr_z = norm.latest_z(&atr_pct);
        let current_atr = atr_pct.last().copied().unwrap_or(0.0);

        let bb_params = BollingerBandsParams::default();
        let bandwidth = if c.len() >= bb_params.period {
            let bands = self.indicators.bollinger_bands(&c.close, bb_params)?;
            let widths: Vec<Option<f64>> = bands.iter().map(|b| b.bandwidth).collect();
            Some(defined(&widths)).filter(|w| norm.has_window(w))
        } else {
            None
        };
        let bb_z = bandwidth.as_deref().map(|w| norm.latest_z(w));

        let mut blend = Blend::new();
        blend
            .add("atr", -norm.scale_z(atr_z), 0.5)
            .add_opt("bb width", bb_z.map(|z| -norm.scale_z(z)), 0.5);
        let value = blend.value().unwrap_or(0.0);

        let mut rationale = format!("ATR {:.2}% of price (z {:+.2})", current_atr, atr_z);
        match (bandwidth.as_deref().and_then(|w| w.last()), bb_z) {
            (Some(width), Some(z)) => {
                rationale.push_str(&format!(", BB width {:.3} (z {:+.2})", width, z));
            }
            _ => rationale.push_str(", BB width n/a"),
        }
        rationale.push_str(&format!(" → {:+.1}", value));

        Ok(SubScore::new(Factor::Volatility, value, rationale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::Normalizer;
    use crate::series::CandleSeries;
    use crate::test_support::candles_from_closes;
    use pulse_core::{Asset, Kline, RawInputs, ScoreStatus};
    use rust_decimal::Decimal;

    fn score(candles: Vec<Kline>) -> SubScore {
        let asset = Asset::stock("TEST");
        let inputs = RawInputs::from_candles(candles);
        let series = CandleSeries::from_klines(&inputs.candles);
        let ctx = ScoringContext::new(&asset, &inputs, &series, Normalizer::default());
        VolatilityScorer::new().score(&ctx)
    }

    #[test]
    fn test_short_series_is_neutral() {
        let sub = score(candles_from_closes(&[100.0; 10]));
        assert_eq!(sub.status, ScoreStatus::InsufficientData);
        assert_eq!(sub.value, 0.0);
    }

    #[test]
    fn test_atr_history_shorter_than_window_is_neutral() {
        // ATR(14)는 n-13개 값 → 윈도우 20에는 33봉 필요
        for n in [14, 25, 32] {
            let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
            let sub = score(candles_from_closes(&closes));
            assert_eq!(sub.status, ScoreStatus::InsufficientData, "n = {}", n);
            assert_eq!(sub.value, 0.0);
            assert!(sub.rationale.contains("ATR values"));
        }
    }

    #[test]
    fn test_full_window_is_computed() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i % 3) as f64).collect();
        let sub = score(candles_from_closes(&closes));
        assert!(sub.is_computed());
        assert!(!sub.rationale.contains("BB width n/a"));
        assert!(sub.value.is_finite());
    }

    #[test]
    fn test_volatility_spike_is_negative() {
        // 조용한 60일 후 마지막 5일 변동폭 급증
        let mut candles = candles_from_closes(
            &(0..60).map(|i| 100.0 + (i % 2) as f64 * 0.2).collect::<Vec<_>>(),
        );
        let last_close = candles.last().map(|k| k.close).unwrap_or(Decimal::ONE_HUNDRED);
        for (i, k) in candles.iter_mut().rev().take(5).enumerate() {
            let swing = Decimal::from(8 + i as i64);
            k.high = last_close + swing;
            k.low = last_close - swing;
        }

        let sub = score(candles);
        assert!(sub.is_computed());
        assert!(sub.value < 0.0, "spike should be risk-negative: {}", sub.value);
    }
}
