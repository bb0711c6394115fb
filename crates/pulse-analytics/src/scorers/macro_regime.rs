//! 매크로(시장 국면) 스코어러.
//!
//! VIX, 달러 인덱스, 10년물 금리, 벤치마크 지수 추세로 시장 전반의 위험 선호도를 평가합니다.
//! 자산 개별 데이터와 무관하므로 실행마다 자산 유형별로 한 번만 계산하고
//! [`ScoringContext::regime`]으로 공유합니다.
//!
//! | 구성요소 | 주식 | 크립토 |
//! |----------|------|--------|
//! | VIX | 0.35 | 0.20 |
//! | DXY 5일 변화 | 0.20 | 0.25 |
//! | 10년물 금리 | 0.25 | 0.15 |
//! | 벤치마크 추세 | 0.20 | 0.40 |

use pulse_core::{AssetType, Factor, MacroSnapshot, RawSeries, SubScore};

use super::{Blend, FactorScorer, ScorerError, ScorerResult, ScoringContext};
use crate::indicators::{defined, IndicatorEngine};
use crate::normalization::{rolling_zscore, Normalizer};

/// 벤치마크 추세 계산에 필요한 최소 관측치 수.
pub const MIN_BENCHMARK_POINTS: usize = 50;

/// DXY 변화율 Z-score에 우선 사용하는 윈도우.
const DXY_WINDOW: usize = 60;

/// 자산 유형별 구성요소 가중치.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeWeights {
    pub vix: f64,
    pub dxy: f64,
    pub treasury: f64,
    pub benchmark: f64,
}

impl RegimeWeights {
    pub fn for_asset_type(asset_type: AssetType) -> Self {
        match asset_type {
            AssetType::Stock => Self {
                vix: 0.35,
                dxy: 0.20,
                treasury: 0.25,
                benchmark: 0.20,
            },
            AssetType::Crypto => Self {
                vix: 0.20,
                dxy: 0.25,
                treasury: 0.15,
                benchmark: 0.40,
            },
        }
    }
}

/// VIX 수준 점수.
pub fn vix_level_points(vix: f64) -> f64 {
    match vix {
        v if v < 15.0 => 70.0,
        v if v < 20.0 => 20.0,
        v if v < 25.0 => -20.0,
        v if v < 30.0 => -50.0,
        v if v < 40.0 => -75.0,
        _ => -100.0,
    }
}

/// 10년물 금리(%) 수준 점수.
pub fn treasury_level_points(rate: f64) -> f64 {
    match rate {
        r if r < 2.0 => 80.0,
        r if r < 3.0 => 40.0,
        r if r < 4.0 => 0.0,
        r if r < 5.0 => -40.0,
        _ => -80.0,
    }
}

/// 매크로 스코어러.
#[derive(Debug, Default)]
pub struct MacroScorer {
    indicators: IndicatorEngine,
}

impl MacroScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 매크로 스냅샷으로 자산 유형별 국면 점수를 계산합니다.
    pub fn score_regime(
        &self,
        snapshot: &MacroSnapshot,
        asset_type: AssetType,
        norm: Normalizer,
    ) -> ScorerResult<SubScore> {
        if snapshot.is_empty() {
            return Err(ScorerError::MissingInput("macro data"));
        }
        let weights = RegimeWeights::for_asset_type(asset_type);
        let mut blend = Blend::new();
        let mut notes = Vec::new();

        if let Some((level, points)) = self.vix_points(snapshot.vix.as_ref(), norm) {
            blend.add("vix", points, weights.vix);
            notes.push(format!("VIX {:.1}", level));
        }
        if let Some((z, points)) = self.dxy_points(snapshot.dxy.as_ref(), norm)? {
            blend.add("dxy", points, weights.dxy);
            notes.push(format!("DXY 5d z {:+.2}", z));
        }
        if let Some((level, points)) = self.treasury_points(snapshot.treasury_10y.as_ref(), norm) {
            blend.add("10y", points, weights.treasury);
            notes.push(format!("10Y {:.2}%", level));
        }
        if let Some((above, points)) =
            self.benchmark_points(snapshot.benchmark_index.as_ref(), norm)?
        {
            blend.add("benchmark", points, weights.benchmark);
            notes.push(format!(
                "benchmark MA20 {} MA50",
                if above { "above" } else { "below" }
            ));
        }

        let value = blend
            .value()
            .ok_or(ScorerError::MissingInput("usable macro series"))?;
        let rationale = format!(
            "{}; {} → {:+.1}",
            notes.join(", "),
            blend.describe(),
            value
        );
        Ok(SubScore::new(Factor::Macro, value, rationale))
    }

    fn vix_points(&self, series: Option<&RawSeries>, norm: Normalizer) -> Option<(f64, f64)> {
        let values = series?.values();
        let level = *values.last()?;
        let adjustment = (-norm.latest_z(&values) * 10.0).clamp(-20.0, 20.0);
        Some((level, vix_level_points(level) + adjustment))
    }

    fn dxy_points(
        &self,
        series: Option<&RawSeries>,
        norm: Normalizer,
    ) -> ScorerResult<Option<(f64, f64)>> {
        let values = match series {
            Some(s) => s.values(),
            None => return Ok(None),
        };
        if values.len() <= 5 {
            return Ok(None);
        }
        let changes = defined(&self.indicators.pct_change(&values, 5)?);
        let window = if changes.len() >= DXY_WINDOW {
            DXY_WINDOW
        } else {
            norm.window
        };
        if changes.len() < window {
            return Ok(None);
        }
        let z = rolling_zscore(&changes, window);
        Ok(Some((z, -norm.scale_z(z))))
    }

    fn treasury_points(&self, series: Option<&RawSeries>, norm: Normalizer) -> Option<(f64, f64)> {
        let values = series?.values();
        let level = *values.last()?;
        let adjustment = (-norm.latest_z(&values) * 10.0).clamp(-30.0, 30.0);
        Some((level, treasury_level_points(level) + adjustment))
    }

    fn benchmark_points(
        &self,
        series: Option<&RawSeries>,
        norm: Normalizer,
    ) -> ScorerResult<Option<(bool, f64)>> {
        let values = match series {
            Some(s) => s.values(),
            None => return Ok(None),
        };
        if values.len() < MIN_BENCHMARK_POINTS {
            return Ok(None);
        }
        let ma20 = self.indicators.sma_last(&values, 20)?;
        let ma50 = self.indicators.sma_last(&values, 50)?;
        let above = ma20 > ma50;
        let momentum = defined(&self.indicators.pct_change(&values, 20)?);
        let trend = if above { 50.0 } else { -50.0 };
        let points = trend + 0.5 * norm.latest_score(&momentum);
        Ok(Some((above, points)))
    }
}

impl FactorScorer for MacroScorer {
    fn factor(&self) -> Factor {
        Factor::Macro
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        if let Some(regime) = ctx.regime {
            return Ok(regime.clone());
        }
        let snapshot = ctx
            .inputs
            .macro_data
            .as_deref()
            .ok_or(ScorerError::MissingInput("macro data"))?;
        self.score_regime(snapshot, ctx.asset.asset_type, ctx.normalizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::CandleSeries;
    use crate::test_support::{series, wave_closes};
    use pulse_core::{Asset, RawInputs, ScoreStatus};
    use std::sync::Arc;

    fn calm_snapshot() -> MacroSnapshot {
        MacroSnapshot {
            vix: Some(series("vix", &[13.0; 30])),
            treasury_10y: Some(series("tnx", &[1.8; 30])),
            benchmark_index: Some(series("^GSPC", &wave_closes(80, 4_000.0, 10.0))),
            ..Default::default()
        }
    }

    fn stressed_snapshot() -> MacroSnapshot {
        MacroSnapshot {
            vix: Some(series("vix", &[42.0; 30])),
            treasury_10y: Some(series("tnx", &[5.5; 30])),
            benchmark_index: Some(series("^GSPC", &wave_closes(80, 4_800.0, -10.0))),
            ..Default::default()
        }
    }

    #[test]
    fn test_level_tables() {
        assert_eq!(vix_level_points(12.0), 70.0);
        assert_eq!(vix_level_points(20.0), -20.0);
        assert_eq!(vix_level_points(45.0), -100.0);
        assert_eq!(treasury_level_points(3.5), 0.0);
        assert_eq!(treasury_level_points(5.0), -80.0);
    }

    #[test]
    fn test_calm_vs_stressed() {
        let scorer = MacroScorer::new();
        let norm = Normalizer::default();
        let calm = scorer
            .score_regime(&calm_snapshot(), AssetType::Stock, norm)
            .unwrap();
        let stressed = scorer
            .score_regime(&stressed_snapshot(), AssetType::Stock, norm)
            .unwrap();
        assert!(calm.value > 50.0, "calm {}", calm.value);
        assert!(stressed.value < -50.0, "stressed {}", stressed.value);
        assert!(calm.rationale.contains("VIX 13.0"));
    }

    #[test]
    fn test_empty_snapshot_is_error() {
        let result = MacroScorer::new().score_regime(
            &MacroSnapshot::default(),
            AssetType::Crypto,
            Normalizer::default(),
        );
        assert!(matches!(result, Err(ScorerError::MissingInput(_))));
    }

    #[test]
    fn test_precomputed_regime_is_reused() {
        let asset = Asset::stock("AAPL");
        let inputs = RawInputs::default();
        let candles = CandleSeries::default();
        let regime = SubScore::new(Factor::Macro, 12.5, "shared");
        let ctx = ScoringContext::new(&asset, &inputs, &candles, Normalizer::default())
            .with_regime(Some(&regime));
        assert_eq!(MacroScorer::new().score(&ctx), regime);
    }

    #[test]
    fn test_falls_back_to_inputs_then_neutral() {
        let asset = Asset::crypto("BTCUSDT");
        let candles = CandleSeries::default();

        let with_macro = RawInputs::default().with_macro(Arc::new(calm_snapshot()));
        let ctx = ScoringContext::new(&asset, &with_macro, &candles, Normalizer::default());
        assert!(MacroScorer::new().score(&ctx).is_computed());

        let without = RawInputs::default();
        let ctx = ScoringContext::new(&asset, &without, &candles, Normalizer::default());
        assert_eq!(MacroScorer::new().score(&ctx).status, ScoreStatus::InsufficientData);
    }
}
