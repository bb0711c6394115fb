//! 스코어링 엔진.
//!
//! 일곱 개 팩터 스코어러를 실행하고 [`Aggregator`]로 결과를 합칩니다.
//!
//! # 실행 단위
//!
//! 매크로 국면 점수는 자산과 무관하므로 [`ScoringEngine::begin_run`]에서 자산 유형별로
//! 한 번 계산하고, 같은 실행의 모든 자산이 [`RunContext`]를 공유합니다.
//! 엔진은 내부 상태를 변경하지 않으므로 여러 스레드에서 동시에 사용할 수 있습니다.
//!
//! ```ignore
//! let engine = ScoringEngine::new(&config.scoring)?;
//! let run = engine.begin_run(Some(&macro_snapshot));
//! let result = engine.score_in_run(&run, &asset, &inputs);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use pulse_core::{
    scoring_span, Asset, AssetType, Factor, FactorWeights, MacroSnapshot, PulseResult, RawInputs,
    ScoringConfig, ScoringResult, SignalThresholds, SubScore,
};

use crate::aggregator::Aggregator;
use crate::normalization::Normalizer;
use crate::scorers::{
    FactorScorer, FundamentalScorer, InsiderFundsScorer, MacroScorer, RelativeStrengthScorer,
    ScoringContext, SentimentScorer, TrendScorer, VolatilityScorer,
};
use crate::series::CandleSeries;

/// 한 스코어링 실행의 공유 상태.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// 실행 ID
    pub run_id: Uuid,
    /// 실행 시각 (모든 결과의 timestamp)
    pub timestamp: DateTime<Utc>,
    /// 자산 유형별 매크로 국면 점수
    pub regimes: HashMap<AssetType, SubScore>,
}

impl RunContext {
    /// 매크로 국면 없이 새 실행을 시작합니다.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            regimes: HashMap::new(),
        }
    }

    pub fn regime(&self, asset_type: AssetType) -> Option<&SubScore> {
        self.regimes.get(&asset_type)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 멀티 팩터 스코어링 엔진.
pub struct ScoringEngine {
    scorers: Vec<Box<dyn FactorScorer>>,
    macro_scorer: MacroScorer,
    aggregator: Aggregator,
    normalizer: Normalizer,
}

impl ScoringEngine {
    /// 설정으로 엔진을 생성합니다. 가중치/임계값이 유효하지 않으면 오류.
    pub fn new(config: &ScoringConfig) -> PulseResult<Self> {
        let aggregator = Aggregator::new(config.weights, config.thresholds)?;
        Ok(Self::with_aggregator(
            aggregator,
            Normalizer::from(config.normalization),
        ))
    }

    /// 기본 가중치/임계값으로 엔진을 생성합니다.
    pub fn with_defaults() -> Self {
        Self::with_aggregator(Aggregator::default(), Normalizer::default())
    }

    fn with_aggregator(aggregator: Aggregator, normalizer: Normalizer) -> Self {
        let scorers: Vec<Box<dyn FactorScorer>> = vec![
            Box::new(TrendScorer::new()),
            Box::new(VolatilityScorer::new()),
            Box::new(SentimentScorer::new()),
            Box::new(FundamentalScorer::new()),
            Box::new(RelativeStrengthScorer::new()),
            Box::new(InsiderFundsScorer::new()),
            Box::new(MacroScorer::new()),
        ];
        Self {
            scorers,
            macro_scorer: MacroScorer::new(),
            aggregator,
            normalizer,
        }
    }

    pub fn weights(&self) -> &FactorWeights {
        self.aggregator.weights()
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        self.aggregator.thresholds()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// 새 실행을 시작하고 자산 유형별 매크로 국면 점수를 계산합니다.
    pub fn begin_run(&self, macro_data: Option<&MacroSnapshot>) -> RunContext {
        let mut run = RunContext::new();
        let Some(snapshot) = macro_data else {
            debug!(run_id = %run.run_id, "No macro snapshot for this run");
            return run;
        };

        for asset_type in AssetType::ALL {
            let regime = match self
                .macro_scorer
                .score_regime(snapshot, asset_type, self.normalizer)
            {
                Ok(regime) => regime,
                Err(e) => {
                    warn!(
                        run_id = %run.run_id,
                        asset_type = %asset_type,
                        reason = %e,
                        "Macro regime fell back to neutral"
                    );
                    SubScore::insufficient(Factor::Macro, e)
                }
            };
            run.regimes.insert(asset_type, regime);
        }
        run
    }

    /// 실행 컨텍스트 안에서 한 자산을 스코어링합니다.
    pub fn score_in_run(&self, run: &RunContext, asset: &Asset, inputs: &RawInputs) -> ScoringResult {
        let span = scoring_span!("score_asset", run.run_id, asset.ticker);
        let _guard = span.enter();

        let candles = CandleSeries::from_klines(&inputs.candles);
        let ctx = ScoringContext::new(asset, inputs, &candles, self.normalizer)
            .with_regime(run.regime(asset.asset_type));

        let sub_scores = self.scorers.iter().map(|s| s.score(&ctx)).collect();
        self.aggregator
            .aggregate(run.run_id, asset, run.timestamp, sub_scores)
    }

    /// 단일 자산을 독립 실행으로 스코어링합니다.
    ///
    /// 입력에 포함된 매크로 스냅샷으로 국면 점수를 계산합니다.
    pub fn score_asset(&self, asset: &Asset, inputs: &RawInputs) -> ScoringResult {
        let run = self.begin_run(inputs.macro_data.as_deref());
        self.score_in_run(&run, asset, inputs)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("scorers", &self.scorers.len())
            .field("aggregator", &self.aggregator)
            .field("normalizer", &self.normalizer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{candles_from_closes, series, wave_closes};
    use pulse_core::{
        FundamentalSnapshot, InstitutionalSnapshot, NewsItem, ScoreStatus, Signal,
    };
    use std::sync::Arc;

    #[test]
    fn test_empty_inputs_yield_hold() {
        let engine = ScoringEngine::with_defaults();
        let result = engine.score_asset(&Asset::stock("EMPTY"), &RawInputs::default());
        assert_eq!(result.ai_score, 0.0);
        assert_eq!(result.signal, Signal::Hold);
        assert_eq!(result.confidence, 0.0);
        assert!(result
            .sub_scores
            .iter()
            .all(|s| s.status == ScoreStatus::InsufficientData));
    }

    #[test]
    fn test_run_shares_id_and_regime() {
        let engine = ScoringEngine::with_defaults();
        let snapshot = MacroSnapshot {
            vix: Some(series("vix", &[13.0; 30])),
            ..Default::default()
        };
        let run = engine.begin_run(Some(&snapshot));
        assert_eq!(run.regimes.len(), 2);

        let inputs = RawInputs::from_candles(candles_from_closes(&wave_closes(80, 100.0, 0.5)));
        let a = engine.score_in_run(&run, &Asset::stock("AAA"), &inputs);
        let b = engine.score_in_run(&run, &Asset::stock("BBB"), &inputs);
        assert_eq!(a.run_id, b.run_id);
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.sub_score(Factor::Macro), b.sub_score(Factor::Macro));
        assert!(a.sub_score(Factor::Macro).unwrap().is_computed());
    }

    #[test]
    fn test_full_inputs_compute_every_factor() {
        let engine = ScoringEngine::with_defaults();
        let closes = wave_closes(120, 100.0, 0.4);
        let candles = candles_from_closes(&closes);
        let benchmark = series("^GSPC", &wave_closes(120, 4_000.0, 5.0));
        let macro_data = MacroSnapshot {
            vix: Some(series("vix", &[18.0; 40])),
            benchmark_index: Some(benchmark.clone()),
            ..Default::default()
        };
        let inputs = RawInputs::from_candles(candles)
            .with_benchmark(benchmark)
            .with_fundamentals(FundamentalSnapshot {
                pe_ratio: Some(18.0),
                roe: Some(0.15),
                ..Default::default()
            })
            .with_news(vec![NewsItem::new(Utc::now(), "Record profit").with_sentiment(0.4)])
            .with_institutional(InstitutionalSnapshot {
                institutional_ownership: Some(0.6),
                ..Default::default()
            })
            .with_macro(Arc::new(macro_data));

        let result = engine.score_asset(&Asset::stock("FULL"), &inputs);
        for sub in &result.sub_scores {
            assert!(sub.is_computed(), "{} not computed: {}", sub.factor, sub.rationale);
            assert!((-100.0..=100.0).contains(&sub.value));
        }
        assert!((result.confidence - 1.0).abs() < 1e-9);
        assert!((-100.0..=100.0).contains(&result.ai_score));
        assert_eq!(result.explanation.matches(" | ").count(), 6);
    }
}
