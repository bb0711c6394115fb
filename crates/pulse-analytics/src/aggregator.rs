//! 서브 점수 집계기.
//!
//! 일곱 개 서브 점수를 고정 팩터 순서로 가중 합산하여 AI SCORE를 만들고,
//! 임계값으로 신호를 분류하고, 사유를 이어 붙여 [`ScoringResult`]를 생성합니다.
//!
//! - 누락된 팩터는 "not evaluated" 중립 점수(0.0)로 채웁니다.
//! - 비유한 점수(NaN, ±∞)는 0.0으로 대체하고 경고 로그를 남깁니다.
//! - 합산은 항상 [`Factor::ALL`] 순서로 수행되어 결과가 결정적입니다.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use pulse_core::{
    clamp_score, Asset, Factor, FactorWeights, PulseResult, ScoringResult, SignalThresholds,
    SubScore,
};

/// 설명 문자열의 팩터 구분자.
pub const EXPLANATION_SEPARATOR: &str = " | ";

/// 가중 합산 집계기.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregator {
    weights: FactorWeights,
    thresholds: SignalThresholds,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            thresholds: SignalThresholds::default(),
        }
    }
}

impl Aggregator {
    /// 가중치와 임계값을 검증하고 집계기를 생성합니다.
    pub fn new(weights: FactorWeights, thresholds: SignalThresholds) -> PulseResult<Self> {
        weights.validate()?;
        thresholds.validate()?;
        Ok(Self {
            weights,
            thresholds,
        })
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    /// 팩터 순서대로 정렬하고 누락/비유한 점수를 정리합니다.
    pub fn normalize_sub_scores(&self, ticker: &str, sub_scores: Vec<SubScore>) -> Vec<SubScore> {
        let mut slots: [Option<SubScore>; 7] = Default::default();

        for sub in sub_scores {
            let index = Factor::ALL
                .iter()
                .position(|f| *f == sub.factor)
                .unwrap_or_default();
            if slots[index].is_some() {
                warn!(ticker, factor = %sub.factor, "Duplicate sub-score ignored");
                continue;
            }
            slots[index] = Some(sub);
        }

        Factor::ALL
            .iter()
            .zip(slots)
            .map(|(factor, slot)| {
                let sub = slot.unwrap_or_else(|| SubScore::insufficient(*factor, "not evaluated"));
                if !sub.value.is_finite() {
                    warn!(
                        ticker,
                        factor = %factor,
                        value = sub.value,
                        "Non-finite sub-score replaced by 0"
                    );
                }
                sub.sanitized()
            })
            .collect()
    }

    /// 가중 합산 점수 ([-100, 100]으로 제한).
    ///
    /// 비유한 서브 점수는 0.0으로 취급합니다.
    pub fn weighted_score(&self, sub_scores: &[SubScore]) -> f64 {
        let raw: f64 = Factor::ALL
            .iter()
            .map(|factor| {
                let value = sub_scores
                    .iter()
                    .find(|s| s.factor == *factor)
                    .map(|s| s.value)
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0);
                self.weights.get(*factor) * value
            })
            .sum();
        clamp_score(raw)
    }

    /// 실데이터로 계산된 팩터의 가중치 합.
    pub fn confidence(&self, sub_scores: &[SubScore]) -> f64 {
        sub_scores
            .iter()
            .filter(|s| s.is_computed())
            .map(|s| self.weights.get(s.factor))
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    /// "Trend: ... | Volatility: ..." 형식의 설명.
    pub fn explain(sub_scores: &[SubScore]) -> String {
        sub_scores
            .iter()
            .map(|s| format!("{}: {}", s.factor.label(), s.rationale))
            .collect::<Vec<_>>()
            .join(EXPLANATION_SEPARATOR)
    }

    /// 서브 점수를 집계하여 최종 결과를 생성합니다.
    pub fn aggregate(
        &self,
        run_id: Uuid,
        asset: &Asset,
        timestamp: DateTime<Utc>,
        sub_scores: Vec<SubScore>,
    ) -> ScoringResult {
        let sub_scores = self.normalize_sub_scores(&asset.ticker, sub_scores);
        let ai_score = self.weighted_score(&sub_scores);
        let signal = self.thresholds.classify(ai_score);
        let confidence = self.confidence(&sub_scores);
        let explanation = Self::explain(&sub_scores);

        info!(
            ticker = %asset.ticker,
            ai_score,
            signal = %signal,
            confidence,
            "Asset scored"
        );

        ScoringResult {
            run_id,
            asset: asset.clone(),
            timestamp,
            sub_scores,
            ai_score,
            signal,
            confidence,
            explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{ScoreStatus, Signal};

    fn subs(values: [f64; 7]) -> Vec<SubScore> {
        Factor::ALL
            .iter()
            .zip(values)
            .map(|(f, v)| SubScore::new(*f, v, format!("{} reason", f.as_str())))
            .collect()
    }

    fn aggregate(sub_scores: Vec<SubScore>) -> ScoringResult {
        Aggregator::default().aggregate(Uuid::nil(), &Asset::stock("AAPL"), Utc::now(), sub_scores)
    }

    #[test]
    fn test_weighted_example() {
        let result = aggregate(subs([80.0, -40.0, 50.0, 30.0, 20.0, 10.0, 0.0]));
        assert!((result.ai_score - 44.5).abs() < 1e-9);
        assert_eq!(result.signal, Signal::Buy);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_explanation_in_factor_order() {
        let mut input = subs([0.0; 7]);
        input.reverse();
        let result = aggregate(input);
        let factors: Vec<Factor> = result.sub_scores.iter().map(|s| s.factor).collect();
        assert_eq!(factors, Factor::ALL.to_vec());
        assert!(result
            .explanation
            .starts_with("Trend: trend reason | Volatility: volatility reason"));
        assert!(result.explanation.ends_with("Macro: macro reason"));
    }

    #[test]
    fn test_nan_sub_score_counts_as_zero() {
        let mut input = subs([80.0, -40.0, 50.0, 30.0, 20.0, 10.0, 0.0]);
        input[2].value = f64::NAN;
        let result = aggregate(input);
        // 50 × 0.20 = 10 이 빠짐
        assert!((result.ai_score - 34.5).abs() < 1e-9);
        let sentiment = result.sub_score(Factor::Sentiment).unwrap();
        assert_eq!(sentiment.value, 0.0);
        assert_eq!(sentiment.status, ScoreStatus::Sanitized);
    }

    #[test]
    fn test_missing_factor_filled_neutral() {
        let input: Vec<SubScore> = subs([100.0; 7]).into_iter().take(6).collect();
        let result = aggregate(input);
        assert_eq!(result.sub_scores.len(), 7);
        let macro_score = result.sub_score(Factor::Macro).unwrap();
        assert_eq!(macro_score.status, ScoreStatus::InsufficientData);
        assert!((result.ai_score - 95.0).abs() < 1e-9);
        assert!((result.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut input = subs([0.0; 7]);
        input.push(SubScore::new(Factor::Trend, 100.0, "late"));
        let result = aggregate(input);
        assert_eq!(result.value(Factor::Trend), 0.0);
    }

    #[test]
    fn test_custom_weights_rejected_when_invalid() {
        let weights = FactorWeights {
            trend: 0.9,
            ..Default::default()
        };
        assert!(Aggregator::new(weights, SignalThresholds::default()).is_err());
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = SignalThresholds {
            strong_buy: 40.0,
            buy: 10.0,
            sell: -10.0,
            strong_sell: -40.0,
        };
        let aggregator = Aggregator::new(FactorWeights::default(), thresholds).unwrap();
        let result = aggregator.aggregate(
            Uuid::nil(),
            &Asset::stock("AAPL"),
            Utc::now(),
            subs([80.0, -40.0, 50.0, 30.0, 20.0, 10.0, 0.0]),
        );
        assert_eq!(result.signal, Signal::StrongBuy);
    }
}
