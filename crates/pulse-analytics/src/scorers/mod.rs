//! 팩터 스코어러.
//!
//! 일곱 개 스코어러가 같은 능력("충분한 이력이 있으면 [-100, 100] 점수와 사유를 낸다")을
//! [`FactorScorer`] trait으로 구현합니다. 스코어러끼리는 서로의 출력을 읽지 않습니다.
//!
//! 데이터 부족이나 지표 계산 실패는 [`ScorerError`]로 표현되며,
//! [`FactorScorer::score`]가 이를 중립 서브 점수로 흡수합니다.

pub mod fundamental;
pub mod insider_funds;
pub mod macro_regime;
pub mod relative_strength;
pub mod sentiment;
pub mod trend;
pub mod volatility;

pub use fundamental::{FundamentalScorer, ReferenceBand};
pub use insider_funds::InsiderFundsScorer;
pub use macro_regime::MacroScorer;
pub use relative_strength::RelativeStrengthScorer;
pub use sentiment::SentimentScorer;
pub use trend::TrendScorer;
pub use volatility::VolatilityScorer;

use pulse_core::{clamp_score, Asset, Factor, RawInputs, SubScore};
use thiserror::Error;
use tracing::{debug, warn};

use crate::indicators::IndicatorError;
use crate::normalization::Normalizer;
use crate::series::CandleSeries;

/// 스코어러 내부 오류. 외부로 전파되지 않고 중립 점수로 변환됩니다.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// 최소 윈도우 미달
    #[error("need {required} {what}, got {provided}")]
    InsufficientData {
        what: &'static str,
        required: usize,
        provided: usize,
    },

    /// 필수 입력 없음
    #[error("no {0} available")]
    MissingInput(&'static str),

    /// 지표 계산 실패
    #[error("indicator failure: {0}")]
    Indicator(#[from] IndicatorError),
}

/// 스코어러 결과 타입.
pub type ScorerResult<T> = Result<T, ScorerError>;

/// 한 자산의 스코어링 컨텍스트.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    /// 대상 자산
    pub asset: &'a Asset,
    /// 원시 입력
    pub inputs: &'a RawInputs,
    /// 변환된 캔들 컬럼
    pub candles: &'a CandleSeries,
    /// 정규화 파라미터
    pub normalizer: Normalizer,
    /// 실행 단위로 미리 계산된 시장 국면 점수
    pub regime: Option<&'a SubScore>,
}

impl<'a> ScoringContext<'a> {
    /// 새 컨텍스트를 생성합니다.
    pub fn new(
        asset: &'a Asset,
        inputs: &'a RawInputs,
        candles: &'a CandleSeries,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            asset,
            inputs,
            candles,
            normalizer,
            regime: None,
        }
    }

    /// 미리 계산된 시장 국면 점수를 설정합니다.
    pub fn with_regime(mut self, regime: Option<&'a SubScore>) -> Self {
        self.regime = regime;
        self
    }

    /// 캔들이 `min`개 이상인지 확인합니다.
    pub fn require_candles(&self, min: usize) -> ScorerResult<()> {
        if self.candles.len() < min {
            return Err(ScorerError::InsufficientData {
                what: "candles",
                required: min,
                provided: self.candles.len(),
            });
        }
        Ok(())
    }
}

/// 팩터 스코어러.
pub trait FactorScorer: Send + Sync {
    /// 담당 팩터.
    fn factor(&self) -> Factor;

    /// 서브 점수를 계산합니다. 데이터 부족 시 `Err`.
    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore>;

    /// 서브 점수를 계산합니다. 실패하면 "insufficient data" 사유의 중립 점수를 반환합니다.
    fn score(&self, ctx: &ScoringContext<'_>) -> SubScore {
        match self.evaluate(ctx) {
            Ok(sub) => {
                debug!(
                    factor = %self.factor(),
                    ticker = %ctx.asset.ticker,
                    score = sub.value,
                    "Factor scored"
                );
                sub
            }
            Err(e) => {
                warn!(
                    factor = %self.factor(),
                    ticker = %ctx.asset.ticker,
                    reason = %e,
                    "Factor fell back to neutral"
                );
                SubScore::insufficient(self.factor(), e)
            }
        }
    }
}

// ================================================================================================
// 가중 결합 헬퍼
// ================================================================================================

/// 가용 구성요소만으로 가중치를 재정규화하는 가중 평균.
#[derive(Debug, Default)]
pub(crate) struct Blend {
    parts: Vec<(&'static str, f64, f64)>,
}

impl Blend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 구성요소를 추가합니다. 비유한 점수는 무시합니다.
    pub(crate) fn add(&mut self, name: &'static str, score: f64, weight: f64) -> &mut Self {
        if score.is_finite() && weight > 0.0 {
            self.parts.push((name, clamp_score(score), weight));
        }
        self
    }

    pub(crate) fn add_opt(
        &mut self,
        name: &'static str,
        score: Option<f64>,
        weight: f64,
    ) -> &mut Self {
        if let Some(score) = score {
            self.add(name, score, weight);
        }
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// 재정규화된 가중 평균. 구성요소가 없으면 None.
    pub(crate) fn value(&self) -> Option<f64> {
        let total: f64 = self.parts.iter().map(|(_, _, w)| w).sum();
        if total <= 0.0 {
            return None;
        }
        let sum: f64 = self.parts.iter().map(|(_, s, w)| s * w).sum();
        // -0.0 → 0.0
        Some(clamp_score(sum / total) + 0.0)
    }

    /// "name +12.3, other -4.0" 형식의 구성요소 요약.
    pub(crate) fn describe(&self) -> String {
        self.parts
            .iter()
            .map(|(name, score, _)| format!("{} {:+.1}", name, score))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_renormalizes() {
        let mut blend = Blend::new();
        blend.add("a", 60.0, 0.25).add("b", 20.0, 0.25);
        assert_eq!(blend.value(), Some(40.0));

        blend.add_opt("c", None, 0.5);
        assert_eq!(blend.value(), Some(40.0));
        assert_eq!(blend.describe(), "a +60.0, b +20.0");
    }

    #[test]
    fn test_blend_has_no_negative_zero() {
        let mut blend = Blend::new();
        blend.add("a", -0.0, 0.5).add("b", -0.0, 0.5);
        let value = blend.value().unwrap();
        assert!(value.is_sign_positive());
        assert_eq!(format!("{:+.1}", value), "+0.0");
    }

    #[test]
    fn test_blend_ignores_non_finite() {
        let mut blend = Blend::new();
        blend.add("nan", f64::NAN, 0.5);
        assert!(blend.is_empty());
        assert_eq!(blend.value(), None);
    }

    #[test]
    fn test_scorer_error_message() {
        let err = ScorerError::InsufficientData {
            what: "closes",
            required: 50,
            provided: 30,
        };
        assert_eq!(err.to_string(), "need 50 closes, got 30");
        assert_eq!(
            SubScore::insufficient(Factor::Trend, err).rationale,
            "insufficient data: need 50 closes, got 30"
        );
    }
}
