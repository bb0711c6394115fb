//! 멀티 팩터 스코어링 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (추세, 모멘텀, 변동성, 거래량)
//! - Z-score 정규화
//! - 일곱 개 팩터 스코어러 (추세, 변동성, 심리, 펀더멘털, 상대강도, 수급, 매크로)
//! - 가중 합산 집계 및 신호 분류
//! - 실행 단위 스코어링 엔진
//!
//! # Re-exports
//!
//! - [`engine`]: 스코어링 엔진 (ScoringEngine, RunContext)
//! - [`aggregator`]: 서브 점수 집계 (Aggregator)
//! - [`scorers`]: 팩터 스코어러 (FactorScorer 및 구현체)

pub mod aggregator;
pub mod engine;
pub mod indicators;
pub mod normalization;
pub mod scorers;
pub mod series;

#[cfg(test)]
mod test_support;

pub use aggregator::{Aggregator, EXPLANATION_SEPARATOR};
pub use engine::{RunContext, ScoringEngine};
pub use normalization::{rolling_zscore, to_sub_score, zscore, Normalizer};
pub use scorers::{
    FactorScorer, FundamentalScorer, InsiderFundsScorer, MacroScorer, ReferenceBand,
    RelativeStrengthScorer, ScorerError, ScorerResult, ScoringContext, SentimentScorer,
    TrendScorer, VolatilityScorer,
};
pub use series::CandleSeries;

// Indicators 모듈 re-exports
pub use indicators::{
    AtrParams, BollingerBandsParams, BollingerBandsResult, CciParams, IndicatorEngine,
    IndicatorError, IndicatorResult, RsiParams, SmaParams, VolumeSurgeParams, WilliamsRParams,
};
