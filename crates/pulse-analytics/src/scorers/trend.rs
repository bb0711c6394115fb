//! 추세 스코어러.
//!
//! 구성요소 (가중치):
//! - MA(20)/MA(50) 교차 방향과 괴리 크기 (0.4)
//! - RSI(14) 위치, 역추세 구간 해석 (0.3): <30 → +0.8, <50 → +0.3, <70 → -0.1, ≥70 → -0.7
//! - 5일 수익률의 롤링 Z-score (0.3)

use pulse_core::{clamp_score, Factor, SubScore};

use super::{FactorScorer, ScorerResult, ScoringContext};
use crate::indicators::{defined, IndicatorEngine, RsiParams};

/// 최소 종가 수.
pub const MIN_CLOSES: usize = 50;

const SHORT_MA: usize = 20;
const LONG_MA: usize = 50;
const MOMENTUM_PERIOD: usize = 5;

const MA_WEIGHT: f64 = 0.4;
const RSI_WEIGHT: f64 = 0.3;
const MOMENTUM_WEIGHT: f64 = 0.3;

/// 추세 스코어러.
#[derive(Debug, Default)]
pub struct TrendScorer {
    indicators: IndicatorEngine,
}

impl TrendScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// RSI 위치를 [-1, 1] 신호로 변환합니다.
    fn rsi_signal(rsi: f64) -> f64 {
        if rsi < 30.0 {
            0.8
        } else if rsi < 50.0 {
            0.3
        } else if rsi < 70.0 {
            -0.1
        } else {
            -0.7
        }
    }
}

impl FactorScorer for TrendScorer {
    fn factor(&self) -> Factor {
        Factor::Trend
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        ctx.require_candles(MIN_CLOSES)?;
        let close = &ctx.candles.close;

        // 1. 이동평균 교차: 방향 × min(괴리율 × 1000, 1)
        let ma_short = self.indicators.sma_last(close, SHORT_MA)?;
        let ma_long = self.indicators.sma_last(close, LONG_MA)?;
        let gap = if ma_long != 0.0 {
            (ma_short - ma_long) / ma_long
        } else {
            0.0
        };
        let direction = if ma_short > ma_long { 1.0 } else { -1.0 };
        let ma_signal = direction * (gap.abs() * 1000.0).min(1.0);

        // 2. RSI
        let rsi = defined(&self.indicators.rsi(close, RsiParams::default())?)
            .last()
            .copied()
            .unwrap_or(50.0);
        let rsi_signal = Self::rsi_signal(rsi);

        // 3. 5일 모멘텀 Z-score
        let momentum = defined(&self.indicators.pct_change(close, MOMENTUM_PERIOD)?);
        let momentum_z = ctx.normalizer.latest_z(&momentum);
        let momentum_signal = ctx.normalizer.scale_z(momentum_z) / 100.0;

        let combined = ma_signal * MA_WEIGHT + rsi_signal * RSI_WEIGHT + momentum_signal * MOMENTUM_WEIGHT;
        let value = clamp_score(combined * 100.0);

        let rationale = format!(
            "MA{} {} MA{} by {:+.2}%, RSI {:.1}, {}d momentum z {:+.2} → {:+.1}",
            SHORT_MA,
            if ma_short > ma_long { "above" } else { "below" },
            LONG_MA,
            gap * 100.0,
            rsi,
            MOMENTUM_PERIOD,
            momentum_z,
            value
        );

        Ok(SubScore::new(Factor::Trend, value, rationale))
    }
}
