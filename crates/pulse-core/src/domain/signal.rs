//! 매매 신호 구간.
//!
//! AI SCORE 축을 겹치지 않는 다섯 구간으로 나눕니다. 경계값은 더 극단적인 구간에 속합니다.
//!
//! | 구간 | 조건 (기본값) |
//! |------|---------------|
//! | STRONG BUY | score ≥ 60 |
//! | BUY | 20 ≤ score < 60 |
//! | HOLD | -20 < score < 20 |
//! | SELL | -60 < score ≤ -20 |
//! | STRONG SELL | score ≤ -60 |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PulseError, PulseResult};

/// 추천 신호. 선언 순서가 곧 강세 순서입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl Signal {
    /// 기본 임계값으로 신호를 결정합니다.
    pub fn from_score(score: f64) -> Self {
        SignalThresholds::default().classify(score)
    }

    /// 표시용 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG BUY",
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG SELL",
        }
    }

    /// 아이콘 (UI용).
    pub fn emoji(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "🟢🟢",
            Signal::Buy => "🟢",
            Signal::Hold => "🟡",
            Signal::Sell => "🔴",
            Signal::StrongSell => "🔴🔴",
        }
    }

    /// 매수 계열 여부.
    pub fn is_bullish(&self) -> bool {
        matches!(self, Signal::Buy | Signal::StrongBuy)
    }

    /// 매도 계열 여부.
    pub fn is_bearish(&self) -> bool {
        matches!(self, Signal::Sell | Signal::StrongSell)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            "STRONG BUY" => Ok(Signal::StrongBuy),
            "BUY" => Ok(Signal::Buy),
            "HOLD" => Ok(Signal::Hold),
            "SELL" => Ok(Signal::Sell),
            "STRONG SELL" => Ok(Signal::StrongSell),
            _ => Err(format!("Unknown signal: {}", s)),
        }
    }
}

/// 신호 구간 임계값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    /// 이 값 이상이면 STRONG BUY
    pub strong_buy: f64,
    /// 이 값 이상이면 BUY
    pub buy: f64,
    /// 이 값 이하이면 SELL
    pub sell: f64,
    /// 이 값 이하이면 STRONG SELL
    pub strong_sell: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 60.0,
            buy: 20.0,
            sell: -20.0,
            strong_sell: -60.0,
        }
    }
}

impl SignalThresholds {
    /// 임계값을 검증합니다.
    ///
    /// 모든 값이 유한하고 [-100, 100] 안에 있으며
    /// `strong_sell < sell < buy < strong_buy` 순서를 지켜야 합니다.
    pub fn validate(&self) -> PulseResult<()> {
        let values = [self.strong_sell, self.sell, self.buy, self.strong_buy];
        if values.iter().any(|v| !v.is_finite() || v.abs() > 100.0) {
            return Err(PulseError::Config(format!(
                "신호 임계값은 [-100, 100] 범위의 유한값이어야 합니다: {:?}",
                self
            )));
        }
        if !(self.strong_sell < self.sell && self.sell < self.buy && self.buy < self.strong_buy) {
            return Err(PulseError::Config(format!(
                "신호 임계값 순서 오류 (strong_sell < sell < buy < strong_buy): {:?}",
                self
            )));
        }
        Ok(())
    }

    /// 점수를 신호로 변환합니다.
    ///
    /// 경계값은 더 극단적인 구간에 속합니다. NaN은 HOLD로 처리합니다.
    pub fn classify(&self, score: f64) -> Signal {
        if score.is_nan() {
            Signal::Hold
        } else if score >= self.strong_buy {
            Signal::StrongBuy
        } else if score >= self.buy {
            Signal::Buy
        } else if score <= self.strong_sell {
            Signal::StrongSell
        } else if score <= self.sell {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
