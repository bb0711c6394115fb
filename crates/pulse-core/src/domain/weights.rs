//! 팩터 가중치 테이블.
//!
//! 실행 시작 시 한 번 결정되고 이후 읽기 전용으로 공유됩니다.

use serde::{Deserialize, Serialize};

use super::factor::Factor;
use crate::error::{PulseError, PulseResult};

/// 가중치 합 허용 오차.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// 팩터 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub trend: f64,             // 0.35
    pub volatility: f64,        // 0.05
    pub sentiment: f64,         // 0.20
    pub fundamental: f64,       // 0.20
    pub relative_strength: f64, // 0.10
    pub insider_funds: f64,     // 0.05
    #[serde(rename = "macro")]
    pub macro_regime: f64, // 0.05
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            trend: 0.35,
            volatility: 0.05,
            sentiment: 0.20,
            fundamental: 0.20,
            relative_strength: 0.10,
            insider_funds: 0.05,
            macro_regime: 0.05,
        }
    }
}

impl FactorWeights {
    /// 팩터의 가중치를 반환합니다.
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Trend => self.trend,
            Factor::Volatility => self.volatility,
            Factor::Sentiment => self.sentiment,
            Factor::Fundamental => self.fundamental,
            Factor::RelativeStrength => self.relative_strength,
            Factor::InsiderFunds => self.insider_funds,
            Factor::Macro => self.macro_regime,
        }
    }

    /// [`Factor::ALL`] 순서로 (팩터, 가중치)를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// 가중치 합.
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }

    /// 가중치를 검증합니다: 모두 유한한 비음수이고 합이 1.0 (허용 오차 내).
    pub fn validate(&self) -> PulseResult<()> {
        if let Some((factor, w)) = self.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(PulseError::Config(format!(
                "{} 가중치가 유효하지 않습니다: {}",
                factor, w
            )));
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PulseError::Config(format!(
                "가중치 합이 1.0이 아닙니다: {:.6}",
                sum
            )));
        }
        Ok(())
    }
}
