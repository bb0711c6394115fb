//! 수집/저장 협력자 trait.
//!
//! 스코어링 코어는 이미 메모리에 적재된 입력만 다룹니다. 입력을 가져오는 쪽과
//! 결과를 보관하는 쪽은 이 trait 뒤에 숨겨 실행기에 주입합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::factor::Factor;
use super::inputs::{MacroSnapshot, RawInputs};
use super::scoring_result::ScoringResult;
use super::signal::Signal;
use crate::error::PulseResult;
use crate::types::{round_display, Asset, AssetType};

// ================================================================================================
// MarketDataSource
// ================================================================================================

/// 스코어링 입력 제공자.
///
/// 구현체는 개별 시계열의 수집 실패(파일 없음, 파싱 오류 등)를 "결측"으로 변환해야 합니다.
/// `Err`는 소스 전체를 사용할 수 없을 때만 반환합니다.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 소스 이름 (로그용).
    fn name(&self) -> &str;

    /// 자산 하나의 입력을 가져옵니다. 매크로 지표는 포함하지 않습니다.
    async fn fetch_inputs(&self, asset: &Asset) -> PulseResult<RawInputs>;

    /// 실행 단위로 공유되는 매크로 지표를 가져옵니다.
    async fn fetch_macro(&self) -> PulseResult<MacroSnapshot>;
}

// ================================================================================================
// ScoreStore
// ================================================================================================

/// 저장용 평탄화 레코드. 수치는 소수 둘째 자리로 반올림됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub timestamp: DateTime<Utc>,
    pub run_id: Uuid,
    pub ticker: String,
    pub asset_type: AssetType,
    pub trend: f64,
    pub volatility: f64,
    pub sentiment: f64,
    pub fundamental: f64,
    pub relative_strength: f64,
    pub insider_funds: f64,
    #[serde(rename = "macro")]
    pub macro_score: f64,
    pub ai_score: f64,
    pub signal: Signal,
    pub confidence: f64,
    pub explanation: String,
}

impl ScoreRecord {
    /// 팩터 점수 값.
    pub fn value(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Trend => self.trend,
            Factor::Volatility => self.volatility,
            Factor::Sentiment => self.sentiment,
            Factor::Fundamental => self.fundamental,
            Factor::RelativeStrength => self.relative_strength,
            Factor::InsiderFunds => self.insider_funds,
            Factor::Macro => self.macro_score,
        }
    }
}

impl From<&ScoringResult> for ScoreRecord {
    fn from(result: &ScoringResult) -> Self {
        let v = |factor: Factor| round_display(result.value(factor), 2);
        Self {
            timestamp: result.timestamp,
            run_id: result.run_id,
            ticker: result.asset.ticker.clone(),
            asset_type: result.asset.asset_type,
            trend: v(Factor::Trend),
            volatility: v(Factor::Volatility),
            sentiment: v(Factor::Sentiment),
            fundamental: v(Factor::Fundamental),
            relative_strength: v(Factor::RelativeStrength),
            insider_funds: v(Factor::InsiderFunds),
            macro_score: v(Factor::Macro),
            ai_score: round_display(result.ai_score, 2),
            signal: result.signal,
            confidence: round_display(result.confidence, 2),
            explanation: result.explanation.clone(),
        }
    }
}

/// 스코어링 결과 저장소.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// 백엔드 이름 (로그용).
    fn backend_name(&self) -> &'static str;

    /// 결과를 저장하고 저장된 건수를 반환합니다.
    async fn save(&self, results: &[ScoringResult]) -> PulseResult<usize>;

    /// 티커의 최근 `days`일 이력을 시간 오름차순으로 반환합니다.
    async fn history(&self, ticker: &str, days: u32) -> PulseResult<Vec<ScoreRecord>>;

    /// 티커별 최신 레코드를 AI SCORE 내림차순으로 반환합니다.
    async fn latest_all(&self) -> PulseResult<Vec<ScoreRecord>>;
}
