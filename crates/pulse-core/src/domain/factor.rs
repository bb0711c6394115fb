//! 팩터 식별자와 팩터별 서브 점수.
//!
//! 일곱 개 팩터는 [`Factor::ALL`]의 고정 순서를 가지며, 이 순서는
//! 가중합 계산과 설명문 조립 모두에 사용됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 서브 점수 하한.
pub const SCORE_MIN: f64 = -100.0;
/// 서브 점수 상한.
pub const SCORE_MAX: f64 = 100.0;

/// 점수를 [-100, 100] 범위로 제한합니다. 비유한 값은 0(중립)이 됩니다.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(SCORE_MIN, SCORE_MAX)
    } else {
        0.0
    }
}

/// 스코어링 팩터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// 추세 (이동평균, RSI, 모멘텀)
    Trend,
    /// 변동성 (ATR, 볼린저 폭)
    Volatility,
    /// 심리 (CCI, Williams %R, VPT, 뉴스)
    Sentiment,
    /// 펀더멘털 (재무 비율)
    Fundamental,
    /// 벤치마크 대비 상대강도
    RelativeStrength,
    /// 기관/내부자 자금 흐름
    InsiderFunds,
    /// 매크로 환경 (시장 국면)
    Macro,
}

impl Factor {
    /// 고정 순서의 전체 팩터 목록.
    pub const ALL: [Factor; 7] = [
        Factor::Trend,
        Factor::Volatility,
        Factor::Sentiment,
        Factor::Fundamental,
        Factor::RelativeStrength,
        Factor::InsiderFunds,
        Factor::Macro,
    ];

    /// snake_case 식별자 (저장소 컬럼명).
    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Trend => "trend",
            Factor::Volatility => "volatility",
            Factor::Sentiment => "sentiment",
            Factor::Fundamental => "fundamental",
            Factor::RelativeStrength => "relative_strength",
            Factor::InsiderFunds => "insider_funds",
            Factor::Macro => "macro",
        }
    }

    /// 표시용 이름.
    pub fn label(&self) -> &'static str {
        match self {
            Factor::Trend => "Trend",
            Factor::Volatility => "Volatility",
            Factor::Sentiment => "Sentiment",
            Factor::Fundamental => "Fundamental",
            Factor::RelativeStrength => "RelativeStrength",
            Factor::InsiderFunds => "InsiderFunds",
            Factor::Macro => "Macro",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Factor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        Factor::ALL
            .into_iter()
            .find(|f| f.label().to_lowercase() == key)
            .ok_or_else(|| format!("Unknown factor: {}", s))
    }
}

/// 서브 점수의 산출 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    /// 실데이터로 계산됨
    Computed,
    /// 데이터 부족으로 중립값 사용
    InsufficientData,
    /// 비유한 값이 중립값으로 대체됨
    Sanitized,
}

/// 한 팩터의 산출물: [-100, 100] 범위 점수와 사유.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    /// 팩터
    pub factor: Factor,
    /// 점수
    pub value: f64,
    /// 사람이 읽을 수 있는 사유 (입력 수치 포함 가능)
    pub rationale: String,
    /// 산출 상태
    pub status: ScoreStatus,
}

impl SubScore {
    /// 계산된 서브 점수를 생성합니다.
    ///
    /// 유한한 값은 범위로 제한됩니다. NaN은 그대로 두어 집계 단계에서 걸러지게 합니다.
    pub fn new(factor: Factor, value: f64, rationale: impl Into<String>) -> Self {
        Self {
            factor,
            value: value.clamp(SCORE_MIN, SCORE_MAX),
            rationale: rationale.into(),
            status: ScoreStatus::Computed,
        }
    }

    /// 데이터 부족 시의 중립 서브 점수.
    pub fn insufficient(factor: Factor, detail: impl fmt::Display) -> Self {
        Self {
            factor,
            value: 0.0,
            rationale: format!("insufficient data: {}", detail),
            status: ScoreStatus::InsufficientData,
        }
    }

    /// 실데이터로 계산되었는지 여부.
    pub fn is_computed(&self) -> bool {
        self.status == ScoreStatus::Computed
    }

    /// 비유한 값을 중립값으로 대체합니다. 이미 유한하면 그대로 반환합니다.
    pub fn sanitized(self) -> Self {
        if self.value.is_finite() {
            return self;
        }
        Self {
            value: 0.0,
            rationale: format!("{} [non-finite score replaced by 0]", self.rationale),
            status: ScoreStatus::Sanitized,
            ..self
        }
    }
}
