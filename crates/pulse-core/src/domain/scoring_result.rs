//! 스코어링 결과 레코드.
//!
//! 자산·시점마다 한 번 생성되고 이후 불변이며, 저장소로 소유권이 넘어갑니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::factor::{Factor, SubScore};
use super::signal::Signal;
use crate::types::{round_display, Asset};

/// 최종 스코어링 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// 스코어링 실행 ID (한 사이클의 모든 자산이 공유)
    pub run_id: Uuid,
    /// 대상 자산
    pub asset: Asset,
    /// 산출 시각
    pub timestamp: DateTime<Utc>,
    /// 일곱 개 서브 점수 ([`Factor::ALL`] 순서)
    pub sub_scores: Vec<SubScore>,
    /// AI SCORE ([-100, 100])
    pub ai_score: f64,
    /// 추천 신호
    pub signal: Signal,
    /// 데이터 신뢰도 (실데이터로 계산된 팩터의 가중치 합, 0.0 ~ 1.0)
    pub confidence: f64,
    /// 팩터 순서대로 이어 붙인 사유
    pub explanation: String,
}

impl ScoringResult {
    /// 팩터의 서브 점수를 조회합니다.
    pub fn sub_score(&self, factor: Factor) -> Option<&SubScore> {
        self.sub_scores.iter().find(|s| s.factor == factor)
    }

    /// 팩터 점수 값. 없으면 0.0.
    pub fn value(&self, factor: Factor) -> f64 {
        self.sub_score(factor).map_or(0.0, |s| s.value)
    }

    /// 서브 점수 패턴에서 도출한 요약 태그.
    pub fn highlights(&self) -> Vec<&'static str> {
        let mut tags = Vec::new();

        let trend = self.value(Factor::Trend);
        if trend > 40.0 {
            tags.push("📈 strong trend");
        } else if trend < -40.0 {
            tags.push("📉 downtrend");
        }

        let sentiment = self.value(Factor::Sentiment);
        if sentiment > 30.0 {
            tags.push("😀 positive sentiment");
        } else if sentiment < -30.0 {
            tags.push("😰 negative sentiment");
        }

        let fundamental = self.value(Factor::Fundamental);
        if fundamental > 40.0 {
            tags.push("💰 strong fundamentals");
        } else if fundamental < -40.0 {
            tags.push("⚠️ weak fundamentals");
        }

        let rs = self.value(Factor::RelativeStrength);
        if rs > 30.0 {
            tags.push("💪 outperforming market");
        } else if rs < -30.0 {
            tags.push("😴 lagging market");
        }

        let volatility = self.value(Factor::Volatility);
        if volatility > 30.0 {
            tags.push("✅ low volatility");
        } else if volatility < -30.0 {
            tags.push("🌪 high volatility");
        }

        if self.value(Factor::InsiderFunds) > 30.0 {
            tags.push("🏦 institutions buying");
        }

        let macro_score = self.value(Factor::Macro);
        if macro_score > 30.0 {
            tags.push("🌍 supportive macro");
        } else if macro_score < -30.0 {
            tags.push("🌧 hostile macro");
        }

        tags
    }

    /// 한 줄 요약 (예: "AAPL 🟢 BUY 44.50 (confidence 86%)").
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {:.2} (confidence {:.0}%)",
            self.asset.ticker,
            self.signal.emoji(),
            self.signal,
            round_display(self.ai_score, 2),
            self.confidence * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(values: [f64; 7]) -> ScoringResult {
        let sub_scores = Factor::ALL
            .iter()
            .zip(values)
            .map(|(f, v)| SubScore::new(*f, v, format!("{} test", f)))
            .collect();

        ScoringResult {
            run_id: Uuid::new_v4(),
            asset: Asset::stock("AAPL"),
            timestamp: Utc::now(),
            sub_scores,
            ai_score: 44.5,
            signal: Signal::Buy,
            confidence: 1.0,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_value_lookup() {
        let r = result_with([80.0, -40.0, 50.0, 30.0, 20.0, 10.0, 0.0]);
        assert_eq!(r.value(Factor::Trend), 80.0);
        assert_eq!(r.value(Factor::Volatility), -40.0);
        assert_eq!(r.sub_score(Factor::Macro).map(|s| s.value), Some(0.0));
    }

    #[test]
    fn test_highlights() {
        let r = result_with([80.0, -40.0, 50.0, 30.0, 20.0, 10.0, 0.0]);
        let tags = r.highlights();
        assert!(tags.contains(&"📈 strong trend"));
        assert!(tags.contains(&"🌪 high volatility"));
        assert!(tags.contains(&"😀 positive sentiment"));
        assert!(!tags.iter().any(|t| t.contains("macro")));
    }

    #[test]
    fn test_summary() {
        let r = result_with([0.0; 7]);
        assert_eq!(r.summary(), "AAPL 🟢 BUY 44.50 (confidence 100%)");
    }
}
