//! 스코어링 입력 묶음.
//!
//! 수집 계층이 자산별로 채워 넘기는 원시 입력입니다. 모든 필드는 결측 가능하며,
//! 결측은 해당 팩터의 중립 점수로만 이어집니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::market_data::{Kline, RawSeries};

/// 시점 기준 재무 비율 스냅샷.
///
/// 비율은 소수 표현입니다 (ROE 0.15 = 15%, 부채비율 1.2 = 120%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalSnapshot {
    /// 주가수익비율 (P/E)
    pub pe_ratio: Option<f64>,
    /// 주가순자산비율 (P/B)
    pub pb_ratio: Option<f64>,
    /// 자기자본이익률 (ROE)
    pub roe: Option<f64>,
    /// 매출 성장률 (YoY)
    pub revenue_growth: Option<f64>,
    /// 부채비율 (D/E)
    pub debt_to_equity: Option<f64>,
    /// 순이익률
    pub profit_margin: Option<f64>,
}

impl FundamentalSnapshot {
    /// 값이 있는 비율 수.
    pub fn present_count(&self) -> usize {
        [
            self.pe_ratio,
            self.pb_ratio,
            self.roe,
            self.revenue_growth,
            self.debt_to_equity,
            self.profit_margin,
        ]
        .iter()
        .filter(|v| v.is_some_and(f64::is_finite))
        .count()
    }

    /// 유효한 비율이 하나도 없는지 여부.
    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }
}

/// 뉴스 헤드라인.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// 게시 시각
    pub published_at: DateTime<Utc>,
    /// 제목
    pub headline: String,
    /// 제공자 감성 점수 (-1.0 ~ 1.0). 없으면 헤드라인 어휘로 추정합니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    /// 출처
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl NewsItem {
    /// 새 뉴스 항목을 생성합니다.
    pub fn new(published_at: DateTime<Utc>, headline: impl Into<String>) -> Self {
        Self {
            published_at,
            headline: headline.into(),
            sentiment: None,
            source: None,
        }
    }

    /// 제공자 감성 점수를 설정합니다.
    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.sentiment = Some(sentiment);
        self
    }
}

/// 기관/내부자 보유 스냅샷. 비율은 소수 표현입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstitutionalSnapshot {
    /// 기관 보유 비율
    pub institutional_ownership: Option<f64>,
    /// 직전 보고 대비 기관 보유 비율 변화 (예: 0.02 = +2%p)
    pub ownership_change: Option<f64>,
    /// 공매도 잔고 비율 (유통주식 대비)
    pub short_interest: Option<f64>,
    /// 내부자 보유 비율
    pub insider_ownership: Option<f64>,
}

impl InstitutionalSnapshot {
    /// 유효한 값이 하나도 없는지 여부.
    pub fn is_empty(&self) -> bool {
        [
            self.institutional_ownership,
            self.ownership_change,
            self.short_interest,
            self.insider_ownership,
        ]
        .iter()
        .all(|v| !v.is_some_and(f64::is_finite))
    }
}

/// 매크로 지표 시계열 묶음. 한 실행 내 모든 자산이 공유합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSnapshot {
    /// 변동성 지수 (VIX)
    pub vix: Option<RawSeries>,
    /// 달러 인덱스 (DXY)
    pub dxy: Option<RawSeries>,
    /// 미국 10년물 금리 (%)
    pub treasury_10y: Option<RawSeries>,
    /// 벤치마크 지수 종가 (예: S&P 500)
    pub benchmark_index: Option<RawSeries>,
}

impl MacroSnapshot {
    /// 어떤 시계열도 없는지 여부.
    pub fn is_empty(&self) -> bool {
        [
            &self.vix,
            &self.dxy,
            &self.treasury_10y,
            &self.benchmark_index,
        ]
        .into_iter()
        .all(|s| s.as_ref().map_or(true, RawSeries::is_empty))
    }
}

/// 한 자산의 스코어링 입력.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    /// 일봉 OHLCV (시간 오름차순)
    pub candles: Vec<Kline>,
    /// 상대강도 비교용 벤치마크 종가
    pub benchmark: Option<RawSeries>,
    /// 재무 비율
    pub fundamentals: Option<FundamentalSnapshot>,
    /// 동종 업계 재무 비율 (Z-score 기준 모집단)
    pub peer_fundamentals: Vec<FundamentalSnapshot>,
    /// 뉴스 헤드라인
    pub news: Vec<NewsItem>,
    /// 기관 보유 현황
    pub institutional: Option<InstitutionalSnapshot>,
    /// 매크로 지표 (실행 단위로 공유)
    pub macro_data: Option<Arc<MacroSnapshot>>,
}

impl RawInputs {
    /// 캔들만으로 입력을 생성합니다.
    pub fn from_candles(candles: Vec<Kline>) -> Self {
        Self {
            candles,
            ..Default::default()
        }
    }

    /// 벤치마크 종가를 설정합니다.
    pub fn with_benchmark(mut self, benchmark: RawSeries) -> Self {
        self.benchmark = Some(benchmark);
        self
    }

    /// 재무 비율을 설정합니다.
    pub fn with_fundamentals(mut self, fundamentals: FundamentalSnapshot) -> Self {
        self.fundamentals = Some(fundamentals);
        self
    }

    /// 동종 업계 재무 비율을 설정합니다.
    pub fn with_peers(mut self, peers: Vec<FundamentalSnapshot>) -> Self {
        self.peer_fundamentals = peers;
        self
    }

    /// 뉴스를 설정합니다.
    pub fn with_news(mut self, news: Vec<NewsItem>) -> Self {
        self.news = news;
        self
    }

    /// 기관 보유 현황을 설정합니다.
    pub fn with_institutional(mut self, institutional: InstitutionalSnapshot) -> Self {
        self.institutional = Some(institutional);
        self
    }

    /// 매크로 지표를 설정합니다.
    pub fn with_macro(mut self, macro_data: Arc<MacroSnapshot>) -> Self {
        self.macro_data = Some(macro_data);
        self
    }
}
