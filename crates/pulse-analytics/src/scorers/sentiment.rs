//! 심리 스코어러.
//!
//! 기술적 심리 지표와 뉴스 극성을 결합합니다.
//!
//! | 구성요소 | 가중치 | 방향 |
//! |----------|--------|------|
//! | 뉴스 극성 (최근 20건) | 0.40 | 긍정 → + |
//! | CCI(20) 롤링 Z | 0.25 | 높을수록 + (모멘텀) |
//! | Williams %R(14) 롤링 Z | 0.20 | 높을수록 − (과매수 역추세) |
//! | VPT 롤링 Z | 0.15 | 높을수록 + |
//!
//! 뉴스가 없거나 극성을 판단할 수 없으면 기술적 지표만으로 가중치를 재정규화합니다.

use pulse_core::{Factor, NewsItem, SubScore};

use super::{Blend, FactorScorer, ScorerError, ScorerResult, ScoringContext};
use crate::indicators::{defined, CciParams, IndicatorEngine, WilliamsRParams};

/// 기술적 구성요소 계산에 필요한 최소 캔들 수.
pub const MIN_CANDLES: usize = 20;

/// 사용할 최근 뉴스 수.
const MAX_NEWS: usize = 20;

const NEWS_WEIGHT: f64 = 0.40;
const CCI_WEIGHT: f64 = 0.25;
const WILLIAMS_WEIGHT: f64 = 0.20;
const VPT_WEIGHT: f64 = 0.15;

const POSITIVE_TERMS: &[&str] = &[
    "beat", "beats", "surge", "surges", "soar", "soars", "rally", "rallies", "record", "upgrade",
    "upgraded", "growth", "profit", "gain", "gains", "strong", "bullish", "outperform", "raises",
    "raised", "approval", "approved", "partnership", "breakthrough", "expands", "buyback",
];

const NEGATIVE_TERMS: &[&str] = &[
    "miss", "misses", "plunge", "plunges", "drop", "drops", "fall", "falls", "downgrade",
    "downgraded", "loss", "losses", "lawsuit", "weak", "bearish", "underperform", "cut", "cuts",
    "recall", "fraud", "probe", "investigation", "decline", "declines", "layoffs", "bankruptcy",
    "hack", "selloff",
];

/// 헤드라인 어휘 극성 (-1.0 ~ 1.0). 감성 어휘가 없으면 None.
pub fn headline_polarity(headline: &str) -> Option<f64> {
    let lower = headline.to_lowercase();
    let (mut pos, mut neg) = (0usize, 0usize);
    for word in lower.split(|c: char| !c.is_alphanumeric()) {
        if POSITIVE_TERMS.contains(&word) {
            pos += 1;
        } else if NEGATIVE_TERMS.contains(&word) {
            neg += 1;
        }
    }
    let total = pos + neg;
    (total > 0).then(|| (pos as f64 - neg as f64) / total as f64)
}

/// 뉴스 목록의 평균 극성과 사용된 건수. 판단 가능한 뉴스가 없으면 None.
///
/// 제공자 감성 점수가 있으면 우선하고, 없으면 헤드라인 어휘로 추정합니다.
pub fn news_polarity(news: &[NewsItem]) -> Option<(f64, usize)> {
    let mut recent: Vec<&NewsItem> = news.iter().collect();
    recent.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let polarities: Vec<f64> = recent
        .into_iter()
        .take(MAX_NEWS)
        .filter_map(|item| match item.sentiment {
            Some(s) if s.is_finite() => Some(s.clamp(-1.0, 1.0)),
            _ => headline_polarity(&item.headline),
        })
        .collect();

    if polarities.is_empty() {
        return None;
    }
    let mean = polarities.iter().sum::<f64>() / polarities.len() as f64;
    Some((mean, polarities.len()))
}

/// 심리 스코어러.
#[derive(Debug, Default)]
pub struct SentimentScorer {
    indicators: IndicatorEngine,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FactorScorer for SentimentScorer {
    fn factor(&self) -> Factor {
        Factor::Sentiment
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        let news = news_polarity(&ctx.inputs.news);
        let c = ctx.candles;
        let norm = ctx.normalizer;

        if c.len() < MIN_CANDLES && news.is_none() {
            return Err(ScorerError::InsufficientData {
                what: "candles (and no usable news)",
                required: MIN_CANDLES,
                provided: c.len(),
            });
        }

        let mut blend = Blend::new();
        if let Some((polarity, _)) = news {
            blend.add("news", polarity * 100.0, NEWS_WEIGHT);
        }

        if c.len() >= MIN_CANDLES {
            let cci = defined(&self.indicators.cci(&c.high, &c.low, &c.close, CciParams::default())?);
            let wr = defined(&self.indicators.williams_r(
                &c.high,
                &c.low,
                &c.close,
                WilliamsRParams::default(),
            )?);
            let vpt = self.indicators.vpt(&c.close, &c.volume)?;

            blend
                .add("cci", norm.latest_score(&cci), CCI_WEIGHT)
                .add("williams %r", -norm.latest_score(&wr), WILLIAMS_WEIGHT)
                .add("vpt", norm.latest_score(&vpt), VPT_WEIGHT);
        }

        let value = blend.value().unwrap_or(0.0);
        let news_note = match news {
            Some((polarity, count)) => format!("news polarity {:+.2} over {} items", polarity, count),
            None => "no news, technical only".to_string(),
        };
        let rationale = format!("{}; {} → {:+.1}", news_note, blend.describe(), value);

        Ok(SubScore::new(Factor::Sentiment, value, rationale))
    }
}
