//! 펀더멘털 스코어러.
//!
//! 주식은 재무 비율(PER, PBR, ROE, 매출 성장률, 부채비율, 이익률)을 기준 모집단에 대해
//! Z-score로 표준화하여 가중 결합합니다. 동종 업계 값이 2개 이상이면 그 분포를,
//! 아니면 [`ReferenceBand`]의 시장 평균 분포를 사용합니다.
//!
//! 크립토는 재무제표 대신 NVT 근사치(가격/거래량)의 역 Z와 거래량 Z를 사용합니다.

use pulse_core::{AssetType, Factor, FundamentalSnapshot, SubScore};

use super::{Blend, FactorScorer, ScorerError, ScorerResult, ScoringContext};
use crate::normalization::{to_sub_score, zscore};

/// 재무 비율의 시장 기준 분포.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceBand {
    /// 기준 평균
    pub mean: f64,
    /// 기준 표준편차
    pub std: f64,
    /// 값이 높을수록 좋은지 여부
    pub higher_is_better: bool,
}

impl ReferenceBand {
    pub const PE: Self = Self::new(20.0, 10.0, false);
    pub const PB: Self = Self::new(3.0, 2.0, false);
    pub const ROE: Self = Self::new(0.10, 0.066, true);
    pub const REVENUE_GROWTH: Self = Self::new(0.05, 0.10, true);
    pub const DEBT_TO_EQUITY: Self = Self::new(1.0, 0.8, false);
    pub const PROFIT_MARGIN: Self = Self::new(0.10, 0.10, true);

    pub const fn new(mean: f64, std: f64, higher_is_better: bool) -> Self {
        Self {
            mean,
            std,
            higher_is_better,
        }
    }

    /// 방향이 반영된 Z-score.
    pub fn z(&self, value: f64) -> f64 {
        if !value.is_finite() || self.std <= 0.0 {
            return 0.0;
        }
        self.orient((value - self.mean) / self.std)
    }

    fn orient(&self, z: f64) -> f64 {
        if self.higher_is_better {
            z
        } else {
            -z
        }
    }
}

/// 비율 하나의 정의.
struct Metric {
    name: &'static str,
    weight: f64,
    band: ReferenceBand,
    extract: fn(&FundamentalSnapshot) -> Option<f64>,
    valid: fn(f64) -> bool,
}

const METRICS: [Metric; 6] = [
    Metric {
        name: "pe",
        weight: 0.20,
        band: ReferenceBand::PE,
        extract: |f| f.pe_ratio,
        valid: |v| v > 0.0 && v < 1_000.0,
    },
    Metric {
        name: "pb",
        weight: 0.10,
        band: ReferenceBand::PB,
        extract: |f| f.pb_ratio,
        valid: |v| v > 0.0,
    },
    Metric {
        name: "roe",
        weight: 0.20,
        band: ReferenceBand::ROE,
        extract: |f| f.roe,
        valid: f64::is_finite,
    },
    Metric {
        name: "growth",
        weight: 0.20,
        band: ReferenceBand::REVENUE_GROWTH,
        extract: |f| f.revenue_growth,
        valid: f64::is_finite,
    },
    Metric {
        name: "d/e",
        weight: 0.15,
        band: ReferenceBand::DEBT_TO_EQUITY,
        extract: |f| f.debt_to_equity,
        valid: |v| v >= 0.0,
    },
    Metric {
        name: "margin",
        weight: 0.15,
        band: ReferenceBand::PROFIT_MARGIN,
        extract: |f| f.profit_margin,
        valid: f64::is_finite,
    },
];

impl Metric {
    fn value(&self, snapshot: &FundamentalSnapshot) -> Option<f64> {
        (self.extract)(snapshot).filter(|v| v.is_finite() && (self.valid)(*v))
    }

    /// 유효한 업계 값이 2개 이상이면 업계 분포, 아니면 기준 분포 대비 Z.
    ///
    /// 업계 분포를 사용했다면 그 크기를 함께 반환합니다.
    fn z(&self, value: f64, peers: &[FundamentalSnapshot]) -> (f64, Option<usize>) {
        let population: Vec<f64> = peers.iter().filter_map(|p| self.value(p)).collect();
        if population.len() >= 2 {
            (self.band.orient(zscore(value, &population)), Some(population.len()))
        } else {
            (self.band.z(value), None)
        }
    }
}

/// 펀더멘털 스코어러.
#[derive(Debug, Default)]
pub struct FundamentalScorer;

impl FundamentalScorer {
    pub fn new() -> Self {
        Self
    }

    fn score_stock(
        &self,
        ctx: &ScoringContext<'_>,
        snapshot: &FundamentalSnapshot,
    ) -> ScorerResult<SubScore> {
        let peers = &ctx.inputs.peer_fundamentals;
        let mut blend = Blend::new();
        let mut values = Vec::new();
        let mut peer_metrics = Vec::new();
        let mut peer_count = 0;

        for metric in &METRICS {
            if let Some(value) = metric.value(snapshot) {
                let (z, population) = metric.z(value, peers);
                if let Some(n) = population {
                    peer_metrics.push(metric.name);
                    peer_count = peer_count.max(n);
                }
                blend.add(metric.name, to_sub_score(z, ctx.normalizer.scale), metric.weight);
                values.push(format!("{} {:.2}", metric.name, value));
            }
        }

        let value = blend
            .value()
            .ok_or(ScorerError::MissingInput("valid financial ratios"))?;
        let basis = if peer_metrics.is_empty() {
            "vs market reference".to_string()
        } else if peer_metrics.len() == values.len() {
            format!("vs {} peers", peer_count)
        } else {
            format!(
                "vs {} peers for {}, market reference otherwise",
                peer_count,
                peer_metrics.join("/")
            )
        };
        let rationale = format!(
            "{} ({}); {} → {:+.1}",
            values.join(", "),
            basis,
            blend.describe(),
            value
        );
        Ok(SubScore::new(Factor::Fundamental, value, rationale))
    }

    /// NVT 근사: 거래량 대비 가격이 낮을수록, 거래 활동이 많을수록 양수.
    fn score_crypto_proxy(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        let norm = ctx.normalizer;
        ctx.require_candles(norm.window)?;
        let c = ctx.candles;

        let pv: Vec<f64> = c
            .close
            .iter()
            .zip(&c.volume)
            .filter(|(_, v)| **v > 0.0)
            .map(|(p, v)| p / v)
            .collect();
        if !norm.has_window(&pv) {
            return Err(ScorerError::InsufficientData {
                what: "candles with volume",
                required: norm.window,
                provided: pv.len(),
            });
        }

        let nvt_z = norm.latest_z(&pv);
        let activity_z = norm.latest_z(&c.volume);
        let mut blend = Blend::new();
        blend
            .add("nvt", -norm.scale_z(nvt_z), 0.5)
            .add("activity", norm.scale_z(activity_z), 0.5);
        let value = blend.value().unwrap_or(0.0);

        let rationale = format!(
            "no financial statements; NVT proxy z {:+.2}, volume z {:+.2} → {:+.1}",
            nvt_z, activity_z, value
        );
        Ok(SubScore::new(Factor::Fundamental, value, rationale))
    }
}

impl FactorScorer for FundamentalScorer {
    fn factor(&self) -> Factor {
        Factor::Fundamental
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> ScorerResult<SubScore> {
        match (ctx.inputs.fundamentals.as_ref(), ctx.asset.asset_type) {
            (Some(snapshot), _) if !snapshot.is_empty() => self.score_stock(ctx, snapshot),
            (_, AssetType::Crypto) => self.score_crypto_proxy(ctx),
            (_, AssetType::Stock) => Err(ScorerError::MissingInput("fundamentals")),
        }
    }
}
