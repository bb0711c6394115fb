//! Z-score 정규화.
//!
//! 원시 지표 값을 기준 모집단에 대해 표준화하고 [-100, 100] 서브 점수로 변환합니다.
//! 모든 함수는 순수 함수이며 에러를 반환하지 않습니다. 퇴화된 통계(표본 2개 미만,
//! 표준편차 0, 비유한 입력)는 0.0으로 처리합니다.

use pulse_core::{clamp_score, NormalizationConfig};

/// 표준편차가 이 값 × (1 + |평균|) 이하이면 분산 0으로 간주합니다.
const DEGENERATE_STD_RATIO: f64 = 1e-12;

/// 산술 평균. 비어 있으면 None.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// 표본 표준편차 (n-1). 값이 2개 미만이면 None.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// `value`의 기준 모집단 대비 Z-score.
///
/// z = (value - mean) / stddev (표본 표준편차).
/// 모집단의 비유한 값은 결측으로 제외합니다.
pub fn zscore(value: f64, population: &[f64]) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }

    let finite: Vec<f64> = population.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(m), Some(std)) = (mean(&finite), sample_std(&finite)) else {
        return 0.0;
    };

    if !std.is_finite() || std <= DEGENERATE_STD_RATIO * (1.0 + m.abs()) {
        return 0.0;
    }

    let z = (value - m) / std;
    if z.is_finite() {
        z
    } else {
        0.0
    }
}

/// 시계열 마지막 값의 롤링 Z-score.
///
/// 마지막 `window`개(마지막 값 포함)를 모집단으로 사용합니다.
/// 값이 `window`개보다 적으면 0.0입니다.
pub fn rolling_zscore(series: &[f64], window: usize) -> f64 {
    if window < 2 || series.len() < window {
        return 0.0;
    }
    let tail = &series[series.len() - window..];
    match tail.last() {
        Some(last) => zscore(*last, tail),
        None => 0.0,
    }
}

/// Z-score를 서브 점수로 변환합니다: clip(z × scale, -100, 100).
pub fn to_sub_score(z: f64, scale: f64) -> f64 {
    clamp_score(z * scale)
}

/// 설정된 윈도우/배율로 정규화를 수행하는 헬퍼.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    /// 롤링 윈도우
    pub window: usize,
    /// Z → 점수 배율
    pub scale: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from(NormalizationConfig::default())
    }
}

impl From<NormalizationConfig> for Normalizer {
    fn from(config: NormalizationConfig) -> Self {
        Self {
            window: config.window,
            scale: config.scale,
        }
    }
}

impl Normalizer {
    /// 시계열 마지막 값의 롤링 Z-score (설정 윈도우).
    pub fn latest_z(&self, series: &[f64]) -> f64 {
        rolling_zscore(series, self.window)
    }

    /// 시계열 마지막 값의 롤링 Z 서브 점수.
    pub fn latest_score(&self, series: &[f64]) -> f64 {
        to_sub_score(self.latest_z(series), self.scale)
    }

    /// 임의 윈도우로 계산한 롤링 Z 서브 점수.
    pub fn latest_score_with_window(&self, series: &[f64], window: usize) -> f64 {
        to_sub_score(rolling_zscore(series, window), self.scale)
    }

    /// 기준 모집단 대비 Z 서브 점수.
    pub fn score_against(&self, value: f64, population: &[f64]) -> f64 {
        to_sub_score(zscore(value, population), self.scale)
    }

    /// Z-score를 서브 점수로 변환합니다.
    pub fn scale_z(&self, z: f64) -> f64 {
        to_sub_score(z, self.scale)
    }

    /// 롤링 Z-score 계산에 필요한 최소 길이인지 확인합니다.
    pub fn has_window(&self, series: &[f64]) -> bool {
        series.len() >= self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zscore_exact() {
        // mean 5, sample std = sqrt(32/7)
        let pop = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = (32.0f64 / 7.0).sqrt();
        assert!((zscore(9.0, &pop) - 4.0 / std).abs() < 1e-12);
        assert!((zscore(5.0, &pop)).abs() < 1e-12);
    }

    #[test]
    fn test_zscore_degenerate() {
        assert_eq!(zscore(3.0, &[]), 0.0);
        assert_eq!(zscore(3.0, &[1.0]), 0.0);
        assert_eq!(zscore(3.0, &[2.0, 2.0, 2.0]), 0.0);
        assert_eq!(zscore(0.1, &[0.1, 0.1, 0.1]), 0.0);
        assert_eq!(zscore(f64::NAN, &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_zscore_skips_non_finite_members() {
        let with_gap = zscore(3.0, &[1.0, f64::NAN, 2.0]);
        let clean = zscore(3.0, &[1.0, 2.0]);
        assert_eq!(with_gap, clean);
    }

    #[test]
    fn test_rolling_zscore_window() {
        let series: Vec<f64> = (1..=30).map(f64::from).collect();
        assert_eq!(rolling_zscore(&series[..10], 20), 0.0);

        let z = rolling_zscore(&series, 20);
        let expected = zscore(30.0, &series[10..]);
        assert_eq!(z, expected);
        assert!(z > 1.0);
    }

    #[test]
    fn test_to_sub_score_clips() {
        assert_eq!(to_sub_score(1.0, 33.0), 33.0);
        assert_eq!(to_sub_score(5.0, 33.0), 100.0);
        assert_eq!(to_sub_score(-5.0, 33.0), -100.0);
        assert_eq!(to_sub_score(f64::NAN, 33.0), 0.0);
    }

    #[test]
    fn test_normalizer_from_config() {
        let n = Normalizer::from(NormalizationConfig {
            window: 10,
            scale: 50.0,
        });
        assert_eq!(n.window, 10);
        assert_eq!(n.scale_z(1.0), 50.0);
        assert!(!n.has_window(&[1.0; 9]));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn zscore_matches_formula(
                pop in prop::collection::vec(-1_000.0f64..1_000.0, 2..60),
                value in -2_000.0f64..2_000.0,
            ) {
                let m = pop.iter().sum::<f64>() / pop.len() as f64;
                let std = (pop.iter().map(|v| (v - m).powi(2)).sum::<f64>()
                    / (pop.len() - 1) as f64).sqrt();
                prop_assume!(std > 1e-6);

                let expected = (value - m) / std;
                prop_assert!((zscore(value, &pop) - expected).abs() <= 1e-9 * (1.0 + expected.abs()));
            }

            #[test]
            fn zscore_degenerate_is_zero(
                constant in -1_000.0f64..1_000.0,
                n in 0usize..30,
                value in -2_000.0f64..2_000.0,
            ) {
                let pop = vec![constant; n];
                let z = zscore(value, &pop);
                prop_assert_eq!(z, 0.0);
            }

            #[test]
            fn zscore_is_always_finite(
                pop in prop::collection::vec(prop::num::f64::ANY, 0..40),
                value in prop::num::f64::ANY,
            ) {
                prop_assert!(zscore(value, &pop).is_finite());
            }
        }
    }
}
