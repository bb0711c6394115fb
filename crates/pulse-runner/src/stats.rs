//! 스코어링 실행 통계 구조체.

use std::collections::BTreeMap;
use std::time::Duration;

use pulse_core::{ScoringResult, Signal};

/// 스코어링 실행 통계
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// 대상 자산 수
    pub total: usize,
    /// 결과가 생성된 자산 수
    pub scored: usize,
    /// 입력 수집 실패 (중립 입력으로 대체)
    pub fetch_errors: usize,
    /// 저장된 결과 수
    pub saved: usize,
    /// 데이터 부족으로 중립 처리된 팩터 수 (전체 자산 합계)
    pub neutral_factors: usize,
    /// 신호별 자산 수
    pub signals: BTreeMap<Signal, usize>,
    /// 소요 시간
    pub elapsed: Duration,
}

impl RunStats {
    /// 새 통계 객체 생성
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// 결과 하나를 집계합니다.
    pub fn record(&mut self, result: &ScoringResult) {
        self.scored += 1;
        self.neutral_factors += result
            .sub_scores
            .iter()
            .filter(|s| !s.is_computed())
            .count();
        *self.signals.entry(result.signal).or_default() += 1;
    }

    /// 평균 팩터 커버리지 (%)
    pub fn coverage(&self) -> f64 {
        if self.scored == 0 {
            0.0
        } else {
            let factors = (self.scored * 7) as f64;
            (1.0 - self.neutral_factors as f64 / factors) * 100.0
        }
    }

    /// "STRONG BUY 1, BUY 2" 형식의 신호 분포.
    pub fn signal_breakdown(&self) -> String {
        self.signals
            .iter()
            .rev()
            .map(|(signal, count)| format!("{} {}", signal.label(), count))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            scored = self.scored,
            fetch_errors = self.fetch_errors,
            saved = self.saved,
            coverage = format!("{:.1}%", self.coverage()),
            signals = %self.signal_breakdown(),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "스코어링 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_core::{Asset, Factor, SubScore};

    fn result(signal: Signal, neutral: usize) -> ScoringResult {
        ScoringResult {
            run_id: Default::default(),
            asset: Asset::stock("T"),
            timestamp: Utc::now(),
            sub_scores: Factor::ALL
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    if i < neutral {
                        SubScore::insufficient(*f, "x")
                    } else {
                        SubScore::new(*f, 0.0, "x")
                    }
                })
                .collect(),
            ai_score: 0.0,
            signal,
            confidence: 1.0,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_record_and_coverage() {
        let mut stats = RunStats::new(2);
        stats.record(&result(Signal::Buy, 0));
        stats.record(&result(Signal::StrongBuy, 7));

        assert_eq!(stats.scored, 2);
        assert_eq!(stats.neutral_factors, 7);
        assert!((stats.coverage() - 50.0).abs() < 1e-9);
        assert_eq!(stats.signal_breakdown(), "STRONG BUY 1, BUY 1");
    }

    #[test]
    fn test_empty_coverage() {
        assert_eq!(RunStats::new(0).coverage(), 0.0);
    }
}
