//! AI SCORE 스코어링 실행기.
//!
//! 이 crate는 설정된 자산 목록을 주기적으로 스코어링하는 바이너리를 제공합니다:
//! - 실행 단위 파이프라인 (매크로 1회 적재 → 자산별 병렬 스코어링 → 일괄 저장)
//! - 실행 통계
//! - CLI 출력 포맷

pub mod pipeline;
pub mod report;
pub mod stats;

pub use pipeline::{CycleOutcome, Pipeline};
pub use stats::RunStats;
