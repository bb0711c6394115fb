//! # Pulse Core
//!
//! 멀티 팩터 스코어링 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - 시장 데이터 구조체 (캔들, 시계열)
//! - 팩터/서브 점수/신호/가중치 타입
//! - 스코어링 입력 및 결과 레코드
//! - 수집/저장 협력자 trait
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
