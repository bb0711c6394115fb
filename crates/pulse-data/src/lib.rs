//! 입력 데이터 적재 및 결과 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 파일 기반 시장 데이터 소스 (OHLCV CSV, 매크로 CSV, 재무/뉴스/기관 JSON)
//! - CSV 및 메모리 스코어 저장소
//! - 설정 기반 저장소 팩토리

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// 데이터 소스 재내보내기
pub use provider::file::FileDataSource;

// 저장소 재내보내기
pub use storage::csv::CsvScoreStore;
pub use storage::memory::MemoryScoreStore;
pub use storage::open_store;
