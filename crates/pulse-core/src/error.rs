//! 스코어링 시스템의 공통 에러 타입.
//!
//! 스코어링 코어 자체는 실패하지 않습니다(데이터 부족은 중립 점수로 흡수).
//! 이 타입은 설정, 데이터 적재, 저장소 등 외곽 계층의 실패를 표현합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum PulseError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 스코어링 작업을 위한 Result 타입.
pub type PulseResult<T> = Result<T, PulseError>;

impl PulseError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 저장소/데이터 I/O 실패는 일시적일 수 있으므로 재시도 대상입니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PulseError::Storage(_) | PulseError::Data(_))
    }

    /// 프로세스 시작을 막아야 하는 에러인지 확인합니다.
    pub fn is_critical(&self) -> bool {
        matches!(self, PulseError::Config(_))
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(err: serde_json::Error) -> Self {
        PulseError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for PulseError {
    fn from(err: config::ConfigError) -> Self {
        PulseError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let storage_err = PulseError::Storage("disk full".to_string());
        assert!(storage_err.is_retryable());

        let config_err = PulseError::Config("bad weights".to_string());
        assert!(!config_err.is_retryable());
    }

    #[test]
    fn test_error_critical() {
        assert!(PulseError::Config("missing".to_string()).is_critical());
        assert!(!PulseError::NotFound("AAPL".to_string()).is_critical());
    }

    #[test]
    fn test_from_serde_json() {
        let err: PulseError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, PulseError::Serialization(_)));
    }
}
