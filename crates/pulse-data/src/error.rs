//! 데이터 모듈 오류 타입.

use std::path::Path;

use pulse_core::PulseError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 파일 입출력 오류
    #[error("I/O error ({path}): {message}")]
    Io { path: String, message: String },

    /// 파싱 오류
    #[error("Parse error ({path}): {message}")]
    Parse { path: String, message: String },

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 레코드/경로를 찾을 수 없음
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DataError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        DataError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(path: &Path, message: impl ToString) -> Self {
        DataError::Parse {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

impl From<DataError> for PulseError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => PulseError::NotFound(msg),
            DataError::Serialization(msg) => PulseError::Serialization(msg),
            DataError::InvalidData(msg) => PulseError::InvalidInput(msg),
            other @ (DataError::Io { .. } | DataError::Parse { .. }) => {
                PulseError::Storage(other.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
