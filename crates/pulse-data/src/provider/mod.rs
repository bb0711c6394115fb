//! 시장 데이터 소스.
//!
//! [`pulse_core::MarketDataSource`] 구현체를 제공합니다.

pub mod file;

pub use file::FileDataSource;
