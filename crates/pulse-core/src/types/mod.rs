//! 스코어링 시스템 전반에서 사용되는 공통 타입.

mod asset;
mod decimal;

pub use asset::*;
pub use decimal::*;
