//! 가격 표현을 위한 Decimal 유틸리티.
//!
//! 시세는 `Decimal`로 보관하고, 통계 계산 직전에만 `f64`로 변환합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Quantity = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 통계 계산용 `f64`로 변환합니다.
    ///
    /// 표현 불가능한 값은 NaN이 되며, 하위 계산에서 유한성 검사로 걸러집니다.
    fn to_f64_lossy(&self) -> f64;

    /// 지정된 소수점 자릿수로 반올림합니다 (0.5는 0에서 멀어지는 방향).
    fn round_dp_away(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    fn round_dp_away(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

/// 표시용 반올림.
///
/// 점수 계산은 전 구간 `f64`로 수행하고, 저장/출력 시점에만 반올림합니다.
pub fn round_display(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}
