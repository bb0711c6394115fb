//! 단위 테스트용 데이터 생성기.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use pulse_core::{Kline, RawSeries};

pub fn day(i: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i as i64)
}

fn dec(x: f64) -> Decimal {
    Decimal::from_f64(x).unwrap().round_dp(6)
}

/// 종가와 거래량으로 캔들을 만듭니다. 고가/저가는 종가 ±1%.
pub fn candles_with_volume(closes: &[f64], volumes: &[f64]) -> Vec<Kline> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Kline::new(
                day(i),
                dec(open),
                dec(close.max(open) * 1.01),
                dec(close.min(open) * 0.99),
                dec(close),
                dec(volume),
            )
        })
        .collect()
}

/// 종가로 캔들을 만듭니다. 거래량은 1000 근처에서 주기적으로 변합니다.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Kline> {
    let volumes: Vec<f64> = (0..closes.len())
        .map(|i| 1_000.0 + ((i * 37) % 11) as f64 * 40.0)
        .collect();
    candles_with_volume(closes, &volumes)
}

/// 선형 추세 + 진동 종가.
pub fn wave_closes(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n)
        .map(|i| start + step * i as f64 + (i as f64 * 0.9).sin() * start * 0.01)
        .collect()
}

/// 일 단위 값 시계열.
pub fn series(metric: &str, values: &[f64]) -> RawSeries {
    RawSeries::from_points(metric, values.iter().enumerate().map(|(i, v)| (day(i), *v)))
}
