//! 스코어링 엔진 벤치마크
//!
//! 250봉 이력 한 자산의 전체 스코어링 비용 측정

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use pulse_analytics::ScoringEngine;
use pulse_core::{Asset, Kline, RawInputs, RawSeries};

fn dec(x: f64) -> Decimal {
    Decimal::from_f64(x).unwrap_or_default().round_dp(4)
}

fn candles(n: usize) -> Vec<Kline> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + 0.2 * i as f64 + (i as f64 * 0.5).sin() * 2.0;
            Kline::new(
                start + Duration::days(i as i64),
                dec(close - 0.5),
                dec(close * 1.01),
                dec(close * 0.99),
                dec(close),
                dec(1_000.0 + (i % 9) as f64 * 120.0),
            )
        })
        .collect()
}

fn bench_score_asset(c: &mut Criterion) {
    let engine = ScoringEngine::with_defaults();
    let klines = candles(250);
    let benchmark = RawSeries::from_closes("^GSPC", &klines);
    let inputs = RawInputs::from_candles(klines).with_benchmark(benchmark);
    let asset = Asset::stock("BENCH");
    let run = engine.begin_run(None);

    c.bench_function("score_in_run_250_bars", |b| {
        b.iter(|| engine.score_in_run(&run, black_box(&asset), black_box(&inputs)))
    });
}

criterion_group!(benches, bench_score_asset);
criterion_main!(benches);
