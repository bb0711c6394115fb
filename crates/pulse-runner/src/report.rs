//! CLI 출력 포맷.

use std::fmt::Write;

use pulse_core::{FactorWeights, ScoreRecord, ScoringResult, SignalThresholds};

/// 단일 결과 상세 출력.
pub fn format_result(result: &ScoringResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.summary());
    let _ = writeln!(out, "  run {}  at {}", result.run_id, result.timestamp.to_rfc3339());

    for sub in &result.sub_scores {
        let _ = writeln!(
            out,
            "  {:<17} {:>7.2}  {}",
            sub.factor.label(),
            sub.value,
            sub.rationale
        );
    }

    let highlights = result.highlights();
    if !highlights.is_empty() {
        let _ = writeln!(out, "  {}", highlights.join("  "));
    }
    out
}

/// 저장된 레코드 표 출력.
pub fn format_records(records: &[ScoreRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<10} {:>8} {:<12} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "timestamp", "ticker", "score", "signal", "trend", "vol", "sent", "fund", "rs", "funds", "macro"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:>8.2} {:<12} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6.1}",
            r.timestamp.format("%Y-%m-%d %H:%M"),
            r.ticker,
            r.ai_score,
            format!("{} {}", r.signal.emoji(), r.signal.label()),
            r.trend,
            r.volatility,
            r.sentiment,
            r.fundamental,
            r.relative_strength,
            r.insider_funds,
            r.macro_score
        );
    }
    out
}

/// 가중치/임계값 표 출력.
pub fn format_weights(weights: &FactorWeights, thresholds: &SignalThresholds) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<17} {:>6}", "factor", "weight");
    for (factor, weight) in weights.iter() {
        let _ = writeln!(out, "{:<17} {:>5.0}%", factor.label(), weight * 100.0);
    }
    let _ = writeln!(out, "{:<17} {:>5.0}%", "total", weights.sum() * 100.0);
    let _ = writeln!(
        out,
        "signals: STRONG BUY >= {} | BUY >= {} | SELL <= {} | STRONG SELL <= {}",
        thresholds.strong_buy, thresholds.buy, thresholds.sell, thresholds.strong_sell
    );
    out
}
