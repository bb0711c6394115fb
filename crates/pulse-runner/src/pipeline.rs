//! 스코어링 파이프라인.
//!
//! # 동작
//! 1. 매크로 지표를 한 번 적재하고 자산 유형별 국면 점수를 계산
//! 2. 자산별 입력 수집 + 스코어링을 `parallelism` 개씩 병렬 실행
//!    (스코어링 자체는 `spawn_blocking`으로 blocking thread pool에서 실행)
//! 3. 모든 결과가 모인 뒤 저장소에 일괄 저장 (일시적 실패는 1회 재시도)

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn, Instrument};

use pulse_analytics::{RunContext, ScoringEngine};
use pulse_core::{
    scoring_span, Asset, MacroSnapshot, MarketDataSource, PulseError, PulseResult, RawInputs,
    ScoreStore, ScoringResult,
};

use crate::stats::RunStats;

/// 한 실행의 결과.
#[derive(Debug)]
pub struct CycleOutcome {
    /// 입력 자산 순서대로 정렬된 결과
    pub results: Vec<ScoringResult>,
    /// 실행 통계
    pub stats: RunStats,
}

/// 수집 → 스코어링 → 저장 파이프라인.
pub struct Pipeline {
    engine: Arc<ScoringEngine>,
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn ScoreStore>,
    parallelism: usize,
}

impl Pipeline {
    pub fn new(
        engine: Arc<ScoringEngine>,
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn ScoreStore>,
        parallelism: usize,
    ) -> Self {
        Self {
            engine,
            source,
            store,
            parallelism: parallelism.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn ScoreStore> {
        &self.store
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// 매크로 지표를 적재합니다. 실패하면 매크로 없이 진행합니다.
    async fn load_macro(&self) -> Option<Arc<MacroSnapshot>> {
        match self.source.fetch_macro().await {
            Ok(snapshot) if !snapshot.is_empty() => Some(Arc::new(snapshot)),
            Ok(_) => None,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "Macro data unavailable");
                None
            }
        }
    }

    /// 자산 하나의 입력을 수집하고 스코어링합니다.
    ///
    /// 수집 실패는 빈 입력으로 대체되어 중립 결과가 생성됩니다. 반환값의 `bool`은 수집 실패 여부입니다.
    async fn score_with(
        engine: Arc<ScoringEngine>,
        source: Arc<dyn MarketDataSource>,
        run: Arc<RunContext>,
        macro_data: Option<Arc<MacroSnapshot>>,
        asset: Asset,
    ) -> PulseResult<(ScoringResult, bool)> {
        let (mut inputs, fetch_failed) = match source.fetch_inputs(&asset).await {
            Ok(inputs) => (inputs, false),
            Err(e) => {
                warn!(ticker = %asset.ticker, error = %e, "Input fetch failed, scoring with empty inputs");
                (RawInputs::default(), true)
            }
        };
        inputs.macro_data = macro_data;

        let result = tokio::task::spawn_blocking(move || engine.score_in_run(&run, &asset, &inputs))
            .await
            .map_err(|e| PulseError::Internal(format!("스코어링 태스크 실행 실패: {}", e)))?;
        Ok((result, fetch_failed))
    }

    /// 자산 목록 전체를 한 번 스코어링하고 저장합니다.
    pub async fn run_cycle(&self, assets: &[Asset]) -> PulseResult<CycleOutcome> {
        let start = Instant::now();
        let macro_data = self.load_macro().await;
        let run = Arc::new(self.engine.begin_run(macro_data.as_deref()));
        let span = scoring_span!("scoring_run", run.run_id);

        async move {
            info!(assets = assets.len(), parallelism = self.parallelism, "Scoring run started");
            let mut stats = RunStats::new(assets.len());

            let tasks = assets.iter().cloned().enumerate().map(|(index, asset)| {
                let engine = Arc::clone(&self.engine);
                let source = Arc::clone(&self.source);
                let run = Arc::clone(&run);
                let macro_data = macro_data.clone();
                async move {
                    let ticker = asset.ticker.clone();
                    let outcome = Self::score_with(engine, source, run, macro_data, asset).await;
                    (index, ticker, outcome)
                }
            });

            let mut completed: Vec<(usize, String, PulseResult<(ScoringResult, bool)>)> =
                stream::iter(tasks)
                    .buffer_unordered(self.parallelism)
                    .collect()
                    .await;
            completed.sort_by_key(|(index, _, _)| *index);

            let mut results = Vec::with_capacity(completed.len());
            for (_, ticker, outcome) in completed {
                match outcome {
                    Ok((result, fetch_failed)) => {
                        if fetch_failed {
                            stats.fetch_errors += 1;
                        }
                        stats.record(&result);
                        results.push(result);
                    }
                    Err(e) => error!(ticker = %ticker, error = %e, "Asset scoring failed"),
                }
            }

            stats.saved = self.save_with_retry(&results).await?;
            stats.elapsed = start.elapsed();
            stats.log_summary("scoring run");

            Ok(CycleOutcome { results, stats })
        }
        .instrument(span)
        .await
    }

    /// 자산 하나를 독립 실행으로 스코어링합니다 (저장하지 않음).
    pub async fn score_one(&self, asset: &Asset) -> PulseResult<ScoringResult> {
        let macro_data = self.load_macro().await;
        let run = Arc::new(self.engine.begin_run(macro_data.as_deref()));
        let (result, _) = Self::score_with(
            Arc::clone(&self.engine),
            Arc::clone(&self.source),
            run,
            macro_data,
            asset.clone(),
        )
        .await?;
        Ok(result)
    }

    /// 결과를 저장합니다. 재시도 가능한 오류는 한 번 더 시도합니다.
    async fn save_with_retry(&self, results: &[ScoringResult]) -> PulseResult<usize> {
        if results.is_empty() {
            return Ok(0);
        }
        match self.store.save(results).await {
            Ok(saved) => Ok(saved),
            Err(e) if e.is_retryable() => {
                warn!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "Score save failed, retrying once"
                );
                self.store.save(results).await
            }
            Err(e) => Err(e),
        }
    }
}
