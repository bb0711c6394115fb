//! AI SCORE 스코어링 실행기 CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use pulse_analytics::ScoringEngine;
use pulse_core::{init_logging, LogFormat, PulseConfig};
use pulse_data::{open_store, FileDataSource};
use pulse_runner::{report, Pipeline};

#[derive(Parser)]
#[command(name = "pulse-runner")]
#[command(about = "Alpha Pulse AI score runner", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (기본: config/default.toml)
    #[arg(long, env = "PULSE_CONFIG")]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// 로그 포맷 (pretty, json, compact)
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// 설정된 전체 자산을 한 번 스코어링하고 저장
    Run,

    /// 데몬 모드: 주기적으로 전체 자산 스코어링
    Daemon,

    /// 단일 티커 스코어링 (저장하지 않음)
    Score {
        /// 티커 (설정된 자산 목록에 있어야 함)
        ticker: String,
    },

    /// 저장된 점수 이력 조회
    History {
        /// 티커
        ticker: String,

        /// 조회 기간 (일)
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// 티커별 최신 점수 (AI SCORE 내림차순)
    Latest,

    /// 팩터 가중치와 신호 임계값 출력
    Weights,
}

/// 수집 → 스코어링 → 저장 파이프라인을 구성합니다.
fn build_pipeline(config: &PulseConfig, engine: Arc<ScoringEngine>) -> anyhow::Result<Pipeline> {
    let store = open_store(&config.storage).context("저장소 열기 실패")?;
    let source =
        Arc::new(FileDataSource::from_config(&config.data).context("데이터 소스 열기 실패")?);
    Ok(Pipeline::new(engine, source, store, config.runner.parallelism))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 설정 로드 (CLI 옵션이 환경 변수보다 우선)
    let mut config = PulseConfig::load(cli.config.as_deref()).context("설정 로드 실패")?;
    config.logging = config.logging.merge_env();
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    // 로깅 초기화
    init_logging(&config.logging).context("로깅 초기화 실패")?;
    tracing::info!(assets = config.assets.len(), "Alpha Pulse runner 시작");

    let engine = Arc::new(ScoringEngine::new(&config.scoring).context("스코어링 설정 오류")?);

    // 명령 실행
    match cli.command {
        Commands::Weights => {
            print!("{}", report::format_weights(engine.weights(), engine.thresholds()));
        }
        Commands::History { ticker, days } => {
            let store = open_store(&config.storage).context("저장소 열기 실패")?;
            let records = store.history(&ticker, days).await?;
            if records.is_empty() {
                println!("{}: 최근 {}일 이력이 없습니다", ticker, days);
            } else {
                print!("{}", report::format_records(&records));
            }
        }
        Commands::Latest => {
            let store = open_store(&config.storage).context("저장소 열기 실패")?;
            let records = store.latest_all().await?;
            print!("{}", report::format_records(&records));
        }
        Commands::Score { ticker } => {
            let asset = config
                .find_asset(&ticker)
                .with_context(|| format!("설정에 없는 티커: {}", ticker))?;
            let pipeline = build_pipeline(&config, engine)?;
            let result = pipeline.score_one(asset).await?;
            print!("{}", report::format_result(&result));
        }
        Commands::Run => {
            let pipeline = build_pipeline(&config, engine)?;
            let outcome = pipeline.run_cycle(&config.assets).await?;
            for result in &outcome.results {
                println!("{}", result.summary());
            }
        }
        Commands::Daemon => {
            let pipeline = build_pipeline(&config, engine)?;
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.runner.interval_minutes
            );

            let mut interval = tokio::time::interval(config.runner.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        match pipeline.run_cycle(&config.assets).await {
                            Ok(outcome) => {
                                tracing::info!(
                                    scored = outcome.stats.scored,
                                    "=== 스코어링 완료, 다음 실행: {}분 후 ===",
                                    config.runner.interval_minutes
                                );
                            }
                            Err(e) => {
                                tracing::error!("스코어링 실행 실패: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }

    tracing::info!("Alpha Pulse runner 종료");
    Ok(())
}
