//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수(`PULSE__SECTION__KEY`) 순으로 덮어씁니다.
//! 가중치와 신호 임계값도 여기서 재정의할 수 있으며, 생략하면 기본값이 유지됩니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{FactorWeights, SignalThresholds};
use crate::error::{PulseError, PulseResult};
use crate::logging::LogConfig;
use crate::types::{Asset, AssetType};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "PULSE";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PulseConfig {
    /// 로깅 설정
    pub logging: LogConfig,
    /// 스코어링 설정
    pub scoring: ScoringConfig,
    /// 입력 데이터 설정
    pub data: DataConfig,
    /// 결과 저장소 설정
    pub storage: StorageConfig,
    /// 실행기 설정
    pub runner: RunnerConfig,
    /// 스코어링 대상 자산
    pub assets: Vec<Asset>,
}

/// 스코어링 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// 팩터 가중치
    pub weights: FactorWeights,
    /// 신호 임계값
    pub thresholds: SignalThresholds,
    /// 정규화 파라미터
    pub normalization: NormalizationConfig,
}

/// Z-score 정규화 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// 롤링 Z-score 윈도우
    pub window: usize,
    /// Z → 서브 점수 배율 (clip(z × scale, ±100))
    pub scale: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            window: 20,
            scale: 33.0,
        }
    }
}

/// 입력 데이터 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// 데이터 루트 디렉토리
    pub dir: PathBuf,
    /// 자산 유형별 벤치마크 티커
    pub benchmarks: BenchmarkConfig,
    /// 사용할 최대 캔들 수 (최근 N개)
    pub lookback: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            benchmarks: BenchmarkConfig::default(),
            lookback: 250,
        }
    }
}

/// 자산 유형별 벤치마크.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// 주식 벤치마크 (지수)
    pub stock: String,
    /// 암호화폐 벤치마크
    pub crypto: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            stock: "^GSPC".to_string(),
            crypto: "BTCUSDT".to_string(),
        }
    }
}

impl BenchmarkConfig {
    /// 자산 유형의 벤치마크 티커.
    pub fn for_asset_type(&self, asset_type: AssetType) -> &str {
        match asset_type {
            AssetType::Stock => &self.stock,
            AssetType::Crypto => &self.crypto,
        }
    }
}

/// 저장소 백엔드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// CSV 파일 (append-only)
    #[default]
    Csv,
    /// 프로세스 메모리 (테스트/일회성 실행용)
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "memory" | "mem" => Ok(Self::Memory),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// 결과 저장소 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 백엔드 종류
    pub backend: StorageBackend,
    /// CSV 파일 경로
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Csv,
            path: PathBuf::from("data/scores.csv"),
        }
    }
}

impl StorageConfig {
    /// 메모리 저장소 설정.
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            ..Default::default()
        }
    }

    /// CSV 저장소 설정.
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Csv,
            path: path.into(),
        }
    }
}

/// 실행기 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// 동시에 스코어링할 최대 자산 수
    pub parallelism: usize,
    /// 데몬 모드 실행 주기 (분)
    pub interval_minutes: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            interval_minutes: 60,
        }
    }
}

impl RunnerConfig {
    /// 실행 주기.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

impl PulseConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `path`가 `None`이면 [`DEFAULT_CONFIG_PATH`]를 선택적으로 읽습니다(없어도 됨).
    pub fn load(path: Option<&Path>) -> PulseResult<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        let config: PulseConfig = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml_str(toml: &str) -> PulseResult<Self> {
        let config: PulseConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// 설정 값의 일관성을 검증합니다.
    pub fn validate(&self) -> PulseResult<()> {
        self.scoring.weights.validate()?;
        self.scoring.thresholds.validate()?;

        let norm = &self.scoring.normalization;
        if norm.window < 2 {
            return Err(PulseError::Config(format!(
                "정규화 윈도우는 2 이상이어야 합니다: {}",
                norm.window
            )));
        }
        if !norm.scale.is_finite() || norm.scale <= 0.0 {
            return Err(PulseError::Config(format!(
                "정규화 배율은 양수여야 합니다: {}",
                norm.scale
            )));
        }
        if self.runner.parallelism == 0 {
            return Err(PulseError::Config(
                "parallelism은 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.runner.interval_minutes == 0 {
            return Err(PulseError::Config(
                "interval_minutes는 1 이상이어야 합니다".to_string(),
            ));
        }
        if let Some(asset) = self.assets.iter().find(|a| a.ticker.trim().is_empty()) {
            return Err(PulseError::Config(format!("빈 티커가 있습니다: {:?}", asset)));
        }
        Ok(())
    }

    /// 티커로 설정된 자산을 찾습니다 (대소문자 무시).
    pub fn find_asset(&self, ticker: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.ticker.eq_ignore_ascii_case(ticker))
    }
}
