//! 자산 및 자산 유형 정의.
//!
//! - `AssetType` - 자산 유형 (주식, 암호화폐)
//! - `Asset` - 스코어링 대상 자산

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 자산 유형 분류.
///
/// 펀더멘털 대체 지표, 벤치마크, 매크로 가중치 선택에 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// 주식
    Stock,
    /// 암호화폐
    Crypto,
}

impl AssetType {
    /// 모든 자산 유형.
    pub const ALL: [AssetType; 2] = [AssetType::Stock, AssetType::Crypto];

    /// 소문자 식별자를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" | "equity" => Ok(AssetType::Stock),
            "crypto" | "cryptocurrency" => Ok(AssetType::Crypto),
            other => Err(format!("Unknown asset type: {}", other)),
        }
    }
}

/// 스코어링 대상 자산.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// 티커 (예: AAPL, BTCUSDT)
    pub ticker: String,
    /// 표시 이름
    #[serde(default)]
    pub name: String,
    /// 자산 유형
    pub asset_type: AssetType,
    /// 거래소 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
}

impl Asset {
    /// 새 자산을 생성합니다. 티커는 대문자로 정규화됩니다.
    pub fn new(ticker: impl Into<String>, asset_type: AssetType) -> Self {
        let ticker = ticker.into().trim().to_uppercase();
        Self {
            name: ticker.clone(),
            ticker,
            asset_type,
            exchange: None,
        }
    }

    /// 주식 자산을 생성합니다.
    pub fn stock(ticker: impl Into<String>) -> Self {
        Self::new(ticker, AssetType::Stock)
    }

    /// 암호화폐 자산을 생성합니다.
    pub fn crypto(ticker: impl Into<String>) -> Self {
        Self::new(ticker, AssetType::Crypto)
    }

    /// 표시 이름을 설정합니다.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 거래소를 설정합니다.
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// 암호화폐 여부.
    pub fn is_crypto(&self) -> bool {
        self.asset_type == AssetType::Crypto
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ticker, self.asset_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_creation() {
        let asset = Asset::stock(" aapl ").with_name("Apple Inc.");
        assert_eq!(asset.ticker, "AAPL");
        assert_eq!(asset.name, "Apple Inc.");
        assert!(!asset.is_crypto());
        assert_eq!(asset.to_string(), "AAPL (stock)");
    }

    #[test]
    fn test_asset_type_parse() {
        assert_eq!("Crypto".parse::<AssetType>().unwrap(), AssetType::Crypto);
        assert_eq!("equity".parse::<AssetType>().unwrap(), AssetType::Stock);
        assert!("bond".parse::<AssetType>().is_err());
    }

    #[test]
    fn test_asset_deserialize_defaults() {
        let asset: Asset =
            serde_json::from_str(r#"{"ticker": "ETHUSDT", "asset_type": "crypto"}"#).unwrap();
        assert_eq!(asset.asset_type, AssetType::Crypto);
        assert!(asset.name.is_empty());
        assert!(asset.exchange.is_none());
    }
}
