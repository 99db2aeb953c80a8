//! Currency identities: the supported fiat codes, crypto assets and the
//! tagged union the converter works with.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCode {
    Usd,
    Myr,
}

impl FiatCode {
    pub const ALL: [FiatCode; 2] = [FiatCode::Usd, FiatCode::Myr];

    pub fn code(&self) -> &'static str {
        match self {
            FiatCode::Usd => "USD",
            FiatCode::Myr => "MYR",
        }
    }
}

impl Display for FiatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for FiatCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(FiatCode::Usd),
            "MYR" => Ok(FiatCode::Myr),
            _ => Err(anyhow!("Unsupported fiat currency: {}", s)),
        }
    }
}

/// A crypto asset with a live price feed.
///
/// Serializes as its price-feed identifier, which is also the key used in
/// crypto snapshots on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum CryptoAsset {
    #[serde(rename = "bitcoin")]
    Btc,
    #[serde(rename = "ethereum")]
    Eth,
    #[serde(rename = "solana")]
    Sol,
    #[serde(rename = "hyperliquid")]
    Hlq,
}

impl CryptoAsset {
    pub const ALL: [CryptoAsset; 4] = [
        CryptoAsset::Btc,
        CryptoAsset::Eth,
        CryptoAsset::Sol,
        CryptoAsset::Hlq,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            CryptoAsset::Btc => "BTC",
            CryptoAsset::Eth => "ETH",
            CryptoAsset::Sol => "SOL",
            CryptoAsset::Hlq => "HLQ",
        }
    }

    /// Identifier of the asset in the upstream price feed.
    pub fn feed_id(&self) -> &'static str {
        match self {
            CryptoAsset::Btc => "bitcoin",
            CryptoAsset::Eth => "ethereum",
            CryptoAsset::Sol => "solana",
            CryptoAsset::Hlq => "hyperliquid",
        }
    }

    pub fn from_feed_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|asset| asset.feed_id().eq_ignore_ascii_case(id.trim()))
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|asset| asset.symbol().eq_ignore_ascii_case(symbol.trim()))
    }
}

impl Display for CryptoAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Accepts either the ticker symbol (`BTC`) or the feed id (`bitcoin`).
impl FromStr for CryptoAsset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s)
            .or_else(|| Self::from_feed_id(s))
            .ok_or_else(|| anyhow!("Unsupported crypto asset: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyKind {
    Fiat,
    Crypto,
}

/// Classifies a currency symbol or price-feed id. Anything that is not a
/// known crypto asset is treated as fiat.
pub fn classify(symbol: &str) -> CurrencyKind {
    if symbol.parse::<CryptoAsset>().is_ok() {
        CurrencyKind::Crypto
    } else {
        CurrencyKind::Fiat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyRef {
    Fiat(FiatCode),
    Crypto(CryptoAsset),
}

impl CurrencyRef {
    pub const USD: CurrencyRef = CurrencyRef::Fiat(FiatCode::Usd);
    pub const MYR: CurrencyRef = CurrencyRef::Fiat(FiatCode::Myr);

    /// Every currency the converter offers, fiat first.
    pub fn all() -> impl Iterator<Item = CurrencyRef> {
        FiatCode::ALL
            .into_iter()
            .map(CurrencyRef::Fiat)
            .chain(CryptoAsset::ALL.into_iter().map(CurrencyRef::Crypto))
    }

    pub fn kind(&self) -> CurrencyKind {
        match self {
            CurrencyRef::Fiat(_) => CurrencyKind::Fiat,
            CurrencyRef::Crypto(_) => CurrencyKind::Crypto,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyRef::Fiat(code) => code.code(),
            CurrencyRef::Crypto(asset) => asset.symbol(),
        }
    }
}

impl Display for CurrencyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for CurrencyRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match classify(s) {
            CurrencyKind::Crypto => s.parse().map(CurrencyRef::Crypto),
            CurrencyKind::Fiat => s
                .parse()
                .map(CurrencyRef::Fiat)
                .map_err(|_| anyhow!("Unsupported currency: {}", s)),
        }
    }
}

impl Serialize for CurrencyRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for CurrencyRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        symbol.parse().map_err(serde::de::Error::custom)
    }
}
