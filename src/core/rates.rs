//! Rate snapshots and the provider abstractions that produce them

use crate::core::currency::CryptoAsset;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fixed USD price injected for HLQ when the price feed omits it.
pub const HLQ_FALLBACK_USD: f64 = 1.25;

/// USD to MYR rate used when a caller supplies none.
pub const FALLBACK_USD_TO_MYR_RATE: f64 = 4.65;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub date: String,
    pub buying_rate: f64,
    pub selling_rate: f64,
    pub middle_rate: f64,
}

/// One point-in-time quote of a foreign currency against MYR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatRateSnapshot {
    pub currency_code: String,
    pub unit: f64,
    pub rate: RateQuote,
}

impl FiatRateSnapshot {
    /// MYR per USD.
    pub fn middle_rate(&self) -> f64 {
        self.rate.middle_rate
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiatRateMeta {
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub session: String,
    #[serde(default)]
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiatRate {
    pub snapshot: FiatRateSnapshot,
    pub meta: FiatRateMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub usd: f64,
    pub myr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<i64>,
}

impl CryptoQuote {
    pub fn from_usd(usd: f64, usd_to_myr_rate: f64, last_updated_at: Option<i64>) -> Self {
        CryptoQuote {
            usd,
            myr: usd * usd_to_myr_rate,
            last_updated_at,
        }
    }
}

/// Crypto prices keyed by asset. Serializes as an object keyed by feed id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CryptoRateSnapshot {
    quotes: BTreeMap<CryptoAsset, CryptoQuote>,
}

impl CryptoRateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, asset: CryptoAsset) -> Option<&CryptoQuote> {
        self.quotes.get(&asset)
    }

    pub fn insert(&mut self, asset: CryptoAsset, quote: CryptoQuote) {
        self.quotes.insert(asset, quote);
    }

    pub fn contains(&self, asset: CryptoAsset) -> bool {
        self.quotes.contains_key(&asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CryptoAsset, &CryptoQuote)> {
        self.quotes.iter().map(|(asset, quote)| (*asset, quote))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl FromIterator<(CryptoAsset, CryptoQuote)> for CryptoRateSnapshot {
    fn from_iter<I: IntoIterator<Item = (CryptoAsset, CryptoQuote)>>(iter: I) -> Self {
        CryptoRateSnapshot {
            quotes: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
pub trait FiatRateProvider: Send + Sync {
    async fn fetch_fiat_rate(&self) -> Result<FiatRate>;
}

#[async_trait]
pub trait CryptoRateProvider: Send + Sync {
    async fn fetch_crypto_rates(
        &self,
        assets: &BTreeSet<CryptoAsset>,
        usd_to_myr_rate: f64,
    ) -> Result<CryptoRateSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_snapshot_wire_format() {
        let snapshot: CryptoRateSnapshot = [
            (
                CryptoAsset::Btc,
                CryptoQuote::from_usd(65000.0, 4.65, Some(1_700_000_000)),
            ),
            (CryptoAsset::Hlq, CryptoQuote::from_usd(2.0, 4.5, None)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["bitcoin"]["usd"], 65000.0);
        assert_eq!(json["bitcoin"]["myr"], 302250.0);
        assert_eq!(json["bitcoin"]["last_updated_at"], 1_700_000_000);
        assert_eq!(json["hyperliquid"]["myr"], 9.0);
        assert!(json["hyperliquid"].get("last_updated_at").is_none());

        let parsed: CryptoRateSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_fiat_snapshot_deserialization() {
        let json = r#"{
            "currency_code": "USD",
            "unit": 1,
            "rate": {
                "date": "2025-03-20",
                "buying_rate": 4.4215,
                "selling_rate": 4.4615,
                "middle_rate": 4.4415
            }
        }"#;

        let snapshot: FiatRateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.currency_code, "USD");
        assert_eq!(snapshot.unit, 1.0);
        assert_eq!(snapshot.rate.date, "2025-03-20");
        assert_eq!(snapshot.middle_rate(), 4.4415);
    }
}
