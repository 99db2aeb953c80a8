use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

use crate::core::currency::CryptoAsset;
use crate::core::error::UpstreamError;
use crate::core::rates::{
    CryptoQuote, CryptoRateProvider, CryptoRateSnapshot, HLQ_FALLBACK_USD,
};

const UPSTREAM: &str = "CoinGecko";

/// CoinGecko simple price feed. Prices are fetched in USD only; MYR prices
/// are derived from the caller's USD to MYR rate.
pub struct CoinGeckoProvider {
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct SimplePrice {
    #[serde(default)]
    usd: Option<f64>,
    #[serde(default)]
    last_updated_at: Option<i64>,
}

type SimplePriceResponse = HashMap<String, SimplePrice>;

/// Builds the snapshot for the requested assets out of the raw price map.
/// HLQ gets a fixed fallback quote when the feed has no price for it.
fn build_snapshot(
    prices: &SimplePriceResponse,
    assets: &BTreeSet<CryptoAsset>,
    usd_to_myr_rate: f64,
) -> CryptoRateSnapshot {
    let mut snapshot: CryptoRateSnapshot = assets
        .iter()
        .filter_map(|asset| {
            let price = prices.get(asset.feed_id())?;
            let usd = price.usd?;
            Some((
                *asset,
                CryptoQuote::from_usd(usd, usd_to_myr_rate, price.last_updated_at),
            ))
        })
        .collect();

    if assets.contains(&CryptoAsset::Hlq) && !snapshot.contains(CryptoAsset::Hlq) {
        warn!("No HLQ price in the feed, using fallback quote");
        snapshot.insert(
            CryptoAsset::Hlq,
            CryptoQuote::from_usd(
                HLQ_FALLBACK_USD,
                usd_to_myr_rate,
                Some(Utc::now().timestamp()),
            ),
        );
    }

    for asset in assets.iter().filter(|a| !snapshot.contains(**a)) {
        warn!(asset = %asset, "No price in the feed");
    }

    snapshot
}

#[async_trait]
impl CryptoRateProvider for CoinGeckoProvider {
    #[instrument(
        name = "CoinGeckoPriceFetch",
        skip(self, assets),
        fields(assets = assets.len())
    )]
    async fn fetch_crypto_rates(
        &self,
        assets: &BTreeSet<CryptoAsset>,
        usd_to_myr_rate: f64,
    ) -> Result<CryptoRateSnapshot> {
        let ids = assets
            .iter()
            .map(|asset| asset.feed_id())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd&include_last_updated_at=true",
            self.base_url, ids
        );
        debug!("Requesting crypto prices from {}", url);

        let client = reqwest::Client::builder().user_agent("kira/0.1").build()?;
        let response = client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                upstream: UPSTREAM,
                source,
            })?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                upstream: UPSTREAM,
                status: response.status(),
            }
            .into());
        }

        let text = response.text().await.map_err(|source| UpstreamError::Request {
            upstream: UPSTREAM,
            source,
        })?;
        let prices: SimplePriceResponse =
            serde_json::from_str(&text).map_err(|e| UpstreamError::Malformed {
                upstream: UPSTREAM,
                reason: e.to_string(),
            })?;

        let snapshot = build_snapshot(&prices, assets, usd_to_myr_rate);
        debug!(quotes = snapshot.len(), "Received crypto prices");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(ids: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(query_param("ids", ids))
            .and(query_param("vs_currencies", "usd"))
            .and(query_param("include_last_updated_at", "true"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn all_assets() -> BTreeSet<CryptoAsset> {
        CryptoAsset::ALL.into_iter().collect()
    }

    #[tokio::test]
    async fn test_successful_price_fetch() {
        let body = r#"{
            "bitcoin": {"usd": 65000, "last_updated_at": 1742460000},
            "ethereum": {"usd": 3500.5, "last_updated_at": 1742460001},
            "solana": {"usd": 150.25, "last_updated_at": 1742460002},
            "hyperliquid": {"usd": 14.2, "last_updated_at": 1742460003}
        }"#;
        let mock_server =
            create_mock_server("bitcoin,ethereum,solana,hyperliquid", 200, body).await;
        let provider = CoinGeckoProvider::new(&mock_server.uri());

        let snapshot = provider
            .fetch_crypto_rates(&all_assets(), 4.0)
            .await
            .unwrap();

        assert_eq!(snapshot.len(), 4);
        let btc = snapshot.get(CryptoAsset::Btc).unwrap();
        assert_eq!(btc.usd, 65000.0);
        assert_eq!(btc.myr, 260000.0);
        assert_eq!(btc.last_updated_at, Some(1742460000));
        assert_eq!(snapshot.get(CryptoAsset::Hlq).unwrap().usd, 14.2);
    }

    #[tokio::test]
    async fn test_missing_hlq_gets_fallback_quote() {
        let body = r#"{
            "bitcoin": {"usd": 65000, "last_updated_at": 1742460000},
            "ethereum": {"usd": 3500, "last_updated_at": 1742460001},
            "solana": {"usd": 150, "last_updated_at": 1742460002}
        }"#;
        let mock_server =
            create_mock_server("bitcoin,ethereum,solana,hyperliquid", 200, body).await;
        let provider = CoinGeckoProvider::new(&mock_server.uri());
        let rate = 4.4415;

        let before = Utc::now().timestamp();
        let snapshot = provider
            .fetch_crypto_rates(&all_assets(), rate)
            .await
            .unwrap();

        let hlq = snapshot.get(CryptoAsset::Hlq).unwrap();
        assert_eq!(hlq.usd, 1.25);
        assert_eq!(hlq.myr, 1.25 * rate);
        assert!(hlq.last_updated_at.unwrap() >= before);
    }

    #[tokio::test]
    async fn test_missing_asset_without_fallback_is_absent() {
        let body = r#"{"bitcoin": {"usd": 65000}, "solana": {}}"#;
        let mock_server = create_mock_server("bitcoin,solana", 200, body).await;
        let provider = CoinGeckoProvider::new(&mock_server.uri());
        let assets = [CryptoAsset::Btc, CryptoAsset::Sol].into_iter().collect();

        let snapshot = provider.fetch_crypto_rates(&assets, 4.65).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains(CryptoAsset::Btc));
        assert!(!snapshot.contains(CryptoAsset::Sol));
        assert!(!snapshot.contains(CryptoAsset::Hlq));
    }

    #[tokio::test]
    async fn test_error_status() {
        let mock_server = create_mock_server("bitcoin", 429, "").await;
        let provider = CoinGeckoProvider::new(&mock_server.uri());
        let assets = [CryptoAsset::Btc].into_iter().collect();

        let err = provider
            .fetch_crypto_rates(&assets, 4.65)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "CoinGecko API responded with status: 429 Too Many Requests"
        );
        assert!(matches!(
            err.downcast_ref::<UpstreamError>(),
            Some(UpstreamError::Status { .. })
        ));
    }

    #[test]
    fn test_build_snapshot_ignores_unrequested_ids() {
        let prices: SimplePriceResponse = serde_json::from_str(
            r#"{"bitcoin": {"usd": 2.0}, "dogecoin": {"usd": 0.1}, "ethereum": {"usd": 3.0}}"#,
        )
        .unwrap();
        let assets = [CryptoAsset::Eth].into_iter().collect();

        let snapshot = build_snapshot(&prices, &assets, 4.5);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(CryptoAsset::Eth).unwrap().myr, 13.5);
    }
}
