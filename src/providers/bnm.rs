use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::error::UpstreamError;
use crate::core::rates::{FiatRate, FiatRateMeta, FiatRateProvider, FiatRateSnapshot};

const UPSTREAM: &str = "BNM";
const ACCEPT: &str = "application/vnd.BNM.API.v1+json";

/// Bank Negara Malaysia exchange rates, quoted in ringgit.
pub struct BnmProvider {
    base_url: String,
    session: String,
    quote: String,
    currency_code: String,
}

impl BnmProvider {
    pub fn new(base_url: &str, session: &str, quote: &str) -> Self {
        BnmProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            session: session.to_string(),
            quote: quote.to_string(),
            currency_code: "USD".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct BnmExchangeRateResponse {
    data: Vec<FiatRateSnapshot>,
    #[serde(default)]
    meta: FiatRateMeta,
}

#[async_trait]
impl FiatRateProvider for BnmProvider {
    #[instrument(
        name = "BnmRateFetch",
        skip(self),
        fields(currency = %self.currency_code)
    )]
    async fn fetch_fiat_rate(&self) -> Result<FiatRate> {
        let url = format!(
            "{}/public/exchange-rate?session={}&quote={}",
            self.base_url, self.session, self.quote
        );
        debug!("Requesting exchange rate from {}", url);

        let client = reqwest::Client::builder().user_agent("kira/0.1").build()?;
        let response = client
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
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
        let data: BnmExchangeRateResponse =
            serde_json::from_str(&text).map_err(|e| UpstreamError::Malformed {
                upstream: UPSTREAM,
                reason: e.to_string(),
            })?;

        let snapshot = data
            .data
            .into_iter()
            .find(|record| record.currency_code == self.currency_code)
            .ok_or_else(|| UpstreamError::MissingRecord {
                upstream: UPSTREAM,
                record: format!("{} exchange rate", self.currency_code),
            })?;
        debug!(middle_rate = snapshot.middle_rate(), "Received BNM rate");

        Ok(FiatRate {
            snapshot,
            meta: data.meta,
        })
    }
}
