use std::collections::BTreeSet;
use std::sync::Arc;

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::core::currency::CryptoAsset;
use crate::core::rates::{CryptoRateSnapshot, FiatRateMeta, FiatRateSnapshot};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Serialize)]
struct ExchangeRateResponse {
    data: FiatRateSnapshot,
    meta: FiatRateMeta,
}

async fn get_exchange_rate(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let rate = state.fiat_provider.fetch_fiat_rate().await.map_err(|e| {
        error!(error = %e, "Error fetching exchange rate");
        ApiError::ExchangeRate(e)
    })?;

    Ok((
        [(header::CACHE_CONTROL, "public, s-maxage=3600")],
        Json(ExchangeRateResponse {
            data: rate.snapshot,
            meta: rate.meta,
        }),
    ))
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct CryptoQuery {
    ids: Option<String>,
    usd_to_myr_rate: Option<String>,
}

#[derive(Serialize)]
struct CryptoResponse {
    data: CryptoRateSnapshot,
    success: bool,
}

/// Resolves the `ids` parameter. Absent or blank means every asset; unknown
/// ids are skipped.
fn parse_asset_ids(ids: Option<&str>) -> ApiResult<BTreeSet<CryptoAsset>> {
    let ids = match ids.map(str::trim) {
        Some(ids) if !ids.is_empty() => ids,
        _ => return Ok(CryptoAsset::ALL.into_iter().collect()),
    };

    let assets: BTreeSet<CryptoAsset> = ids
        .split(',')
        .filter(|id| !id.trim().is_empty())
        .filter_map(|id| match id.parse() {
            Ok(asset) => Some(asset),
            Err(_) => {
                warn!(id = %id, "Skipping unsupported asset id");
                None
            }
        })
        .collect();

    if assets.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "No supported asset ids in: {ids}"
        )));
    }
    Ok(assets)
}

/// Parses `usdToMyrRate`, falling back when it is missing or unusable.
fn parse_usd_to_myr_rate(rate: Option<&str>, fallback: f64) -> f64 {
    rate.and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(fallback)
}

async fn get_crypto(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CryptoQuery>,
) -> ApiResult<impl IntoResponse> {
    let assets = parse_asset_ids(query.ids.as_deref())?;
    let usd_to_myr_rate = parse_usd_to_myr_rate(
        query.usd_to_myr_rate.as_deref(),
        state.config.fallback_usd_to_myr_rate,
    );

    let data = state
        .crypto_provider
        .fetch_crypto_rates(&assets, usd_to_myr_rate)
        .await
        .map_err(|e| {
            error!(error = %e, "Error fetching cryptocurrency data");
            ApiError::Crypto(e)
        })?;

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(CryptoResponse {
            data,
            success: true,
        }),
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exchange-rate", get(get_exchange_rate))
        .route("/crypto", get(get_crypto))
}
