//! HTTP API serving the rate endpoints the converter reads from.

pub mod error;
pub mod rates;

use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::rates::{CryptoRateProvider, FiatRateProvider};
use crate::providers::{BnmProvider, CoinGeckoProvider};
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct AppState {
    pub config: AppConfig,
    pub fiat_provider: Arc<dyn FiatRateProvider>,
    pub crypto_provider: Arc<dyn CryptoRateProvider>,
}

impl AppState {
    /// Builds the state with the upstream providers named in `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let bnm = config.providers.bnm();
        let coingecko = config.providers.coingecko();
        AppState {
            fiat_provider: Arc::new(BnmProvider::new(&bnm.base_url, &bnm.session, &bnm.quote)),
            crypto_provider: Arc::new(CoinGeckoProvider::new(&coingecko.base_url)),
            config,
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", rates::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: AppConfig, bind: Option<&str>) -> Result<()> {
    let addr = bind.unwrap_or(&config.server.bind).to_string();
    let state = Arc::new(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")
}
