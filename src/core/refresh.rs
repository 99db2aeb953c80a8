//! One refresh cycle: the fiat rate first, then crypto prices derived with it.

use crate::core::currency::CryptoAsset;
use crate::core::rates::{CryptoRateProvider, FiatRateProvider};
use crate::core::state::{Action, ConverterState, reduce};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs a refresh against `state` and returns the resulting state.
///
/// A fiat failure ends the cycle with no new snapshots. A crypto failure
/// keeps the fresh fiat snapshot, so fiat pairs still convert.
pub async fn refresh(
    state: &ConverterState,
    fiat_provider: &(dyn FiatRateProvider + Send + Sync),
    crypto_provider: &(dyn CryptoRateProvider + Send + Sync),
    assets: &BTreeSet<CryptoAsset>,
) -> ConverterState {
    let mut state = reduce(state, Action::RefreshStarted);
    let generation = state.generation;
    debug!(generation, "Refreshing rates");

    for action in fetch_actions(generation, fiat_provider, crypto_provider, assets).await {
        state = reduce(&state, action);
    }

    reduce(&state, Action::RefreshFinished { generation })
}

async fn fetch_actions(
    generation: u64,
    fiat_provider: &(dyn FiatRateProvider + Send + Sync),
    crypto_provider: &(dyn CryptoRateProvider + Send + Sync),
    assets: &BTreeSet<CryptoAsset>,
) -> Vec<Action> {
    let mut actions = Vec::new();

    let fiat = match fiat_provider.fetch_fiat_rate().await {
        Ok(rate) => Arc::new(rate.snapshot),
        Err(e) => {
            error!(error = %e, "Failed to fetch exchange rate");
            actions.push(Action::RefreshFailed {
                generation,
                message: format!("Failed to fetch exchange rate: {e}"),
            });
            return actions;
        }
    };
    let usd_to_myr_rate = fiat.middle_rate();
    actions.push(Action::FiatLoaded {
        generation,
        snapshot: fiat,
    });

    let action = match crypto_provider
        .fetch_crypto_rates(assets, usd_to_myr_rate)
        .await
    {
        Ok(snapshot) => Action::CryptoLoaded {
            generation,
            snapshot: Arc::new(snapshot),
        },
        Err(e) => {
            error!(error = %e, "Failed to fetch crypto prices");
            Action::RefreshFailed {
                generation,
                message: format!("Failed to fetch cryptocurrency data: {e}"),
            }
        }
    };
    actions.push(action);
    actions
}
