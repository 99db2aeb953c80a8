use super::ui;
use crate::core::currency::CryptoAsset;
use crate::core::rates::{
    CryptoRateProvider, CryptoRateSnapshot, FiatRateProvider, FiatRateSnapshot,
};
use crate::core::refresh::refresh;
use crate::core::state::ConverterState;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use comfy_table::Cell;
use std::collections::BTreeSet;

fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn display_fiat_rate(fiat: &FiatRateSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Unit"),
        ui::header_cell("Buying (MYR)"),
        ui::header_cell("Middle (MYR)"),
        ui::header_cell("Selling (MYR)"),
    ]);
    table.add_row(vec![
        Cell::new(&fiat.currency_code),
        ui::format_optional_cell(Some(fiat.unit), |u| format!("{u}")),
        ui::format_optional_cell(Some(fiat.rate.buying_rate), |r| format!("{r:.4}")),
        ui::format_optional_cell(Some(fiat.rate.middle_rate), |r| format!("{r:.4}")),
        ui::format_optional_cell(Some(fiat.rate.selling_rate), |r| format!("{r:.4}")),
    ]);

    format!(
        "{} {}\n\n{}",
        ui::style_text("Exchange rate", ui::StyleType::Title),
        ui::style_text(&format!("({})", fiat.rate.date), ui::StyleType::Subtle),
        table
    )
}

/// Lists every asset, including those the snapshot has no price for.
pub fn display_crypto_rates(
    crypto: &CryptoRateSnapshot,
    assets: &BTreeSet<CryptoAsset>,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Price (USD)"),
        ui::header_cell("Price (MYR)"),
        ui::header_cell("Updated"),
    ]);

    for asset in assets {
        let quote = crypto.get(*asset);
        table.add_row(vec![
            Cell::new(asset.symbol()),
            ui::format_optional_cell(quote.map(|q| q.usd), |p| format!("{p:.2}")),
            ui::format_optional_cell(quote.map(|q| q.myr), |p| format!("{p:.2}")),
            ui::format_optional_cell(quote.and_then(|q| q.last_updated_at), format_timestamp),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Crypto prices", ui::StyleType::Title),
        table
    )
}

pub fn display_rates(state: &ConverterState, assets: &BTreeSet<CryptoAsset>) -> String {
    let mut sections = Vec::new();
    if let Some(fiat) = &state.fiat {
        sections.push(display_fiat_rate(fiat));
    }
    if let Some(crypto) = &state.crypto {
        sections.push(display_crypto_rates(crypto, assets));
    }
    if let Some(error) = &state.error {
        sections.push(ui::style_text(error, ui::StyleType::Error));
    }
    sections.join("\n\n")
}

pub async fn run(
    fiat_provider: &(dyn FiatRateProvider + Send + Sync),
    crypto_provider: &(dyn CryptoRateProvider + Send + Sync),
) -> Result<()> {
    let assets: BTreeSet<CryptoAsset> = CryptoAsset::ALL.into_iter().collect();

    let pb = ui::new_spinner("Fetching rates...");
    let state = refresh(
        &ConverterState::default(),
        fiat_provider,
        crypto_provider,
        &assets,
    )
    .await;
    pb.finish_and_clear();

    println!("{}", display_rates(&state, &assets));

    match (&state.error, &state.fiat) {
        (Some(error), None) => Err(anyhow!("{error}")),
        _ => Ok(()),
    }
}
