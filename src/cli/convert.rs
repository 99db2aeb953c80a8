use super::ui;
use crate::core::currency::{CryptoAsset, CurrencyRef};
use crate::core::rates::{CryptoRateProvider, FiatRateProvider};
use crate::core::refresh::refresh;
use crate::core::state::ConverterState;
use anyhow::{Result, anyhow};
use std::collections::BTreeSet;

impl ConverterState {
    /// Renders the conversion line. An unavailable conversion leaves the
    /// value blank. Without an exchange rate only the error is shown.
    pub fn display_conversion(&self) -> String {
        if let (None, Some(error)) = (&self.fiat, &self.error) {
            return ui::style_text(error, ui::StyleType::Error);
        }

        let conversion = self.conversion();
        let value_style = if conversion.is_available() {
            ui::StyleType::Value
        } else {
            ui::StyleType::Subtle
        };

        let mut output = format!(
            "{} {} = {} {}",
            self.amount,
            ui::style_text(self.from.symbol(), ui::StyleType::Label),
            ui::style_text(&conversion.display_in(self.to), value_style),
            ui::style_text(self.to.symbol(), ui::StyleType::Label),
        );

        if let Some(fiat) = &self.fiat {
            output.push_str(&ui::style_text(
                &format!(
                    "\n1 USD = {} MYR (mid-market, {})",
                    fiat.middle_rate(),
                    fiat.rate.date
                ),
                ui::StyleType::Subtle,
            ));
        }

        if let Some(error) = &self.error {
            output.push_str(&format!("\n{}", ui::style_text(error, ui::StyleType::Error)));
        }

        output
    }
}

pub async fn run(
    amount: f64,
    from: CurrencyRef,
    to: CurrencyRef,
    fiat_provider: &(dyn FiatRateProvider + Send + Sync),
    crypto_provider: &(dyn CryptoRateProvider + Send + Sync),
) -> Result<()> {
    let assets: BTreeSet<CryptoAsset> = CryptoAsset::ALL.into_iter().collect();
    let state = ConverterState::new(amount, from, to);

    let pb = ui::new_spinner("Fetching rates...");
    let state = refresh(&state, fiat_provider, crypto_provider, &assets).await;
    pb.finish_and_clear();

    println!("{}", state.display_conversion());

    match (&state.error, state.conversion().is_available()) {
        (Some(error), false) => Err(anyhow!("{error}")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{FiatRateSnapshot, RateQuote};
    use crate::core::state::{Action, reduce};
    use std::sync::Arc;

    fn loaded_state(amount: f64, from: CurrencyRef, to: CurrencyRef) -> ConverterState {
        let state = reduce(&ConverterState::new(amount, from, to), Action::RefreshStarted);
        let generation = state.generation;
        reduce(
            &state,
            Action::FiatLoaded {
                generation,
                snapshot: Arc::new(FiatRateSnapshot {
                    currency_code: "USD".to_string(),
                    unit: 1.0,
                    rate: RateQuote {
                        date: "2025-03-20".to_string(),
                        buying_rate: 4.63,
                        selling_rate: 4.67,
                        middle_rate: 4.65,
                    },
                }),
            },
        )
    }

    #[test]
    fn test_display_conversion() {
        console::set_colors_enabled(false);
        let state = loaded_state(600.0, CurrencyRef::MYR, CurrencyRef::USD);

        let output = state.display_conversion();
        assert!(output.starts_with("600 MYR = 129.03 USD"));
        assert!(output.contains("1 USD = 4.65 MYR (mid-market, 2025-03-20)"));
    }

    #[test]
    fn test_display_unavailable_conversion_is_blank() {
        console::set_colors_enabled(false);
        let state = loaded_state(1.0, CurrencyRef::USD, CurrencyRef::Crypto(CryptoAsset::Btc));
        let state = reduce(
            &state,
            Action::RefreshFailed {
                generation: state.generation,
                message: "Failed to fetch cryptocurrency data".to_string(),
            },
        );

        let output = state.display_conversion();
        assert!(output.starts_with("1 USD =  BTC"));
        assert!(output.ends_with("Failed to fetch cryptocurrency data"));
    }

    #[test]
    fn test_display_uses_fixed_precision_of_target() {
        console::set_colors_enabled(false);
        let state = loaded_state(600.0, CurrencyRef::USD, CurrencyRef::MYR);
        assert!(state.display_conversion().starts_with("600 USD = 2790.00 MYR"));
    }

    #[test]
    fn test_display_without_exchange_rate_shows_only_error() {
        console::set_colors_enabled(false);
        let state = reduce(&ConverterState::default(), Action::RefreshStarted);
        let state = reduce(
            &state,
            Action::RefreshFailed {
                generation: state.generation,
                message: "Failed to fetch exchange rate: timeout".to_string(),
            },
        );

        assert_eq!(
            state.display_conversion(),
            "Failed to fetch exchange rate: timeout"
        );
    }
}
