//! The conversion engine: a pure function over the latest rate snapshots.

use crate::core::currency::{CryptoAsset, CurrencyRef, FiatCode};
use crate::core::rates::{CryptoQuote, CryptoRateSnapshot, FiatRateSnapshot};
use serde::Serialize;

/// Decimal places kept for amounts denominated in fiat.
pub const FIAT_DECIMALS: i32 = 2;
/// Decimal places kept for amounts denominated in crypto.
pub const CRYPTO_DECIMALS: i32 = 8;

/// Result of a conversion. `Unavailable` is an expected outcome when the
/// snapshots needed for the pair have not been loaded, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Conversion {
    Amount(f64),
    Unavailable,
}

impl Conversion {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Conversion::Amount(value) => Some(*value),
            Conversion::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Conversion::Amount(_))
    }

    /// Renders the amount with the fixed precision of `to`, or nothing at
    /// all when unavailable.
    pub fn display_in(&self, to: CurrencyRef) -> String {
        match self {
            Conversion::Amount(value) => format!("{:.*}", decimals_for(to) as usize, value),
            Conversion::Unavailable => String::new(),
        }
    }
}

/// Decimal places kept for amounts denominated in `currency`.
pub fn decimals_for(currency: CurrencyRef) -> i32 {
    match currency {
        CurrencyRef::Fiat(_) => FIAT_DECIMALS,
        CurrencyRef::Crypto(_) => CRYPTO_DECIMALS,
    }
}

impl From<Option<f64>> for Conversion {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Conversion::Amount(v),
            _ => Conversion::Unavailable,
        }
    }
}

/// Rounds the exact decimal value of `value` to `decimals` places, with
/// exact ties going away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    // A tie is an odd multiple of 2^-(decimals + 1); scaling by a power of
    // two is exact, and so is the decimal scaling below for such values.
    let halves = value.abs() * 2f64.powi(decimals + 1);
    if halves.fract() == 0.0 && halves % 2.0 == 1.0 {
        let factor = 10f64.powi(decimals);
        return (value * factor).round() / factor;
    }

    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

fn fiat_amount(value: f64) -> Option<f64> {
    Some(round_to(value, FIAT_DECIMALS))
}

fn crypto_amount(value: f64) -> Option<f64> {
    Some(round_to(value, CRYPTO_DECIMALS))
}

fn fiat_price(quote: &CryptoQuote, code: FiatCode) -> f64 {
    match code {
        FiatCode::Usd => quote.usd,
        FiatCode::Myr => quote.myr,
    }
}

fn quote(crypto: &CryptoRateSnapshot, asset: CryptoAsset) -> Option<&CryptoQuote> {
    crypto.get(asset)
}

/// Converts `amount` of `from` into `to`.
///
/// Fiat pairs use the fiat snapshot's middle rate; any pair with a crypto
/// side uses the crypto snapshot's USD or MYR price. Fiat-denominated
/// results keep 2 decimals and crypto-denominated results keep 8.
pub fn convert(
    amount: f64,
    from: CurrencyRef,
    to: CurrencyRef,
    fiat: Option<&FiatRateSnapshot>,
    crypto: Option<&CryptoRateSnapshot>,
) -> Conversion {
    let result = match (from, to) {
        (CurrencyRef::Fiat(from), CurrencyRef::Fiat(to)) => {
            fiat.and_then(|fiat| convert_fiat(amount, from, to, fiat))
        }
        (CurrencyRef::Crypto(asset), CurrencyRef::Fiat(code)) => crypto
            .and_then(|c| quote(c, asset))
            .and_then(|q| fiat_amount(amount * fiat_price(q, code))),
        (CurrencyRef::Fiat(code), CurrencyRef::Crypto(asset)) => crypto
            .and_then(|c| quote(c, asset))
            .and_then(|q| crypto_amount(amount / fiat_price(q, code))),
        (CurrencyRef::Crypto(from), CurrencyRef::Crypto(to)) => crypto.and_then(|c| {
            let usd_value = amount * quote(c, from)?.usd;
            crypto_amount(usd_value / quote(c, to)?.usd)
        }),
    };

    result.into()
}

fn convert_fiat(amount: f64, from: FiatCode, to: FiatCode, fiat: &FiatRateSnapshot) -> Option<f64> {
    let rate = fiat.middle_rate();
    match (from, to) {
        (FiatCode::Myr, FiatCode::Usd) => fiat_amount(amount / rate),
        (FiatCode::Usd, FiatCode::Myr) => fiat_amount(amount * rate),
        (FiatCode::Usd, FiatCode::Usd) | (FiatCode::Myr, FiatCode::Myr) => fiat_amount(amount),
    }
}
