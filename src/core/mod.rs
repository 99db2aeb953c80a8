//! Core conversion logic and abstractions

pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod log;
pub mod rates;
pub mod refresh;
pub mod state;

// Re-export main types for cleaner imports
pub use convert::{Conversion, convert};
pub use currency::{CryptoAsset, CurrencyKind, CurrencyRef, FiatCode, classify};
pub use error::UpstreamError;
pub use rates::{
    CryptoQuote, CryptoRateProvider, CryptoRateSnapshot, FiatRate, FiatRateMeta,
    FiatRateProvider, FiatRateSnapshot,
};
pub use state::{Action, ConverterState, reduce};
