//! Converter state as an immutable value and the reducer that advances it.
//!
//! Every user edit and every fetch outcome is an [`Action`]. [`reduce`]
//! never mutates its input; it returns the next state. Fetch outcomes carry
//! the generation of the refresh that produced them, and outcomes from an
//! older generation are dropped so a slow response cannot overwrite the
//! result of a newer refresh.

use crate::core::convert::{Conversion, convert};
use crate::core::currency::CurrencyRef;
use crate::core::rates::{CryptoRateSnapshot, FiatRateSnapshot};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ConverterState {
    pub amount: f64,
    pub from: CurrencyRef,
    pub to: CurrencyRef,
    pub fiat: Option<Arc<FiatRateSnapshot>>,
    pub crypto: Option<Arc<CryptoRateSnapshot>>,
    pub generation: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ConverterState {
    fn default() -> Self {
        ConverterState::new(600.0, CurrencyRef::MYR, CurrencyRef::USD)
    }
}

impl ConverterState {
    pub fn new(amount: f64, from: CurrencyRef, to: CurrencyRef) -> Self {
        ConverterState {
            amount,
            from,
            to,
            fiat: None,
            crypto: None,
            generation: 0,
            loading: false,
            error: None,
        }
    }

    /// The converted amount for the current form values and snapshots.
    pub fn conversion(&self) -> Conversion {
        convert(
            self.amount,
            self.from,
            self.to,
            self.fiat.as_deref(),
            self.crypto.as_deref(),
        )
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Dropping stale refresh result"
            );
            return false;
        }
        true
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SetAmount(f64),
    SetFrom(CurrencyRef),
    SetTo(CurrencyRef),
    Swap,
    RefreshStarted,
    FiatLoaded {
        generation: u64,
        snapshot: Arc<FiatRateSnapshot>,
    },
    CryptoLoaded {
        generation: u64,
        snapshot: Arc<CryptoRateSnapshot>,
    },
    RefreshFailed {
        generation: u64,
        message: String,
    },
    RefreshFinished {
        generation: u64,
    },
}

pub fn reduce(state: &ConverterState, action: Action) -> ConverterState {
    let mut next = state.clone();
    match action {
        Action::SetAmount(amount) => next.amount = amount,
        Action::SetFrom(currency) => next.from = currency,
        Action::SetTo(currency) => next.to = currency,
        Action::Swap => std::mem::swap(&mut next.from, &mut next.to),
        Action::RefreshStarted => {
            next.generation += 1;
            next.loading = true;
            next.error = None;
        }
        Action::FiatLoaded {
            generation,
            snapshot,
        } => {
            if state.is_current(generation) {
                // Crypto MYR prices were derived from the previous fiat rate
                next.fiat = Some(snapshot);
                next.crypto = None;
            }
        }
        Action::CryptoLoaded {
            generation,
            snapshot,
        } => {
            if state.is_current(generation) {
                next.crypto = Some(snapshot);
            }
        }
        Action::RefreshFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) {
                next.error = Some(message);
            }
        }
        Action::RefreshFinished { generation } => {
            if state.is_current(generation) {
                next.loading = false;
            }
        }
    }
    next
}
