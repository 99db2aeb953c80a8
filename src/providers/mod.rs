pub mod bnm;
pub mod coingecko;

pub use bnm::BnmProvider;
pub use coingecko::CoinGeckoProvider;
