use crate::core::currency::CurrencyRef;
use crate::core::rates::FALLBACK_USD_TO_MYR_RATE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BnmProviderConfig {
    pub base_url: String,
    #[serde(default = "default_bnm_session")]
    pub session: String,
    #[serde(default = "default_bnm_quote")]
    pub quote: String,
}

fn default_bnm_session() -> String {
    "0900".to_string()
}

fn default_bnm_quote() -> String {
    "rm".to_string()
}

impl Default for BnmProviderConfig {
    fn default() -> Self {
        BnmProviderConfig {
            base_url: "https://api.bnm.gov.my".to_string(),
            session: default_bnm_session(),
            quote: default_bnm_quote(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
}

impl Default for CoinGeckoProviderConfig {
    fn default() -> Self {
        CoinGeckoProviderConfig {
            base_url: "https://api.coingecko.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub bnm: Option<BnmProviderConfig>,
    pub coingecko: Option<CoinGeckoProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            bnm: Some(BnmProviderConfig::default()),
            coingecko: Some(CoinGeckoProviderConfig::default()),
        }
    }
}

impl ProvidersConfig {
    pub fn bnm(&self) -> BnmProviderConfig {
        self.bnm.clone().unwrap_or_default()
    }

    pub fn coingecko(&self) -> CoinGeckoProviderConfig {
        self.coingecko.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Initial converter form values.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultsConfig {
    pub amount: f64,
    pub from: CurrencyRef,
    pub to: CurrencyRef,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            amount: 600.0,
            from: CurrencyRef::MYR,
            to: CurrencyRef::USD,
        }
    }
}

fn default_fallback_rate() -> f64 {
    FALLBACK_USD_TO_MYR_RATE
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_fallback_rate")]
    pub fallback_usd_to_myr_rate: f64,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            server: ServerConfig::default(),
            fallback_usd_to_myr_rate: default_fallback_rate(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the built-in
    /// defaults when no config file has been set up.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("my", "kira", "kira")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CryptoAsset;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  bnm:
    base_url: "http://example.com/bnm"
  coingecko:
    base_url: "http://example.com/coingecko"
server:
  bind: "0.0.0.0:8080"
fallback_usd_to_myr_rate: 4.5
defaults:
  amount: 1.5
  from: btc
  to: MYR
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let bnm = config.providers.bnm();
        assert_eq!(bnm.base_url, "http://example.com/bnm");
        assert_eq!(bnm.session, "0900");
        assert_eq!(bnm.quote, "rm");
        assert_eq!(
            config.providers.coingecko().base_url,
            "http://example.com/coingecko"
        );
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.fallback_usd_to_myr_rate, 4.5);
        assert_eq!(config.defaults.amount, 1.5);
        assert_eq!(config.defaults.from, CurrencyRef::Crypto(CryptoAsset::Btc));
        assert_eq!(config.defaults.to, CurrencyRef::MYR);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.providers.bnm().base_url, "https://api.bnm.gov.my");
        assert_eq!(
            config.providers.coingecko().base_url,
            "https://api.coingecko.com"
        );
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.fallback_usd_to_myr_rate, 4.65);
        assert_eq!(config.defaults.amount, 600.0);
        assert_eq!(config.defaults.from, CurrencyRef::MYR);
        assert_eq!(config.defaults.to, CurrencyRef::USD);
    }

    #[test]
    fn test_unsupported_default_currency_fails() {
        let yaml_str = r#"
defaults:
  amount: 1
  from: EUR
  to: USD
"#;
        let result: Result<AppConfig, _> = serde_yaml::from_str(yaml_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from_path(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }
}
