use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

/// Longest day window accepted anywhere a number of days is configurable.
pub const MAX_DAYS: i64 = 3_650;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ExchangeSettings {
    pub base_url: String,
    pub credentials: Option<ApiCredentials>,
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub cache_ttl: Duration,
    pub page_refresh: Duration,
    pub status_poll: Duration,
    pub trade_lookback_days: i64,
    pub portfolio_history: i64,
    pub recent_logs: i64,
    pub recent_reflections: i64,
    pub performance_days: i64,
    pub currency_symbol: String,
    pub exchange: ExchangeSettings,
}

impl Settings {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let credentials = match (get("EXCHANGE_API_KEY"), get("EXCHANGE_SECRET_KEY")) {
            (Some(api_key), Some(secret_key)) => Some(ApiCredentials { api_key, secret_key }),
            _ => None,
        };

        Ok(Self {
            db_path: PathBuf::from(text("JOURNAL_DB_PATH", "trading_enhanced.db")),
            bind: parsed(&get, "DASHBOARD_BIND", SocketAddr::from(([127, 0, 0, 1], 8501)))?,
            cache_ttl: seconds(&get, "DASHBOARD_CACHE_TTL_SECS", 300)?,
            page_refresh: seconds(&get, "DASHBOARD_REFRESH_SECS", 60)?,
            status_poll: seconds(&get, "STATUS_POLL_SECS", 30)?,
            trade_lookback_days: days(&get, "DASHBOARD_TRADE_LOOKBACK_DAYS", 365)?,
            portfolio_history: positive(&get, "DASHBOARD_PORTFOLIO_HISTORY", 100)?,
            recent_logs: positive(&get, "DASHBOARD_RECENT_LOGS", 10)?,
            recent_reflections: positive(&get, "DASHBOARD_RECENT_REFLECTIONS", 5)?,
            performance_days: days(&get, "DASHBOARD_PERFORMANCE_DAYS", 7)?,
            currency_symbol: text("CURRENCY_SYMBOL", "₩"),
            exchange: ExchangeSettings {
                base_url: text("EXCHANGE_BASE_URL", "https://api.binance.com")
                    .trim_end_matches('/')
                    .to_string(),
                credentials,
                symbol: text("TRADING_SYMBOL", "BTCKRW").to_uppercase(),
                base_asset: text("BASE_ASSET", "BTC").to_uppercase(),
                quote_asset: text("QUOTE_ASSET", "KRW").to_uppercase(),
            },
        })
    }

    pub fn demo_mode(&self) -> bool {
        self.exchange.credentials.is_none()
    }
}

fn parsed<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn positive<G>(get: &G, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = parsed(get, key, default)?;
    if value <= 0 {
        return Err(ConfigError::Zero { key });
    }
    Ok(value)
}

fn days<G>(get: &G, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = positive(get, key, default)?;
    if value > MAX_DAYS {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: format!("at most {MAX_DAYS} days"),
        });
    }
    Ok(value)
}

fn seconds<G>(get: &G, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = parsed(get, key, default)?;
    if value == 0 {
        return Err(ConfigError::Zero { key });
    }
    Ok(Duration::from_secs(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_run_in_demo_mode() {
        let s = settings(&[]).unwrap();
        assert!(s.demo_mode());
        assert_eq!(s.db_path, PathBuf::from("trading_enhanced.db"));
        assert_eq!(s.bind.port(), 8501);
        assert_eq!(s.cache_ttl, Duration::from_secs(300));
        assert_eq!(s.trade_lookback_days, 365);
        assert_eq!(s.portfolio_history, 100);
        assert_eq!(s.exchange.symbol, "BTCKRW");
        assert_eq!(s.currency_symbol, "₩");
    }

    #[test]
    fn credentials_need_both_halves() {
        let s = settings(&[("EXCHANGE_API_KEY", "key")]).unwrap();
        assert!(s.demo_mode());

        let s = settings(&[("EXCHANGE_API_KEY", "key"), ("EXCHANGE_SECRET_KEY", "  ")]).unwrap();
        assert!(s.demo_mode());

        let s = settings(&[("EXCHANGE_API_KEY", "key"), ("EXCHANGE_SECRET_KEY", "secret")]).unwrap();
        assert!(!s.demo_mode());
    }

    #[test]
    fn invalid_numbers_name_the_key() {
        let err = settings(&[("DASHBOARD_CACHE_TTL_SECS", "five")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DASHBOARD_CACHE_TTL_SECS", .. }));

        let err = settings(&[("DASHBOARD_BIND", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DASHBOARD_BIND", .. }));
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(
            settings(&[("STATUS_POLL_SECS", "0")]).unwrap_err(),
            ConfigError::Zero { key: "STATUS_POLL_SECS" }
        );
        assert_eq!(
            settings(&[("DASHBOARD_RECENT_LOGS", "-3")]).unwrap_err(),
            ConfigError::Zero { key: "DASHBOARD_RECENT_LOGS" }
        );
    }

    #[test]
    fn day_windows_are_capped() {
        let err = settings(&[("DASHBOARD_TRADE_LOOKBACK_DAYS", "200000000")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DASHBOARD_TRADE_LOOKBACK_DAYS", .. }));

        let err = settings(&[("DASHBOARD_PERFORMANCE_DAYS", "3651")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DASHBOARD_PERFORMANCE_DAYS", .. }));

        let s = settings(&[("DASHBOARD_PERFORMANCE_DAYS", "3650")]).unwrap();
        assert_eq!(s.performance_days, MAX_DAYS);
    }

    #[test]
    fn normalises_exchange_fields() {
        let s = settings(&[
            ("EXCHANGE_BASE_URL", "https://testnet.binance.vision/"),
            ("TRADING_SYMBOL", "btcusdt"),
            ("QUOTE_ASSET", "usdt"),
        ])
        .unwrap();
        assert_eq!(s.exchange.base_url, "https://testnet.binance.vision");
        assert_eq!(s.exchange.symbol, "BTCUSDT");
        assert_eq!(s.exchange.quote_asset, "USDT");
    }
}
