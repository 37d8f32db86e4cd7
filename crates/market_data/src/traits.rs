use std::collections::HashMap;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::error::ExchangeError;

pub trait RemoteResponse<T> {
    fn to_model(&self) -> Result<T, ExchangeError>;

    fn parse_number(field: &'static str, value: &str) -> Result<f64, ExchangeError>
    where
        Self: Sized,
    {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| ExchangeError::InvalidNumber {
                field,
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssetBalance {
    pub free: f64,
    pub locked: f64,
}

impl AssetBalance {
    pub fn total(&self) -> f64 {
        self.free + self.locked
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountBalances {
    pub can_trade: bool,
    pub assets: HashMap<String, AssetBalance>,
}

impl AccountBalances {
    /// Free plus locked amount of `asset`, zero when the account never held it.
    pub fn total(&self, asset: &str) -> f64 {
        self.assets
            .get(&asset.to_uppercase())
            .map(AssetBalance::total)
            .unwrap_or(0.0)
    }
}

/// The slice of an exchange the dashboard reads from.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Whether signed account endpoints can be called.
    fn has_credentials(&self) -> bool;

    async fn ping(&self) -> Result<(), ExchangeError>;

    async fn ticker_price(&self, symbol: &str) -> Result<f64, ExchangeError>;

    async fn account_balances(&self) -> Result<AccountBalances, ExchangeError>;
}
