use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::{AccountBalances, AssetBalance, RemoteResponse};

#[derive(Debug, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountInformation {
    pub balances: Vec<Balance>,
    #[serde(rename = "canTrade")]
    pub can_trade: bool,
}

impl RemoteResponse<AccountBalances> for AccountInformation {
    fn to_model(&self) -> Result<AccountBalances, ExchangeError> {
        let mut assets = std::collections::HashMap::with_capacity(self.balances.len());
        for b in &self.balances {
            let balance = AssetBalance {
                free: Self::parse_number("free", &b.free)?,
                locked: Self::parse_number("locked", &b.locked)?,
            };
            assets.insert(b.asset.to_uppercase(), balance);
        }

        Ok(AccountBalances {
            can_trade: self.can_trade,
            assets,
        })
    }
}
