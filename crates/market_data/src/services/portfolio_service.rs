use std::sync::Arc;

use chrono::Utc;
use common::config::ExchangeSettings;
use common::models::{LivePortfolio, PortfolioSource};
use reporting::cost_basis;
use storage::repositories::{AnalysisLogRepository, PortfolioRepository, TradeRepository};
use storage::{Journal, StorageError};
use tracing::{debug, warn};

use crate::traits::ExchangeApi;

/// Builds the portfolio panel: live balances when the exchange account is
/// reachable, otherwise the journal's latest daily snapshot.
pub struct PortfolioService {
    exchange: Option<Arc<dyn ExchangeApi>>,
    journal: Journal,
    settings: ExchangeSettings,
}

impl PortfolioService {
    pub fn new(
        exchange: Option<Arc<dyn ExchangeApi>>,
        journal: Journal,
        settings: ExchangeSettings,
    ) -> Self {
        Self {
            exchange,
            journal,
            settings,
        }
    }

    pub async fn live_portfolio(&self) -> Result<Option<LivePortfolio>, StorageError> {
        let portfolio = match self.from_exchange().await? {
            Some(p) => Some(p),
            None => self.from_journal().await?,
        };

        let Some(portfolio) = portfolio else {
            return Ok(None);
        };

        let trades = TradeRepository::get_all_successful(self.journal.pool()).await?;
        Ok(Some(portfolio.with_cost_basis(cost_basis(&trades))))
    }

    async fn from_exchange(&self) -> Result<Option<LivePortfolio>, StorageError> {
        let Some(exchange) = self.exchange.as_ref().filter(|e| e.has_credentials()) else {
            return Ok(None);
        };

        let balances = match exchange.account_balances().await {
            Ok(balances) => balances,
            Err(e) => {
                warn!("Falling back to journal portfolio: {}", e);
                return Ok(None);
            }
        };

        // Balances are still live when the symbol has no ticker on this exchange.
        let price = match self.public_price().await {
            Some(price) => price,
            None => self.journal_price().await?.unwrap_or_else(|| {
                warn!("No price for {}, valuing holdings at zero", self.settings.symbol);
                0.0
            }),
        };

        let base_balance = balances.total(&self.settings.base_asset);
        let quote_balance = balances.total(&self.settings.quote_asset);
        let base_value = base_balance * price;

        debug!(
            "Live portfolio: {} {} + {} {} @ {}",
            base_balance, self.settings.base_asset, quote_balance, self.settings.quote_asset, price
        );

        Ok(Some(LivePortfolio {
            source: PortfolioSource::Exchange,
            base_asset: self.settings.base_asset.clone(),
            quote_asset: self.settings.quote_asset.clone(),
            price,
            base_balance,
            quote_balance,
            base_value,
            total_value: quote_balance + base_value,
            avg_cost: None,
            return_pct: None,
            as_of: Utc::now(),
        }))
    }

    async fn from_journal(&self) -> Result<Option<LivePortfolio>, StorageError> {
        let Some(snapshot) = PortfolioRepository::get_latest(self.journal.pool()).await? else {
            return Ok(None);
        };

        let price = match self.public_price().await {
            Some(price) => price,
            None => self
                .journal_price()
                .await?
                .unwrap_or(snapshot.base_avg_price),
        };

        let base_value = snapshot.base_balance * price;
        Ok(Some(LivePortfolio {
            source: PortfolioSource::Journal,
            base_asset: self.settings.base_asset.clone(),
            quote_asset: self.settings.quote_asset.clone(),
            price,
            base_balance: snapshot.base_balance,
            quote_balance: snapshot.quote_balance,
            base_value,
            total_value: snapshot.quote_balance + base_value,
            avg_cost: None,
            return_pct: None,
            as_of: snapshot.date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc(),
        }))
    }

    /// Latest logged price, then the latest snapshot's average price.
    async fn journal_price(&self) -> Result<Option<f64>, StorageError> {
        let pool = self.journal.pool();
        let logged = AnalysisLogRepository::get_recent(pool, 1)
            .await?
            .first()
            .map(|log| log.current_price)
            .filter(|p| *p > 0.0);
        if logged.is_some() {
            return Ok(logged);
        }

        Ok(PortfolioRepository::get_latest(pool)
            .await?
            .map(|s| s.base_avg_price)
            .filter(|p| *p > 0.0))
    }

    /// Ticker endpoints need no credentials, so demo mode can still show a live price.
    async fn public_price(&self) -> Option<f64> {
        let exchange = self.exchange.as_ref()?;
        match exchange.ticker_price(&self.settings.symbol).await {
            Ok(price) if price > 0.0 => Some(price),
            Ok(_) => None,
            Err(e) => {
                debug!("No public price for {}: {}", self.settings.symbol, e);
                None
            }
        }
    }
}
