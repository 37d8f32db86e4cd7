use chrono::Utc;
use common::models::{ConnectionState, SystemStatus};
use tracing::{debug, warn};

use crate::traits::ExchangeApi;

/// Probes the market-data endpoint and, when credentials exist, the account endpoint.
pub async fn check_status(exchange: Option<&dyn ExchangeApi>) -> SystemStatus {
    let Some(exchange) = exchange else {
        return SystemStatus {
            market_feed: ConnectionState::NotConfigured,
            account: ConnectionState::NotConfigured,
            last_checked: Some(Utc::now()),
        };
    };

    let market_feed = match exchange.ping().await {
        Ok(()) => ConnectionState::Connected,
        Err(e) => {
            warn!("Market data feed unreachable: {}", e);
            ConnectionState::Disconnected(e.to_string())
        }
    };

    let account = if !exchange.has_credentials() {
        ConnectionState::NotConfigured
    } else {
        match exchange.account_balances().await {
            Ok(_) => ConnectionState::Connected,
            Err(e) => {
                warn!("Exchange account unreachable: {}", e);
                ConnectionState::Disconnected(e.to_string())
            }
        }
    };

    debug!(
        "Status check: feed {}, account {}",
        market_feed.label(),
        account.label()
    );

    SystemStatus {
        market_feed,
        account,
        last_checked: Some(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExchangeError;
    use crate::traits::{AccountBalances, MockExchangeApi};

    #[tokio::test]
    async fn without_exchange_nothing_is_configured() {
        let status = check_status(None).await;
        assert_eq!(status.market_feed, ConnectionState::NotConfigured);
        assert_eq!(status.account, ConnectionState::NotConfigured);
        assert!(status.last_checked.is_some());
    }

    #[tokio::test]
    async fn demo_mode_skips_account_probe() {
        let mut mock = MockExchangeApi::new();
        mock.expect_ping().times(1).returning(|| Ok(()));
        mock.expect_has_credentials().return_const(false);
        mock.expect_account_balances().never();

        let status = check_status(Some(&mock as &dyn ExchangeApi)).await;
        assert_eq!(status.market_feed, ConnectionState::Connected);
        assert_eq!(status.account, ConnectionState::NotConfigured);
        assert!(status.is_demo());
    }

    #[tokio::test]
    async fn failures_carry_the_reason() {
        let mut mock = MockExchangeApi::new();
        mock.expect_ping().returning(|| {
            Err(ExchangeError::Api {
                status: 503,
                body: "maintenance".into(),
            })
        });
        mock.expect_has_credentials().return_const(true);
        mock.expect_account_balances()
            .returning(|| Ok(AccountBalances::default()));

        let status = check_status(Some(&mock as &dyn ExchangeApi)).await;
        match status.market_feed {
            ConnectionState::Disconnected(reason) => assert!(reason.contains("maintenance")),
            other => panic!("unexpected feed state {other:?}"),
        }
        assert_eq!(status.account, ConnectionState::Connected);
    }
}
