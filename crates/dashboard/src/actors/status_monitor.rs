use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use common::actors::{Actor, ActorType, ControlMessage};
use market_data::ExchangeApi;
use market_data::services::{PortfolioService, check_status};
use tokio::{sync::mpsc, time};
use tracing::{info, warn};
use uuid::Uuid;

use crate::live::LiveState;

/// Polls the exchange for connection status and balances on a fixed interval.
pub struct StatusMonitor {
    id: Uuid,
    exchange: Option<Arc<dyn ExchangeApi>>,
    portfolio: Arc<PortfolioService>,
    live: Arc<LiveState>,
    poll_every: Duration,
}

impl StatusMonitor {
    pub fn new(
        exchange: Option<Arc<dyn ExchangeApi>>,
        portfolio: Arc<PortfolioService>,
        live: Arc<LiveState>,
        poll_every: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            exchange,
            portfolio,
            live,
            poll_every,
        }
    }

    pub async fn poll_once(&self) {
        let status = check_status(self.exchange.as_deref()).await;
        self.live.set_status(status).await;

        match self.portfolio.live_portfolio().await {
            Ok(portfolio) => self.live.set_portfolio(portfolio).await,
            // Keep showing the last known portfolio.
            Err(e) => warn!("Failed to refresh portfolio: {}", e),
        }
    }
}

#[async_trait]
impl Actor for StatusMonitor {
    fn name(&self) -> ActorType {
        ActorType::StatusMonitor
    }

    fn id(&self) -> Uuid {
        self.id
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let _heartbeat = self.spawn_heartbeat(supervisor_tx);
        info!("Status monitor polling every {:?}", self.poll_every);

        let mut ticker = time::interval(self.poll_every);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }
}
