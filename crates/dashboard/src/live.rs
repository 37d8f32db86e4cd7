use common::models::{LivePortfolio, SystemStatus};
use tokio::sync::RwLock;

/// Latest connection status and portfolio, written by the status monitor and
/// read by every page render.
#[derive(Debug, Default)]
pub struct LiveState {
    status: RwLock<SystemStatus>,
    portfolio: RwLock<Option<LivePortfolio>>,
}

impl LiveState {
    pub async fn status(&self) -> SystemStatus {
        self.status.read().await.clone()
    }

    pub async fn set_status(&self, status: SystemStatus) {
        *self.status.write().await = status;
    }

    pub async fn portfolio(&self) -> Option<LivePortfolio> {
        self.portfolio.read().await.clone()
    }

    pub async fn set_portfolio(&self, portfolio: Option<LivePortfolio>) {
        *self.portfolio.write().await = portfolio;
    }
}
