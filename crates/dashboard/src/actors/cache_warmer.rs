use std::sync::Arc;

use async_trait::async_trait;
use common::actors::{Actor, ActorType, ControlMessage};
use common::config::Settings;
use storage::Journal;
use tokio::{sync::mpsc, time};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::data::{self, DashboardData};

/// Reloads the dashboard data whenever the cached copy has gone stale, so page
/// renders rarely wait on the journal.
pub struct CacheWarmer {
    id: Uuid,
    journal: Journal,
    settings: Arc<Settings>,
    cache: Arc<TtlCache<DashboardData>>,
}

impl CacheWarmer {
    pub fn new(journal: Journal, settings: Arc<Settings>, cache: Arc<TtlCache<DashboardData>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            journal,
            settings,
            cache,
        }
    }

    pub async fn warm(&self) {
        if self.cache.is_fresh().await {
            return;
        }
        match data::load(&self.journal, &self.settings).await {
            Ok(data) => {
                self.cache.store(data).await;
                debug!("Dashboard cache warmed");
            }
            Err(e) => warn!("Failed to warm dashboard cache: {}", e),
        }
    }
}

#[async_trait]
impl Actor for CacheWarmer {
    fn name(&self) -> ActorType {
        ActorType::CacheWarmer
    }

    fn id(&self) -> Uuid {
        self.id
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let _heartbeat = self.spawn_heartbeat(supervisor_tx);

        // Check well inside the TTL so a fresh copy is usually waiting.
        let mut ticker = time::interval((self.settings.cache_ttl / 4).max(time::Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.warm().await;
        }
    }
}
