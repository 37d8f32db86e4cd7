use std::sync::Arc;

use common::config::Settings;
use storage::{Journal, StorageError};

use crate::cache::TtlCache;
use crate::data::{self, DashboardData};
use crate::live::LiveState;

#[derive(Clone)]
pub struct AppState {
    pub journal: Journal,
    pub settings: Arc<Settings>,
    pub cache: Arc<TtlCache<DashboardData>>,
    pub live: Arc<LiveState>,
}

impl AppState {
    pub fn new(journal: Journal, settings: Arc<Settings>) -> Self {
        Self {
            cache: Arc::new(TtlCache::new(settings.cache_ttl)),
            live: Arc::new(LiveState::default()),
            journal,
            settings,
        }
    }

    pub async fn dashboard_data(&self) -> Result<Arc<DashboardData>, StorageError> {
        self.cache
            .get_or_try_load(|| data::load(&self.journal, &self.settings))
            .await
    }
}
