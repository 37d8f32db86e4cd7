use dotenvy::dotenv;
use std::sync::Arc;
use tokio::{signal, sync::oneshot};
use tracing::{debug, info, warn};

use common::actors::{Actor, ActorType};
use common::config::Settings;
use common::logger;
use dashboard::actors::{CacheWarmer, StatusMonitor, Supervisor};
use dashboard::{AppState, server};
use market_data::ExchangeApi;
use market_data::remote::BinanceClient;
use market_data::services::PortfolioService;
use storage::Journal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    debug!("Dashboard starting up...");

    let settings = Arc::new(Settings::from_env()?);
    if settings.demo_mode() {
        warn!("No exchange API keys configured, running in demo mode");
    }

    let journal = Journal::open(&settings.db_path).await?;
    info!("Journal opened at {}", settings.db_path.display());

    let exchange: Option<Arc<dyn ExchangeApi>> = match BinanceClient::new(&settings.exchange) {
        Ok(client) => Some(Arc::new(client) as Arc<dyn ExchangeApi>),
        Err(e) => {
            warn!("Exchange client unavailable: {}", e);
            None
        }
    };
    let portfolio = Arc::new(PortfolioService::new(
        exchange.clone(),
        journal.clone(),
        settings.exchange.clone(),
    ));

    let state = AppState::new(journal.clone(), settings.clone());
    let mut supervisor = Supervisor::new();

    let live_for_monitor = state.live.clone();
    let poll_every = settings.status_poll;
    supervisor.register_actor(
        ActorType::StatusMonitor,
        Box::new(move || {
            Box::new(StatusMonitor::new(
                exchange.clone(),
                portfolio.clone(),
                live_for_monitor.clone(),
                poll_every,
            )) as Box<dyn Actor>
        }),
    );

    let journal_for_warmer = journal.clone();
    let settings_for_warmer = settings.clone();
    let cache_for_warmer = state.cache.clone();
    supervisor.register_actor(
        ActorType::CacheWarmer,
        Box::new(move || {
            Box::new(CacheWarmer::new(
                journal_for_warmer.clone(),
                settings_for_warmer.clone(),
                cache_for_warmer.clone(),
            )) as Box<dyn Actor>
        }),
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let supervisor_task = tokio::spawn(async move {
        supervisor
            .run_until(async move {
                let _ = stop_rx.await;
            })
            .await;
    });

    server::serve(state, settings.bind, async {
        let _ = signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await?;

    let _ = stop_tx.send(());
    supervisor_task.await?;
    journal.close().await;

    Ok(())
}
