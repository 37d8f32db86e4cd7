use chrono::{Duration, NaiveDateTime};
use common::config::Settings;
use common::models::{
    AnalysisLog, MonthlyPerformance, PerformanceAnalysis, PerformanceMetrics, PortfolioSnapshot,
    Reflection, Trade, TradingStats,
};
use common::time;
use reporting::{analyze_performance, calculate_performance_metrics, monthly_performance};
use storage::repositories::{
    AnalysisLogRepository, PortfolioRepository, ReflectionRepository, StatsRepository,
    TradeRepository,
};
use storage::{Journal, StorageError};
use tracing::debug;

/// Everything the page reads from the journal, loaded in one pass and cached.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Trades inside the lookback window, newest first.
    pub trades: Vec<Trade>,
    /// Daily snapshots, newest first.
    pub portfolio_history: Vec<PortfolioSnapshot>,
    pub recent_logs: Vec<AnalysisLog>,
    pub reflections: Vec<Reflection>,
    pub stats: TradingStats,
    pub metrics: Option<PerformanceMetrics>,
    pub monthly: Vec<MonthlyPerformance>,
    pub performance: PerformanceAnalysis,
    pub loaded_at: NaiveDateTime,
}

impl DashboardData {
    pub fn successful_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.success)
    }
}

pub async fn load(journal: &Journal, settings: &Settings) -> Result<DashboardData, StorageError> {
    let pool = journal.pool();
    let now = time::now();
    let today = now.date();

    let trades = TradeRepository::get_trades_by_date(
        pool,
        today - Duration::days(settings.trade_lookback_days),
        Some(today),
    )
    .await?;
    let portfolio_history = PortfolioRepository::get_history(pool, settings.portfolio_history).await?;
    let recent_logs = AnalysisLogRepository::get_recent(pool, settings.recent_logs).await?;
    let reflections = ReflectionRepository::get_recent(pool, settings.recent_reflections).await?;
    let stats = StatsRepository::get_trading_stats(pool).await?;

    let window_start = now - Duration::days(settings.performance_days);
    let window = TradeRepository::get_successful_between(pool, window_start, now).await?;
    let performance = analyze_performance(&window, window_start.date(), today);

    // Failed orders never moved money, so only executed trades feed the totals.
    let executed: Vec<Trade> = trades.iter().filter(|t| t.success).cloned().collect();
    let metrics = calculate_performance_metrics(&executed);
    let monthly = monthly_performance(&executed);

    debug!(
        "Loaded dashboard data: {} trades, {} snapshots, {} logs, {} reflections",
        trades.len(),
        portfolio_history.len(),
        recent_logs.len(),
        reflections.len()
    );

    Ok(DashboardData {
        trades,
        portfolio_history,
        recent_logs,
        reflections,
        stats,
        metrics,
        monthly,
        performance,
        loaded_at: now,
    })
}
