pub mod analysis_log_repo;
pub mod portfolio_repo;
pub mod reflection_repo;
pub mod stats_repo;
pub mod trade_repo;

pub use analysis_log_repo::AnalysisLogRepository;
pub use portfolio_repo::PortfolioRepository;
pub use reflection_repo::ReflectionRepository;
pub use stats_repo::StatsRepository;
pub use trade_repo::TradeRepository;
