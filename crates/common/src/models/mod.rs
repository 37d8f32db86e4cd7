pub mod analysis_log;
pub mod market_context;
pub mod performance;
pub mod portfolio;
pub mod reflection;
pub mod status;
pub mod trade;

pub use analysis_log::{AnalysisLog, AnalysisLogInsert};
pub use market_context::MarketContext;
pub use performance::{MonthlyPerformance, PerformanceAnalysis, PerformanceMetrics, TradingStats};
pub use portfolio::{LivePortfolio, PortfolioSnapshot, PortfolioSource};
pub use reflection::{Reflection, ReflectionInsert};
pub use status::{ConnectionState, SystemStatus};
pub use trade::{ParseSideError, Trade, TradeInsert, TradeSide};
