pub mod format;
pub mod metrics;
pub mod replay;

pub use metrics::{calculate_performance_metrics, monthly_performance};
pub use replay::{Position, analyze_performance, cost_basis};
