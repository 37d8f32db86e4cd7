pub mod cache_warmer;
pub mod status_monitor;
pub mod supervisor;

pub use cache_warmer::CacheWarmer;
pub use status_monitor::StatusMonitor;
pub use supervisor::Supervisor;
