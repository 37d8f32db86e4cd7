pub mod portfolio_service;
pub mod status_service;

pub use portfolio_service::PortfolioService;
pub use status_service::check_status;
