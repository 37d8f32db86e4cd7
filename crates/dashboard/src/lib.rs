pub mod actors;
pub mod cache;
pub mod charts;
pub mod data;
pub mod error;
pub mod live;
pub mod routes;
pub mod server;
pub mod state;
pub mod views;

pub use error::ApiError;
pub use state::AppState;
