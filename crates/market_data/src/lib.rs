pub mod error;
pub mod remote;
pub mod services;
pub mod traits;

pub use error::ExchangeError;
pub use traits::{AccountBalances, AssetBalance, ExchangeApi};
