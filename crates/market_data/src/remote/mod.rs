pub mod account_response;
pub mod binance_client;
pub mod ticker_response;

pub use account_response::{AccountInformation, Balance};
pub use binance_client::BinanceClient;
pub use ticker_response::TickerPriceResponse;
