use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::RemoteResponse;

#[derive(Deserialize, Debug)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: String,
}

impl RemoteResponse<f64> for TickerPriceResponse {
    fn to_model(&self) -> Result<f64, ExchangeError> {
        Self::parse_number("price", &self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_price_string() {
        let resp: TickerPriceResponse =
            serde_json::from_str(r#"{"symbol":"BTCUSDT","price":"64123.45000000"}"#).unwrap();
        assert_eq!(resp.to_model().unwrap(), 64123.45);
    }

    #[test]
    fn rejects_garbage_price() {
        let resp = TickerPriceResponse {
            symbol: "BTCUSDT".into(),
            price: "n/a".into(),
        };
        assert!(matches!(
            resp.to_model(),
            Err(ExchangeError::InvalidNumber { field: "price", .. })
        ));
    }
}
