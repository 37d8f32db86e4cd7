use async_trait::async_trait;
use chrono::Utc;
use common::config::{ApiCredentials, ExchangeSettings};
use hmac::{Hmac, Mac};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::ExchangeError;
use crate::remote::{AccountInformation, TickerPriceResponse};
use crate::traits::{AccountBalances, ExchangeApi, RemoteResponse};

type HmacSha256 = Hmac<Sha256>;

const RECV_WINDOW_MS: u64 = 5000;

#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    credentials: Option<ApiCredentials>,
}

impl BinanceClient {
    pub fn new(settings: &ExchangeSettings) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent("trading_journal_dashboard/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            credentials: settings.credentials.clone(),
        })
    }

    fn sign(secret_key: &str, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    async fn read_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, ExchangeError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Binance {} failed: {} {}", what, status, body);
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl ExchangeApi for BinanceClient {
    fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    async fn ping(&self) -> Result<(), ExchangeError> {
        let url = format!("{}/api/v3/ping", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Self::read_json::<serde_json::Value>(resp, "ping").await?;
        Ok(())
    }

    async fn ticker_price(&self, symbol: &str) -> Result<f64, ExchangeError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.to_uppercase())])
            .send()
            .await?;

        let ticker = Self::read_json::<TickerPriceResponse>(resp, "ticker").await?;
        let price = ticker.to_model()?;
        debug!("{} last price {}", ticker.symbol, price);
        Ok(price)
    }

    async fn account_balances(&self) -> Result<AccountBalances, ExchangeError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ExchangeError::MissingCredentials)?;

        let params = format!(
            "recvWindow={}&timestamp={}",
            RECV_WINDOW_MS,
            Utc::now().timestamp_millis()
        );
        let signature = Self::sign(&credentials.secret_key, &params);
        let url = format!(
            "{}/api/v3/account?{}&signature={}",
            self.base_url, params, signature
        );

        let resp = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .send()
            .await?;

        let info = Self::read_json::<AccountInformation>(resp, "account info").await?;
        info.to_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, RawQuery};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn settings(credentials: Option<ApiCredentials>) -> ExchangeSettings {
        settings_at("http://127.0.0.1:9", credentials)
    }

    fn settings_at(base_url: &str, credentials: Option<ApiCredentials>) -> ExchangeSettings {
        ExchangeSettings {
            base_url: base_url.into(),
            credentials,
            symbol: "BTCUSDT".into(),
            base_asset: "BTC".into(),
            quote_asset: "USDT".into(),
        }
    }

    #[test]
    fn signature_matches_documented_example() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            BinanceClient::sign(secret, query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[tokio::test]
    async fn account_without_credentials_fails_fast() {
        let client = BinanceClient::new(&settings(None)).unwrap();
        assert!(!client.has_credentials());
        assert!(matches!(
            client.account_balances().await,
            Err(ExchangeError::MissingCredentials)
        ));
    }

    #[test]
    fn credentials_enable_signed_calls() {
        let client = BinanceClient::new(&settings(Some(ApiCredentials {
            api_key: "key".into(),
            secret_key: "secret".into(),
        })))
        .unwrap();
        assert!(client.has_credentials());
    }

    async fn ticker(Query(q): Query<HashMap<String, String>>) -> Response {
        match q.get("symbol").map(String::as_str) {
            Some("BTCUSDT") => Json(json!({"symbol": "BTCUSDT", "price": "64000.50000000"})).into_response(),
            _ => (StatusCode::BAD_REQUEST, r#"{"code":-1121,"msg":"Invalid symbol."}"#).into_response(),
        }
    }

    async fn account(headers: HeaderMap, RawQuery(query): RawQuery) -> Response {
        let signed = query.as_deref().is_some_and(|q| q.contains("&signature="));
        if !signed || headers.get("X-MBX-APIKEY").is_none() {
            return (StatusCode::UNAUTHORIZED, "unsigned request").into_response();
        }
        Json(json!({
            "canTrade": true,
            "balances": [
                {"asset": "BTC", "free": "0.50000000", "locked": "0.25000000"},
                {"asset": "USDT", "free": "1000.00", "locked": "0.00"}
            ]
        }))
        .into_response()
    }

    /// Serves a minimal exchange on an ephemeral port and returns its base URL.
    async fn local_exchange() -> String {
        let app = Router::new()
            .route("/api/v3/ticker/price", get(ticker))
            .route("/api/v3/account", get(account));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn ticker_decodes_price() {
        let base_url = local_exchange().await;
        let client = BinanceClient::new(&settings_at(&base_url, None)).unwrap();
        assert_eq!(client.ticker_price("btcusdt").await.unwrap(), 64000.5);
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let base_url = local_exchange().await;
        let client = BinanceClient::new(&settings_at(&base_url, None)).unwrap();

        match client.ticker_price("BTCKRW").await {
            Err(ExchangeError::Api { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid symbol."));
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn signed_account_call_decodes_balances() {
        let base_url = local_exchange().await;
        let client = BinanceClient::new(&settings_at(
            &base_url,
            Some(ApiCredentials {
                api_key: "key".into(),
                secret_key: "secret".into(),
            }),
        ))
        .unwrap();

        let balances = client.account_balances().await.unwrap();
        assert!(balances.can_trade);
        assert_eq!(balances.total("btc"), 0.75);
        assert_eq!(balances.total("USDT"), 1000.0);
    }
}
