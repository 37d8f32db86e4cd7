use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Exchange returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Exchange credentials are not configured")]
    MissingCredentials,
    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}
