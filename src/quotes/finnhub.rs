use serde::Deserialize;
use thiserror::Error;

pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("quote endpoint returned {0}")]
    Status(reqwest::StatusCode),
    #[error("quote payload carried no usable price: {0}")]
    BadPrice(f64),
}

/// Response from the Finnhub quote API. Only the current price matters here;
/// Finnhub reports `c = 0` for unknown symbols.
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    c: f64,
}

pub async fn fetch_price(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
    api_key: &str,
) -> Result<f64, QuoteError> {
    let url = format!("{base_url}/quote?symbol={symbol}&token={api_key}");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(QuoteError::Status(status));
    }

    let payload: QuoteResponse = response.json().await?;
    validate_price(payload.c)
}

fn validate_price(price: f64) -> Result<f64, QuoteError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(QuoteError::BadPrice(price))
    }
}
