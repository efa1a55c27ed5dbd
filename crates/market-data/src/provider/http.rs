//! Shared HTTP plumbing for providers.
//!
//! Providers get the raw body back and do their own shape validation, so a
//! 2xx response with an unexpected body is reported as a shape error while
//! network failures and non-2xx statuses are transport errors.

use std::str::FromStr;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;

use crate::errors::PriceError;

/// Upper bound applied at the client level. The resolver applies its own,
/// tighter per-attempt timeout on top of this one.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for a chain tip height, roughly 1900 years of blocks.
const MAX_BLOCK_HEIGHT: u64 = 100_000_000;

const USER_AGENT: &str = concat!("satoshi-market-data/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by a provider instance.
pub(crate) fn build_client(provider: &str) -> Result<Client, PriceError> {
    build_client_with_agent(provider, USER_AGENT)
}

fn build_client_with_agent(provider: &str, user_agent: &str) -> Result<Client, PriceError> {
    Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .user_agent(user_agent)
        .build()
        .map_err(|e| PriceError::Transport {
            provider: provider.to_string(),
            message: format!("Failed to build HTTP client: {}", e),
        })
}

/// GET `url` and return the body of a 2xx response.
pub(crate) async fn get_text(
    client: &Client,
    provider: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, PriceError> {
    debug!("{} request: {} with {} params", provider, url, params.len());

    let response = client
        .get(url)
        .query(params)
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .send()
        .await
        .map_err(|e| PriceError::Transport {
            provider: provider.to_string(),
            message: format!("Request failed: {}", e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PriceError::HttpStatus {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| PriceError::Transport {
        provider: provider.to_string(),
        message: format!("Failed to read response: {}", e),
    })
}

/// Parse a body as JSON, reporting a malformed body as a shape error.
pub(crate) fn parse_json(provider: &str, body: &str) -> Result<serde_json::Value, PriceError> {
    serde_json::from_str(body)
        .map_err(|e| PriceError::shape(provider, format!("invalid JSON: {}", e)))
}

/// Read a strictly positive decimal out of a JSON number or numeric string.
///
/// `what` names the field for the error message.
pub(crate) fn positive_decimal(
    provider: &str,
    value: Option<&serde_json::Value>,
    what: &str,
) -> Result<Decimal, PriceError> {
    let raw = match value {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            return Err(PriceError::shape(
                provider,
                format!("'{}' is not numeric: {}", what, other),
            ))
        }
        None => return Err(PriceError::shape(provider, format!("missing '{}'", what))),
    };

    let parsed = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| PriceError::shape(provider, format!("'{}' is not numeric: {}", what, raw)))?;

    if parsed <= Decimal::ZERO {
        return Err(PriceError::shape(
            provider,
            format!("'{}' is not positive: {}", what, parsed),
        ));
    }
    Ok(parsed)
}

/// Parse a plain-text block height body.
pub(crate) fn parse_height(provider: &str, body: &str) -> Result<u64, PriceError> {
    let trimmed = body.trim();
    let height = trimmed
        .parse::<u64>()
        .map_err(|_| PriceError::shape(provider, format!("not a block height: {:.32}", trimmed)))?;
    if height > MAX_BLOCK_HEIGHT {
        return Err(PriceError::shape(
            provider,
            format!("implausible block height: {}", height),
        ));
    }
    Ok(height)
}
