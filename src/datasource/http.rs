//! Shared GET helper for the JSON lookup APIs.

use super::DataSourceError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// GET `url` and decode the body. A 404 is `Ok(None)`; any other non-2xx
/// status is an error.
pub(crate) async fn get_optional_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Option<T>, DataSourceError> {
    debug!("GET {}", url);
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DataSourceError::RateLimited);
    }
    if !status.is_success() {
        return Err(DataSourceError::HttpError {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("Unexpected status")
                .to_string(),
        });
    }

    response
        .json::<T>()
        .await
        .map(Some)
        .map_err(|e| DataSourceError::ParseError(e.to_string()))
}
