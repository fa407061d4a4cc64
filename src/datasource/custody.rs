//! Custody collaborators: a JSON relay to an external signer, and the
//! stand-in used when no signer is attached.

use super::{CustodySigner, DataSourceError};
use crate::domain::WalletRecord;
use crate::transactions::TransactionRequest;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

/// Forwards requests to a signer service over HTTP.
///
/// `POST {base}/transactions` with the request body returns
/// `{"transactionId": "..."}`; `GET {base}/records/{program}` returns the
/// held records.
#[derive(Debug, Clone)]
pub struct RelayCustody {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    transaction_id: String,
}

impl RelayCustody {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn map_send_error(e: reqwest::Error) -> DataSourceError {
    if e.is_connect() {
        DataSourceError::NotConnected
    } else {
        DataSourceError::NetworkError(e.to_string())
    }
}

fn check_status(status: StatusCode) -> Result<(), DataSourceError> {
    if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::UNAUTHORIZED {
        return Err(DataSourceError::NotConnected);
    }
    if !status.is_success() {
        return Err(DataSourceError::HttpError {
            status: status.as_u16(),
            message: "Signer rejected request".to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl CustodySigner for RelayCustody {
    async fn request_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<String, DataSourceError> {
        let url = format!("{}/transactions", self.base_url);
        debug!(
            "Submitting {} to signer",
            request.function_name().unwrap_or("<empty>")
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response.status())?;

        let body = response
            .json::<SubmitResponse>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))?;
        info!("Signer accepted transaction {}", body.transaction_id);
        Ok(body.transaction_id)
    }

    async fn request_records(&self, program: &str) -> Result<Vec<WalletRecord>, DataSourceError> {
        let url = format!("{}/records/{}", self.base_url, program);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response.status())?;

        response
            .json::<Vec<WalletRecord>>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))
    }
}

/// Custody when no signer is configured: every call is `NotConnected`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedCustody;

#[async_trait]
impl CustodySigner for DisconnectedCustody {
    async fn request_transaction(
        &self,
        _request: &TransactionRequest,
    ) -> Result<String, DataSourceError> {
        Err(DataSourceError::NotConnected)
    }

    async fn request_records(&self, _program: &str) -> Result<Vec<WalletRecord>, DataSourceError> {
        Err(DataSourceError::NotConnected)
    }
}
