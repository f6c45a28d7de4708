use std::{future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    algorand::Address,
    error::{AppError, AppResult},
    ledger::models::LedgerRound,
};

use super::{
    models::*,
    NodeApi,
};

const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub url: String,
    pub token: String,
    /// Ceiling for any single node call, long-poll included.
    pub timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4001".to_string(),
            token: String::new(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// algod v2 REST client
pub struct AlgodClient {
    config: NodeConfig,
    http: reqwest::Client,
}

impl AlgodClient {
    pub fn new(config: NodeConfig) -> AppResult<Self> {
        // Timeouts are applied per call in `with_timeout`
        let http = reqwest::Client::builder().build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self
            .http
            .get(self.url(path))
            .header(API_TOKEN_HEADER, &self.config.token)
            .send();

        let response = self.with_timeout(path, request).await??;
        Self::decode(response).await
    }

    async fn with_timeout<F: Future>(&self, path: &str, call: F) -> AppResult<F::Output> {
        tokio::time::timeout(self.config.timeout, call)
            .await
            .map_err(|_| {
                AppError::NodeUnavailable(format!(
                    "{} timed out after {:?}",
                    path, self.config.timeout
                ))
            })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response.text().await.unwrap_or_default();
        Err(classify(status, message))
    }
}

/// 404 → `NotFound`, other 4xx → `NodeRejected`, anything else → `NodeUnavailable`.
fn classify(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::NOT_FOUND {
        AppError::NotFound(message)
    } else if status.is_client_error() {
        AppError::NodeRejected {
            status: status.as_u16(),
            message,
        }
    } else {
        AppError::NodeUnavailable(format!("{}: {}", status, message))
    }
}

#[async_trait]
impl NodeApi for AlgodClient {
    #[instrument(skip(self))]
    async fn status(&self) -> AppResult<NodeStatus> {
        self.get_json("/v2/status").await
    }

    #[instrument(skip(self))]
    async fn status_after_block(&self, round: LedgerRound) -> AppResult<NodeStatus> {
        self.get_json(&format!("/v2/status/wait-for-block-after/{}", round))
            .await
    }

    #[instrument(skip(self, address), fields(address = %address))]
    async fn pending_transactions_by_address(
        &self,
        address: &Address,
    ) -> AppResult<PendingTransactionsResponse> {
        self.get_json(&format!(
            "/v2/accounts/{}/transactions/pending?format=json",
            address
        ))
        .await
    }

    #[instrument(skip(self))]
    async fn pending_transaction_info(&self, tx_id: &str) -> AppResult<PendingTransactionInfo> {
        self.get_json(&format!("/v2/transactions/pending/{}?format=json", tx_id))
            .await
    }

    #[instrument(skip(self))]
    async fn suggested_params(&self) -> AppResult<SuggestedParams> {
        self.get_json("/v2/transactions/params").await
    }

    #[instrument(skip(self, signed), fields(bytes = signed.len()))]
    async fn send_raw_transaction(&self, signed: &[u8]) -> AppResult<String> {
        let path = "/v2/transactions";
        let request = self
            .http
            .post(self.url(path))
            .header(API_TOKEN_HEADER, &self.config.token)
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(signed.to_vec())
            .send();

        let response = self.with_timeout(path, request).await??;
        let submitted: SubmitResponse = Self::decode(response).await?;
        debug!("Node accepted transaction {}", submitted.tx_id);

        Ok(submitted.tx_id)
    }
}
