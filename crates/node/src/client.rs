//! JSON-RPC client, used by the wallet CLI.

use crate::rpc::{RpcRequest, RpcResponse};
use modulax_types::{codec, Account, Transaction};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors from RPC calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed rpc response")]
    MalformedResponse,
}

/// Client for a node's `/rpc` endpoint.
pub struct RpcClient {
    url: String,
    http: reqwest::Client,
}

impl RpcClient {
    /// Client for the given endpoint URL, e.g. `http://localhost:8080/rpc`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the account for a hex address.
    pub async fn get_account(&self, address_hex: &str) -> Result<Account, ClientError> {
        let result = self.call("getAccount", vec![json!(address_hex)]).await?;
        serde_json::from_value(result).map_err(|_| ClientError::MalformedResponse)
    }

    /// Submit a signed transaction; returns the server's acceptance string.
    pub async fn send_transaction(&self, tx: &Transaction) -> Result<String, ClientError> {
        let tx_hex = hex::encode(codec::to_bytes(tx));
        let result = self.call("sendTransaction", vec![json!(tx_hex)]).await?;
        result
            .as_str()
            .map(str::to_owned)
            .ok_or(ClientError::MalformedResponse)
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError> {
        let response: RpcResponse = self
            .http
            .post(self.url.as_str())
            .json(&RpcRequest::new(method, params))
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or(ClientError::MalformedResponse)
    }
}
