//! CometBFT JSON-RPC client

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use bandproof_core::{SignedHeader, StoreQuery};

use crate::cometbft::{AbciQueryResponse, CommitResponse};

/// ABCI path for raw key lookups in the oracle module store.
pub const ORACLE_KEY_PATH: &str = "/store/oracle/key";

#[derive(Clone)]
pub struct CometClient {
    url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

impl CometClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: Client::new(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": "bandproof",
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("{} request to {} failed", method, self.url))?;

        let json: RpcResponse = response
            .json()
            .await
            .with_context(|| format!("{} response is not json-rpc", method))?;

        if let Some(error) = json.error {
            bail!(
                "rpc error {}: {} {}",
                error.code,
                error.message,
                error.data.unwrap_or_default()
            );
        }

        json.result
            .ok_or_else(|| anyhow!("no result in {} response", method))
    }

    /// Signed header for `height`, or the latest one.
    pub async fn commit(&self, height: Option<u64>) -> Result<SignedHeader> {
        let params = match height {
            Some(h) => json!({ "height": h.to_string() }),
            None => json!({}),
        };
        let result = self.call("commit", params).await?;
        let response: CommitResponse =
            serde_json::from_value(result).context("unexpected commit response")?;
        if !response.canonical {
            debug!("commit is not canonical yet, signatures come from the seen commit");
        }
        response.into_signed_header()
    }

    pub async fn abci_query(&self, path: &str, data: &[u8], height: u64, prove: bool) -> Result<StoreQuery> {
        let params = json!({
            "path": path,
            "data": hex::encode(data),
            "height": height.to_string(),
            "prove": prove,
        });
        let result = self.call("abci_query", params).await?;
        let response: AbciQueryResponse =
            serde_json::from_value(result).context("unexpected abci_query response")?;
        response.into_store_query()
    }

    /// Proven lookup of `key` in the state committed by block `commit_height`.
    pub async fn oracle_query(&self, key: &[u8], commit_height: u64) -> Result<StoreQuery> {
        let height = StoreQuery::query_height(commit_height)?;
        debug!(key = %hex::encode(key), height, "querying oracle store");
        self.abci_query(ORACLE_KEY_PATH, key, height, true).await
    }
}
