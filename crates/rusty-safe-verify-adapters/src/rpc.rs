use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use serde_json::Value;
use tracing::debug;

use rusty_safe_verify_core::{EthCallPort, PortError};

/// JSON-RPC connection for one chain. Passed explicitly; never process-global.
#[derive(Debug, Clone)]
pub struct JsonRpcSession {
    url: String,
    client: reqwest::Client,
}

impl JsonRpcSession {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Network(format!("failed to build rpc client: {e}")))?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!(url = %self.url, method, "json-rpc request");
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Network(format!("rpc status {status}")));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| PortError::Network(format!("rpc json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(PortError::Contract(format!("{method} returned error: {err}")));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Contract(format!("{method} response missing result")))
    }
}

impl EthCallPort for JsonRpcSession {
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, PortError> {
        let result = self
            .request(
                "eth_call",
                serde_json::json!([{ "to": to, "data": data }, "latest"]),
            )
            .await?;
        let raw = result
            .as_str()
            .ok_or_else(|| PortError::Contract("eth_call result is not a hex string".to_owned()))?;
        raw.parse::<Bytes>()
            .map_err(|e| PortError::Contract(format!("eth_call result is not hex: {e}")))
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> PortError {
    if err.is_timeout() {
        PortError::Timeout(err.to_string())
    } else {
        PortError::Network(err.to_string())
    }
}
