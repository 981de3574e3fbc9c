use std::collections::BTreeMap;
use std::time::Duration;

use alloy::primitives::B256;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::debug;

use rusty_safe_verify_core::{MessageRecord, MessageServicePort, PortError};

use crate::config::VerifierConfig;
use crate::rpc::transport_error;

/// Reads SafeMessage records from the Safe transaction service.
#[derive(Debug, Clone)]
pub struct MessageRecordFetcher {
    client: reqwest::Client,
    base_urls: BTreeMap<u64, String>,
}

impl MessageRecordFetcher {
    pub fn new(base_urls: BTreeMap<u64, String>, timeout: Duration) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Network(format!("failed to build service client: {e}")))?;
        Ok(Self { client, base_urls })
    }

    pub fn from_config(config: &VerifierConfig) -> Result<Self, PortError> {
        Self::new(config.tx_service_urls.clone(), config.request_timeout())
    }

    pub fn message_url(&self, safe_message_hash: B256, chain_id: u64) -> Result<String, PortError> {
        let base = self.base_urls.get(&chain_id).ok_or_else(|| {
            PortError::InvalidInput(format!(
                "no transaction service configured for chain {chain_id}"
            ))
        })?;
        Ok(format!(
            "{}/v1/messages/{}/",
            base.trim_end_matches('/'),
            alloy::hex::encode_prefixed(safe_message_hash)
        ))
    }

    async fn fetch(
        &self,
        safe_message_hash: B256,
        chain_id: u64,
    ) -> Result<MessageRecord, PortError> {
        let url = self.message_url(safe_message_hash, chain_id)?;
        debug!(%url, "fetching safe message record");
        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(format!(
                "message {safe_message_hash} on chain {chain_id}"
            )));
        }
        if !status.is_success() {
            return Err(PortError::Network(format!(
                "transaction service status {status}"
            )));
        }
        response
            .json::<MessageRecord>()
            .await
            .map_err(|e| PortError::Encoding(format!("malformed message record: {e}")))
    }
}

impl MessageServicePort for MessageRecordFetcher {
    async fn fetch_message(
        &self,
        safe_message_hash: B256,
        chain_id: u64,
    ) -> Result<MessageRecord, PortError> {
        let result = self.fetch(safe_message_hash, chain_id).await;
        if let Err(PortError::NotFound(what)) = &result {
            debug!(%what, "safe message not found");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_url_uses_prefixed_hash_and_trailing_slash() {
        let mut urls = BTreeMap::new();
        urls.insert(5, "http://service.local/api/".to_owned());
        let fetcher =
            MessageRecordFetcher::new(urls, Duration::from_secs(1)).expect("fetcher");
        let hash = B256::repeat_byte(0xab);
        assert_eq!(
            fetcher.message_url(hash, 5).expect("url"),
            format!("http://service.local/api/v1/messages/0x{}/", "ab".repeat(32))
        );
        assert!(matches!(
            fetcher.message_url(hash, 1),
            Err(PortError::InvalidInput(_))
        ));
    }
}
