use alloy::primitives::{Address, Bytes, B256};
use thiserror::Error;

use crate::domain::{Eip712Document, MessageRecord, RawMessage, SafeMessageEnvelope};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("contract error: {0}")]
    Contract(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("{what} hash mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        what: &'static str,
        expected: B256,
        actual: B256,
    },
    #[error("threshold not met: {confirmations} of {threshold:?} confirmations")]
    ThresholdNotMet {
        confirmations: usize,
        threshold: Option<u64>,
    },
    #[error("invalid signature")]
    InvalidSignature,
    #[error("{0}")]
    IllegalTransition(String),
}

/// Pure hashing of messages and SafeMessage envelopes.
pub trait HashingPort {
    fn typed_data_hash(&self, doc: &Eip712Document) -> Result<B256, PortError>;

    /// EIP-191 hash for text, EIP-712 hash for typed data.
    fn inner_hash(&self, message: &RawMessage) -> Result<B256, PortError>;

    fn build_envelope(
        &self,
        chain_id: u64,
        safe_address: Address,
        message: &RawMessage,
    ) -> Result<SafeMessageEnvelope, PortError>;

    fn safe_message_hash(&self, envelope: &SafeMessageEnvelope) -> Result<B256, PortError> {
        self.typed_data_hash(&envelope.to_document())
    }
}

/// Read-only `eth_call` over an explicitly passed connection.
#[allow(async_fn_in_trait)]
pub trait EthCallPort {
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, PortError>;
}

/// View calls against a Safe. Callers treat any error other than
/// [`PortError::Timeout`] as absent (or `false`), never as a usable value.
#[allow(async_fn_in_trait)]
pub trait SafeContractPort {
    async fn threshold(&self, safe_address: Address) -> Result<u64, PortError>;

    async fn onchain_message_hash(
        &self,
        safe_address: Address,
        raw_hash: B256,
    ) -> Result<B256, PortError>;

    async fn is_valid_signature(
        &self,
        safe_address: Address,
        message_hash: B256,
        signature: &Bytes,
    ) -> Result<bool, PortError>;
}

/// Lookup of SafeMessage records in the transaction service.
#[allow(async_fn_in_trait)]
pub trait MessageServicePort {
    async fn fetch_message(
        &self,
        safe_message_hash: B256,
        chain_id: u64,
    ) -> Result<MessageRecord, PortError>;
}
