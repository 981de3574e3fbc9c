#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256};

use rusty_safe_verify_core::{
    Confirmation, Eip712Document, HashingPort, MessageRecord, MessageServicePort,
    OrchestratorSettings, PortError, RawMessage, SafeContractPort, SafeMessageEnvelope,
    SignatureType, VerificationOrchestrator,
};

/// Deterministic stand-in for the real EIP-712 hasher.
#[derive(Debug, Default)]
pub struct FixtureHashing;

impl HashingPort for FixtureHashing {
    fn typed_data_hash(&self, doc: &Eip712Document) -> Result<B256, PortError> {
        let bytes = serde_json::to_vec(doc).map_err(|e| PortError::Encoding(e.to_string()))?;
        Ok(keccak256(bytes))
    }

    fn inner_hash(&self, message: &RawMessage) -> Result<B256, PortError> {
        match message {
            RawMessage::Text(text) => Ok(keccak256(text.as_bytes())),
            RawMessage::Typed(doc) if doc.message.is_empty() => Err(PortError::Encoding(
                "typed message has no fields to encode".to_owned(),
            )),
            RawMessage::Typed(doc) => self.typed_data_hash(doc),
        }
    }

    fn build_envelope(
        &self,
        chain_id: u64,
        safe_address: Address,
        message: &RawMessage,
    ) -> Result<SafeMessageEnvelope, PortError> {
        if message.is_empty() {
            return Err(PortError::InvalidInput("message is empty".to_owned()));
        }
        Ok(SafeMessageEnvelope {
            chain_id,
            verifying_contract: safe_address,
            message: self.inner_hash(message)?,
        })
    }
}

#[derive(Debug, Default)]
pub struct CountingHashing {
    pub inner_hash_calls: AtomicUsize,
}

impl HashingPort for CountingHashing {
    fn typed_data_hash(&self, doc: &Eip712Document) -> Result<B256, PortError> {
        FixtureHashing.typed_data_hash(doc)
    }

    fn inner_hash(&self, message: &RawMessage) -> Result<B256, PortError> {
        self.inner_hash_calls.fetch_add(1, Ordering::SeqCst);
        FixtureHashing.inner_hash(message)
    }

    fn build_envelope(
        &self,
        chain_id: u64,
        safe_address: Address,
        message: &RawMessage,
    ) -> Result<SafeMessageEnvelope, PortError> {
        if message.is_empty() {
            return Err(PortError::InvalidInput("message is empty".to_owned()));
        }
        Ok(SafeMessageEnvelope {
            chain_id,
            verifying_contract: safe_address,
            message: self.inner_hash(message)?,
        })
    }
}

#[derive(Debug, Default)]
pub struct ContractCalls {
    pub threshold: AtomicUsize,
    pub onchain_hash: AtomicUsize,
    pub is_valid_signature: AtomicUsize,
}

#[derive(Debug)]
pub struct FixtureContract {
    pub threshold: Option<u64>,
    /// `None` mirrors the real reader failing to call the fallback handler.
    pub onchain_hash: Option<B256>,
    pub signature_valid: bool,
    pub delay: Option<Duration>,
    pub calls: ContractCalls,
}

impl FixtureContract {
    pub fn new(threshold: Option<u64>, signature_valid: bool) -> Self {
        Self {
            threshold,
            onchain_hash: None,
            signature_valid,
            delay: None,
            calls: ContractCalls::default(),
        }
    }

    pub fn with_onchain_hash(mut self, hash: B256) -> Self {
        self.onchain_hash = Some(hash);
        self
    }

    pub fn signature_calls(&self) -> usize {
        self.calls.is_valid_signature.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl SafeContractPort for FixtureContract {
    async fn threshold(&self, _safe_address: Address) -> Result<u64, PortError> {
        self.calls.threshold.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.threshold
            .ok_or_else(|| PortError::Contract("getThreshold reverted".to_owned()))
    }

    async fn onchain_message_hash(
        &self,
        _safe_address: Address,
        _raw_hash: B256,
    ) -> Result<B256, PortError> {
        self.calls.onchain_hash.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.onchain_hash
            .ok_or_else(|| PortError::Contract("getMessageHash reverted".to_owned()))
    }

    async fn is_valid_signature(
        &self,
        _safe_address: Address,
        _message_hash: B256,
        _signature: &Bytes,
    ) -> Result<bool, PortError> {
        self.calls.is_valid_signature.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.signature_valid)
    }
}

#[derive(Debug, Default)]
pub struct FixtureService {
    pub record: Option<MessageRecord>,
    /// Returned instead of the record when set.
    pub error: Option<PortError>,
    pub calls: AtomicUsize,
}

impl FixtureService {
    pub fn with_record(record: MessageRecord) -> Self {
        Self {
            record: Some(record),
            ..Self::default()
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

impl MessageServicePort for FixtureService {
    async fn fetch_message(
        &self,
        safe_message_hash: B256,
        _chain_id: u64,
    ) -> Result<MessageRecord, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.record
            .clone()
            .ok_or_else(|| PortError::NotFound(format!("message {safe_message_hash}")))
    }
}

pub type FixtureOrchestrator =
    VerificationOrchestrator<FixtureHashing, FixtureContract, FixtureService>;

pub fn orchestrator(
    contract: FixtureContract,
    service: FixtureService,
    cross_check: bool,
) -> FixtureOrchestrator {
    VerificationOrchestrator::new(
        FixtureHashing,
        contract,
        service,
        OrchestratorSettings {
            cross_check_onchain_hash: cross_check,
            step_timeout: Duration::from_secs(5),
        },
    )
}

pub fn safe_address() -> Address {
    "0x1111111111111111111111111111111111111111"
        .parse()
        .expect("valid safe address")
}

pub fn owner(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

pub fn confirmation(seed: u8) -> Confirmation {
    Confirmation {
        created: "2023-01-01T00:00:00Z".to_owned(),
        modified: "2023-01-01T00:00:00Z".to_owned(),
        owner: owner(seed),
        signature: Bytes::from(vec![seed; 65]),
        signature_type: SignatureType::Eoa,
    }
}

/// Hash the fixture hasher derives for `message` on chain 5.
pub fn safe_message_hash(message: &str) -> B256 {
    let hashing = FixtureHashing;
    let envelope = hashing
        .build_envelope(5, safe_address(), &RawMessage::from(message))
        .expect("envelope");
    hashing.safe_message_hash(&envelope).expect("safe message hash")
}

pub fn record_for(message: &str, confirmations: Vec<Confirmation>) -> MessageRecord {
    MessageRecord {
        created: "2023-01-01T00:00:00Z".to_owned(),
        modified: "2023-01-01T00:00:00Z".to_owned(),
        message_hash: safe_message_hash(message),
        message: RawMessage::from(message),
        proposed_by: owner(0x0a),
        safe_app_id: None,
        confirmations,
        prepared_signature: Some(Bytes::from(vec![0x1b; 130])),
    }
}
