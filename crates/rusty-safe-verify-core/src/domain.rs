use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the implicit EIP-712 domain type.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";
/// Primary type of the envelope Safe wallets sign for off-chain messages.
pub const SAFE_MESSAGE_TYPE: &str = "SafeMessage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// EIP-712 typed data as produced by dapps and `eth_signTypedData_v4`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Document {
    #[serde(default)]
    pub domain: Map<String, Value>,
    pub types: BTreeMap<String, Vec<FieldDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_type: Option<String>,
    pub message: Map<String, Value>,
}

/// A message a Safe is asked to sign: plain text (EIP-191) or typed data (EIP-712).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMessage {
    Text(String),
    Typed(Eip712Document),
}

impl RawMessage {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Typed(doc) => doc.message.is_empty(),
        }
    }
}

impl From<&str> for RawMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Eip712Document> for RawMessage {
    fn from(doc: Eip712Document) -> Self {
        Self::Typed(doc)
    }
}

/// `SafeMessage(bytes message)` bound to a Safe on a chain. Hashing it yields the
/// SafeMessage hash that identifies a pending signature request everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeMessageEnvelope {
    pub chain_id: u64,
    pub verifying_contract: Address,
    /// EIP-191 or EIP-712 hash of the wrapped message.
    pub message: B256,
}

impl SafeMessageEnvelope {
    pub fn to_document(&self) -> Eip712Document {
        let mut domain = Map::new();
        domain.insert("chainId".to_owned(), Value::from(self.chain_id));
        domain.insert(
            "verifyingContract".to_owned(),
            Value::String(self.verifying_contract.to_checksum(None)),
        );

        let mut types = BTreeMap::new();
        types.insert(
            SAFE_MESSAGE_TYPE.to_owned(),
            vec![FieldDef::new("message", "bytes")],
        );

        let mut message = Map::new();
        message.insert(
            "message".to_owned(),
            Value::String(alloy::hex::encode_prefixed(self.message)),
        );

        Eip712Document {
            domain,
            types,
            primary_type: Some(SAFE_MESSAGE_TYPE.to_owned()),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureType {
    ContractSignature,
    ApprovedHash,
    Eoa,
    EthSign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub created: String,
    pub modified: String,
    pub owner: Address,
    pub signature: Bytes,
    pub signature_type: SignatureType,
}

/// Off-chain state of a SafeMessage as kept by the transaction service.
///
/// `prepared_signature` is rebuilt by the service on every confirmation and is only
/// meaningful once enough owners confirmed; the service does not enforce that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub created: String,
    pub modified: String,
    pub message_hash: B256,
    pub message: RawMessage,
    pub proposed_by: Address,
    #[serde(default)]
    pub safe_app_id: Option<i64>,
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
    #[serde(default)]
    pub prepared_signature: Option<Bytes>,
}

impl MessageRecord {
    /// Number of distinct owners that confirmed.
    pub fn distinct_confirmations(&self) -> usize {
        self.confirmations
            .iter()
            .map(|c| c.owner)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Which fallback-handler entry point maps a raw message hash to the SafeMessage hash.
/// The two ABIs are not interchangeable; pick the one the target Safe deploys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnchainHashVariant {
    /// `getMessageHash(bytes)`, answered for the called Safe itself.
    #[default]
    #[serde(rename = "legacy")]
    LegacyGetMessageHash,
    /// `getMessageHashForSafe(address,bytes)`.
    #[serde(rename = "for-safe")]
    GetMessageHashForSafe,
}

impl FromStr for OnchainHashVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "getmessagehash" => Ok(Self::LegacyGetMessageHash),
            "for-safe" | "getmessagehashforsafe" => Ok(Self::GetMessageHashForSafe),
            other => Err(format!("unknown on-chain hash variant '{other}'")),
        }
    }
}

impl fmt::Display for OnchainHashVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyGetMessageHash => f.write_str("legacy"),
            Self::GetMessageHashForSafe => f.write_str("for-safe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    pub chain_id: u64,
    pub safe_address: Address,
    pub message: RawMessage,
}

/// Exactly one outcome per verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "camelCase")]
pub enum VerificationResult {
    Valid,
    Invalid,
    #[serde(rename_all = "camelCase")]
    ThresholdNotMet {
        confirmations: usize,
        threshold: Option<u64>,
    },
    Error(String),
}

impl VerificationResult {
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("Message is signed"),
            Self::Invalid => f.write_str("Message signature is invalid"),
            Self::ThresholdNotMet {
                confirmations,
                threshold: Some(threshold),
            } => write!(f, "Threshold not met ({confirmations}/{threshold})"),
            Self::ThresholdNotMet {
                confirmations,
                threshold: None,
            } => write!(f, "Threshold not met ({confirmations}/unknown)"),
            Self::Error(reason) => write!(f, "Error while verifying: {reason}"),
        }
    }
}
