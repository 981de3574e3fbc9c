use std::collections::{BTreeMap, BTreeSet};

use alloy::primitives::{eip191_hash_message, Address, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use alloy_dyn_abi::TypedData;
use serde_json::{Map, Value};

use rusty_safe_verify_core::{
    Eip712Document, FieldDef, HashingPort, PortError, RawMessage, SafeMessageEnvelope,
    EIP712_DOMAIN_TYPE,
};

use crate::abi::SafeMessage;

/// Computes EIP-712 signing hashes for caller-supplied typed data.
///
/// `EIP712Domain` is always derived from the keys present in `domain`; a declared
/// `EIP712Domain` type is dropped before hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedDataHasher;

impl TypedDataHasher {
    pub fn hash(&self, doc: &Eip712Document) -> Result<B256, PortError> {
        self.to_typed_data(doc)?
            .eip712_signing_hash()
            .map_err(|e| PortError::Encoding(format!("eip712 hashing failed: {e}")))
    }

    pub fn to_typed_data(&self, doc: &Eip712Document) -> Result<TypedData, PortError> {
        let types = strip_domain_type(&doc.types);
        check_declared_types(&types)?;
        let primary_type = match doc.primary_type.as_deref() {
            Some(EIP712_DOMAIN_TYPE) => {
                return Err(PortError::Encoding(
                    "EIP712Domain cannot be the primary type".to_owned(),
                ))
            }
            Some(name) if types.contains_key(name) => name.to_owned(),
            Some(name) => {
                return Err(PortError::Encoding(format!(
                    "primary type '{name}' is not declared"
                )))
            }
            None => infer_primary_type(&types)?,
        };
        let domain = normalize_domain(&doc.domain)?;

        let payload = serde_json::json!({
            "types": types,
            "primaryType": primary_type,
            "domain": domain,
            "message": doc.message,
        });
        serde_json::from_value(payload)
            .map_err(|e| PortError::Encoding(format!("invalid typed data: {e}")))
    }
}

/// Wraps messages into the `SafeMessage` envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeMessageBuilder {
    hasher: TypedDataHasher,
}

impl SafeMessageBuilder {
    pub fn new(hasher: TypedDataHasher) -> Self {
        Self { hasher }
    }

    pub fn inner_hash(&self, message: &RawMessage) -> Result<B256, PortError> {
        match message {
            RawMessage::Text(text) => Ok(eip191_hash_message(text.as_bytes())),
            RawMessage::Typed(doc) => self.hasher.hash(doc),
        }
    }

    /// Returns the envelope unhashed so it can be shown before signing.
    pub fn build_envelope(
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

    pub fn envelope_hash(&self, envelope: &SafeMessageEnvelope) -> Result<B256, PortError> {
        self.hasher.hash(&envelope.to_document())
    }
}

/// SafeMessage hash through the statically typed `sol!` struct.
pub fn static_safe_message_hash(envelope: &SafeMessageEnvelope) -> B256 {
    let domain = Eip712Domain {
        chain_id: Some(U256::from(envelope.chain_id)),
        verifying_contract: Some(envelope.verifying_contract),
        ..Default::default()
    };
    SafeMessage {
        message: envelope.message.to_vec().into(),
    }
    .eip712_signing_hash(&domain)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HashingAdapter {
    builder: SafeMessageBuilder,
}

impl HashingPort for HashingAdapter {
    fn typed_data_hash(&self, doc: &Eip712Document) -> Result<B256, PortError> {
        self.builder.hasher.hash(doc)
    }

    fn inner_hash(&self, message: &RawMessage) -> Result<B256, PortError> {
        self.builder.inner_hash(message)
    }

    fn build_envelope(
        &self,
        chain_id: u64,
        safe_address: Address,
        message: &RawMessage,
    ) -> Result<SafeMessageEnvelope, PortError> {
        self.builder.build_envelope(chain_id, safe_address, message)
    }

    fn safe_message_hash(&self, envelope: &SafeMessageEnvelope) -> Result<B256, PortError> {
        let hash = self.builder.envelope_hash(envelope)?;
        debug_assert_eq!(hash, static_safe_message_hash(envelope));
        Ok(hash)
    }
}

/// Parses a Safe address. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_safe_address(raw: &str) -> Result<Address, PortError> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PortError::InvalidInput(format!(
            "'{trimmed}' is not a 20-byte hex address"
        )));
    }
    let address: Address = hex
        .parse()
        .map_err(|e| PortError::InvalidInput(format!("invalid address '{trimmed}': {e}")))?;

    let mixed_case = hex.chars().any(|c| c.is_ascii_uppercase())
        && hex.chars().any(|c| c.is_ascii_lowercase());
    if mixed_case && &address.to_checksum(None)[2..] != hex {
        return Err(PortError::InvalidInput(format!(
            "address '{trimmed}' has an invalid checksum"
        )));
    }
    Ok(address)
}

fn strip_domain_type(types: &BTreeMap<String, Vec<FieldDef>>) -> BTreeMap<String, Vec<FieldDef>> {
    types
        .iter()
        .filter(|(name, _)| name.as_str() != EIP712_DOMAIN_TYPE)
        .map(|(name, fields)| (name.clone(), fields.clone()))
        .collect()
}

/// `Person[][3]` -> `Person`
fn base_type(ty: &str) -> &str {
    ty.split('[').next().unwrap_or(ty).trim()
}

fn is_elementary(ty: &str) -> bool {
    match ty {
        "address" | "bool" | "string" | "bytes" => true,
        _ => {
            if let Some(size) = ty.strip_prefix("bytes") {
                return size
                    .parse::<usize>()
                    .is_ok_and(|size| (1..=32).contains(&size));
            }
            match ty.strip_prefix("uint").or_else(|| ty.strip_prefix("int")) {
                Some("") => true,
                Some(bits) => bits
                    .parse::<usize>()
                    .is_ok_and(|bits| bits % 8 == 0 && (8..=256).contains(&bits)),
                None => false,
            }
        }
    }
}

fn check_declared_types(types: &BTreeMap<String, Vec<FieldDef>>) -> Result<(), PortError> {
    for (owner, fields) in types {
        for field in fields {
            let base = base_type(&field.ty);
            if !is_elementary(base) && !types.contains_key(base) {
                return Err(PortError::Encoding(format!(
                    "type '{base}' used by {owner}.{} is not declared",
                    field.name
                )));
            }
        }
    }
    Ok(())
}

/// The primary type is the only struct no other struct refers to.
fn infer_primary_type(types: &BTreeMap<String, Vec<FieldDef>>) -> Result<String, PortError> {
    let referenced: BTreeSet<&str> = types
        .iter()
        .flat_map(|(owner, fields)| {
            fields
                .iter()
                .map(|f| base_type(&f.ty))
                .filter(move |base| *base != owner.as_str())
        })
        .collect();
    let roots: Vec<&String> = types
        .keys()
        .filter(|name| !referenced.contains(name.as_str()))
        .collect();

    match roots.as_slice() {
        [root] => Ok((*root).clone()),
        [] => Err(PortError::Encoding(
            "typed data has no primary type candidate".to_owned(),
        )),
        many => Err(PortError::Encoding(format!(
            "ambiguous primary type: {}",
            many.iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn normalize_domain(domain: &Map<String, Value>) -> Result<Map<String, Value>, PortError> {
    let mut out = Map::new();
    for (key, value) in domain {
        let normalized = match key.as_str() {
            "name" | "version" => Value::String(domain_str(key, value)?.to_owned()),
            "chainId" => serde_json::to_value(domain_uint(value)?)
                .map_err(|e| PortError::Encoding(format!("domain.chainId: {e}")))?,
            "verifyingContract" => {
                let address: Address = domain_str(key, value)?
                    .parse()
                    .map_err(|e| PortError::Encoding(format!("domain.verifyingContract: {e}")))?;
                Value::String(address.to_checksum(None))
            }
            "salt" => {
                let salt: B256 = domain_str(key, value)?
                    .parse()
                    .map_err(|e| PortError::Encoding(format!("domain.salt: {e}")))?;
                Value::String(alloy::hex::encode_prefixed(salt))
            }
            other => {
                return Err(PortError::Encoding(format!(
                    "unsupported domain field '{other}'"
                )))
            }
        };
        out.insert(key.clone(), normalized);
    }
    Ok(out)
}

fn domain_str<'a>(key: &str, value: &'a Value) -> Result<&'a str, PortError> {
    value
        .as_str()
        .ok_or_else(|| PortError::Encoding(format!("domain.{key} must be a string")))
}

fn domain_uint(value: &Value) -> Result<U256, PortError> {
    match value {
        Value::Number(num) => parse_u256(&num.to_string()),
        Value::String(s) => parse_u256(s),
        _ => Err(PortError::Encoding(
            "domain.chainId must be a number or numeric string".to_owned(),
        )),
    }
}

fn parse_u256(raw: &str) -> Result<U256, PortError> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        U256::from_str_radix(hex, 16)
            .map_err(|e| PortError::Encoding(format!("invalid hex integer: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Encoding(format!("invalid integer: {e}")))
    }
}
