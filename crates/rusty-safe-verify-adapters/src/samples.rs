//! Sample typed-data documents a dapp would ask a Safe to sign.

use alloy::primitives::Address;
use serde_json::{json, Value};

use rusty_safe_verify_core::{Eip712Document, PortError};

const DAPP_NAME: &str = "EIP-1271 Example DApp";
const DAPP_VERSION: &str = "1.0";

/// `Mail(Person from,Person to,string contents)`, with `EIP712Domain` declared.
pub fn mail_example(
    chain_id: u64,
    verifying_contract: Address,
    contents: &str,
) -> Result<Eip712Document, PortError> {
    to_document(json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" },
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "account", "type": "address" },
            ],
            "Mail": [
                { "name": "from", "type": "Person" },
                { "name": "to", "type": "Person" },
                { "name": "contents", "type": "string" },
            ],
        },
        "primaryType": "Mail",
        "domain": domain(chain_id, verifying_contract),
        "message": {
            "from": { "name": "Alice", "account": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa" },
            "to": { "name": "Bob", "account": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb" },
            "contents": contents,
        },
    }))
}

/// Every elementary type plus a nested struct and a struct array. No `primaryType`.
pub fn nested_example(
    chain_id: u64,
    verifying_contract: Address,
    text: &str,
) -> Result<Eip712Document, PortError> {
    let nested = json!({
        "nestedString": text,
        "nestedAddress": "0x0000000000000000000000000000000000000002",
        "nestedUint256": 0,
        "nestedUint32": 1,
        "nestedBytes32": "0x000000000000000000000000000000000000000000000000000000000000da7a",
        "nestedBoolean": false,
    });
    to_document(json!({
        "types": {
            "Nested": [
                { "name": "nestedString", "type": "string" },
                { "name": "nestedAddress", "type": "address" },
                { "name": "nestedUint256", "type": "uint256" },
                { "name": "nestedUint32", "type": "uint32" },
                { "name": "nestedBytes32", "type": "bytes32" },
                { "name": "nestedBoolean", "type": "bool" },
            ],
            "Example": [
                { "name": "testString", "type": "string" },
                { "name": "testAddress", "type": "address" },
                { "name": "testUint256", "type": "uint256" },
                { "name": "testUint32", "type": "uint32" },
                { "name": "testBytes32", "type": "bytes32" },
                { "name": "testBoolean", "type": "bool" },
                { "name": "testNested", "type": "Nested" },
                { "name": "testNestedArray", "type": "Nested[]" },
            ],
        },
        "domain": domain(chain_id, verifying_contract),
        "message": {
            "testString": text,
            "testAddress": verifying_contract.to_checksum(None),
            "testUint256": "115792089237316195423570985008687907853269984665640564039457584007908834671663",
            "testUint32": "123",
            "testBytes32": "0x00000000000000000000000000000000000000000000000000000000deadbeef",
            "testBoolean": true,
            "testNested": nested.clone(),
            "testNestedArray": [nested.clone(), nested],
        },
    }))
}

fn domain(chain_id: u64, verifying_contract: Address) -> Value {
    json!({
        "name": DAPP_NAME,
        "version": DAPP_VERSION,
        "chainId": chain_id,
        "verifyingContract": verifying_contract.to_checksum(None),
    })
}

fn to_document(value: Value) -> Result<Eip712Document, PortError> {
    serde_json::from_value(value)
        .map_err(|e| PortError::Encoding(format!("invalid sample typed data: {e}")))
}
