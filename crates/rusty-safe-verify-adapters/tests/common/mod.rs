#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use alloy::hex;
use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;
use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

use rusty_safe_verify_adapters::abi::{ISafe, ISafeMessageHashForSafe};

pub type Calls = Arc<Mutex<Vec<String>>>;

pub fn safe_address() -> Address {
    "0x1111111111111111111111111111111111111111"
        .parse()
        .expect("safe address")
}

/// State a mocked Safe answers view calls from.
#[derive(Debug, Clone)]
pub struct ChainFixture {
    pub threshold: U256,
    pub onchain_hash: Option<B256>,
    pub signature_valid: bool,
    pub upper_case_result: bool,
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self {
            threshold: U256::from(1),
            onchain_hash: None,
            signature_valid: true,
            upper_case_result: false,
        }
    }
}

pub fn spawn_rpc_server(chain: ChainFixture) -> (String, Calls) {
    let server = Server::http("127.0.0.1:0").expect("start rpc server");
    let url = format!("http://{}", server.server_addr());
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);

    thread::spawn(move || {
        for _ in 0..32 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let (name, reply) = rpc_reply(&chain, &payload);
            if let Ok(mut g) = seen.lock() {
                g.push(name);
            }
            let response =
                Response::from_string(reply.to_string()).with_status_code(StatusCode(200));
            let _ = req.respond(response);
        }
    });

    (url, calls)
}

fn rpc_reply(chain: &ChainFixture, payload: &Value) -> (String, Value) {
    let id = payload.get("id").cloned().unwrap_or(json!(1));
    let data = payload["params"][0]["data"].as_str().unwrap_or_default();
    let selector = data.get(2..10).unwrap_or_default().to_ascii_lowercase();

    let (name, result): (&str, Result<String, &str>) =
        if selector == hex::encode(ISafe::getThresholdCall::SELECTOR) {
            (
                "getThreshold",
                Ok(format!("0x{}", hex::encode(chain.threshold.to_be_bytes::<32>()))),
            )
        } else if selector == hex::encode(ISafe::getMessageHashCall::SELECTOR) {
            (
                "getMessageHash",
                chain
                    .onchain_hash
                    .map(hex::encode_prefixed)
                    .ok_or("execution reverted"),
            )
        } else if selector
            == hex::encode(ISafeMessageHashForSafe::getMessageHashForSafeCall::SELECTOR)
        {
            (
                "getMessageHashForSafe",
                chain
                    .onchain_hash
                    .map(hex::encode_prefixed)
                    .ok_or("execution reverted"),
            )
        } else if selector == hex::encode(ISafe::isValidSignatureCall::SELECTOR) {
            let word = if chain.signature_valid {
                format!("20c13b0b{}", "0".repeat(56))
            } else {
                "0".repeat(64)
            };
            let word = if chain.upper_case_result {
                word.to_ascii_uppercase()
            } else {
                word
            };
            ("isValidSignature", Ok(format!("0x{word}")))
        } else {
            ("unknown", Err("unknown selector"))
        };

    let reply = match result {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": 3, "message": message },
        }),
    };
    (name.to_owned(), reply)
}

/// Serves `GET {base}/v1/messages/{hash}/` from `records`; anything else is a 404.
/// Returns the `/api` base URL.
pub fn spawn_service_server(records: Vec<Value>) -> (String, Calls) {
    let server = Server::http("127.0.0.1:0").expect("start service server");
    let base = format!("http://{}/api", server.server_addr());
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);

    thread::spawn(move || {
        for _ in 0..32 {
            let req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let path = req.url().to_ascii_lowercase();
            if let Ok(mut g) = seen.lock() {
                g.push(path.clone());
            }
            let found = match req.method() {
                Method::Get => records.iter().find(|record| {
                    record["messageHash"]
                        .as_str()
                        .map(|hash| path == format!("/api/v1/messages/{}/", hash.to_ascii_lowercase()))
                        .unwrap_or(false)
                }),
                _ => None,
            };
            let (code, payload) = match found {
                Some(record) => (200, record.to_string()),
                None => (404, json!({ "detail": "Not found." }).to_string()),
            };
            let _ = req.respond(Response::from_string(payload).with_status_code(StatusCode(code)));
        }
    });

    (base, calls)
}

/// Answers every request with the same status and body.
pub fn spawn_fixed_server(code: u16, body: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").expect("start fixed server");
    let base = format!("http://{}/api", server.server_addr());
    thread::spawn(move || {
        for _ in 0..8 {
            let req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let _ = req.respond(Response::from_string(body).with_status_code(StatusCode(code)));
        }
    });
    base
}

/// Answers every request with `body`, but only after `delay`.
pub fn spawn_slow_server(delay: Duration, body: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").expect("start slow server");
    let base = format!("http://{}/api", server.server_addr());
    thread::spawn(move || {
        for _ in 0..8 {
            let req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            thread::sleep(delay);
            let _ = req.respond(Response::from_string(body).with_status_code(StatusCode(200)));
        }
    });
    base
}

pub fn owner(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

pub fn record_json(message_hash: B256, message: Value, owners: &[u8], prepared: Option<String>) -> Value {
    let confirmations: Vec<Value> = owners
        .iter()
        .map(|seed| {
            json!({
                "created": "2023-03-01T10:00:00Z",
                "modified": "2023-03-01T10:00:00Z",
                "owner": owner(*seed),
                "signature": format!("0x{}", hex::encode([*seed; 65])),
                "signatureType": "EOA",
            })
        })
        .collect();
    json!({
        "created": "2023-03-01T10:00:00Z",
        "modified": "2023-03-01T10:05:00Z",
        "safe": safe_address(),
        "messageHash": hex::encode_prefixed(message_hash),
        "message": message,
        "proposedBy": owner(owners.first().copied().unwrap_or(0xaa)),
        "safeAppId": null,
        "confirmations": confirmations,
        "preparedSignature": prepared,
    })
}

pub fn prepared_signature(owners: &[u8]) -> String {
    let bytes: Vec<u8> = owners.iter().flat_map(|seed| [*seed; 65]).collect();
    hex::encode_prefixed(bytes)
}
