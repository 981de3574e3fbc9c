pub mod abi;
pub mod config;
pub mod hashing;
pub mod rpc;
pub mod safe_contract;
pub mod safe_service;
pub mod samples;

pub use abi::{is_magic_value, EIP1271_LEGACY_MAGIC_VALUE};
pub use config::{resolve_chain_id, VerifierConfig, DEFAULT_TX_SERVICE_URLS};
pub use hashing::{
    parse_safe_address, static_safe_message_hash, HashingAdapter, SafeMessageBuilder,
    TypedDataHasher,
};
pub use rpc::JsonRpcSession;
pub use safe_contract::SafeContractReader;
pub use safe_service::MessageRecordFetcher;

use rusty_safe_verify_core::{PortError, VerificationOrchestrator};

pub type HttpOrchestrator =
    VerificationOrchestrator<HashingAdapter, SafeContractReader<JsonRpcSession>, MessageRecordFetcher>;

/// Wires the HTTP adapters for one chain from configuration.
pub fn http_orchestrator(
    config: &VerifierConfig,
    chain_id: u64,
) -> Result<HttpOrchestrator, PortError> {
    let rpc = JsonRpcSession::new(config.rpc_url(chain_id)?, config.request_timeout())?;
    Ok(VerificationOrchestrator::new(
        HashingAdapter::default(),
        SafeContractReader::new(rpc, config.onchain_hash_variant),
        MessageRecordFetcher::from_config(config)?,
        config.orchestrator_settings(),
    ))
}
