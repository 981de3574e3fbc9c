use std::collections::BTreeMap;
use std::ffi::OsString;
use std::time::Duration;

use alloy::primitives::ChainId;
use safe_utils::Of;
use tracing::warn;

use rusty_safe_verify_core::{OnchainHashVariant, OrchestratorSettings, PortError};

pub const RPC_URL_ENV_PREFIX: &str = "RUSTY_SAFE_RPC_URL_";
pub const TX_SERVICE_URL_ENV_PREFIX: &str = "RUSTY_SAFE_TX_SERVICE_URL_";
pub const ONCHAIN_HASH_VARIANT_ENV: &str = "RUSTY_SAFE_ONCHAIN_HASH_VARIANT";
pub const CROSS_CHECK_ENV: &str = "RUSTY_SAFE_CROSS_CHECK";
pub const REQUEST_TIMEOUT_ENV: &str = "RUSTY_SAFE_REQUEST_TIMEOUT_MS";
pub const STEP_TIMEOUT_ENV: &str = "RUSTY_SAFE_STEP_TIMEOUT_MS";

/// Safe transaction service per chain id.
pub const DEFAULT_TX_SERVICE_URLS: &[(u64, &str)] = &[
    (1, "https://safe-transaction-mainnet.safe.global/api"),
    (5, "https://safe-transaction-goerli.safe.global/api"),
    (10, "https://safe-transaction-optimism.safe.global/api"),
    (56, "https://safe-transaction-bsc.safe.global/api"),
    (100, "https://safe-transaction-gnosis-chain.safe.global/api"),
    (137, "https://safe-transaction-polygon.safe.global/api"),
    (8453, "https://safe-transaction-base.safe.global/api"),
    (42161, "https://safe-transaction-arbitrum.safe.global/api"),
    (43114, "https://safe-transaction-avalanche.safe.global/api"),
    (11155111, "https://safe-transaction-sepolia.safe.global/api"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub rpc_urls: BTreeMap<u64, String>,
    pub tx_service_urls: BTreeMap<u64, String>,
    pub onchain_hash_variant: OnchainHashVariant,
    pub cross_check_onchain_hash: bool,
    /// Per HTTP request. Whichever of this and `step_timeout_ms` fires first,
    /// the step reports `Error("timeout")`.
    pub request_timeout_ms: u64,
    pub step_timeout_ms: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            rpc_urls: BTreeMap::new(),
            tx_service_urls: DEFAULT_TX_SERVICE_URLS
                .iter()
                .map(|(chain_id, url)| (*chain_id, (*url).to_owned()))
                .collect(),
            onchain_hash_variant: OnchainHashVariant::default(),
            cross_check_onchain_hash: true,
            request_timeout_ms: 30_000,
            step_timeout_ms: 15_000,
        }
    }
}

impl VerifierConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(unicode_vars(std::env::vars_os()));
        config
    }

    /// Overlays `RUSTY_SAFE_*` variables. Unparseable values are logged and skipped.
    pub fn apply_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(chain) = key.strip_prefix(RPC_URL_ENV_PREFIX) {
                match chain.parse::<u64>() {
                    Ok(chain_id) => {
                        self.rpc_urls.insert(chain_id, value);
                    }
                    Err(_) => warn!(%key, "ignoring rpc url for non-numeric chain id"),
                }
            } else if let Some(chain) = key.strip_prefix(TX_SERVICE_URL_ENV_PREFIX) {
                match chain.parse::<u64>() {
                    Ok(chain_id) => {
                        self.tx_service_urls.insert(chain_id, value);
                    }
                    Err(_) => warn!(%key, "ignoring tx service url for non-numeric chain id"),
                }
            } else if key == ONCHAIN_HASH_VARIANT_ENV {
                match value.parse() {
                    Ok(variant) => self.onchain_hash_variant = variant,
                    Err(err) => warn!(%key, %err, "ignoring on-chain hash variant"),
                }
            } else if key == CROSS_CHECK_ENV {
                match parse_flag(&value) {
                    Some(flag) => self.cross_check_onchain_hash = flag,
                    None => warn!(%key, %value, "ignoring non-boolean flag"),
                }
            } else if key == REQUEST_TIMEOUT_ENV {
                match value.parse() {
                    Ok(ms) => self.request_timeout_ms = ms,
                    Err(_) => warn!(%key, %value, "ignoring non-numeric timeout"),
                }
            } else if key == STEP_TIMEOUT_ENV {
                match value.parse() {
                    Ok(ms) => self.step_timeout_ms = ms,
                    Err(_) => warn!(%key, %value, "ignoring non-numeric timeout"),
                }
            }
        }
    }

    pub fn rpc_url(&self, chain_id: u64) -> Result<&str, PortError> {
        self.rpc_urls
            .get(&chain_id)
            .map(String::as_str)
            .ok_or_else(|| {
                PortError::InvalidInput(format!(
                    "no rpc url configured for chain {chain_id} (set {RPC_URL_ENV_PREFIX}{chain_id})"
                ))
            })
    }

    pub fn tx_service_url(&self, chain_id: u64) -> Result<&str, PortError> {
        self.tx_service_urls
            .get(&chain_id)
            .map(String::as_str)
            .ok_or_else(|| {
                PortError::InvalidInput(format!(
                    "no transaction service configured for chain {chain_id}"
                ))
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            cross_check_onchain_hash: self.cross_check_onchain_hash,
            step_timeout: Duration::from_millis(self.step_timeout_ms),
        }
    }
}

/// Accepts a decimal chain id or a chain name known to `safe_utils`.
pub fn resolve_chain_id(raw: &str) -> Result<u64, PortError> {
    let raw = raw.trim();
    if let Ok(chain_id) = raw.parse::<u64>() {
        return Ok(chain_id);
    }
    ChainId::of(raw).map_err(|e| PortError::InvalidInput(format!("unknown chain '{raw}': {e}")))
}

/// Drops variables whose name or value is not valid unicode.
fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
