use alloy::primitives::{Address, Bytes, B256, U256};
use tracing::debug;

use rusty_safe_verify_core::{EthCallPort, OnchainHashVariant, PortError, SafeContractPort};

use crate::abi;

/// Safe view calls over any `eth_call` transport.
#[derive(Debug, Clone)]
pub struct SafeContractReader<T> {
    rpc: T,
    variant: OnchainHashVariant,
}

impl<T: EthCallPort> SafeContractReader<T> {
    pub fn new(rpc: T, variant: OnchainHashVariant) -> Self {
        Self { rpc, variant }
    }

    pub fn variant(&self) -> OnchainHashVariant {
        self.variant
    }

    pub fn rpc(&self) -> &T {
        &self.rpc
    }
}

impl<T: EthCallPort> SafeContractPort for SafeContractReader<T> {
    async fn threshold(&self, safe_address: Address) -> Result<u64, PortError> {
        let data = self
            .rpc
            .eth_call(safe_address, abi::get_threshold_calldata())
            .await?;
        let threshold = abi::decode_threshold(&data)?;
        if threshold.is_zero() {
            return Err(PortError::Contract("safe reports a zero threshold".to_owned()));
        }
        if threshold > U256::from(u64::MAX) {
            return Err(PortError::Contract(format!(
                "threshold {threshold} does not fit in u64"
            )));
        }
        debug!(safe = %safe_address, %threshold, "read safe threshold");
        Ok(threshold.as_limbs()[0])
    }

    async fn onchain_message_hash(
        &self,
        safe_address: Address,
        raw_hash: B256,
    ) -> Result<B256, PortError> {
        let calldata = abi::message_hash_calldata(self.variant, safe_address, raw_hash);
        let data = self.rpc.eth_call(safe_address, calldata).await?;
        abi::decode_bytes32(&data)
    }

    async fn is_valid_signature(
        &self,
        safe_address: Address,
        message_hash: B256,
        signature: &Bytes,
    ) -> Result<bool, PortError> {
        let calldata = abi::is_valid_signature_calldata(message_hash, signature);
        let data = self.rpc.eth_call(safe_address, calldata).await?;
        Ok(abi::is_magic_value(&data))
    }
}
