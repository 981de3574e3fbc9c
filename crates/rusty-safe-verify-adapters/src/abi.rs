use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use rusty_safe_verify_core::{OnchainHashVariant, PortError};

sol! {
    interface ISafe {
        function getThreshold() external view returns (uint256);
        function getMessageHash(bytes memory message) external view returns (bytes32);
        function isValidSignature(bytes calldata _data, bytes calldata _signature) external view returns (bytes4);
    }

    interface ISafeMessageHashForSafe {
        function getMessageHashForSafe(address safe, bytes memory message) external view returns (bytes32);
    }

    struct SafeMessage {
        bytes message;
    }
}

/// `bytes4(keccak256("isValidSignature(bytes,bytes)"))`, returned by Safe's
/// CompatibilityFallbackHandler for a valid signature.
pub const EIP1271_LEGACY_MAGIC_VALUE: [u8; 4] = [0x20, 0xc1, 0x3b, 0x0b];

pub fn get_threshold_calldata() -> Bytes {
    ISafe::getThresholdCall {}.abi_encode().into()
}

pub fn message_hash_calldata(variant: OnchainHashVariant, safe: Address, raw_hash: B256) -> Bytes {
    let message = Bytes::from(raw_hash.to_vec());
    match variant {
        OnchainHashVariant::LegacyGetMessageHash => {
            ISafe::getMessageHashCall { message }.abi_encode().into()
        }
        OnchainHashVariant::GetMessageHashForSafe => {
            ISafeMessageHashForSafe::getMessageHashForSafeCall { safe, message }
                .abi_encode()
                .into()
        }
    }
}

/// The legacy handler takes the raw message hash as `_data`, not the SafeMessage hash.
pub fn is_valid_signature_calldata(raw_hash: B256, signature: &Bytes) -> Bytes {
    ISafe::isValidSignatureCall {
        _data: Bytes::from(raw_hash.to_vec()),
        _signature: signature.clone(),
    }
    .abi_encode()
    .into()
}

pub fn decode_threshold(data: &[u8]) -> Result<U256, PortError> {
    ISafe::getThresholdCall::abi_decode_returns(data, true)
        .map(|ret| ret._0)
        .map_err(|e| PortError::Contract(format!("getThreshold returned malformed data: {e}")))
}

pub fn decode_bytes32(data: &[u8]) -> Result<B256, PortError> {
    ISafe::getMessageHashCall::abi_decode_returns(data, true)
        .map(|ret| ret._0)
        .map_err(|e| PortError::Contract(format!("message hash call returned malformed data: {e}")))
}

/// Compares the leading four bytes of the raw `isValidSignature` return data.
pub fn is_magic_value(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == EIP1271_LEGACY_MAGIC_VALUE
}
