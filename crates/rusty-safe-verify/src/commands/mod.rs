pub mod chains;
pub mod hash;
pub mod verify;

use std::fs;

use alloy::primitives::Address;
use eyre::{Result, WrapErr};
use rusty_safe_verify_adapters::samples::{mail_example, nested_example};
use rusty_safe_verify_adapters::{parse_safe_address, resolve_chain_id};
use rusty_safe_verify_core::{Eip712Document, RawMessage};

use crate::cli::{ExampleKind, TargetArgs};

/// Chain, Safe and message shared by `hash` and `verify`.
pub struct Target {
    pub chain_id: u64,
    pub safe_address: Address,
    pub message: RawMessage,
}

impl Target {
    pub fn from_args(args: &TargetArgs) -> Result<Self> {
        let chain_id = resolve_chain_id(&args.chain)?;
        let safe_address = parse_safe_address(&args.safe)?;
        let input = &args.input;

        let message = if let Some(text) = &input.message {
            RawMessage::from(text.as_str())
        } else if let Some(path) = &input.typed_data {
            let raw = fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            let doc: Eip712Document = serde_json::from_str(&raw)
                .wrap_err_with(|| format!("{} is not EIP-712 typed data", path.display()))?;
            RawMessage::from(doc)
        } else if let Some(kind) = input.example {
            let doc = match kind {
                ExampleKind::Mail => mail_example(chain_id, safe_address, &args.example_text)?,
                ExampleKind::Nested => nested_example(chain_id, safe_address, &args.example_text)?,
            };
            RawMessage::from(doc)
        } else {
            eyre::bail!("one of --message, --typed-data or --example is required");
        };

        Ok(Self {
            chain_id,
            safe_address,
            message,
        })
    }
}
