use eyre::Result;
use rusty_safe_verify_adapters::HashingAdapter;
use rusty_safe_verify_core::HashingPort;

use super::Target;
use crate::cli::HashArgs;
use crate::output::HashOutput;

pub fn run(args: HashArgs, json: bool) -> Result<()> {
    let target = Target::from_args(&args.target)?;
    let hashing = HashingAdapter::default();

    let envelope = hashing.build_envelope(target.chain_id, target.safe_address, &target.message)?;
    let safe_message_hash = hashing.safe_message_hash(&envelope)?;

    HashOutput {
        chain_id: target.chain_id,
        safe_address: target.safe_address,
        raw_message_hash: envelope.message,
        safe_message_hash,
        safe_message: envelope.to_document(),
    }
    .print(json)
}
