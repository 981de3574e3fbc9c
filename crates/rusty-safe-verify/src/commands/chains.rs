use alloy::primitives::ChainId;
use eyre::Result;
use safe_utils::{get_all_supported_chain_names, Of};
use tracing::warn;

use crate::output::{print_chains, ChainOutput};

pub fn run(json: bool) -> Result<()> {
    let chains: Vec<ChainOutput> = get_all_supported_chain_names()
        .into_iter()
        .filter_map(|name| match ChainId::of(&name) {
            Ok(chain_id) => Some(ChainOutput { name, chain_id }),
            Err(e) => {
                warn!(%name, error = %e, "skipping chain without id");
                None
            }
        })
        .collect();
    print_chains(&chains, json)
}
