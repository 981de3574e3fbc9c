use eyre::Result;
use rusty_safe_verify_adapters::{http_orchestrator, VerifierConfig};
use rusty_safe_verify_core::VerificationRequest;
use tracing::info;

use super::Target;
use crate::cli::VerifyArgs;
use crate::output::print_report;

pub async fn run(args: VerifyArgs, json: bool) -> Result<()> {
    let target = Target::from_args(&args.target)?;

    let mut config = VerifierConfig::from_env();
    if let Some(url) = args.rpc_url {
        config.rpc_urls.insert(target.chain_id, url);
    }
    if let Some(url) = args.tx_service_url {
        config.tx_service_urls.insert(target.chain_id, url);
    }
    if let Some(variant) = args.variant {
        config.onchain_hash_variant = variant;
    }
    if args.no_cross_check {
        config.cross_check_onchain_hash = false;
    }
    if let Some(ms) = args.step_timeout_ms {
        config.step_timeout_ms = ms;
    }
    info!(
        chain_id = target.chain_id,
        safe = %target.safe_address,
        variant = %config.onchain_hash_variant,
        cross_check = config.cross_check_onchain_hash,
        "verifying safe message"
    );

    let orchestrator = http_orchestrator(&config, target.chain_id)?;
    let report = orchestrator
        .verify(&VerificationRequest {
            chain_id: target.chain_id,
            safe_address: target.safe_address,
            message: target.message,
        })
        .await;

    print_report(&report, json)?;
    if !report.result.is_valid() {
        eyre::bail!("{}", report.result);
    }
    Ok(())
}
