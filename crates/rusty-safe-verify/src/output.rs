use alloy::primitives::{Address, B256};
use eyre::Result;
use serde::Serialize;

use rusty_safe_verify_core::{Eip712Document, VerificationReport};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashOutput {
    pub chain_id: u64,
    pub safe_address: Address,
    pub raw_message_hash: B256,
    pub safe_message_hash: B256,
    pub safe_message: Eip712Document,
}

impl HashOutput {
    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
        } else {
            println!("Chain: {}", self.chain_id);
            println!("Safe: {}", self.safe_address);
            println!("Message hash: {}", self.raw_message_hash);
            println!("SafeMessage hash: {}", self.safe_message_hash);
            println!("SafeMessage:");
            println!("{}", serde_json::to_string_pretty(&self.safe_message)?);
        }
        Ok(())
    }
}

pub fn print_report(report: &VerificationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("Chain: {}", report.chain_id);
    println!("Safe: {}", report.safe_address);
    if let Some(hash) = report.raw_message_hash {
        println!("Message hash: {hash}");
    }
    if let Some(hash) = report.safe_message_hash {
        println!("SafeMessage hash: {hash}");
    }
    if let Some(hash) = report.onchain_message_hash {
        println!("On-chain SafeMessage hash: {hash}");
    }
    match (report.confirmations, report.threshold) {
        (Some(confirmations), Some(threshold)) => {
            println!("Confirmations: {confirmations}/{threshold}")
        }
        (Some(confirmations), None) => println!("Confirmations: {confirmations}"),
        _ => {}
    }
    println!("Is signature valid?: {}", report.result);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOutput {
    pub name: String,
    pub chain_id: u64,
}

pub fn print_chains(chains: &[ChainOutput], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(chains)?);
    } else {
        for chain in chains {
            println!("{:>10}  {}", chain.chain_id, chain.name);
        }
    }
    Ok(())
}
