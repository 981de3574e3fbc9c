use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{VerificationRequest, VerificationResult};
use crate::ports::{HashingPort, MessageServicePort, PortError, SafeContractPort};
use crate::state_machine::{verify_transition, StageTransition, VerifyAction, VerifyStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Compare the locally derived SafeMessage hash with the one the Safe computes.
    pub cross_check_onchain_hash: bool,
    /// Upper bound for every remote step.
    pub step_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            cross_check_onchain_hash: true,
            step_timeout: Duration::from_millis(15_000),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub chain_id: u64,
    pub safe_address: Address,
    pub result: VerificationResult,
    pub raw_message_hash: Option<B256>,
    pub safe_message_hash: Option<B256>,
    pub onchain_message_hash: Option<B256>,
    pub threshold: Option<u64>,
    pub confirmations: Option<usize>,
    pub trail: Vec<StageTransition>,
    #[serde(skip)]
    stage: VerifyStage,
    #[serde(skip)]
    failure: Option<PortError>,
}

impl VerificationReport {
    fn new(request: &VerificationRequest) -> Self {
        Self {
            chain_id: request.chain_id,
            safe_address: request.safe_address,
            result: VerificationResult::error("not started"),
            raw_message_hash: None,
            safe_message_hash: None,
            onchain_message_hash: None,
            threshold: None,
            confirmations: None,
            trail: Vec::new(),
            stage: VerifyStage::Idle,
            failure: None,
        }
    }

    pub fn stage(&self) -> VerifyStage {
        self.stage
    }

    /// Maps the outcome onto the error taxonomy so callers can use `?`.
    pub fn into_result(self) -> Result<VerificationReport, PortError> {
        let err = match &self.result {
            VerificationResult::Valid => None,
            VerificationResult::Invalid => Some(PortError::InvalidSignature),
            VerificationResult::ThresholdNotMet {
                confirmations,
                threshold,
            } => Some(PortError::ThresholdNotMet {
                confirmations: *confirmations,
                threshold: *threshold,
            }),
            VerificationResult::Error(reason) => Some(
                self.failure
                    .clone()
                    .unwrap_or_else(|| PortError::IllegalTransition(reason.clone())),
            ),
        };
        match err {
            None => Ok(self),
            Some(err) => Err(err),
        }
    }

    /// Records `err` as the cause and reports it with its own message.
    fn fail_with(&mut self, err: PortError) -> VerificationResult {
        let reason = err.to_string();
        self.halt(reason, err)
    }

    /// Records `err` as the cause and reports `reason` as the visible outcome.
    fn halt(&mut self, reason: impl Into<String>, err: PortError) -> VerificationResult {
        self.failure = Some(err);
        VerificationResult::error(reason)
    }

    fn advance(&mut self, action: VerifyAction) -> Result<(), VerificationResult> {
        let (to, reason) =
            verify_transition(self.stage, action).map_err(|e| self.fail_with(e))?;
        debug!(from = ?self.stage, ?action, ?to, reason, "verification stage");
        self.trail.push(StageTransition {
            from: self.stage,
            action,
            to,
            reason,
        });
        self.stage = to;
        Ok(())
    }
}

/// Single-pass SafeMessage verification:
/// hash -> on-chain cross-check -> record lookup -> threshold gate -> EIP-1271 check.
///
/// Holds no state between calls; one instance can serve concurrent verifications.
pub struct VerificationOrchestrator<H, C, S>
where
    H: HashingPort,
    C: SafeContractPort,
    S: MessageServicePort,
{
    pub hashing: H,
    pub contract: C,
    pub service: S,
    pub settings: OrchestratorSettings,
}

impl<H, C, S> VerificationOrchestrator<H, C, S>
where
    H: HashingPort,
    C: SafeContractPort,
    S: MessageServicePort,
{
    pub fn new(hashing: H, contract: C, service: S, settings: OrchestratorSettings) -> Self {
        Self {
            hashing,
            contract,
            service,
            settings,
        }
    }

    pub async fn verify(&self, request: &VerificationRequest) -> VerificationReport {
        let mut report = VerificationReport::new(request);
        let result = match self.drive(request, &mut report).await {
            Ok(result) => result,
            Err(stop) => {
                let _ = report.advance(VerifyAction::Fail);
                stop
            }
        };
        info!(
            chain_id = request.chain_id,
            safe = %request.safe_address,
            safe_message_hash = ?report.safe_message_hash,
            outcome = %result,
            "safe message verification finished"
        );
        report.result = result;
        report
    }

    async fn drive(
        &self,
        request: &VerificationRequest,
        report: &mut VerificationReport,
    ) -> Result<VerificationResult, VerificationResult> {
        let safe = request.safe_address;

        let envelope = self
            .hashing
            .build_envelope(request.chain_id, safe, &request.message)
            .map_err(|e| report.fail_with(e))?;
        let raw_hash = envelope.message;
        let safe_message_hash = self
            .hashing
            .safe_message_hash(&envelope)
            .map_err(|e| report.fail_with(e))?;
        report.raw_message_hash = Some(raw_hash);
        report.safe_message_hash = Some(safe_message_hash);
        report.advance(VerifyAction::Derive)?;

        if self.settings.cross_check_onchain_hash {
            let onchain = self
                .bounded(
                    report,
                    "onchain_message_hash",
                    self.contract.onchain_message_hash(safe, raw_hash),
                )
                .await?
                .map_err(|e| report.halt("cannot derive on-chain hash", e))?;
            report.onchain_message_hash = Some(onchain);
            if onchain != safe_message_hash {
                warn!(%onchain, local = %safe_message_hash, "on-chain SafeMessage hash differs");
                return Err(report.halt(
                    "on-chain hash mismatch",
                    PortError::HashMismatch {
                        what: "on-chain",
                        expected: safe_message_hash,
                        actual: onchain,
                    },
                ));
            }
            report.advance(VerifyAction::CrossCheck)?;
        } else {
            report.advance(VerifyAction::SkipCrossCheck)?;
        }

        let record = self
            .bounded(
                report,
                "fetch_message",
                self.service.fetch_message(safe_message_hash, request.chain_id),
            )
            .await?
            .map_err(|e| report.halt("record not found", e))?;
        if record.message_hash != safe_message_hash {
            warn!(
                record = %record.message_hash,
                requested = %safe_message_hash,
                "transaction service returned a different message"
            );
            return Err(report.halt(
                "record hash mismatch",
                PortError::HashMismatch {
                    what: "record",
                    expected: safe_message_hash,
                    actual: record.message_hash,
                },
            ));
        }
        let confirmations = record.distinct_confirmations();
        report.confirmations = Some(confirmations);
        report.advance(VerifyAction::FetchRecord)?;

        let threshold = self
            .bounded(report, "threshold", self.contract.threshold(safe))
            .await?
            .ok();
        report.threshold = threshold;
        match threshold {
            Some(threshold) if confirmations as u64 >= threshold => {}
            _ => {
                return Err(VerificationResult::ThresholdNotMet {
                    confirmations,
                    threshold,
                })
            }
        }
        report.advance(VerifyAction::CheckThreshold)?;

        let signature = record.prepared_signature.clone().unwrap_or_default();
        let valid = self
            .bounded(
                report,
                "is_valid_signature",
                self.contract
                    .is_valid_signature(safe, raw_hash, &signature),
            )
            .await?
            .unwrap_or(false);
        report.advance(VerifyAction::ValidateSignature)?;

        Ok(if valid {
            VerificationResult::Valid
        } else {
            VerificationResult::Invalid
        })
    }

    /// Runs one remote call under the step timeout. A timeout, whether the step
    /// elapsed or the port gave up first, halts with `Error("timeout")`; any other
    /// failure is logged and handed back for the caller to fail closed on.
    async fn bounded<F, T>(
        &self,
        report: &mut VerificationReport,
        step: &'static str,
        fut: F,
    ) -> Result<Result<T, PortError>, VerificationResult>
    where
        F: Future<Output = Result<T, PortError>>,
    {
        let limit = self.settings.step_timeout;
        match tokio::time::timeout(limit, fut).await {
            Ok(Err(PortError::Timeout(what))) => {
                warn!(step, %what, "verification step timed out in transport");
                Err(report.halt("timeout", PortError::Timeout(format!("{step}: {what}"))))
            }
            Ok(Err(err)) => {
                warn!(step, error = %err, "verification step failed");
                Ok(Err(err))
            }
            Ok(Ok(value)) => Ok(Ok(value)),
            Err(_) => {
                warn!(step, timeout = ?limit, "verification step timed out");
                Err(report.halt(
                    "timeout",
                    PortError::Timeout(format!("{step} exceeded {limit:?}")),
                ))
            }
        }
    }
}
