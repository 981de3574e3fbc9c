pub mod domain;
pub mod orchestrator;
pub mod ports;
pub mod state_machine;

pub use domain::{
    Confirmation, Eip712Document, FieldDef, MessageRecord, OnchainHashVariant, RawMessage,
    SafeMessageEnvelope, SignatureType, VerificationRequest, VerificationResult,
    EIP712_DOMAIN_TYPE, SAFE_MESSAGE_TYPE,
};
pub use orchestrator::{OrchestratorSettings, VerificationOrchestrator, VerificationReport};
pub use ports::{EthCallPort, HashingPort, MessageServicePort, PortError, SafeContractPort};
pub use state_machine::{verify_transition, StageTransition, VerifyAction, VerifyStage};
