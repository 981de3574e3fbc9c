use serde::Serialize;

use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerifyStage {
    Idle,
    Derived,
    CrossChecked,
    RecordFetched,
    ThresholdChecked,
    Done,
    Halted,
}

impl VerifyStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Halted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerifyAction {
    Derive,
    CrossCheck,
    SkipCrossCheck,
    FetchRecord,
    CheckThreshold,
    ValidateSignature,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTransition {
    pub from: VerifyStage,
    pub action: VerifyAction,
    pub to: VerifyStage,
    pub reason: &'static str,
}

pub fn verify_transition(
    stage: VerifyStage,
    action: VerifyAction,
) -> Result<(VerifyStage, &'static str), PortError> {
    use VerifyAction as A;
    use VerifyStage as S;

    let next = match (stage, action) {
        (S::Idle, A::Derive) => (S::Derived, "safe message hash derived"),
        (S::Derived, A::CrossCheck) => (S::CrossChecked, "on-chain hash matches"),
        (S::Derived, A::SkipCrossCheck) => (S::CrossChecked, "on-chain cross-check disabled"),
        (S::CrossChecked, A::FetchRecord) => (S::RecordFetched, "message record fetched"),
        (S::RecordFetched, A::CheckThreshold) => (S::ThresholdChecked, "threshold met"),
        (S::ThresholdChecked, A::ValidateSignature) => (S::Done, "signature checked"),
        (s, A::Fail) if !s.is_terminal() => (S::Halted, "verification halted"),
        (s, a) => {
            return Err(PortError::IllegalTransition(format!(
                "illegal verification transition: {s:?} -> {a:?}"
            )))
        }
    };
    Ok(next)
}
