use keyshare_store::StoreError;
use keyshare_types::Height;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ScheduleError {
    #[error("target height {target} must be greater than current height {current}")]
    InvalidTargetHeight { current: Height, target: Height },

    #[error("encrypted transaction data is empty")]
    EmptyData,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Why a scheduled transaction, or part of it, was reverted.
///
/// The display form is the `reason` attribute of the revert event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ExecError {
    #[error("unable to resolve creator {0}")]
    ActorResolutionFailed(String),

    #[error("unable to decode tx data: {0}")]
    Decode(String),

    #[error("unable to wrap tx: {0}")]
    Wrap(&'static str),

    #[error("unable to get tx signature: {0}")]
    Signatures(String),

    #[error("signer public key does not match sender public key")]
    SignerMismatch,

    #[error("incorrect nonce sequence: expected {expected}, got {got}")]
    NonceMismatch { expected: u64, got: u64 },

    #[error("invalid signature")]
    InvalidSignature,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ExecError {
    /// Does this failure abort the remaining transactions of the block?
    pub fn halts_batch(&self) -> bool {
        !matches!(self, Self::InvalidSignature | Self::Dispatch(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error("no handler for message type {0}")]
    Unroutable(String),

    #[error("message {type_url} failed: {reason}")]
    Failed { type_url: String, reason: String },
}
