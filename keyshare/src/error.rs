use keyshare_crypto::SchemeError;
use keyshare_store::StoreError;
use keyshare_types::{Address, Height, Identity, InvalidParams, RequesterKind};

use crate::request::RequesterError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum KeyshareError {
    #[error("validator {0} already registered")]
    ValidatorAlreadyRegistered(Address),

    #[error("validator {0} not registered")]
    ValidatorNotRegistered(Address),

    #[error("commitment of {owner} for round {round} already registered")]
    AlreadyRegistered { owner: Address, round: u64 },

    #[error("no commitment of {owner} for round {round}")]
    CommitmentNotFound { owner: Address, round: u64 },

    #[error("provided commitments are empty")]
    EmptyCommitments,

    #[error("no commitments for round {0}")]
    CommitmentsNotFound(u64),

    #[error("invalid commitment: {0}")]
    InvalidCommitment(#[source] SchemeError),

    #[error("invalid commitment length, expected {expected} coefficients, got {got}")]
    InvalidCommitmentLength { expected: usize, got: usize },

    #[error("invalid share / commitment")]
    InvalidShare,

    #[error("invalid key share index {0}")]
    InvalidKeyShareIndex(u32),

    #[error("invalid key share length, expected {expected}, got {got}")]
    InvalidKeyShareLength { expected: usize, got: usize },

    #[error("invalid public key length, expected {expected}, got {got}")]
    InvalidPubKeyLength { expected: usize, got: usize },

    #[error("invalid public key")]
    InvalidPubKey,

    #[error("insufficient shares for {height}: {have} < {need}")]
    InsufficientShares {
        height: Height,
        have: usize,
        need: usize,
    },

    #[error("no active public key")]
    NoActivePublicKey,

    #[error("a queued key already exists")]
    QueuedKeyAlreadyExists,

    #[error("address {0} is not trusted")]
    AddressNotTrusted(Address),

    #[error("not enough validators: {have} < {need}")]
    NotEnoughValidators { have: usize, need: usize },

    #[error("invalid block height {0}")]
    InvalidBlockHeight(Height),

    #[error("no key share request for identity {0}")]
    RequestNotFound(Identity),

    #[error("no aggregated key share for {0:?}")]
    AggregatedKeyNotFound(Option<Height>),

    #[error("no {0} requester")]
    UnknownRequester(RequesterKind),

    #[error("requester error: {0}")]
    Requester(#[from] RequesterError),

    #[error("failed to combine shares: {0}")]
    Combine(#[source] SchemeError),

    #[error("invalid parameters: {0}")]
    Params(#[from] InvalidParams),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl KeyshareError {
    /// Map a share verification failure to the module error.
    pub(crate) fn from_share_check(e: SchemeError) -> Self {
        match e {
            SchemeError::KeyShareLength(expected, got) => Self::InvalidKeyShareLength { expected, got },
            SchemeError::CommitmentLength(_) | SchemeError::InvalidCommitment => {
                Self::InvalidCommitment(e)
            }
            _ => Self::InvalidShare,
        }
    }

    pub(crate) fn from_public_key_check(e: SchemeError) -> Self {
        match e {
            SchemeError::PublicKeyLength(expected, got) => Self::InvalidPubKeyLength { expected, got },
            _ => Self::InvalidPubKey,
        }
    }

    pub(crate) fn from_combine(e: SchemeError) -> Self {
        match e {
            SchemeError::DuplicateIndex(i) => Self::InvalidKeyShareIndex(i),
            _ => Self::Combine(e),
        }
    }
}
