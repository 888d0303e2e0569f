//! The narrow interface between the key-share protocol and the cryptography backing it.

use std::num::NonZeroUsize;

use thiserror::Error;

/// A threshold scheme whose key holders publish commitments and reveal per-context shares.
///
/// All inputs and outputs are opaque byte strings so that the protocol layer can persist
/// them without knowing the underlying groups. Every method must be deterministic: replicas
/// evaluating the same inputs must reach the same decision.
pub trait ShareScheme {
    /// The public key bound by a commitment.
    fn public_key(&self, commitment: &[u8]) -> Result<Vec<u8>, SchemeError>;

    /// Check that bytes are a well-formed public key of this scheme.
    fn check_public_key(&self, public_key: &[u8]) -> Result<(), SchemeError>;

    /// Number of polynomial coefficients the commitment binds, if the scheme exposes it.
    ///
    /// Any `coefficients` valid shares are enough to combine a key.
    fn coefficients(&self, commitment: &[u8]) -> Result<Option<NonZeroUsize>, SchemeError>;

    /// Check a share of key holder `index` for `context` against the holder's commitment.
    ///
    /// Returns `Ok(false)` for a well-formed share which does not open the commitment and
    /// an error for malformed input.
    fn verify_share(
        &self,
        commitment: &[u8],
        index: u32,
        context: &[u8],
        share: &[u8],
    ) -> Result<bool, SchemeError>;

    /// Combine verified `(index, share)` pairs of the same context into the aggregated key.
    fn combine(&self, shares: &[(u32, Vec<u8>)]) -> Result<Vec<u8>, SchemeError>;
}

impl<T: ShareScheme + ?Sized> ShareScheme for Box<T> {
    fn public_key(&self, commitment: &[u8]) -> Result<Vec<u8>, SchemeError> {
        (**self).public_key(commitment)
    }

    fn check_public_key(&self, public_key: &[u8]) -> Result<(), SchemeError> {
        (**self).check_public_key(public_key)
    }

    fn coefficients(&self, commitment: &[u8]) -> Result<Option<NonZeroUsize>, SchemeError> {
        (**self).coefficients(commitment)
    }

    fn verify_share(
        &self,
        commitment: &[u8],
        index: u32,
        context: &[u8],
        share: &[u8],
    ) -> Result<bool, SchemeError> {
        (**self).verify_share(commitment, index, context, share)
    }

    fn combine(&self, shares: &[(u32, Vec<u8>)]) -> Result<Vec<u8>, SchemeError> {
        (**self).combine(shares)
    }
}

/// Error type for [`ShareScheme`] methods.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemeError {
    #[error("invalid key share length, expected: {0}, got: {1}")]
    KeyShareLength(usize, usize),
    #[error("invalid public key length, expected: {0}, got: {1}")]
    PublicKeyLength(usize, usize),
    #[error("invalid commitment length: {0}")]
    CommitmentLength(usize),
    #[error("invalid commitment")]
    InvalidCommitment,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid key share encoding")]
    InvalidKeyShare,
    #[error("no shares to combine")]
    NoShares,
    #[error("duplicate share index {0}")]
    DuplicateIndex(u32),
    #[error("internal error: {0}")]
    Internal(String),
}
