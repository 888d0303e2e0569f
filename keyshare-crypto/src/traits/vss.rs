//! Verifiable secret sharing, used by the trusted dealer of a key epoch.

use ark_std::rand::Rng;
use thiserror::Error;

/// A trait for (t, n)-Verifiable Secret Sharing (VSS) schemes.
/// See: <https://en.wikipedia.org/wiki/Verifiable_secret_sharing>
///
/// `(t, n)` live in `PublicParam` rather than in const generics since a key epoch's
/// threshold and validator count are chain parameters known only at runtime.
pub trait VerifiableSecretSharing {
    type PublicParam;
    type Secret;
    type SecretShare;
    type Commitment;

    /// Generates a (t, n)-secret sharing of the given `secret`.
    ///
    /// Returns the `n` secret shares and the commitment to the sharing polynomial.
    fn share<R: Rng>(
        pp: &Self::PublicParam,
        rng: &mut R,
        secret: Self::Secret,
    ) -> (Vec<Self::SecretShare>, Self::Commitment);

    /// Verifies the secret share of node `node_idx` against the commitment.
    fn verify(
        pp: &Self::PublicParam,
        node_idx: usize,
        share: &Self::SecretShare,
        commitment: &Self::Commitment,
    ) -> Result<bool, VssError>;

    /// Reconstructs the secret from `t` (index, share) pairs.
    fn reconstruct(
        pp: &Self::PublicParam,
        shares: impl Iterator<Item = (usize, Self::SecretShare)>,
    ) -> Result<Self::Secret, VssError>;
}

/// Error types for [`VerifiableSecretSharing`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VssError {
    #[error("mismatched number of secret shares, expected: {0}, got: {1}")]
    MismatchedSharesCount(usize, usize),
    #[error("share index out of bound, max: {0}, got: {1}")]
    IndexOutOfBound(usize, usize),
    #[error("invalid VSS commitment")]
    InvalidCommitment,
    #[error("threshold {0} exceeds number of nodes {1}")]
    InvalidThreshold(u32, u32),
    #[error("failed to reconstruct: {0}")]
    FailedReconstruction(String),
}
