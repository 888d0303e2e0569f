//! Implementation of Feldman VSS

use std::iter::successors;
use std::marker::PhantomData;
use std::num::NonZeroU32;

use ark_ec::CurveGroup;
use ark_poly::{DenseUVPolynomial, Polynomial, univariate::DensePolynomial};
use ark_std::rand::Rng;

use crate::interpolation::interpolate;
use crate::traits::vss::{VerifiableSecretSharing, VssError};

/// Feldman VSS: <https://www.cs.umd.edu/~gasarch/TOPICS/secretsharing/feldmanVSS.pdf>
#[derive(Debug, Clone)]
pub struct FeldmanVss<C: CurveGroup>(PhantomData<C>);

#[derive(Debug, Clone, Copy)]
pub struct FeldmanVssPublicParam {
    // reconstruction threshold t
    pub(crate) t: NonZeroU32,
    // total number of nodes
    pub(crate) n: NonZeroU32,
}

impl FeldmanVssPublicParam {
    pub fn new(t: NonZeroU32, n: NonZeroU32) -> Result<Self, VssError> {
        if t > n {
            return Err(VssError::InvalidThreshold(t.get(), n.get()));
        }
        Ok(Self { t, n })
    }

    pub fn threshold(&self) -> NonZeroU32 {
        self.t
    }

    pub fn nodes(&self) -> NonZeroU32 {
        self.n
    }
}

impl<C: CurveGroup> FeldmanVss<C> {
    /// Sample a random polynomial with `f(0) = secret` and return it with its commitment
    /// `(g^a_0, g^a_1, ..., g^a_{t-1})`.
    pub(crate) fn rand_poly_and_commit<R: Rng>(
        pp: &FeldmanVssPublicParam,
        secret: C::ScalarField,
        rng: &mut R,
    ) -> (DensePolynomial<C::ScalarField>, Vec<C::Affine>) {
        // degree t-1, so any t evaluations interpolate it
        let mut poly = DensePolynomial::<C::ScalarField>::rand(pp.t.get() as usize - 1, rng);
        // t > 0, so coeffs[0] exists
        poly.coeffs[0] = secret;
        let commitment = C::generator().batch_mul(&poly.coeffs);
        (poly, commitment)
    }

    /// Node i in {0, .., n-1} gets f(i+1).
    pub(crate) fn compute_shares(
        pp: &FeldmanVssPublicParam,
        poly: &DensePolynomial<C::ScalarField>,
    ) -> impl Iterator<Item = C::ScalarField> {
        (0..pp.n.get()).map(|node_idx| poly.evaluate(&(node_idx + 1).into()))
    }

    /// Open the commitment at node `node_idx`'s evaluation point, i.e. compute `g^f(i+1)`
    /// as `Prod_j u_j^{(i+1)^j}`. This is the node's public share.
    pub fn derive_public_share(node_idx: usize, commitment: &[C::Affine]) -> Result<C, VssError> {
        if commitment.is_empty() {
            return Err(VssError::InvalidCommitment);
        }
        let eval_point = C::ScalarField::from(node_idx as u64 + 1);
        let powers = successors(Some(C::ScalarField::from(1u64)), |prev| {
            Some(*prev * eval_point)
        })
        .take(commitment.len())
        .collect::<Vec<_>>();
        C::msm(commitment, &powers).map_err(|_| VssError::InvalidCommitment)
    }
}

impl<C: CurveGroup> VerifiableSecretSharing for FeldmanVss<C> {
    type PublicParam = FeldmanVssPublicParam;
    type Secret = C::ScalarField;
    type SecretShare = C::ScalarField;
    type Commitment = Vec<C::Affine>;

    fn share<R: Rng>(
        pp: &Self::PublicParam,
        rng: &mut R,
        secret: Self::Secret,
    ) -> (Vec<Self::SecretShare>, Self::Commitment) {
        let (poly, comm) = Self::rand_poly_and_commit(pp, secret, rng);
        let shares = Self::compute_shares(pp, &poly).collect();
        (shares, comm)
    }

    fn verify(
        pp: &Self::PublicParam,
        node_idx: usize,
        share: &Self::SecretShare,
        commitment: &Self::Commitment,
    ) -> Result<bool, VssError> {
        let n = pp.n.get() as usize;
        if node_idx >= n {
            return Err(VssError::IndexOutOfBound(n - 1, node_idx));
        }
        if commitment.len() != pp.t.get() as usize {
            return Err(VssError::InvalidCommitment);
        }
        let public_share = Self::derive_public_share(node_idx, commitment)?;
        Ok(C::generator() * share == public_share)
    }

    fn reconstruct(
        pp: &Self::PublicParam,
        shares: impl Iterator<Item = (usize, Self::SecretShare)>,
    ) -> Result<Self::Secret, VssError> {
        let shares = shares.collect::<Vec<_>>();
        let n = pp.n.get() as usize;
        let t = pp.t.get() as usize;
        if shares.len() != t {
            return Err(VssError::MismatchedSharesCount(t, shares.len()));
        }
        if let Some((idx, _)) = shares.iter().find(|(idx, _)| *idx >= n) {
            return Err(VssError::IndexOutOfBound(n - 1, *idx));
        }
        let eval_points: Vec<_> = shares
            .iter()
            .map(|&(idx, _)| C::ScalarField::from(idx as u64 + 1))
            .collect();
        let evals: Vec<_> = shares.iter().map(|&(_, share)| share).collect();
        interpolate::<C>(&eval_points, &evals)
            .map_err(|e| VssError::FailedReconstruction(e.to_string()))
    }
}
