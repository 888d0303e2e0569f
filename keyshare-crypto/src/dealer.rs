//! Trusted dealer for a key epoch. Used by devnets and tests.

use std::fmt;
use std::num::NonZeroU32;

use ark_bls12_381::G1Affine;
use ark_std::UniformRand;
use ark_std::rand::Rng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::bls::BlsScheme;
use crate::feldman::{FeldmanVss, FeldmanVssPublicParam};
use crate::traits::vss::{VerifiableSecretSharing, VssError};
use crate::{G2, KEY_SHARE_LEN, SchemeError, Scalar, hash_to_g1};

#[derive(Debug, Clone, Copy)]
pub struct Dealer {
    pp: FeldmanVssPublicParam,
}

/// The output of one dealing: the commitment every key holder registers and the
/// per-holder secret shares.
pub struct Dealing {
    secret: SecretShare,
    commitment: Vec<u8>,
    shares: Vec<SecretShare>,
}

/// A secret Shamir share `f(index + 1)`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretShare {
    #[zeroize(skip)]
    index: u32,
    share: Scalar,
}

impl Dealer {
    pub fn new(threshold: NonZeroU32, nodes: NonZeroU32) -> Result<Self, VssError> {
        Ok(Self {
            pp: FeldmanVssPublicParam::new(threshold, nodes)?,
        })
    }

    pub fn deal<R: Rng>(&self, rng: &mut R) -> Dealing {
        let secret = Scalar::rand(rng);
        self.deal_secret(rng, secret)
    }

    pub fn deal_secret<R: Rng>(&self, rng: &mut R, secret: Scalar) -> Dealing {
        let (shares, comm) = FeldmanVss::<G2>::share(&self.pp, rng, secret);
        Dealing {
            secret: SecretShare {
                index: u32::MAX,
                share: secret,
            },
            commitment: BlsScheme::encode_commitment(&comm),
            shares: shares
                .into_iter()
                .zip(0..)
                .map(|(share, index)| SecretShare { index, share })
                .collect(),
        }
    }
}

impl Dealing {
    /// Encoded Feldman commitment of the dealing.
    pub fn commitment(&self) -> &[u8] {
        &self.commitment
    }

    pub fn shares(&self) -> &[SecretShare] {
        &self.shares
    }

    pub fn share(&self, index: u32) -> Option<&SecretShare> {
        self.shares.get(index as usize)
    }

    /// The master secret `f(0)`.
    pub fn secret(&self) -> &Scalar {
        &self.secret.share
    }
}

impl fmt::Debug for Dealing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dealing")
            .field("commitment", &self.commitment.len())
            .field("shares", &self.shares.len())
            .finish()
    }
}

impl SecretShare {
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Key share for a context: `f(index + 1) * H(context)`.
    pub fn extract(&self, context: &[u8]) -> Result<Vec<u8>, SchemeError> {
        extract(&self.share, context)
    }
}

impl fmt::Debug for SecretShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretShare({})", self.index)
    }
}

/// Multiply `H(context)` by a secret scalar.
pub fn extract(secret: &Scalar, context: &[u8]) -> Result<Vec<u8>, SchemeError> {
    let h = hash_to_g1(context)?;
    let k: G1Affine = (h * *secret).into();
    let v = BlsScheme::encode_g1(&k);
    debug_assert_eq!(v.len(), KEY_SHARE_LEN);
    Ok(v)
}
