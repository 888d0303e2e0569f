use std::num::NonZeroUsize;

use ark_bls12_381::{Bls12_381, G1Affine, G2Affine};
use ark_ec::hashing::curve_maps::wb::WBMap;
use ark_ec::hashing::map_to_curve_hasher::MapToCurveBasedHasher;
use ark_ec::hashing::HashToCurve;
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::field_hashers::DefaultFieldHasher;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use sha2::Sha256;

use crate::feldman::FeldmanVss;
use crate::interpolation::interpolate_in_exponent;
use crate::{G1, G2, SchemeError, Scalar, ShareScheme};

type H2C = MapToCurveBasedHasher<G1, DefaultFieldHasher<Sha256>, WBMap<ark_bls12_381::g1::Config>>;

const DOMAIN: &[u8] = b"KEYSHARE-V01-CS01-with-BLS12381G1_XMD:SHA-256_SSWU_RO_";

/// Compressed size of a key share (a G1 point).
pub const KEY_SHARE_LEN: usize = 48;

/// Compressed size of an aggregated key (a G1 point).
pub const AGGREGATED_KEY_LEN: usize = 48;

/// Compressed size of a public key (a G2 point).
pub const PUBLIC_KEY_LEN: usize = 96;

/// Map a context (height or identity) to the G1 point its key is derived from.
pub fn hash_to_g1(context: &[u8]) -> Result<G1Affine, SchemeError> {
    let hasher = H2C::new(DOMAIN).map_err(|e| SchemeError::Internal(format!("{e:?}")))?;
    hasher
        .hash(context)
        .map_err(|e| SchemeError::Internal(format!("{e:?}")))
}

/// Threshold extraction of Boneh-Franklin identity keys over BLS12-381.
///
/// - commitment: compressed list of `g2^a_j` (Feldman commitment of the dealing)
/// - share of node `i` for context `c`: `f(i+1) * H(c)` in G1
/// - verification: `e(share, g2) == e(H(c), g2^f(i+1))`
/// - combination: interpolation in the exponent, giving `f(0) * H(c)`
#[derive(Debug, Clone, Copy, Default)]
pub struct BlsScheme;

impl BlsScheme {
    pub fn new() -> Self {
        Self
    }

    /// Decode a commitment: a little-endian `u64` count followed by that many compressed
    /// G2 points.
    ///
    /// The count is checked against the input length before any point is decoded.
    pub(crate) fn decode_commitment(bytes: &[u8]) -> Result<Vec<G2Affine>, SchemeError> {
        let (n, points) = bytes
            .split_first_chunk::<8>()
            .ok_or(SchemeError::CommitmentLength(bytes.len()))?;
        let n = u64::from_le_bytes(*n);
        if n == 0 {
            return Err(SchemeError::InvalidCommitment);
        }
        let expected = usize::try_from(n)
            .ok()
            .and_then(|n| n.checked_mul(PUBLIC_KEY_LEN));
        if expected != Some(points.len()) {
            return Err(SchemeError::CommitmentLength(bytes.len()));
        }
        points
            .chunks_exact(PUBLIC_KEY_LEN)
            .map(|c| {
                G2Affine::deserialize_compressed(c).map_err(|_| SchemeError::InvalidCommitment)
            })
            .collect()
    }

    pub(crate) fn encode_commitment(comm: &[G2Affine]) -> Vec<u8> {
        let mut v = Vec::with_capacity(8 + comm.len() * PUBLIC_KEY_LEN);
        comm.serialize_compressed(&mut v)
            .expect("serializing into a vector never fails");
        v
    }

    pub(crate) fn decode_g1(bytes: &[u8], len: usize) -> Result<G1Affine, SchemeError> {
        if bytes.len() != len {
            return Err(SchemeError::KeyShareLength(len, bytes.len()));
        }
        G1Affine::deserialize_compressed(bytes).map_err(|_| SchemeError::InvalidKeyShare)
    }

    pub(crate) fn encode_g1(p: &G1Affine) -> Vec<u8> {
        let mut v = Vec::with_capacity(KEY_SHARE_LEN);
        p.serialize_compressed(&mut v)
            .expect("serializing into a vector never fails");
        v
    }

    /// Decode a compressed public key.
    pub fn decode_public_key(bytes: &[u8]) -> Result<G2Affine, SchemeError> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(SchemeError::PublicKeyLength(PUBLIC_KEY_LEN, bytes.len()));
        }
        G2Affine::deserialize_compressed(bytes).map_err(|_| SchemeError::InvalidPublicKey)
    }
}

impl ShareScheme for BlsScheme {
    fn public_key(&self, commitment: &[u8]) -> Result<Vec<u8>, SchemeError> {
        let comm = Self::decode_commitment(commitment)?;
        let mut v = Vec::with_capacity(PUBLIC_KEY_LEN);
        comm[0]
            .serialize_compressed(&mut v)
            .expect("serializing into a vector never fails");
        Ok(v)
    }

    fn check_public_key(&self, public_key: &[u8]) -> Result<(), SchemeError> {
        Self::decode_public_key(public_key).map(|_| ())
    }

    fn coefficients(&self, commitment: &[u8]) -> Result<Option<NonZeroUsize>, SchemeError> {
        let comm = Self::decode_commitment(commitment)?;
        Ok(NonZeroUsize::new(comm.len()))
    }

    fn verify_share(
        &self,
        commitment: &[u8],
        index: u32,
        context: &[u8],
        share: &[u8],
    ) -> Result<bool, SchemeError> {
        let comm = Self::decode_commitment(commitment)?;
        let share = Self::decode_g1(share, KEY_SHARE_LEN)?;
        let public_share = FeldmanVss::<G2>::derive_public_share(index as usize, &comm)
            .map_err(|_| SchemeError::InvalidCommitment)?;
        let h = hash_to_g1(context)?;
        let lhs = Bls12_381::pairing(share, G2Affine::generator());
        let rhs = Bls12_381::pairing(h, public_share.into_affine());
        Ok(lhs == rhs)
    }

    fn combine(&self, shares: &[(u32, Vec<u8>)]) -> Result<Vec<u8>, SchemeError> {
        if shares.is_empty() {
            return Err(SchemeError::NoShares);
        }
        let mut points = Vec::with_capacity(shares.len());
        let mut evals = Vec::with_capacity(shares.len());
        for (i, (idx, bytes)) in shares.iter().enumerate() {
            if shares[..i].iter().any(|(j, _)| j == idx) {
                return Err(SchemeError::DuplicateIndex(*idx));
            }
            points.push(Scalar::from(u64::from(*idx) + 1));
            evals.push(Self::decode_g1(bytes, KEY_SHARE_LEN)?);
        }
        let key = interpolate_in_exponent::<G1>(&points, &evals)?;
        Ok(Self::encode_g1(&key.into_affine()))
    }
}
