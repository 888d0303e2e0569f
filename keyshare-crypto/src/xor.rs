//! A deliberately insecure stand-in for [`crate::BlsScheme`].
//!
//! A commitment is `public_key (32 bytes) || seed (32 bytes)`; the only valid share for a
//! context is `blake3(seed || context)`; combining XORs the shares in index order. This keeps
//! protocol tests independent of curve arithmetic.

use std::num::NonZeroUsize;

use crate::{SchemeError, ShareScheme};

const HALF: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct XorScheme;

impl XorScheme {
    /// Build a commitment for a key holder.
    pub fn commitment(public_key: [u8; HALF], seed: [u8; HALF]) -> Vec<u8> {
        let mut v = Vec::with_capacity(2 * HALF);
        v.extend_from_slice(&public_key);
        v.extend_from_slice(&seed);
        v
    }

    /// The valid share for `context` under the given seed.
    pub fn share(seed: [u8; HALF], context: &[u8]) -> Vec<u8> {
        let mut h = blake3::Hasher::new();
        h.update(&seed);
        h.update(context);
        h.finalize().as_bytes().to_vec()
    }

    fn split(commitment: &[u8]) -> Result<(&[u8], &[u8]), SchemeError> {
        if commitment.len() != 2 * HALF {
            return Err(SchemeError::CommitmentLength(commitment.len()));
        }
        Ok(commitment.split_at(HALF))
    }
}

impl ShareScheme for XorScheme {
    fn public_key(&self, commitment: &[u8]) -> Result<Vec<u8>, SchemeError> {
        Self::split(commitment).map(|(pk, _)| pk.to_vec())
    }

    fn check_public_key(&self, public_key: &[u8]) -> Result<(), SchemeError> {
        if public_key.len() != HALF {
            return Err(SchemeError::PublicKeyLength(HALF, public_key.len()));
        }
        Ok(())
    }

    fn coefficients(&self, commitment: &[u8]) -> Result<Option<NonZeroUsize>, SchemeError> {
        Self::split(commitment).map(|_| None)
    }

    fn verify_share(
        &self,
        commitment: &[u8],
        _index: u32,
        context: &[u8],
        share: &[u8],
    ) -> Result<bool, SchemeError> {
        let (_, seed) = Self::split(commitment)?;
        if share.len() != HALF {
            return Err(SchemeError::KeyShareLength(HALF, share.len()));
        }
        let mut s = [0; HALF];
        s.copy_from_slice(seed);
        Ok(Self::share(s, context) == share)
    }

    fn combine(&self, shares: &[(u32, Vec<u8>)]) -> Result<Vec<u8>, SchemeError> {
        if shares.is_empty() {
            return Err(SchemeError::NoShares);
        }
        let mut sorted: Vec<_> = shares.iter().collect();
        sorted.sort_by_key(|(i, _)| *i);
        let mut key = [0u8; HALF];
        for (i, (idx, share)) in sorted.iter().enumerate() {
            if i > 0 && sorted[i - 1].0 == *idx {
                return Err(SchemeError::DuplicateIndex(*idx));
            }
            if share.len() != HALF {
                return Err(SchemeError::KeyShareLength(HALF, share.len()));
            }
            key.iter_mut().zip(share.iter()).for_each(|(k, s)| *k ^= s);
        }
        Ok(key.to_vec())
    }
}
