//! Threshold key shares for identity based decryption keys.
//!
//! Key holders receive a Shamir share `f(i+1)` of a master secret `f(0)` together with a
//! Feldman commitment to `f`. For every context (a block height or a request identity) a
//! holder reveals `f(i+1) * H(context)`. Anyone can check such a share against the
//! commitment, and any `t` valid shares combine into `f(0) * H(context)`, the decryption key
//! for ciphertexts bound to that context under the public key `g2^f(0)`.
//!
//! The protocol layer only talks to the byte-oriented [`ShareScheme`] trait, so it can be
//! exercised with the trivial XOR scheme in [`xor`] (feature `test`).

mod bls;
pub mod dealer;
pub mod feldman;
mod interpolation;
pub mod traits;

#[cfg(any(test, feature = "test"))]
pub mod xor;

pub use bls::{AGGREGATED_KEY_LEN, BlsScheme, KEY_SHARE_LEN, PUBLIC_KEY_LEN, hash_to_g1};
pub use traits::scheme::{SchemeError, ShareScheme};

/// Scalar field of the pairing groups.
pub type Scalar = ark_bls12_381::Fr;

/// Group holding key shares and aggregated keys.
pub type G1 = ark_bls12_381::G1Projective;

/// Group holding commitments and public keys.
pub type G2 = ark_bls12_381::G2Projective;
