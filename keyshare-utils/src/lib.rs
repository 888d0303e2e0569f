pub mod logging;

use keyshare_types::{Address, Keypair};

pub fn unsafe_zero_keypair<N: Into<u64>>(i: N) -> Keypair {
    keypair_from_seed_indexed([0u8; 32], i.into())
}

pub fn keypair_from_seed_indexed(seed: [u8; 32], index: u64) -> Keypair {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed);
    hasher.update(&index.to_le_bytes());
    let new_seed = *hasher.finalize().as_bytes();
    Keypair::from_seed(new_seed)
}

/// Address of the `i`-th zero-seeded keypair.
pub fn unsafe_zero_address<N: Into<u64>>(i: N) -> Address {
    Address::from(&unsafe_zero_keypair(i).public_key())
}

pub fn bs58_encode(b: &[u8]) -> String {
    bs58::encode(b).into_string()
}
