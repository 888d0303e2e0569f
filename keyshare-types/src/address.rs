use std::fmt;
use std::str::FromStr;

use committable::{Commitment, Committable, RawCommitmentBuilder};
use serde::{Deserialize, Serialize};

use crate::PublicKey;

/// Account address: the first 20 bytes of the blake3 digest of the account public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub fn zero() -> Self {
        Self([0; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<&PublicKey> for Address {
    fn from(k: &PublicKey) -> Self {
        let h = blake3::hash(k.as_slice());
        let mut a = [0; 20];
        a.copy_from_slice(&h.as_bytes()[..20]);
        Self(a)
    }
}

impl From<[u8; 20]> for Address {
    fn from(a: [u8; 20]) -> Self {
        Self(a)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut a = [0; 20];
        let n = bs58::decode(s)
            .onto(&mut a[..])
            .map_err(|_| InvalidAddress(()))?;
        if n != a.len() {
            return Err(InvalidAddress(()));
        }
        Ok(Self(a))
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = InvalidAddress;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Committable for Address {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("Address")
            .fixed_size_bytes(&self.0)
            .finalize()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid address")]
pub struct InvalidAddress(());
