use std::cmp::Ordering;
use std::fmt;

use committable::{Commitment, Committable, RawCommitmentBuilder};
use data_encoding::BASE64URL_NOPAD;
use ed25519_compact as ed25519;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Account signing key pair.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Keypair {
    pair: ed25519::KeyPair,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key: ed25519::PublicKey,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    sig: ed25519::Signature,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            pair: ed25519::KeyPair::generate(),
        }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            pair: ed25519::KeyPair::from_seed(ed25519::Seed::new(seed)),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey { key: self.pair.pk }
    }

    /// Deterministic signature, so that replicas re-signing the same data agree.
    pub fn sign(&self, data: &[u8]) -> Signature {
        Signature {
            sig: self.pair.sk.sign(data, None),
        }
    }
}

impl PublicKey {
    pub fn is_valid(&self, data: &[u8], s: &Signature) -> bool {
        self.key.verify(data, &s.sig).is_ok()
    }

    pub fn as_bytes(&self) -> [u8; 32] {
        *self.key
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.key[..]
    }
}

impl Signature {
    pub fn as_bytes(&self) -> [u8; 64] {
        *self.sig
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.sig[..]
    }

    /// Base58 text form used in encoded transactions.
    pub fn to_bs58(&self) -> String {
        bs58::encode(self.as_slice()).into_string()
    }

    pub fn from_bs58(s: &str) -> Result<Self, InvalidSignature> {
        let v = bs58::decode(s)
            .into_vec()
            .map_err(|_| InvalidSignature(()))?;
        Self::try_from(&v[..])
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(value: [u8; 32]) -> Self {
        PublicKey {
            key: ed25519::PublicKey::new(value),
        }
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = InvalidPublicKey;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let k = ed25519::PublicKey::from_slice(value).map_err(|_| InvalidPublicKey(()))?;
        Ok(Self { key: k })
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = InvalidSignature;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let s = ed25519::Signature::from_slice(value).map_err(|_| InvalidSignature(()))?;
        Ok(Self { sig: s })
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key[..].cmp(&other.key[..])
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        bs58::encode(self.as_slice()).into_string().serialize(s)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        let v = bs58::decode(&s).into_vec().map_err(de::Error::custom)?;
        Self::try_from(&v[..]).map_err(de::Error::custom)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .field("secret_key", &"SecretKey")
            .finish()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64URL_NOPAD.encode(&self.as_bytes()))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64URL_NOPAD.encode(&self.as_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Debug>::fmt(self, f)
    }
}

impl Committable for PublicKey {
    fn commit(&self) -> Commitment<Self> {
        RawCommitmentBuilder::new("PublicKey")
            .fixed_size_field("key", &self.as_bytes())
            .finalize()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid public key")]
pub struct InvalidPublicKey(());

#[derive(Debug, thiserror::Error)]
#[error("invalid signature")]
pub struct InvalidSignature(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_text_form() {
        let k = Keypair::from_seed([7; 32]);
        let s = k.sign(b"hello");
        assert!(k.public_key().is_valid(b"hello", &s));
        assert!(!k.public_key().is_valid(b"hellO", &s));
        let t = s.to_bs58();
        assert_eq!(Signature::from_bs58(&t).unwrap(), s);
        assert!(Signature::from_bs58("0OIl").is_err());
        assert!(Signature::from_bs58("abc").is_err());
    }

    #[test]
    fn public_key_json() {
        let k = Keypair::from_seed([1; 32]).public_key();
        let j = serde_json::to_string(&k).unwrap();
        assert_eq!(serde_json::from_str::<PublicKey>(&j).unwrap(), k);
    }
}
