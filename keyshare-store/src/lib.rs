//! Ordered key/value storage.
//!
//! Block processing reads and writes state exclusively through [`KvStore`]. Keys compare
//! bytewise, so fixed width big-endian integers iterate in numeric order.

mod key;
mod mem;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use key::Key;
pub use mem::MemStore;

/// Ordered byte-keyed storage with prefix iteration.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set(&mut self, key: Vec<u8>, val: Vec<u8>);

    /// Remove a key, returning whether it was present.
    fn delete(&mut self, key: &[u8]) -> bool;

    /// All entries whose key starts with `prefix`, in ascending key order.
    ///
    /// The result is a snapshot; callers may mutate the store while walking it.
    fn prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    fn contains(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&mut self, key: Vec<u8>, val: Vec<u8>) {
        (**self).set(key, val)
    }

    fn delete(&mut self, key: &[u8]) -> bool {
        (**self).delete(key)
    }

    fn prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        (**self).prefix(prefix)
    }
}

/// Typed access on top of [`KvStore`], values encoded with bincode.
pub trait TypedStore: KvStore {
    fn load<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StoreError> {
        self.get(key).map(|v| decode(&v)).transpose()
    }

    fn store<T: Serialize>(&mut self, key: Vec<u8>, val: &T) -> Result<(), StoreError> {
        let v = encode(val)?;
        self.set(key, v);
        Ok(())
    }

    /// Decode all values under a prefix, in key order.
    fn values<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>, StoreError> {
        self.prefix(prefix)
            .into_iter()
            .map(|(_, v)| decode(&v))
            .collect()
    }
}

impl<S: KvStore + ?Sized> TypedStore for S {}

pub fn encode<T: Serialize>(val: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serde::encode_to_vec(val, bincode::config::standard()).map_err(StoreError::Encode)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    let (val, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(StoreError::Decode)?;
    Ok(val)
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("failed to encode value: {0}")]
    Encode(#[source] bincode::error::EncodeError),

    #[error("failed to decode value: {0}")]
    Decode(#[source] bincode::error::DecodeError),
}
