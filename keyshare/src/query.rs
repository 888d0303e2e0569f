//! Read-only queries.

use data_encoding::HEXLOWER;
use keyshare_crypto::ShareScheme;
use keyshare_store::{KvStore, TypedStore};
use keyshare_types::{
    Address, AggregatedKeyShare, AuthorizedAddress, GeneralKeyShare, Height, Identity, KeyShare,
    Params,
};
use sha2::{Digest, Sha256};

use crate::{Keyshare, KeyshareError, layout};

/// Randomness derived from the aggregated key of a height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Randomness {
    pub height: Height,
    /// Lower-case hex of `sha256(aggregated key)`.
    pub randomness: String,
}

impl<C: ShareScheme> Keyshare<C> {
    pub fn query_params(&self) -> &Params {
        self.params()
    }

    pub fn key_share<S: KvStore>(
        &self,
        store: &S,
        validator: &Address,
        height: Height,
    ) -> Result<Option<KeyShare>, KeyshareError> {
        Ok(store.load(&layout::keyshare(validator, height))?)
    }

    pub fn key_shares<S: KvStore>(&self, store: &S) -> Result<Vec<KeyShare>, KeyshareError> {
        Ok(store.values(layout::KEYSHARE)?)
    }

    pub fn aggregated_key_share<S: KvStore>(
        &self,
        store: &S,
        height: Height,
    ) -> Result<Option<AggregatedKeyShare>, KeyshareError> {
        Ok(store.load(&layout::aggregated(height))?)
    }

    pub fn aggregated_key_shares<S: KvStore>(
        &self,
        store: &S,
    ) -> Result<Vec<AggregatedKeyShare>, KeyshareError> {
        Ok(store.values(layout::AGGREGATED)?)
    }

    /// The highest height with an aggregated key.
    pub fn latest_aggregated_height<S: KvStore>(
        &self,
        store: &S,
    ) -> Result<Option<Height>, KeyshareError> {
        Ok(store.load(layout::AGGREGATED_LATEST)?)
    }

    pub fn authorized_address<S: KvStore>(
        &self,
        store: &S,
        target: &Address,
    ) -> Result<Option<AuthorizedAddress>, KeyshareError> {
        Ok(store.load(&layout::authorized(target))?)
    }

    pub fn authorized_addresses<S: KvStore>(
        &self,
        store: &S,
    ) -> Result<Vec<AuthorizedAddress>, KeyshareError> {
        Ok(store.values(layout::AUTHORIZED)?)
    }

    pub fn general_key_share<S: KvStore>(
        &self,
        store: &S,
        validator: &Address,
        identity: Identity,
    ) -> Result<Option<GeneralKeyShare>, KeyshareError> {
        Ok(store.load(&layout::general_share(validator, identity))?)
    }

    pub fn general_key_shares<S: KvStore>(
        &self,
        store: &S,
    ) -> Result<Vec<GeneralKeyShare>, KeyshareError> {
        Ok(store.values(layout::GENERAL_SHARE)?)
    }

    /// Randomness of a height, or of the latest aggregated height if none is given.
    pub fn verifiable_randomness<S: KvStore>(
        &self,
        store: &S,
        height: Option<Height>,
    ) -> Result<Randomness, KeyshareError> {
        let h = match height {
            Some(h) => h,
            None => self
                .latest_aggregated_height(store)?
                .ok_or(KeyshareError::AggregatedKeyNotFound(None))?,
        };
        let agg = self
            .aggregated_key_share(store, h)?
            .ok_or(KeyshareError::AggregatedKeyNotFound(Some(h)))?;
        let digest = Sha256::digest(&agg.data);
        Ok(Randomness {
            height: h,
            randomness: HEXLOWER.encode(&digest),
        })
    }
}
