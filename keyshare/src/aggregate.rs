//! Share verification and aggregation.

use std::collections::BTreeMap;

use keyshare_crypto::ShareScheme;
use keyshare_store::{KvStore, TypedStore};
use keyshare_types::{
    Address, AggregatedKeyShare, Event, EventSink, GeneralKeyShare, Height, Identity, KeyShare,
    KeyShareRequest,
};
use tracing::{debug, info, warn};

use crate::request::Requester;
use crate::{Keyshare, KeyshareError, layout};

impl<C: ShareScheme> Keyshare<C> {
    /// Verify and record the key share of `sender` for `height`.
    ///
    /// Once enough shares for the height exist the aggregated key is combined right away.
    pub fn submit_share<S, E>(
        &self,
        store: &mut S,
        events: &mut E,
        sender: &Address,
        height: Height,
        share: Vec<u8>,
        now: Height,
    ) -> Result<(), KeyshareError>
    where
        S: KvStore,
        E: EventSink,
    {
        let floor: Height = store.load(layout::PRUNED_BELOW)?.unwrap_or_default();
        if height < floor {
            return Err(KeyshareError::InvalidBlockHeight(height));
        }
        let validator = self.resolve_sender(store, sender)?;
        let commitment = self.commitment(store, &validator.address, *height)?;
        let valid = self
            .scheme
            .verify_share(&commitment.data, validator.index, &height.context(), &share)
            .map_err(KeyshareError::from_share_check)?;
        if !valid {
            warn!(validator = %validator.address, %height, "rejected key share");
            return Err(KeyshareError::InvalidShare);
        }
        let ks = KeyShare {
            validator: validator.address,
            height,
            index: validator.index,
            data: share,
            received_at: now,
        };
        store.store(layout::keyshare(&validator.address, height), &ks)?;
        events.emit(Event::KeyShareSubmitted {
            validator: validator.address,
            height,
        });
        debug!(validator = %validator.address, %height, "key share accepted");

        let count = store.prefix(&layout::keyshares(height)).len();
        if count >= self.params().threshold as usize
            && !store.contains(&layout::aggregated(height))
        {
            match self.aggregate(store, events, height) {
                Ok(_) | Err(KeyshareError::InsufficientShares { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Combine the key shares of a height.
    ///
    /// Only shares whose owners committed to the same public key are combined. Returns the
    /// stored key if it exists already.
    pub fn aggregate<S, E>(
        &self,
        store: &mut S,
        events: &mut E,
        height: Height,
    ) -> Result<AggregatedKeyShare, KeyshareError>
    where
        S: KvStore,
        E: EventSink,
    {
        if let Some(a) = store.load(&layout::aggregated(height))? {
            return Ok(a);
        }
        let shares: Vec<KeyShare> = store.values(&layout::keyshares(height))?;
        let (pubkey, pairs) = self.agreeing_shares(
            store,
            *height,
            shares.into_iter().map(|s| (s.validator, s.index, s.data)),
        )?;
        let need = self.params().threshold as usize;
        if pairs.len() < need {
            return Err(KeyshareError::InsufficientShares {
                height,
                have: pairs.len(),
                need,
            });
        }
        let data = self
            .scheme
            .combine(&pairs)
            .map_err(KeyshareError::from_combine)?;
        let agg = AggregatedKeyShare {
            height,
            data,
            pubkey,
        };
        store.store(layout::aggregated(height), &agg)?;
        let latest: Option<Height> = store.load(layout::AGGREGATED_LATEST)?;
        if latest.is_none_or(|h| h < height) {
            store.store(layout::AGGREGATED_LATEST.to_vec(), &height)?;
        }
        events.emit(Event::KeyShareAggregated {
            height,
            data: agg.data.clone(),
            pubkey: agg.pubkey.clone(),
        });
        info!(%height, shares = %pairs.len(), "key shares aggregated");
        Ok(agg)
    }

    /// Verify and record the key share of `sender` for a requested identity.
    ///
    /// Once enough agreeing shares exist the identity key is combined and delivered to the
    /// requester that asked for the identity. The key is stored in the request only after
    /// a successful delivery, so a failed delivery is retried with the next share.
    pub fn submit_general_share<S, E>(
        &self,
        store: &mut S,
        events: &mut E,
        requesters: &mut [&mut dyn Requester],
        sender: &Address,
        identity: Identity,
        share: Vec<u8>,
        now: Height,
    ) -> Result<(), KeyshareError>
    where
        S: KvStore,
        E: EventSink,
    {
        let validator = self.resolve_sender(store, sender)?;
        let mut req: KeyShareRequest = store
            .load(&layout::request(identity))?
            .ok_or(KeyshareError::RequestNotFound(identity))?;
        let commitment = self.commitment(store, &validator.address, req.round)?;
        let valid = self
            .scheme
            .verify_share(&commitment.data, validator.index, &identity.context(), &share)
            .map_err(KeyshareError::from_share_check)?;
        if !valid {
            warn!(validator = %validator.address, %identity, "rejected general key share");
            return Err(KeyshareError::InvalidShare);
        }
        let gs = GeneralKeyShare {
            validator: validator.address,
            identity,
            index: validator.index,
            data: share,
            received_at: now,
        };
        store.store(layout::general_share(&validator.address, identity), &gs)?;
        debug!(validator = %validator.address, %identity, "general key share accepted");

        if req.is_aggregated() {
            return Ok(());
        }
        let shares: Vec<GeneralKeyShare> = store.values(&layout::general_shares(identity))?;
        let (_, pairs) = self.agreeing_shares(
            store,
            req.round,
            shares.into_iter().map(|s| (s.validator, s.index, s.data)),
        )?;
        if pairs.len() < self.params().threshold as usize {
            return Ok(());
        }
        let key = self
            .scheme
            .combine(&pairs)
            .map_err(KeyshareError::from_combine)?;

        // the request only counts as aggregated once its key reached the requester
        let r = requesters
            .iter_mut()
            .find(|r| r.kind() == req.kind)
            .ok_or(KeyshareError::UnknownRequester(req.kind))?;
        if let Err(e) = r.deliver(&req.request_id, identity, &key) {
            warn!(%identity, kind = %req.kind, err = %e, "general key delivery failed");
            return Err(e.into());
        }
        req.aggr_keyshare = key;
        store.store(layout::request(identity), &req)?;
        events.emit(Event::GeneralKeyShareAggregated {
            identity,
            data: req.aggr_keyshare.clone(),
        });
        info!(%identity, kind = %req.kind, "general key shares aggregated");
        Ok(())
    }

    /// The largest group of shares whose owners' commitments for `round` bind the same
    /// public key, sorted by index, together with that key.
    ///
    /// Ties go to the greater key so the choice is the same on every node.
    fn agreeing_shares<S, I>(
        &self,
        store: &S,
        round: u64,
        shares: I,
    ) -> Result<(Vec<u8>, Vec<(u32, Vec<u8>)>), KeyshareError>
    where
        S: KvStore,
        I: IntoIterator<Item = (Address, u32, Vec<u8>)>,
    {
        let mut groups: BTreeMap<Vec<u8>, Vec<(u32, Vec<u8>)>> = BTreeMap::new();
        for (owner, index, data) in shares {
            let c = self.commitment(store, &owner, round)?;
            let pk = self
                .scheme
                .public_key(&c.data)
                .map_err(KeyshareError::InvalidCommitment)?;
            groups.entry(pk).or_default().push((index, data));
        }
        if groups.len() > 1 {
            warn!(%round, keys = %groups.len(), "commitments of round bind different keys");
        }
        let (pk, mut pairs) = groups
            .into_iter()
            .max_by_key(|(_, g)| g.len())
            .unwrap_or_default();
        pairs.sort_by_key(|(i, _)| *i);
        Ok((pk, pairs))
    }

    /// Delete aggregated keys and key shares of heights below `before`.
    pub fn prune_aggregated<S: KvStore>(
        &self,
        store: &mut S,
        before: Height,
    ) -> Result<usize, KeyshareError> {
        let mut n = 0;
        for prefix in [layout::AGGREGATED, layout::KEYSHARE] {
            for (k, _) in store.prefix(prefix) {
                match height_of(prefix, &k) {
                    Some(h) if h < before => {
                        store.delete(&k);
                        n += 1
                    }
                    _ => break,
                }
            }
        }
        let floor: Height = store.load(layout::PRUNED_BELOW)?.unwrap_or_default();
        if before > floor {
            store.store(layout::PRUNED_BELOW.to_vec(), &before)?;
        }
        if n > 0 {
            debug!(%before, entries = %n, "pruned aggregated keys");
        }
        Ok(n)
    }
}

/// Height component following `prefix` in a storage key.
fn height_of(prefix: &[u8], key: &[u8]) -> Option<Height> {
    let b = key.get(prefix.len()..prefix.len() + 8)?;
    let a: [u8; 8] = b.try_into().ok()?;
    Some(Height::from(u64::from_be_bytes(a)))
}
