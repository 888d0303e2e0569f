//! Public key publication and rotation.

use keyshare_crypto::ShareScheme;
use keyshare_store::{KvStore, TypedStore};
use keyshare_types::{Address, Event, EventSink, Height, PubKey};
use tracing::{info, warn};

use crate::{Keyshare, KeyshareError, layout};

/// Active, queued and previously active public keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubKeys {
    pub active: Option<PubKey>,
    pub queued: Option<PubKey>,
    pub previous: Option<PubKey>,
}

impl<C: ShareScheme> Keyshare<C> {
    /// Queue the public key of a key round for activation.
    ///
    /// The key becomes active at the first block where enough commitments of its round
    /// bind exactly this key.
    pub fn queue_public_key<S: KvStore>(
        &self,
        store: &mut S,
        creator: Address,
        round: u64,
        public_key: Vec<u8>,
        expiry: Height,
        now: Height,
    ) -> Result<(), KeyshareError> {
        let params = self.params();
        if !params.is_trusted(&creator) {
            return Err(KeyshareError::AddressNotTrusted(creator));
        }
        if store.contains(layout::PUBKEY_QUEUED) {
            return Err(KeyshareError::QueuedKeyAlreadyExists);
        }
        let have = self.validators(store)?.len();
        let need = params.min_validators as usize;
        if have < need {
            return Err(KeyshareError::NotEnoughValidators { have, need });
        }
        if expiry <= now || expiry > now + params.key_expiry {
            return Err(KeyshareError::InvalidBlockHeight(expiry));
        }
        self.scheme
            .check_public_key(&public_key)
            .map_err(KeyshareError::from_public_key_check)?;
        let pk = PubKey {
            public_key,
            creator,
            round,
            expiry,
        };
        store.store(layout::PUBKEY_QUEUED.to_vec(), &pk)?;
        info!(%creator, %round, %expiry, "public key queued");
        Ok(())
    }

    pub fn pub_keys<S: KvStore>(&self, store: &S) -> Result<PubKeys, KeyshareError> {
        Ok(PubKeys {
            active: store.load(layout::PUBKEY_ACTIVE)?,
            queued: store.load(layout::PUBKEY_QUEUED)?,
            previous: store.load(layout::PUBKEY_PREVIOUS)?,
        })
    }

    pub fn active_pub_key<S: KvStore>(&self, store: &S) -> Result<Option<PubKey>, KeyshareError> {
        Ok(store.load(layout::PUBKEY_ACTIVE)?)
    }

    /// Activate a ready queued key or retire an expired active key.
    ///
    /// A queued key whose expiry has passed is dropped without being activated.
    pub(crate) fn rotate<S, E>(
        &self,
        store: &mut S,
        events: &mut E,
        now: Height,
    ) -> Result<(), KeyshareError>
    where
        S: KvStore,
        E: EventSink,
    {
        let need = self.params().threshold as usize;
        if let Some(queued) = store.load::<PubKey>(layout::PUBKEY_QUEUED)? {
            if queued.expiry < now {
                store.delete(layout::PUBKEY_QUEUED);
                warn!(
                    round = %queued.round,
                    expiry = %queued.expiry,
                    %now,
                    "queued public key expired before activation"
                );
            } else if self.backing_commitments(store, &queued)? >= need {
                if let Some(active) = store.load::<PubKey>(layout::PUBKEY_ACTIVE)? {
                    store.store(layout::PUBKEY_PREVIOUS.to_vec(), &active)?;
                }
                store.store(layout::PUBKEY_ACTIVE.to_vec(), &queued)?;
                store.delete(layout::PUBKEY_QUEUED);
                events.emit(Event::PubKeyActivated {
                    pubkey: queued.public_key.clone(),
                    round: queued.round,
                    expiry: queued.expiry,
                });
                info!(round = %queued.round, expiry = %queued.expiry, %now, "public key activated");
                return Ok(());
            }
        }
        if let Some(active) = store.load::<PubKey>(layout::PUBKEY_ACTIVE)? {
            if active.expiry < now {
                store.store(layout::PUBKEY_PREVIOUS.to_vec(), &active)?;
                store.delete(layout::PUBKEY_ACTIVE);
                events.emit(Event::PubKeyExpired {
                    pubkey: active.public_key,
                    height: now,
                });
                warn!(round = %active.round, %now, "active public key expired");
            }
        }
        Ok(())
    }

    /// Number of commitments of the key's round which bind the key.
    fn backing_commitments<S: KvStore>(&self, store: &S, pk: &PubKey) -> Result<usize, KeyshareError> {
        let cs = match self.commitments(store, pk.round) {
            Ok(cs) => cs,
            Err(KeyshareError::CommitmentsNotFound(_)) => return Ok(0),
            Err(e) => return Err(e),
        };
        let n = cs
            .iter()
            .filter(|c| {
                self.scheme
                    .public_key(&c.data)
                    .is_ok_and(|k| k == pk.public_key)
            })
            .count();
        Ok(n)
    }
}
