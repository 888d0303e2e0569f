//! Validators, delegated submitters and commitments.

use keyshare_crypto::ShareScheme;
use keyshare_store::{KvStore, TypedStore};
use keyshare_types::{Address, AuthorizedAddress, Commitment, Validator};
use tracing::{debug, info};

use crate::{Keyshare, KeyshareError, layout};

impl<C: ShareScheme> Keyshare<C> {
    /// Register a key holder, assigning it the next key index.
    pub fn register_validator<S: KvStore>(
        &self,
        store: &mut S,
        address: Address,
    ) -> Result<Validator, KeyshareError> {
        let key = layout::validator(&address);
        if store.contains(&key) {
            return Err(KeyshareError::ValidatorAlreadyRegistered(address));
        }
        let index: u32 = store.load(layout::VALIDATOR_INDEX)?.unwrap_or(0);
        let v = Validator { address, index };
        store.store(key, &v)?;
        store.store(layout::VALIDATOR_INDEX.to_vec(), &(index + 1))?;
        info!(validator = %address, %index, "validator registered");
        Ok(v)
    }

    /// Remove a key holder. Its index is not handed out again.
    pub fn deregister_validator<S: KvStore>(
        &self,
        store: &mut S,
        address: &Address,
    ) -> Result<(), KeyshareError> {
        if !store.delete(&layout::validator(address)) {
            return Err(KeyshareError::ValidatorNotRegistered(*address));
        }
        info!(validator = %address, "validator deregistered");
        Ok(())
    }

    pub fn validator<S: KvStore>(
        &self,
        store: &S,
        address: &Address,
    ) -> Result<Option<Validator>, KeyshareError> {
        Ok(store.load(&layout::validator(address))?)
    }

    pub fn validators<S: KvStore>(&self, store: &S) -> Result<Vec<Validator>, KeyshareError> {
        Ok(store.values(layout::VALIDATOR)?)
    }

    /// Allow `target` to submit shares on behalf of `validator`.
    pub fn authorize_address<S: KvStore>(
        &self,
        store: &mut S,
        validator: &Address,
        target: Address,
    ) -> Result<(), KeyshareError> {
        self.registered(store, validator)?;
        let entry = AuthorizedAddress {
            target,
            authorized_by: *validator,
        };
        store.store(layout::authorized(&target), &entry)?;
        debug!(%validator, %target, "address authorized");
        Ok(())
    }

    pub fn revoke_address<S: KvStore>(
        &self,
        store: &mut S,
        validator: &Address,
        target: &Address,
    ) -> Result<(), KeyshareError> {
        let key = layout::authorized(target);
        match store.load::<AuthorizedAddress>(&key)? {
            Some(a) if a.authorized_by == *validator => {
                store.delete(&key);
                debug!(%validator, %target, "address authorization revoked");
                Ok(())
            }
            _ => Err(KeyshareError::ValidatorNotRegistered(*target)),
        }
    }

    /// The validator a share submitted by `sender` is attributed to.
    pub(crate) fn resolve_sender<S: KvStore>(
        &self,
        store: &S,
        sender: &Address,
    ) -> Result<Validator, KeyshareError> {
        if let Some(v) = self.validator(store, sender)? {
            return Ok(v);
        }
        if let Some(a) = store.load::<AuthorizedAddress>(&layout::authorized(sender))? {
            return self.registered(store, &a.authorized_by);
        }
        Err(KeyshareError::ValidatorNotRegistered(*sender))
    }

    fn registered<S: KvStore>(&self, store: &S, a: &Address) -> Result<Validator, KeyshareError> {
        self.validator(store, a)?
            .ok_or(KeyshareError::ValidatorNotRegistered(*a))
    }

    /// Publish the commitment of a validator for a key round.
    pub fn register_commitment<S: KvStore>(
        &self,
        store: &mut S,
        owner: Address,
        round: u64,
        data: Vec<u8>,
    ) -> Result<(), KeyshareError> {
        self.registered(store, &owner)?;
        if data.is_empty() {
            return Err(KeyshareError::EmptyCommitments);
        }
        let key = layout::commitment(&owner, round);
        if store.contains(&key) {
            return Err(KeyshareError::AlreadyRegistered { owner, round });
        }
        let coeffs = self
            .scheme
            .coefficients(&data)
            .map_err(KeyshareError::InvalidCommitment)?;
        if let Some(n) = coeffs {
            let expected = self.params().threshold as usize;
            if n.get() != expected {
                return Err(KeyshareError::InvalidCommitmentLength {
                    expected,
                    got: n.get(),
                });
            }
        }
        store.store(key, &Commitment { owner, round, data })?;
        debug!(%owner, %round, "commitment registered");
        Ok(())
    }

    pub fn commitment<S: KvStore>(
        &self,
        store: &S,
        owner: &Address,
        round: u64,
    ) -> Result<Commitment, KeyshareError> {
        store
            .load(&layout::commitment(owner, round))?
            .ok_or(KeyshareError::CommitmentNotFound {
                owner: *owner,
                round,
            })
    }

    /// All commitments of a round, in owner order.
    pub fn commitments<S: KvStore>(
        &self,
        store: &S,
        round: u64,
    ) -> Result<Vec<Commitment>, KeyshareError> {
        let cs: Vec<Commitment> = store.values(&layout::commitments(round))?;
        if cs.is_empty() {
            return Err(KeyshareError::CommitmentsNotFound(round));
        }
        Ok(cs)
    }
}
