use keyshare_store::{KvStore, StoreError, TypedStore};
use keyshare_types::Address;

use crate::{Pep, SignModeHandler, layout};

impl<H: SignModeHandler> Pep<H> {
    /// Number of signatures of `creator` processed so far.
    pub fn executed_nonce<S: KvStore>(&self, store: &S, creator: &Address) -> Result<u64, StoreError> {
        Ok(store.load(&layout::nonce(creator))?.unwrap_or(0))
    }

    /// Advance the executed nonce and return the new value.
    pub(crate) fn increment_nonce<S: KvStore>(
        &self,
        store: &mut S,
        creator: &Address,
    ) -> Result<u64, StoreError> {
        let n = self.executed_nonce(store, creator)? + 1;
        store.store(layout::nonce(creator), &n)?;
        Ok(n)
    }
}
