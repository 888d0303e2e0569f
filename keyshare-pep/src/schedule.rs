use keyshare_store::{KvStore, StoreError, TypedStore};
use keyshare_types::{Event, EventSink, Height, ScheduledEncryptedTx};
use tracing::debug;

use crate::{Pep, ScheduleError, SignModeHandler, layout};

impl<H: SignModeHandler> Pep<H> {
    /// Schedule an encrypted transaction for execution at `target`.
    ///
    /// Indices count up per target height, so transactions of a height execute in
    /// submission order.
    pub fn schedule<S, E>(
        &self,
        store: &mut S,
        events: &mut E,
        current: Height,
        creator: &str,
        target: Height,
        data: Vec<u8>,
    ) -> Result<ScheduledEncryptedTx, ScheduleError>
    where
        S: KvStore,
        E: EventSink,
    {
        if target <= current {
            return Err(ScheduleError::InvalidTargetHeight { current, target });
        }
        if data.is_empty() {
            return Err(ScheduleError::EmptyData);
        }
        let index: u64 = store.load(&layout::next_index(target))?.unwrap_or(0);
        let tx = ScheduledEncryptedTx {
            target_height: target,
            index,
            creator: creator.to_string(),
            data,
        };
        store.store(layout::scheduled(target, index), &tx)?;
        store.store(layout::next_index(target), &(index + 1))?;
        events.emit(Event::EncryptedTxSubmitted {
            creator: tx.creator.clone(),
            target_height: target,
            index,
        });
        debug!(%creator, %target, %index, "encrypted tx scheduled");
        Ok(tx)
    }

    pub fn scheduled_tx<S: KvStore>(
        &self,
        store: &S,
        height: Height,
        index: u64,
    ) -> Result<Option<ScheduledEncryptedTx>, StoreError> {
        store.load(&layout::scheduled(height, index))
    }

    /// Transactions scheduled for a height, in index order.
    pub fn scheduled_txs<S: KvStore>(
        &self,
        store: &S,
        height: Height,
    ) -> Result<Vec<ScheduledEncryptedTx>, StoreError> {
        store.values(&layout::scheduled_at(height))
    }

    pub fn all_scheduled<S: KvStore>(&self, store: &S) -> Result<Vec<ScheduledEncryptedTx>, StoreError> {
        store.values(layout::SCHEDULED)
    }
}
