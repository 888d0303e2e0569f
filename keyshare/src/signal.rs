//! Signal queue: tells validators when to start sending general key shares.

use keyshare_crypto::ShareScheme;
use keyshare_store::{KvStore, TypedStore, decode};
use keyshare_types::{Event, EventSink, KeyShareRequest, RequesterKind, SignalQueueEntry};
use tracing::{debug, trace};

use crate::{Keyshare, KeyshareError, layout};

impl<C: ShareScheme> Keyshare<C> {
    pub fn enqueue_signal<S: KvStore>(
        &self,
        store: &mut S,
        kind: RequesterKind,
        entry: SignalQueueEntry,
    ) -> Result<(), KeyshareError> {
        store.store(layout::signal(kind, &entry.request_id), &entry)?;
        Ok(())
    }

    pub fn signals<S: KvStore>(
        &self,
        store: &S,
        kind: RequesterKind,
    ) -> Result<Vec<SignalQueueEntry>, KeyshareError> {
        Ok(store.values(&layout::signal_queue(kind))?)
    }

    /// Consume all pending signals of a requester.
    ///
    /// Every entry is removed, whatever its outcome. For a known identity whose key has not
    /// been aggregated yet a [`Event::StartSendGeneralKeyShare`] is emitted. Returns the
    /// number of emitted events.
    pub fn process_signals<S, E>(
        &self,
        store: &mut S,
        events: &mut E,
        kind: RequesterKind,
    ) -> Result<usize, KeyshareError>
    where
        S: KvStore,
        E: EventSink,
    {
        let mut n = 0;
        for (key, val) in store.prefix(&layout::signal_queue(kind)) {
            store.delete(&key);
            let entry: SignalQueueEntry = decode(&val)?;
            let Some(identity) = entry.identity else {
                continue;
            };
            match store.load::<KeyShareRequest>(&layout::request(identity))? {
                None => trace!(%identity, %kind, "dropping stale signal"),
                Some(r) if r.is_aggregated() => {}
                Some(_) => {
                    events.emit(Event::StartSendGeneralKeyShare { identity });
                    debug!(%identity, %kind, "start sending general key shares");
                    n += 1
                }
            }
        }
        Ok(n)
    }
}
