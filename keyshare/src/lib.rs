mod aggregate;
mod config;
mod error;
mod layout;
mod query;
mod registry;
mod request;
mod rotation;
mod signal;

use keyshare_crypto::ShareScheme;
use keyshare_store::KvStore;
use keyshare_types::{EventSink, Height, Params, RequesterKind};
use tracing::{debug, warn};

pub use config::{ConfigError, KeyshareConfig, KeyshareConfigBuilder};
pub use error::KeyshareError;
pub use query::Randomness;
pub use request::{Requester, RequesterError};
pub use rotation::PubKeys;

/// The key share module.
///
/// All state lives in the [`KvStore`] passed to each operation, so that a replica holds no
/// state besides its configuration and every mutation is visible to the ledger.
#[derive(Debug)]
pub struct Keyshare<C> {
    scheme: C,
    config: KeyshareConfig,
}

impl<C: ShareScheme> Keyshare<C> {
    pub fn new(scheme: C, config: KeyshareConfig) -> Result<Self, KeyshareError> {
        config.validate()?;
        Ok(Self { scheme, config })
    }

    pub fn params(&self) -> &Params {
        self.config.params()
    }

    pub fn config(&self) -> &KeyshareConfig {
        &self.config
    }

    pub fn scheme(&self) -> &C {
        &self.scheme
    }

    /// Block start processing.
    ///
    /// 1. Rotate the public key.
    /// 2. Assign identities to inbound requests of every requester.
    /// 3. Consume the signal queues.
    /// 4. Prune aggregated keys past retention.
    ///
    /// Requester failures are logged and leave the failing requests queued for the next
    /// block; only storage failures are returned.
    pub fn begin_block<S, E>(
        &self,
        store: &mut S,
        events: &mut E,
        height: Height,
        requesters: &mut [&mut dyn Requester],
    ) -> Result<(), KeyshareError>
    where
        S: KvStore,
        E: EventSink,
    {
        self.rotate(store, events, height)?;

        for r in requesters.iter_mut() {
            match self.process_request_queue(store, &mut **r) {
                Ok(ids) if !ids.is_empty() => {
                    debug!(%height, kind = %r.kind(), n = %ids.len(), "requests processed")
                }
                Ok(_) => {}
                Err(KeyshareError::Store(e)) => return Err(e.into()),
                Err(err) => warn!(%height, kind = %r.kind(), %err, "request queue stalled"),
            }
        }

        for kind in [RequesterKind::Pep, RequesterKind::Gov] {
            self.process_signals(store, events, kind)?;
        }

        let retention = self.params().aggregated_retention;
        if retention > 0 && *height > retention {
            self.prune_aggregated(store, height - retention)?;
        }
        Ok(())
    }
}
