//! Identity requests.
//!
//! Requesters place [`InboundRequest`]s into their queue. Every block the queue is drained:
//! each request receives the next identity, which is recorded in a [`KeyShareRequest`] and
//! forwarded to the requester.

use keyshare_crypto::ShareScheme;
use keyshare_store::{KvStore, TypedStore};
use keyshare_types::{
    ExecutionQueueEntry, Identity, InboundRequest, KeyShareRequest, RequestId, RequesterKind,
};
use tracing::{debug, warn};

use crate::{Keyshare, KeyshareError, layout};

/// A subsystem that asks for identities and consumes the resulting keys.
pub trait Requester {
    fn kind(&self) -> RequesterKind;

    /// Hand over the identity assigned to one of the requester's requests.
    fn forward(&mut self, entry: ExecutionQueueEntry) -> Result<(), RequesterError>;

    /// Hand over the aggregated key of an identity.
    fn deliver(
        &mut self,
        request_id: &RequestId,
        identity: Identity,
        aggr_keyshare: &[u8],
    ) -> Result<(), RequesterError>;
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RequesterError {
    #[error("proposal {0} not found")]
    ProposalNotFound(RequestId),

    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    #[error("requester failure: {0}")]
    Other(String),
}

impl<C: ShareScheme> Keyshare<C> {
    /// Place a request into the inbound queue of a requester.
    pub fn submit_request<S: KvStore>(
        &self,
        store: &mut S,
        kind: RequesterKind,
        req: InboundRequest,
    ) -> Result<(), KeyshareError> {
        store.store(layout::inbound(kind, &req.request_id), &req)?;
        Ok(())
    }

    pub fn inbound_requests<S: KvStore>(
        &self,
        store: &S,
        kind: RequesterKind,
    ) -> Result<Vec<InboundRequest>, KeyshareError> {
        Ok(store.values(&layout::inbound_queue(kind))?)
    }

    /// Assign the next identity to an inbound request.
    ///
    /// The request and the advanced counter are persisted before the requester is called,
    /// so an identity is never handed out twice even if forwarding fails.
    pub fn enqueue_request<S, R>(
        &self,
        store: &mut S,
        requester: &mut R,
        req: &InboundRequest,
    ) -> Result<Identity, KeyshareError>
    where
        S: KvStore,
        R: Requester + ?Sized,
    {
        let active = self
            .active_pub_key(store)?
            .ok_or(KeyshareError::NoActivePublicKey)?;
        let count: u64 = store.load(layout::REQUEST_COUNT)?.unwrap_or(0) + 1;
        let identity = Identity::from_count(count);
        let kind = requester.kind();
        let ksr = KeyShareRequest {
            identity,
            kind,
            pubkey: active.public_key.clone(),
            round: active.round,
            aggr_keyshare: Vec::new(),
            request_id: req.request_id.clone(),
            proposal_id: req.proposal_id,
        };
        store.store(layout::request(identity), &ksr)?;
        store.store(layout::REQUEST_COUNT.to_vec(), &count)?;

        requester.forward(ExecutionQueueEntry {
            creator: req.creator,
            request_id: req.request_id.clone(),
            identity,
            pubkey: active.public_key,
            proposal_id: req.proposal_id,
        })?;

        store.delete(&layout::inbound(kind, &req.request_id));
        debug!(%identity, %kind, request = %req.request_id, "identity assigned");
        Ok(identity)
    }

    /// Assign identities to all inbound requests of a requester.
    ///
    /// Stops at the first failing request; it and all later ones stay queued.
    pub fn process_request_queue<S, R>(
        &self,
        store: &mut S,
        requester: &mut R,
    ) -> Result<Vec<Identity>, KeyshareError>
    where
        S: KvStore,
        R: Requester + ?Sized,
    {
        let kind = requester.kind();
        let reqs = self.inbound_requests(store, kind)?;
        if reqs.is_empty() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::with_capacity(reqs.len());
        for r in &reqs {
            match self.enqueue_request(store, requester, r) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    warn!(%kind, request = %r.request_id, %err, "failed to process request");
                    return Err(err);
                }
            }
        }
        Ok(ids)
    }

    /// The highest identity handed out so far.
    pub fn request_count<S: KvStore>(&self, store: &S) -> Result<u64, KeyshareError> {
        Ok(store.load(layout::REQUEST_COUNT)?.unwrap_or(0))
    }

    pub fn key_share_request<S: KvStore>(
        &self,
        store: &S,
        identity: Identity,
    ) -> Result<Option<KeyShareRequest>, KeyshareError> {
        Ok(store.load(&layout::request(identity))?)
    }

    pub fn key_share_requests<S: KvStore>(
        &self,
        store: &S,
    ) -> Result<Vec<KeyShareRequest>, KeyshareError> {
        Ok(store.values(layout::REQUEST)?)
    }
}
