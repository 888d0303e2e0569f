use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Height, Identity, ProposalId, RequestId};

/// A registered key holder and its position in the sharing polynomial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    /// Key index `i`; the holder's evaluation point is `i + 1`.
    pub index: u32,
}

/// A validator's published commitment for one key round.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub owner: Address,
    pub round: u64,
    pub data: Vec<u8>,
}

/// A verified key share for a block height.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyShare {
    pub validator: Address,
    pub height: Height,
    pub index: u32,
    pub data: Vec<u8>,
    pub received_at: Height,
}

/// A verified key share for a requested identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralKeyShare {
    pub validator: Address,
    pub identity: Identity,
    pub index: u32,
    pub data: Vec<u8>,
    pub received_at: Height,
}

/// The combined key for a height. Written once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedKeyShare {
    pub height: Height,
    pub data: Vec<u8>,
    /// Public key the shares were checked against.
    pub pubkey: Vec<u8>,
}

/// A public key published for encryption, either active or queued for activation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKey {
    pub public_key: Vec<u8>,
    pub creator: Address,
    /// Key round whose commitments back this key.
    pub round: u64,
    /// Last height at which the key may bind new identities.
    pub expiry: Height,
}

/// The two requesters which may ask for identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequesterKind {
    Pep,
    Gov,
}

impl RequesterKind {
    pub fn tag(self) -> u8 {
        match self {
            Self::Pep => 0,
            Self::Gov => 1,
        }
    }
}

impl fmt::Display for RequesterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pep => f.write_str("pep"),
            Self::Gov => f.write_str("gov"),
        }
    }
}

/// A request for an identity, waiting in a requester's inbound queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRequest {
    pub request_id: RequestId,
    pub creator: Address,
    pub proposal_id: Option<ProposalId>,
}

/// Request bookkeeping for one identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyShareRequest {
    pub identity: Identity,
    pub kind: RequesterKind,
    /// Snapshot of the active public key at issuance.
    pub pubkey: Vec<u8>,
    /// Key round of `pubkey`; general key shares are checked against its commitments.
    pub round: u64,
    /// Empty until the general key shares have been combined.
    pub aggr_keyshare: Vec<u8>,
    pub request_id: RequestId,
    pub proposal_id: Option<ProposalId>,
}

impl KeyShareRequest {
    pub fn is_aggregated(&self) -> bool {
        !self.aggr_keyshare.is_empty()
    }
}

/// What a requester receives once an identity has been assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionQueueEntry {
    pub creator: Address,
    pub request_id: RequestId,
    pub identity: Identity,
    pub pubkey: Vec<u8>,
    pub proposal_id: Option<ProposalId>,
}

/// "Notify when ready" marker. Entries without identity are consumed silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalQueueEntry {
    pub request_id: RequestId,
    pub identity: Option<Identity>,
}

/// An address a validator allowed to submit shares on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedAddress {
    pub target: Address,
    pub authorized_by: Address,
}

macro_rules! bytes_debug {
    ($t:ty, $($f:ident),+; $bytes:ident) => {
        impl fmt::Debug for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($t))
                    $(.field(stringify!($f), &self.$f))+
                    .field(stringify!($bytes), &bs58::encode(&self.$bytes).into_string())
                    .finish()
            }
        }
    };
}

bytes_debug!(Commitment, owner, round; data);
bytes_debug!(KeyShare, validator, height, index, received_at; data);
bytes_debug!(GeneralKeyShare, validator, identity, index, received_at; data);
bytes_debug!(AggregatedKeyShare, height; data);
bytes_debug!(PubKey, creator, round, expiry; public_key);
bytes_debug!(KeyShareRequest, identity, kind, round, request_id, proposal_id; pubkey);
