mod address;
mod event;
mod height;
mod identity;
mod keys;
mod params;
mod records;
mod tx;

pub use address::{Address, InvalidAddress};
pub use event::{Event, EventSink};
pub use height::Height;
pub use identity::{Identity, InvalidIdentity, ProposalId, RequestId};
pub use keys::{InvalidPublicKey, InvalidSignature, Keypair, PublicKey, Signature};
pub use params::{InvalidParams, Params};
pub use records::{
    AggregatedKeyShare, AuthorizedAddress, Commitment, ExecutionQueueEntry, GeneralKeyShare,
    InboundRequest, KeyShare, KeyShareRequest, PubKey, RequesterKind, SignalQueueEntry,
    Validator,
};
pub use tx::{AuthInfo, Msg, ScheduledEncryptedTx, SignDoc, SignedTx, SignerInfo, TxBody};
