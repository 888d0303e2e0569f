use data_encoding::HEXLOWER;

use crate::{Address, Height, Identity};

/// Consensus-visible events. Every replica emits the same sequence for the same block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    EncryptedTxExecuted {
        creator: String,
        height: Height,
        data: Vec<u8>,
        index: u64,
    },
    EncryptedTxReverted {
        creator: String,
        height: Height,
        reason: String,
        index: u64,
    },
    EncryptedTxSubmitted {
        creator: String,
        target_height: Height,
        index: u64,
    },
    StartSendGeneralKeyShare {
        identity: Identity,
    },
    KeyShareSubmitted {
        validator: Address,
        height: Height,
    },
    KeyShareAggregated {
        height: Height,
        data: Vec<u8>,
        pubkey: Vec<u8>,
    },
    GeneralKeyShareAggregated {
        identity: Identity,
        data: Vec<u8>,
    },
    PubKeyActivated {
        pubkey: Vec<u8>,
        round: u64,
        expiry: Height,
    },
    PubKeyExpired {
        pubkey: Vec<u8>,
        height: Height,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EncryptedTxExecuted { .. } => "encrypted-tx-executed",
            Self::EncryptedTxReverted { .. } => "encrypted-tx-reverted",
            Self::EncryptedTxSubmitted { .. } => "new-encrypted-tx-submitted",
            Self::StartSendGeneralKeyShare { .. } => "start-send-general-keyshare",
            Self::KeyShareSubmitted { .. } => "keyshare-sent",
            Self::KeyShareAggregated { .. } => "keyshare-aggregated",
            Self::GeneralKeyShareAggregated { .. } => "general-keyshare-aggregated",
            Self::PubKeyActivated { .. } => "pubkey-activated",
            Self::PubKeyExpired { .. } => "pubkey-expired",
        }
    }

    /// Event attributes in emission order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::EncryptedTxExecuted {
                creator,
                height,
                data,
                index,
            } => vec![
                ("creator", creator.clone()),
                ("height", height.to_string()),
                ("data", String::from_utf8_lossy(data).into_owned()),
                ("index", index.to_string()),
            ],
            Self::EncryptedTxReverted {
                creator,
                height,
                reason,
                index,
            } => vec![
                ("creator", creator.clone()),
                ("height", height.to_string()),
                ("reason", reason.clone()),
                ("index", index.to_string()),
            ],
            Self::EncryptedTxSubmitted {
                creator,
                target_height,
                index,
            } => vec![
                ("creator", creator.clone()),
                ("target-height", target_height.to_string()),
                ("index", index.to_string()),
            ],
            Self::StartSendGeneralKeyShare { identity } => vec![("identity", identity.to_string())],
            Self::KeyShareSubmitted { validator, height } => vec![
                ("validator", validator.to_string()),
                ("height", height.to_string()),
            ],
            Self::KeyShareAggregated {
                height,
                data,
                pubkey,
            } => vec![
                ("height", height.to_string()),
                ("data", HEXLOWER.encode(data)),
                ("pubkey", HEXLOWER.encode(pubkey)),
            ],
            Self::GeneralKeyShareAggregated { identity, data } => vec![
                ("identity", identity.to_string()),
                ("data", HEXLOWER.encode(data)),
            ],
            Self::PubKeyActivated {
                pubkey,
                round,
                expiry,
            } => vec![
                ("pubkey", HEXLOWER.encode(pubkey)),
                ("round", round.to_string()),
                ("expiry", expiry.to_string()),
            ],
            Self::PubKeyExpired { pubkey, height } => vec![
                ("pubkey", HEXLOWER.encode(pubkey)),
                ("height", height.to_string()),
            ],
        }
    }
}

/// Where block processing reports its events.
pub trait EventSink {
    fn emit(&mut self, e: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, e: Event) {
        self.push(e)
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, e: Event) {
        (**self).emit(e)
    }
}
