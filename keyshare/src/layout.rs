//! Storage key layout of the module.

use keyshare_store::Key;
use keyshare_types::{Address, Height, Identity, RequestId, RequesterKind};

pub(crate) const VALIDATOR: &[u8] = b"ks/validator/";
pub(crate) const VALIDATOR_INDEX: &[u8] = b"ks/validator-index";
pub(crate) const AUTHORIZED: &[u8] = b"ks/authorized/";
pub(crate) const COMMITMENT: &[u8] = b"ks/commitment/";
pub(crate) const KEYSHARE: &[u8] = b"ks/keyshare/";
pub(crate) const AGGREGATED: &[u8] = b"ks/aggregated/";
pub(crate) const AGGREGATED_LATEST: &[u8] = b"ks/aggregated-latest";
pub(crate) const PRUNED_BELOW: &[u8] = b"ks/pruned-below";
pub(crate) const PUBKEY_ACTIVE: &[u8] = b"ks/pubkey/active";
pub(crate) const PUBKEY_PREVIOUS: &[u8] = b"ks/pubkey/previous";
pub(crate) const PUBKEY_QUEUED: &[u8] = b"ks/pubkey/queued";
pub(crate) const GENERAL_SHARE: &[u8] = b"ks/general-share/";
pub(crate) const REQUEST: &[u8] = b"ks/request/";
pub(crate) const REQUEST_COUNT: &[u8] = b"ks/request-count";
pub(crate) const INBOUND: &[u8] = b"ks/inbound/";
pub(crate) const SIGNAL: &[u8] = b"ks/signal/";

pub(crate) fn validator(a: &Address) -> Vec<u8> {
    Key::new(VALIDATOR).bytes(a.as_ref()).finish()
}

pub(crate) fn authorized(target: &Address) -> Vec<u8> {
    Key::new(AUTHORIZED).bytes(target.as_ref()).finish()
}

pub(crate) fn commitments(round: u64) -> Vec<u8> {
    Key::new(COMMITMENT).u64(round).finish()
}

pub(crate) fn commitment(owner: &Address, round: u64) -> Vec<u8> {
    Key::new(COMMITMENT).u64(round).bytes(owner.as_ref()).finish()
}

pub(crate) fn keyshares(h: Height) -> Vec<u8> {
    Key::new(KEYSHARE).u64(*h).finish()
}

pub(crate) fn keyshare(v: &Address, h: Height) -> Vec<u8> {
    Key::new(KEYSHARE).u64(*h).bytes(v.as_ref()).finish()
}

pub(crate) fn aggregated(h: Height) -> Vec<u8> {
    Key::new(AGGREGATED).u64(*h).finish()
}

pub(crate) fn general_shares(id: Identity) -> Vec<u8> {
    Key::new(GENERAL_SHARE).u64(id.count()).finish()
}

pub(crate) fn general_share(v: &Address, id: Identity) -> Vec<u8> {
    Key::new(GENERAL_SHARE)
        .u64(id.count())
        .bytes(v.as_ref())
        .finish()
}

pub(crate) fn request(id: Identity) -> Vec<u8> {
    Key::new(REQUEST).u64(id.count()).finish()
}

pub(crate) fn inbound_queue(k: RequesterKind) -> Vec<u8> {
    Key::new(INBOUND).u8(k.tag()).finish()
}

pub(crate) fn inbound(k: RequesterKind, r: &RequestId) -> Vec<u8> {
    Key::new(INBOUND)
        .u8(k.tag())
        .bytes(r.as_str().as_bytes())
        .finish()
}

pub(crate) fn signal_queue(k: RequesterKind) -> Vec<u8> {
    Key::new(SIGNAL).u8(k.tag()).finish()
}

pub(crate) fn signal(k: RequesterKind, r: &RequestId) -> Vec<u8> {
    Key::new(SIGNAL)
        .u8(k.tag())
        .bytes(r.as_str().as_bytes())
        .finish()
}
