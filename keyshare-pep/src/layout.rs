use keyshare_store::Key;
use keyshare_types::{Address, Height};

pub(crate) const SCHEDULED: &[u8] = b"pep/scheduled/";
pub(crate) const NEXT_INDEX: &[u8] = b"pep/next-index/";
pub(crate) const NONCE: &[u8] = b"pep/nonce/";

pub(crate) fn scheduled_at(h: Height) -> Vec<u8> {
    Key::new(SCHEDULED).u64(*h).finish()
}

pub(crate) fn scheduled(h: Height, index: u64) -> Vec<u8> {
    Key::new(SCHEDULED).u64(*h).u64(index).finish()
}

pub(crate) fn next_index(h: Height) -> Vec<u8> {
    Key::new(NEXT_INDEX).u64(*h).finish()
}

pub(crate) fn nonce(a: &Address) -> Vec<u8> {
    Key::new(NONCE).bytes(a.as_ref()).finish()
}
