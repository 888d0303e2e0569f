use keyshare::{Keyshare, KeyshareConfig, KeyshareError, PubKeys, Requester, RequesterError};
use keyshare_crypto::xor::XorScheme;
use keyshare_store::MemStore;
use keyshare_types::{
    Address, Event, ExecutionQueueEntry, Height, Identity, InboundRequest, ProposalId, RequestId,
    RequesterKind, SignalQueueEntry,
};
use keyshare_utils::logging::init_logging;
use keyshare_utils::unsafe_zero_address;
use quickcheck::quickcheck;

const PK1: [u8; 32] = [1; 32];
const PK2: [u8; 32] = [2; 32];
const N: u32 = 3;
const T: u32 = 2;

fn seed(round: u64, i: u32) -> [u8; 32] {
    let mut s = [i as u8; 32];
    s[0] = round as u8;
    s
}

#[derive(Debug)]
struct MockRequester {
    kind: RequesterKind,
    forwarded: Vec<ExecutionQueueEntry>,
    delivered: Vec<(RequestId, Identity, Vec<u8>)>,
    reject: bool,
    unreachable: bool,
}

impl MockRequester {
    fn new(kind: RequesterKind) -> Self {
        Self {
            kind,
            forwarded: Vec::new(),
            delivered: Vec::new(),
            reject: false,
            unreachable: false,
        }
    }
}

impl Requester for MockRequester {
    fn kind(&self) -> RequesterKind {
        self.kind
    }

    fn forward(&mut self, e: ExecutionQueueEntry) -> Result<(), RequesterError> {
        if self.reject {
            return Err(RequesterError::ProposalNotFound(e.request_id));
        }
        self.forwarded.push(e);
        Ok(())
    }

    fn deliver(
        &mut self,
        r: &RequestId,
        identity: Identity,
        key: &[u8],
    ) -> Result<(), RequesterError> {
        if self.unreachable {
            return Err(RequesterError::RequestNotFound(r.clone()));
        }
        self.delivered.push((r.clone(), identity, key.to_vec()));
        Ok(())
    }
}

struct Setup {
    ks: Keyshare<XorScheme>,
    store: MemStore,
    vals: Vec<Address>,
    trusted: Address,
}

fn config(trusted: Address) -> KeyshareConfig {
    KeyshareConfig::builder()
        .params(keyshare_types::Params {
            threshold: T,
            min_validators: N,
            key_expiry: 100,
            trusted_addresses: vec![trusted],
            aggregated_retention: 0,
        })
        .build()
}

fn setup() -> Setup {
    let trusted = unsafe_zero_address(99u32);
    let ks = Keyshare::new(XorScheme, config(trusted)).unwrap();
    let mut store = MemStore::new();
    let vals: Vec<Address> = (0..N).map(unsafe_zero_address).collect();
    for a in &vals {
        ks.register_validator(&mut store, *a).unwrap();
    }
    Setup {
        ks,
        store,
        vals,
        trusted,
    }
}

impl Setup {
    fn commit(&mut self, round: u64, pk: [u8; 32], count: u32) {
        for (i, a) in self.vals.iter().enumerate().take(count as usize) {
            let c = XorScheme::commitment(pk, seed(round, i as u32));
            self.ks
                .register_commitment(&mut self.store, *a, round, c)
                .unwrap();
        }
    }

    /// Queue and activate the key of a round.
    fn activate(&mut self, round: u64, pk: [u8; 32], now: u64) -> Vec<Event> {
        self.ks
            .queue_public_key(
                &mut self.store,
                self.trusted,
                round,
                pk.to_vec(),
                Height::from(now + 50),
                Height::from(now),
            )
            .unwrap();
        self.commit(round, pk, T);
        let mut events = Vec::new();
        self.ks
            .begin_block(&mut self.store, &mut events, Height::from(now + 1), &mut [])
            .unwrap();
        events
    }

    fn general_share(
        &mut self,
        requesters: &mut [&mut dyn Requester],
        events: &mut Vec<Event>,
        i: u32,
        id: Identity,
    ) -> Result<(), KeyshareError> {
        let share = XorScheme::share(seed(1, i), &id.context());
        self.ks.submit_general_share(
            &mut self.store,
            events,
            requesters,
            &self.vals[i as usize],
            id,
            share,
            Height::from(3),
        )
    }

    fn request(&mut self, kind: RequesterKind, id: &str) {
        let r = InboundRequest {
            request_id: RequestId::new(id),
            creator: self.vals[0],
            proposal_id: None,
        };
        self.ks.submit_request(&mut self.store, kind, r).unwrap();
    }
}

#[test]
fn identities_require_active_key() {
    init_logging();

    let mut s = setup();
    let mut pep = MockRequester::new(RequesterKind::Pep);
    s.request(RequesterKind::Pep, "a");
    assert!(matches!(
        s.ks.process_request_queue(&mut s.store, &mut pep),
        Err(KeyshareError::NoActivePublicKey)
    ));
    assert_eq!(s.ks.inbound_requests(&s.store, RequesterKind::Pep).unwrap().len(), 1);
    assert_eq!(s.ks.request_count(&s.store).unwrap(), 0);

    let events = s.activate(1, PK1, 1);
    assert!(matches!(events[..], [Event::PubKeyActivated { round: 1, .. }]));

    let mut events = Vec::new();
    s.ks.begin_block(&mut s.store, &mut events, Height::from(3), &mut [&mut pep])
        .unwrap();
    assert_eq!(pep.forwarded.len(), 1);
    let e = &pep.forwarded[0];
    assert_eq!(e.identity, Identity::from_count(1));
    assert_eq!(e.pubkey, PK1.to_vec());
    assert_eq!(e.request_id, RequestId::new("a"));
    assert!(s.ks.inbound_requests(&s.store, RequesterKind::Pep).unwrap().is_empty());

    let req = s.ks.key_share_request(&s.store, e.identity).unwrap().unwrap();
    assert!(!req.is_aggregated());
    assert_eq!(req.round, 1);
}

#[test]
fn queued_key_checks() {
    let mut s = setup();
    let now = Height::from(1);
    let exp = Height::from(10);
    let r = s
        .ks
        .queue_public_key(&mut s.store, s.vals[0], 1, PK1.to_vec(), exp, now);
    assert!(matches!(r, Err(KeyshareError::AddressNotTrusted(_))));
    let r = s
        .ks
        .queue_public_key(&mut s.store, s.trusted, 1, vec![1; 31], exp, now);
    assert!(matches!(
        r,
        Err(KeyshareError::InvalidPubKeyLength {
            expected: 32,
            got: 31
        })
    ));
    let r = s
        .ks
        .queue_public_key(&mut s.store, s.trusted, 1, PK1.to_vec(), now, now);
    assert!(matches!(r, Err(KeyshareError::InvalidBlockHeight(_))));
    s.ks.queue_public_key(&mut s.store, s.trusted, 1, PK1.to_vec(), exp, now)
        .unwrap();
    let r = s
        .ks
        .queue_public_key(&mut s.store, s.trusted, 2, PK2.to_vec(), exp, now);
    assert!(matches!(r, Err(KeyshareError::QueuedKeyAlreadyExists)));

    // one backing commitment is below threshold
    s.commit(1, PK1, 1);
    let mut events = Vec::new();
    s.ks.begin_block(&mut s.store, &mut events, Height::from(2), &mut [])
        .unwrap();
    assert!(events.is_empty());
    let keys = s.ks.pub_keys(&s.store).unwrap();
    assert!(keys.active.is_none());
    assert!(keys.queued.is_some());
}

#[test]
fn rotation_keeps_old_identities_valid() {
    let mut s = setup();
    let mut pep = MockRequester::new(RequesterKind::Pep);
    s.activate(1, PK1, 1);
    s.request(RequesterKind::Pep, "old");
    s.ks.process_request_queue(&mut s.store, &mut pep).unwrap();
    let old = pep.forwarded[0].identity;

    let events = s.activate(2, PK2, 5);
    assert!(matches!(events[..], [Event::PubKeyActivated { round: 2, .. }]));
    let keys = s.ks.pub_keys(&s.store).unwrap();
    assert_eq!(keys.active.unwrap().public_key, PK2.to_vec());
    assert_eq!(keys.previous.unwrap().public_key, PK1.to_vec());

    s.request(RequesterKind::Pep, "new");
    s.ks.process_request_queue(&mut s.store, &mut pep).unwrap();
    assert_eq!(pep.forwarded[1].pubkey, PK2.to_vec());

    // shares for the old identity are still checked against round 1
    let mut events = Vec::new();
    let mut reqs: [&mut dyn Requester; 1] = [&mut pep];
    for i in 0..T {
        let share = XorScheme::share(seed(1, i), &old.context());
        s.ks.submit_general_share(
            &mut s.store,
            &mut events,
            &mut reqs,
            &s.vals[i as usize],
            old,
            share,
            Height::from(7),
        )
        .unwrap();
    }
    assert_eq!(pep.delivered.len(), 1);
    assert_eq!(pep.delivered[0].1, old);
}

#[test]
fn general_key_shares_aggregate_once() {
    let mut s = setup();
    let mut pep = MockRequester::new(RequesterKind::Pep);
    s.activate(1, PK1, 1);
    s.request(RequesterKind::Pep, "r");
    s.ks.process_request_queue(&mut s.store, &mut pep).unwrap();
    let id = pep.forwarded[0].identity;

    let mut events = Vec::new();
    let unknown = Identity::from_count(40);
    {
        let mut reqs: [&mut dyn Requester; 1] = [&mut pep];
        assert!(matches!(
            s.ks.submit_general_share(
                &mut s.store,
                &mut events,
                &mut reqs,
                &s.vals[0],
                unknown,
                XorScheme::share(seed(1, 0), &unknown.context()),
                Height::from(3),
            ),
            Err(KeyshareError::RequestNotFound(_))
        ));
        assert!(matches!(
            s.ks.submit_general_share(
                &mut s.store,
                &mut events,
                &mut reqs,
                &s.vals[0],
                id,
                XorScheme::share(seed(1, 0), b"wrong"),
                Height::from(3),
            ),
            Err(KeyshareError::InvalidShare)
        ));
        for i in 0..N {
            let share = XorScheme::share(seed(1, i), &id.context());
            s.ks.submit_general_share(
                &mut s.store,
                &mut events,
                &mut reqs,
                &s.vals[i as usize],
                id,
                share,
                Height::from(3),
            )
            .unwrap();
        }
    }
    assert_eq!(pep.delivered.len(), 1);
    let req = s.ks.key_share_request(&s.store, id).unwrap().unwrap();
    assert_eq!(req.aggr_keyshare, pep.delivered[0].2);
    assert_eq!(s.ks.general_key_shares(&s.store).unwrap().len(), N as usize);
    let n = events
        .iter()
        .filter(|e| matches!(e, Event::GeneralKeyShareAggregated { .. }))
        .count();
    assert_eq!(n, 1);
}

#[test]
fn undelivered_key_is_delivered_later() {
    let mut s = setup();
    let mut pep = MockRequester::new(RequesterKind::Pep);
    s.activate(1, PK1, 1);
    s.request(RequesterKind::Pep, "r");
    s.ks.process_request_queue(&mut s.store, &mut pep).unwrap();
    let id = pep.forwarded[0].identity;
    let mut events = Vec::new();

    s.general_share(&mut [&mut pep], &mut events, 0, id).unwrap();
    // nobody to deliver to
    assert!(matches!(
        s.general_share(&mut [], &mut events, 1, id),
        Err(KeyshareError::UnknownRequester(RequesterKind::Pep))
    ));
    pep.unreachable = true;
    assert!(matches!(
        s.general_share(&mut [&mut pep], &mut events, 1, id),
        Err(KeyshareError::Requester(RequesterError::RequestNotFound(_)))
    ));
    let req = s.ks.key_share_request(&s.store, id).unwrap().unwrap();
    assert!(!req.is_aggregated());
    assert!(events.is_empty());
    assert!(pep.delivered.is_empty());

    pep.unreachable = false;
    s.general_share(&mut [&mut pep], &mut events, 2, id).unwrap();
    assert_eq!(pep.delivered.len(), 1);
    assert_eq!(pep.delivered[0].1, id);
    let req = s.ks.key_share_request(&s.store, id).unwrap().unwrap();
    assert_eq!(req.aggr_keyshare, pep.delivered[0].2);
    assert!(matches!(events[..], [Event::GeneralKeyShareAggregated { .. }]));

    // delivered keys are not handed over again
    s.general_share(&mut [&mut pep], &mut events, 1, id).unwrap();
    assert_eq!(pep.delivered.len(), 1);
}

#[test]
fn expired_queued_key_is_dropped() {
    let mut s = setup();
    s.ks.queue_public_key(
        &mut s.store,
        s.trusted,
        1,
        PK1.to_vec(),
        Height::from(10),
        Height::from(1),
    )
    .unwrap();
    s.commit(1, PK1, T);

    let mut events = Vec::new();
    s.ks.begin_block(&mut s.store, &mut events, Height::from(11), &mut [])
        .unwrap();
    assert!(events.is_empty());
    assert_eq!(s.ks.pub_keys(&s.store).unwrap(), PubKeys::default());

    // the slot is free again
    s.ks.queue_public_key(
        &mut s.store,
        s.trusted,
        2,
        PK2.to_vec(),
        Height::from(40),
        Height::from(11),
    )
    .unwrap();
}

#[test]
fn signals_are_consumed_once() {
    let mut s = setup();
    let mut pep = MockRequester::new(RequesterKind::Pep);
    s.activate(1, PK1, 1);
    s.request(RequesterKind::Pep, "r");
    s.ks.process_request_queue(&mut s.store, &mut pep).unwrap();
    let id = pep.forwarded[0].identity;

    for (r, identity) in [
        ("a", Some(id)),
        ("b", Some(Identity::from_count(999))),
        ("c", None),
    ] {
        s.ks.enqueue_signal(
            &mut s.store,
            RequesterKind::Pep,
            SignalQueueEntry {
                request_id: RequestId::new(r),
                identity,
            },
        )
        .unwrap();
    }

    let mut events = Vec::new();
    s.ks.begin_block(&mut s.store, &mut events, Height::from(3), &mut [])
        .unwrap();
    assert_eq!(events, vec![Event::StartSendGeneralKeyShare { identity: id }]);
    assert!(s.ks.signals(&s.store, RequesterKind::Pep).unwrap().is_empty());

    let mut events = Vec::new();
    s.ks.begin_block(&mut s.store, &mut events, Height::from(4), &mut [])
        .unwrap();
    assert!(events.is_empty());
}

#[test]
fn failing_requester_stalls_its_queue() {
    let mut s = setup();
    let mut gov = MockRequester::new(RequesterKind::Gov);
    gov.reject = true;
    s.activate(1, PK1, 1);
    for p in [7u64, 8] {
        let r = InboundRequest {
            request_id: ProposalId::from(p).into(),
            creator: s.vals[0],
            proposal_id: Some(ProposalId::from(p)),
        };
        s.ks.submit_request(&mut s.store, RequesterKind::Gov, r).unwrap();
    }
    assert!(matches!(
        s.ks.process_request_queue(&mut s.store, &mut gov),
        Err(KeyshareError::Requester(RequesterError::ProposalNotFound(_)))
    ));
    assert_eq!(s.ks.inbound_requests(&s.store, RequesterKind::Gov).unwrap().len(), 2);
    // the identity was consumed regardless
    assert_eq!(s.ks.request_count(&s.store).unwrap(), 1);

    // begin_block logs the failure and carries on
    let mut events = Vec::new();
    s.ks.begin_block(&mut s.store, &mut events, Height::from(3), &mut [&mut gov])
        .unwrap();

    gov.reject = false;
    let ids = s.ks.process_request_queue(&mut s.store, &mut gov).unwrap();
    assert_eq!(ids, vec![Identity::from_count(3), Identity::from_count(4)]);
    assert_eq!(gov.forwarded[0].proposal_id, Some(ProposalId::from(7)));
}

#[test]
fn expired_key_stops_issuance() {
    let mut s = setup();
    let mut pep = MockRequester::new(RequesterKind::Pep);
    s.activate(1, PK1, 1);
    let mut events = Vec::new();
    s.ks.begin_block(&mut s.store, &mut events, Height::from(51), &mut [])
        .unwrap();
    assert!(events.is_empty());
    s.ks.begin_block(&mut s.store, &mut events, Height::from(52), &mut [])
        .unwrap();
    assert!(matches!(events[..], [Event::PubKeyExpired { .. }]));
    s.request(RequesterKind::Pep, "late");
    assert!(matches!(
        s.ks.process_request_queue(&mut s.store, &mut pep),
        Err(KeyshareError::NoActivePublicKey)
    ));
}

quickcheck! {
    /// Identities increase strictly across blocks and module restarts.
    fn identities_increase(batches: Vec<u8>) -> bool {
        let mut s = setup();
        s.activate(1, PK1, 1);
        let mut pep = MockRequester::new(RequesterKind::Pep);
        let mut n = 0;
        for (b, size) in batches.iter().take(8).enumerate() {
            for _ in 0..size % 4 {
                s.request(RequesterKind::Pep, &format!("req-{n:04}"));
                n += 1;
            }
            if b % 3 == 2 {
                // a fresh module instance over the same state
                s.ks = Keyshare::new(XorScheme, config(s.trusted)).unwrap();
            }
            let mut events = Vec::new();
            s.ks
                .begin_block(&mut s.store, &mut events, Height::from(3 + b as u64), &mut [&mut pep])
                .unwrap();
        }
        let ids: Vec<u64> = pep.forwarded.iter().map(|e| e.identity.count()).collect();
        ids.len() == n && ids.windows(2).all(|w| w[0] < w[1])
    }
}
