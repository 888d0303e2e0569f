use std::num::NonZeroU32;

use ark_std::test_rng;
use keyshare::{Keyshare, KeyshareConfig, KeyshareError};
use keyshare_crypto::dealer::{Dealer, extract};
use keyshare_crypto::xor::XorScheme;
use keyshare_crypto::{BlsScheme, ShareScheme};
use keyshare_store::MemStore;
use keyshare_types::{Address, Event, Height, Params};
use keyshare_utils::logging::init_logging;
use keyshare_utils::unsafe_zero_address;
use quickcheck::quickcheck;

const PK: [u8; 32] = [42; 32];

fn seed(i: u32) -> [u8; 32] {
    [i as u8 + 1; 32]
}

fn config(threshold: u32, validators: u32) -> KeyshareConfig {
    KeyshareConfig::builder()
        .params(Params {
            threshold,
            min_validators: validators,
            ..Params::default()
        })
        .build()
}

fn xor_module(
    n: u32,
    t: u32,
    round: u64,
) -> (Keyshare<XorScheme>, MemStore, Vec<Address>) {
    let ks = Keyshare::new(XorScheme, config(t, n)).unwrap();
    let mut store = MemStore::new();
    let mut vals = Vec::new();
    for i in 0..n {
        let a = unsafe_zero_address(i);
        let v = ks.register_validator(&mut store, a).unwrap();
        assert_eq!(v.index, i);
        ks.register_commitment(&mut store, a, round, XorScheme::commitment(PK, seed(i)))
            .unwrap();
        vals.push(a)
    }
    (ks, store, vals)
}

/// Three validators commit for height 7 with threshold 2; one sends a tampered share.
#[test]
fn tampered_share_is_excluded() {
    init_logging();

    let rng = &mut test_rng();
    let dealing = Dealer::new(NonZeroU32::new(2).unwrap(), NonZeroU32::new(3).unwrap())
        .unwrap()
        .deal(rng);

    let ks = Keyshare::new(BlsScheme::new(), config(2, 3)).unwrap();
    let mut store = MemStore::new();
    let mut events = Vec::new();
    let height = Height::from(7);
    let ctx = height.context();

    let vals: Vec<Address> = (0..3u32).map(unsafe_zero_address).collect();
    for a in &vals {
        ks.register_validator(&mut store, *a).unwrap();
        ks.register_commitment(&mut store, *a, 7, dealing.commitment().to_vec())
            .unwrap();
    }

    let s0 = dealing.share(0).unwrap().extract(&ctx).unwrap();
    let s2 = dealing.share(2).unwrap().extract(&ctx).unwrap();
    // a well-formed share bound to another height
    let tampered = dealing
        .share(1)
        .unwrap()
        .extract(&Height::from(8).context())
        .unwrap();

    ks.submit_share(&mut store, &mut events, &vals[0], height, s0, height)
        .unwrap();
    assert!(matches!(
        ks.submit_share(&mut store, &mut events, &vals[1], height, tampered, height),
        Err(KeyshareError::InvalidShare)
    ));
    assert!(ks.key_share(&store, &vals[1], height).unwrap().is_none());
    assert!(matches!(
        ks.aggregate(&mut store, &mut events, height),
        Err(KeyshareError::InsufficientShares { have: 1, need: 2, .. })
    ));

    ks.submit_share(&mut store, &mut events, &vals[2], height, s2, height)
        .unwrap();
    let agg = ks.aggregate(&mut store, &mut events, height).unwrap();
    assert_eq!(agg.data, extract(dealing.secret(), &ctx).unwrap());
    assert_eq!(
        agg.pubkey,
        BlsScheme::new().public_key(dealing.commitment()).unwrap()
    );

    let aggregated = events
        .iter()
        .filter(|e| matches!(e, Event::KeyShareAggregated { .. }))
        .count();
    assert_eq!(aggregated, 1);
}

#[test]
fn aggregation_is_idempotent() {
    let (ks, mut store, vals) = xor_module(3, 2, 5);
    let mut events = Vec::new();
    let h = Height::from(5);
    for (i, a) in vals.iter().enumerate() {
        let s = XorScheme::share(seed(i as u32), &h.context());
        ks.submit_share(&mut store, &mut events, a, h, s, h).unwrap();
    }
    let a1 = ks.aggregate(&mut store, &mut events, h).unwrap();
    let a2 = ks.aggregate(&mut store, &mut events, h).unwrap();
    assert_eq!(a1, a2);
    assert_eq!(ks.aggregated_key_shares(&store).unwrap().len(), 1);
    assert_eq!(ks.latest_aggregated_height(&store).unwrap(), Some(h));

    // aggregated eagerly with the first two shares only
    let expected = XorScheme
        .combine(&[
            (0, XorScheme::share(seed(0), &h.context())),
            (1, XorScheme::share(seed(1), &h.context())),
        ])
        .unwrap();
    assert_eq!(a1.data, expected);

    let r1 = ks.verifiable_randomness(&store, None).unwrap();
    let r2 = ks.verifiable_randomness(&store, Some(h)).unwrap();
    assert_eq!(r1, r2);
    assert_eq!(r1.randomness.len(), 64);
    assert!(matches!(
        ks.verifiable_randomness(&store, Some(Height::from(6))),
        Err(KeyshareError::AggregatedKeyNotFound(Some(_)))
    ));
}

#[test]
fn commitment_registration() -> anyhow::Result<()> {
    let (ks, mut store, vals) = xor_module(2, 1, 1);
    assert!(matches!(
        ks.register_commitment(&mut store, vals[0], 1, XorScheme::commitment(PK, seed(0))),
        Err(KeyshareError::AlreadyRegistered { round: 1, .. })
    ));
    assert!(matches!(
        ks.register_commitment(&mut store, vals[0], 2, Vec::new()),
        Err(KeyshareError::EmptyCommitments)
    ));
    assert!(matches!(
        ks.register_commitment(&mut store, vals[0], 2, vec![1, 2, 3]),
        Err(KeyshareError::InvalidCommitment(_))
    ));
    let stranger = unsafe_zero_address(77u32);
    assert!(matches!(
        ks.register_commitment(&mut store, stranger, 2, XorScheme::commitment(PK, seed(9))),
        Err(KeyshareError::ValidatorNotRegistered(_))
    ));
    assert!(matches!(
        ks.commitment(&store, &vals[1], 3),
        Err(KeyshareError::CommitmentNotFound { round: 3, .. })
    ));
    assert_eq!(ks.commitments(&store, 1)?.len(), 2);
    assert!(matches!(
        ks.commitments(&store, 9),
        Err(KeyshareError::CommitmentsNotFound(9))
    ));
    Ok(())
}

#[test]
fn malformed_bls_commitments_are_rejected() {
    let rng = &mut test_rng();
    let dealing = Dealer::new(NonZeroU32::new(2).unwrap(), NonZeroU32::new(3).unwrap())
        .unwrap()
        .deal(rng);
    let ks = Keyshare::new(BlsScheme::new(), config(2, 3)).unwrap();
    let mut store = MemStore::new();
    let a = unsafe_zero_address(0u32);
    ks.register_validator(&mut store, a).unwrap();

    // a count prefix far beyond the bytes that follow
    let mut huge = (1u64 << 40).to_le_bytes().to_vec();
    huge.extend_from_slice(&[0; 96]);
    let mut truncated = dealing.commitment().to_vec();
    truncated.truncate(truncated.len() - 1);
    let mut garbage = dealing.commitment().to_vec();
    garbage[8..].fill(0xff);

    for bytes in [huge, truncated, garbage, vec![0; 8]] {
        assert!(matches!(
            ks.register_commitment(&mut store, a, 1, bytes),
            Err(KeyshareError::InvalidCommitment(_))
        ));
    }
    assert!(ks.commitment(&store, &a, 1).is_err());
    ks.register_commitment(&mut store, a, 1, dealing.commitment().to_vec())
        .unwrap();
}

/// Validators of one height commit to different dealings.
#[test]
fn shares_of_different_dealings_are_not_combined() {
    let rng = &mut test_rng();
    let dealer = Dealer::new(NonZeroU32::new(2).unwrap(), NonZeroU32::new(3).unwrap()).unwrap();
    let d1 = dealer.deal(rng);
    let d2 = dealer.deal(rng);

    let ks = Keyshare::new(BlsScheme::new(), config(2, 3)).unwrap();
    let mut store = MemStore::new();
    let mut events = Vec::new();
    let height = Height::from(7);
    let ctx = height.context();

    let vals: Vec<Address> = (0..3u32).map(unsafe_zero_address).collect();
    for (a, d) in vals.iter().zip([&d1, &d2, &d1]) {
        ks.register_validator(&mut store, *a).unwrap();
        ks.register_commitment(&mut store, *a, 7, d.commitment().to_vec())
            .unwrap();
    }

    let s0 = d1.share(0).unwrap().extract(&ctx).unwrap();
    let s1 = d2.share(1).unwrap().extract(&ctx).unwrap();
    let s2 = d1.share(2).unwrap().extract(&ctx).unwrap();

    // each share is valid against its own commitment
    ks.submit_share(&mut store, &mut events, &vals[0], height, s0, height)
        .unwrap();
    ks.submit_share(&mut store, &mut events, &vals[1], height, s1, height)
        .unwrap();
    assert_eq!(ks.key_shares(&store).unwrap().len(), 2);
    assert!(ks.aggregated_key_shares(&store).unwrap().is_empty());
    assert!(matches!(
        ks.aggregate(&mut store, &mut events, height),
        Err(KeyshareError::InsufficientShares { have: 1, need: 2, .. })
    ));

    ks.submit_share(&mut store, &mut events, &vals[2], height, s2, height)
        .unwrap();
    let agg = ks.aggregate(&mut store, &mut events, height).unwrap();
    assert_eq!(agg.data, extract(d1.secret(), &ctx).unwrap());
    assert_eq!(
        agg.pubkey,
        BlsScheme::new().public_key(d1.commitment()).unwrap()
    );
}

#[test]
fn resubmitted_share_after_aggregation() {
    let (ks, mut store, vals) = xor_module(3, 2, 6);
    let mut events = Vec::new();
    let h = Height::from(6);
    for (i, a) in vals.iter().enumerate().take(2) {
        let s = XorScheme::share(seed(i as u32), &h.context());
        ks.submit_share(&mut store, &mut events, a, h, s, h).unwrap();
    }
    let before = ks.aggregate(&mut store, &mut events, h).unwrap();

    let s = XorScheme::share(seed(0), &h.context());
    ks.submit_share(&mut store, &mut events, &vals[0], h, s, Height::from(8))
        .unwrap();
    let shares = ks.key_shares(&store).unwrap();
    assert_eq!(shares.len(), 2);
    let first = ks.key_share(&store, &vals[0], h).unwrap().unwrap();
    assert_eq!(first.received_at, Height::from(8));

    assert_eq!(ks.aggregate(&mut store, &mut events, h).unwrap(), before);
    let aggregated = events
        .iter()
        .filter(|e| matches!(e, Event::KeyShareAggregated { .. }))
        .count();
    assert_eq!(aggregated, 1);
}

#[test]
fn commitment_length_must_match_threshold() {
    let rng = &mut test_rng();
    let dealing = Dealer::new(NonZeroU32::new(3).unwrap(), NonZeroU32::new(4).unwrap())
        .unwrap()
        .deal(rng);
    let ks = Keyshare::new(BlsScheme::new(), config(2, 4)).unwrap();
    let mut store = MemStore::new();
    let a = unsafe_zero_address(0u32);
    ks.register_validator(&mut store, a).unwrap();
    assert!(matches!(
        ks.register_commitment(&mut store, a, 1, dealing.commitment().to_vec()),
        Err(KeyshareError::InvalidCommitmentLength {
            expected: 2,
            got: 3
        })
    ));
}

#[test]
fn share_without_commitment() {
    let (ks, mut store, vals) = xor_module(2, 2, 1);
    let mut events = Vec::new();
    let h = Height::from(2);
    let s = XorScheme::share(seed(0), &h.context());
    assert!(matches!(
        ks.submit_share(&mut store, &mut events, &vals[0], h, s, h),
        Err(KeyshareError::CommitmentNotFound { round: 2, .. })
    ));
    assert!(matches!(
        ks.submit_share(&mut store, &mut events, &vals[0], Height::from(1), vec![0; 3], h),
        Err(KeyshareError::InvalidKeyShareLength {
            expected: 32,
            got: 3
        })
    ));
}

#[test]
fn authorized_address_submits_for_validator() {
    let (ks, mut store, vals) = xor_module(2, 2, 4);
    let mut events = Vec::new();
    let h = Height::from(4);
    let delegate = unsafe_zero_address(50u32);
    let outsider = unsafe_zero_address(51u32);

    let s = XorScheme::share(seed(1), &h.context());
    assert!(matches!(
        ks.submit_share(&mut store, &mut events, &delegate, h, s.clone(), h),
        Err(KeyshareError::ValidatorNotRegistered(_))
    ));

    ks.authorize_address(&mut store, &vals[1], delegate).unwrap();
    assert!(matches!(
        ks.authorize_address(&mut store, &outsider, delegate),
        Err(KeyshareError::ValidatorNotRegistered(_))
    ));
    ks.submit_share(&mut store, &mut events, &delegate, h, s, h)
        .unwrap();
    let share = ks.key_share(&store, &vals[1], h).unwrap().unwrap();
    assert_eq!(share.index, 1);
    assert_eq!(
        events,
        vec![Event::KeyShareSubmitted {
            validator: vals[1],
            height: h
        }]
    );

    ks.revoke_address(&mut store, &vals[1], &delegate).unwrap();
    assert!(ks.authorized_addresses(&store).unwrap().is_empty());
}

#[test]
fn validator_indices_are_not_reused() {
    let (ks, mut store, vals) = xor_module(2, 1, 1);
    assert!(matches!(
        ks.register_validator(&mut store, vals[0]),
        Err(KeyshareError::ValidatorAlreadyRegistered(_))
    ));
    ks.deregister_validator(&mut store, &vals[0]).unwrap();
    let v = ks.register_validator(&mut store, vals[0]).unwrap();
    assert_eq!(v.index, 2);
    assert_eq!(ks.validators(&store).unwrap().len(), 2);
}

#[test]
fn pruning() {
    let (ks, mut store, vals) = xor_module(1, 1, 0);
    let mut events = Vec::new();
    for h in 1..=4u64 {
        let h = Height::from(h);
        ks.register_commitment(&mut store, vals[0], *h, XorScheme::commitment(PK, seed(0)))
            .unwrap();
        let s = XorScheme::share(seed(0), &h.context());
        ks.submit_share(&mut store, &mut events, &vals[0], h, s, h)
            .unwrap();
    }
    assert_eq!(ks.aggregated_key_shares(&store).unwrap().len(), 4);
    ks.prune_aggregated(&mut store, Height::from(3)).unwrap();
    let left: Vec<Height> = ks
        .aggregated_key_shares(&store)
        .unwrap()
        .into_iter()
        .map(|a| a.height)
        .collect();
    assert_eq!(left, vec![Height::from(3), Height::from(4)]);
    assert_eq!(ks.key_shares(&store).unwrap().len(), 2);

    let s = XorScheme::share(seed(0), &Height::from(2).context());
    assert!(matches!(
        ks.submit_share(&mut store, &mut events, &vals[0], Height::from(2), s, Height::from(5)),
        Err(KeyshareError::InvalidBlockHeight(_))
    ));
}

quickcheck! {
    /// Aggregation succeeds iff at least `threshold` valid shares were accepted.
    fn quorum(n: u8, t: u8, k: u8, invalid: u8) -> bool {
        let n = u32::from(n % 6) + 1;
        let t = u32::from(t) % n + 1;
        let k = u32::from(k) % (n + 1);
        let invalid = u32::from(invalid) % (n - k + 1);

        let h = Height::from(9);
        let (ks, mut store, vals) = xor_module(n, t, *h);
        let mut events = Vec::new();
        for (i, a) in vals.iter().enumerate().take(k as usize) {
            let s = XorScheme::share(seed(i as u32), &h.context());
            ks.submit_share(&mut store, &mut events, a, h, s, h).unwrap();
        }
        // wrong shares from the remaining validators never count
        for (i, a) in vals.iter().enumerate().skip(k as usize).take(invalid as usize) {
            let s = XorScheme::share(seed(i as u32), b"elsewhere");
            if !matches!(
                ks.submit_share(&mut store, &mut events, a, h, s, h),
                Err(KeyshareError::InvalidShare)
            ) {
                return false
            }
        }
        match ks.aggregate(&mut store, &mut events, h) {
            Ok(_) => k >= t,
            Err(KeyshareError::InsufficientShares { have, need, .. }) => {
                k < t && have == k as usize && need == t as usize
            }
            Err(_) => false,
        }
    }
}
