//! Property tests for the digest scheme and the ring index.

mod common;

use common::init_test_logging;
use proptest::prelude::*;
use ringlink::ring::RingIndex;
use ringlink::security::{DIGEST_LEN, MessageDigest, SenderId};

proptest! {
    /// `verify(id, p, compute(id, p))` holds for every payload and identity.
    #[test]
    fn digest_roundtrip(
        payload in proptest::collection::vec(any::<u8>(), 0..=60),
        id in any::<[u8; 4]>(),
    ) {
        let sender = SenderId::new(id);
        let digest = MessageDigest::compute(sender, &payload);
        prop_assert!(digest.verify(sender, &payload));
    }

    /// Distinct payloads produce distinct digests.
    #[test]
    fn distinct_payloads_distinct_digests(
        p1 in proptest::collection::vec(any::<u8>(), 0..=60),
        p2 in proptest::collection::vec(any::<u8>(), 0..=60),
    ) {
        prop_assume!(p1 != p2);
        let d1 = MessageDigest::compute(SenderId::PRODUCER, &p1);
        let d2 = MessageDigest::compute(SenderId::PRODUCER, &p2);
        prop_assert_ne!(d1.as_bytes(), d2.as_bytes());
    }

    /// The digest binds the sender identity, not just the payload.
    #[test]
    fn distinct_identities_distinct_digests(
        payload in proptest::collection::vec(any::<u8>(), 0..=60),
        a in any::<[u8; 4]>(),
        b in any::<[u8; 4]>(),
    ) {
        prop_assume!(a != b);
        let da = MessageDigest::compute(SenderId::new(a), &payload);
        let db = MessageDigest::compute(SenderId::new(b), &payload);
        prop_assert_ne!(da.as_bytes(), db.as_bytes());
    }

    /// `n` increments from zero always land on `n % capacity`.
    #[test]
    fn ring_index_is_modular(capacity in 1usize..=256, n in 0usize..=2048) {
        let mut index = RingIndex::new(capacity);
        for _ in 0..n {
            index.advance();
        }
        prop_assert_eq!(index.get(), n % capacity);
        prop_assert!(index.get() < capacity);
    }
}

/// Randomized tamper sweep: flipping any single payload bit breaks
/// verification.
#[test]
fn random_payload_tampering_is_detected() {
    init_test_logging();
    fastrand::seed(0x5EED);

    for _ in 0..200 {
        let len = fastrand::usize(1..=60);
        let payload: Vec<u8> = (0..len).map(|_| fastrand::u8(..)).collect();
        let digest = MessageDigest::compute(SenderId::PRODUCER, &payload);

        let mut tampered = payload.clone();
        let byte = fastrand::usize(0..len);
        let bit = fastrand::u8(0..8);
        tampered[byte] ^= 1 << bit;

        assert!(digest.verify(SenderId::PRODUCER, &payload));
        assert!(
            !digest.verify(SenderId::PRODUCER, &tampered),
            "flipped bit {bit} of byte {byte} went undetected"
        );
    }
}

/// Truncated digests never authenticate.
#[test]
fn truncated_digest_is_malformed() {
    init_test_logging();

    let digest = MessageDigest::compute(SenderId::CONSUMER, b"batch");
    for len in 0..DIGEST_LEN {
        assert!(MessageDigest::try_from(&digest.as_bytes()[..len]).is_err());
    }
}
