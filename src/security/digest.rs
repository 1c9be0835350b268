//! Message digests authenticating `(sender identity ‖ payload)`.
//!
//! The digest is a plain SHA-256 over the sender's 4-byte identity tag
//! followed by the payload bytes. Both identity tags are pre-shared, so the
//! scheme is tamper/corruption evident rather than unforgeable against an
//! adversary with channel access; that is the protocol's stated integrity
//! property. There is no confidentiality goal, so comparison does not need
//! to be constant-time; it must only cover all 32 bytes.

use crate::security::error::{AuthError, AuthResult};
use crate::security::identity::SenderId;
use core::fmt;
use sha2::{Digest, Sha256};

/// Size of a message digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A 32-byte digest authenticating a sender identity plus payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageDigest {
    bytes: [u8; DIGEST_LEN],
}

impl MessageDigest {
    /// Computes the digest over `sender ‖ payload`.
    #[must_use]
    pub fn compute(sender: SenderId, payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(sender.as_bytes());
        hasher.update(payload);

        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&hasher.finalize());
        Self { bytes }
    }

    /// Recomputes the digest for `sender ‖ payload` and compares all 32 bytes.
    #[must_use]
    pub fn verify(&self, sender: SenderId, payload: &[u8]) -> bool {
        let computed = Self::compute(sender, payload);
        self.bytes == computed.bytes
    }

    /// Like [`verify`](Self::verify), but reports a mismatch as an error.
    ///
    /// The receiver recomputes from the identity it expects for the channel
    /// direction; equality is mandatory before the payload may be trusted.
    pub fn authenticate(&self, sender: SenderId, payload: &[u8]) -> AuthResult<()> {
        if self.verify(sender, payload) {
            Ok(())
        } else {
            Err(AuthError::verification_failed()
                .with_context(format!("expected sender {sender}")))
        }
    }

    /// Creates a digest from raw bytes (as carried in a received frame).
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self { bytes }
    }

    /// Returns a zeroed digest (placeholder; never verifies in practice).
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; DIGEST_LEN],
        }
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }
}

impl TryFrom<&[u8]> for MessageDigest {
    type Error = AuthError;

    fn try_from(slice: &[u8]) -> AuthResult<Self> {
        let bytes: [u8; DIGEST_LEN] = slice
            .try_into()
            .map_err(|_| AuthError::malformed_digest().with_context(format!("{} bytes", slice.len())))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Debug for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({:02x}{:02x}...)", self.bytes[0], self.bytes[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        let d1 = MessageDigest::compute(SenderId::PRODUCER, &[1, 2, 3]);
        let d2 = MessageDigest::compute(SenderId::PRODUCER, &[1, 2, 3]);
        assert_eq!(d1, d2);
    }

    #[test]
    fn verify_accepts_matching_digest() {
        let digest = MessageDigest::compute(SenderId::CONSUMER, b"head=42");
        assert!(digest.verify(SenderId::CONSUMER, b"head=42"));
        assert!(digest.authenticate(SenderId::CONSUMER, b"head=42").is_ok());
    }

    #[test]
    fn verify_rejects_different_payload() {
        let digest = MessageDigest::compute(SenderId::PRODUCER, &[1, 2, 3]);
        assert!(!digest.verify(SenderId::PRODUCER, &[1, 2, 4]));
    }

    #[test]
    fn verify_rejects_different_sender() {
        let digest = MessageDigest::compute(SenderId::PRODUCER, &[1, 2, 3]);
        assert!(!digest.verify(SenderId::CONSUMER, &[1, 2, 3]));
    }

    #[test]
    fn zero_digest_fails_verification() {
        // Unless SHA-256 of the input happens to be zero (probability 2^-256).
        assert!(!MessageDigest::zero().verify(SenderId::PRODUCER, &[1, 2, 3]));
    }

    #[test]
    fn single_bit_flip_fails_verification() {
        let payload = [1u8, 2, 3, 4, 5];
        let good = MessageDigest::compute(SenderId::PRODUCER, &payload);

        let good_bytes = *good.as_bytes();
        for byte_idx in 0..DIGEST_LEN {
            for bit_idx in 0..8u8 {
                let mut flipped = good_bytes;
                flipped[byte_idx] ^= 1 << bit_idx;
                let bad = MessageDigest::from_bytes(flipped);
                assert!(
                    !bad.verify(SenderId::PRODUCER, &payload),
                    "flipping bit {bit_idx} of byte {byte_idx} must fail verification"
                );
            }
        }
    }

    #[test]
    fn try_from_rejects_short_slice() {
        let err = MessageDigest::try_from(&[0u8; 16][..]).unwrap_err();
        assert_eq!(err.kind(), crate::security::AuthErrorKind::MalformedDigest);
    }

    #[test]
    fn try_from_roundtrip() {
        let digest = MessageDigest::compute(SenderId::PRODUCER, b"payload");
        let carried = MessageDigest::try_from(&digest.as_bytes()[..]).unwrap();
        assert_eq!(carried, digest);
    }

    #[test]
    fn authenticate_reports_expected_sender() {
        let digest = MessageDigest::compute(SenderId::PRODUCER, &[9]);
        let err = digest.authenticate(SenderId::CONSUMER, &[9]).unwrap_err();
        assert!(err.is_verification_failure());
        assert!(err.to_string().contains("baadbeef"));
    }
}
