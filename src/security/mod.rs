//! Message authentication primitives.
//!
//! Every inter-task message carries a 32-byte digest over
//! `(sender identity ‖ payload)` so corruption or spoofing of a frame is
//! detected before the payload is trusted.
//!
//! # Design
//!
//! 1. **Pre-shared identities**: both tasks know both 4-byte tags ahead of
//!    time; nothing is negotiated.
//! 2. **Tamper evidence, not unforgeability**: the identity tag is
//!    reconstructable by anyone with channel access, so the scheme detects
//!    corruption and accidental spoofing, not a deliberate in-channel
//!    adversary.
//! 3. **Fail-soft verification**: a mismatch discards the frame and is
//!    reported to the caller; it never tears down the channel.
//!
//! The digest engine is in-process SHA-256, so the "hash engine
//! unavailable" fatal path of driver-backed engines has no analogue here.

pub mod digest;
pub mod error;
pub mod identity;

pub use digest::{DIGEST_LEN, MessageDigest};
pub use error::{AuthError, AuthErrorKind, AuthResult};
pub use identity::{SENDER_ID_LEN, SenderId};
